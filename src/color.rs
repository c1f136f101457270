use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Driver colours: driver code → Color32
// ---------------------------------------------------------------------------

/// Distinct label colours for the drivers of one season, in grid order.
#[derive(Debug, Clone, Default)]
pub struct DriverColors {
    mapping: BTreeMap<String, Color32>,
}

impl DriverColors {
    pub fn new(drivers: &[String]) -> Self {
        let mapping = drivers
            .iter()
            .cloned()
            .zip(generate_palette(drivers.len()))
            .collect();
        DriverColors { mapping }
    }

    /// Colour for a driver code; grey for codes outside the season.
    pub fn color_for(&self, driver: &str) -> Color32 {
        self.mapping.get(driver).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colors = generate_palette(20);
        assert_eq!(colors.len(), 20);
        for (i, a) in colors.iter().enumerate() {
            assert!(colors[i + 1..].iter().all(|b| a != b));
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_driver_is_grey() {
        let drivers: Vec<String> = ["VER", "LEC"].iter().map(|s| s.to_string()).collect();
        let colors = DriverColors::new(&drivers);
        assert_ne!(colors.color_for("VER"), colors.color_for("LEC"));
        assert_eq!(colors.color_for("SCH"), Color32::GRAY);
    }
}
