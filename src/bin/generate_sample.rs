//! Writes a small demonstration dataset and placeholder image:
//!
//! ```text
//! data/events.csv      one column per season, Grand Prix names
//! data/drivers.csv     one column per season, driver codes
//! data/race_laps.csv   event,laps
//! img/placeholder.png
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

const EVENTS_2022: &[&str] = &[
    "Bahrain Grand Prix",
    "Saudi Arabian Grand Prix",
    "Australian Grand Prix",
    "Emilia Romagna Grand Prix",
    "Miami Grand Prix",
    "Spanish Grand Prix",
    "Monaco Grand Prix",
    "Azerbaijan Grand Prix",
    "Canadian Grand Prix",
    "British Grand Prix",
    "Austrian Grand Prix",
    "Hungarian Grand Prix",
    "Belgian Grand Prix",
    "Dutch Grand Prix",
    "Italian Grand Prix",
    "Singapore Grand Prix",
    "Japanese Grand Prix",
    "United States Grand Prix",
    "Mexico City Grand Prix",
    "São Paulo Grand Prix",
    "Abu Dhabi Grand Prix",
];

const EVENTS_2023: &[&str] = &[
    "Bahrain Grand Prix",
    "Saudi Arabian Grand Prix",
    "Australian Grand Prix",
    "Azerbaijan Grand Prix",
    "Miami Grand Prix",
    "Monaco Grand Prix",
    "Spanish Grand Prix",
    "Canadian Grand Prix",
    "Austrian Grand Prix",
    "British Grand Prix",
    "Hungarian Grand Prix",
    "Belgian Grand Prix",
    "Dutch Grand Prix",
    "Italian Grand Prix",
    "Singapore Grand Prix",
    "Japanese Grand Prix",
    "Qatar Grand Prix",
    "United States Grand Prix",
    "Mexico City Grand Prix",
    "São Paulo Grand Prix",
    "Las Vegas Grand Prix",
    "Abu Dhabi Grand Prix",
];

const EVENTS_2024: &[&str] = &[
    "Bahrain Grand Prix",
    "Saudi Arabian Grand Prix",
    "Australian Grand Prix",
    "Japanese Grand Prix",
    "Chinese Grand Prix",
    "Miami Grand Prix",
    "Emilia Romagna Grand Prix",
    "Monaco Grand Prix",
    "Canadian Grand Prix",
    "Spanish Grand Prix",
    "Austrian Grand Prix",
    "British Grand Prix",
    "Hungarian Grand Prix",
    "Belgian Grand Prix",
    "Dutch Grand Prix",
    "Italian Grand Prix",
];

const DRIVERS_2022: &[&str] = &[
    "VER", "LEC", "PER", "RUS", "SAI", "HAM", "NOR", "OCO", "ALO", "BOT", "RIC", "VET", "MAG",
    "GAS", "STR", "SCH", "ZHO", "TSU", "ALB", "LAT",
];

const DRIVERS_2023: &[&str] = &[
    "VER", "PER", "HAM", "ALO", "LEC", "NOR", "SAI", "RUS", "PIA", "STR", "GAS", "OCO", "ALB",
    "TSU", "BOT", "HUL", "RIC", "ZHO", "MAG", "SAR",
];

const DRIVERS_2024: &[&str] = &[
    "VER", "LEC", "NOR", "PIA", "SAI", "HAM", "RUS", "PER", "ALO", "HUL", "STR", "TSU", "ALB",
    "RIC", "GAS", "MAG", "OCO", "ZHO", "SAR", "BOT",
];

const RACE_LAPS: &[(&str, u32)] = &[
    ("Bahrain Grand Prix", 57),
    ("Saudi Arabian Grand Prix", 50),
    ("Australian Grand Prix", 58),
    ("Japanese Grand Prix", 53),
    ("Chinese Grand Prix", 56),
    ("Miami Grand Prix", 57),
    ("Emilia Romagna Grand Prix", 63),
    ("Monaco Grand Prix", 78),
    ("Azerbaijan Grand Prix", 51),
    ("Canadian Grand Prix", 70),
    ("Spanish Grand Prix", 66),
    ("Austrian Grand Prix", 71),
    ("British Grand Prix", 52),
    ("Hungarian Grand Prix", 70),
    ("Belgian Grand Prix", 44),
    ("Dutch Grand Prix", 72),
    ("Italian Grand Prix", 53),
    ("Singapore Grand Prix", 62),
    ("Qatar Grand Prix", 57),
    ("United States Grand Prix", 56),
    ("Mexico City Grand Prix", 71),
    ("São Paulo Grand Prix", 71),
    ("Las Vegas Grand Prix", 50),
    ("Abu Dhabi Grand Prix", 58),
];

/// Write a column-per-year table with a leading index column, padding
/// shorter seasons with blank cells.
fn write_year_table(path: &Path, seasons: &[(&str, &[&str])]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![String::new()];
    header.extend(seasons.iter().map(|(year, _)| year.to_string()));
    writer.write_record(&header)?;

    let rows = seasons.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
    for row in 0..rows {
        let mut record = vec![row.to_string()];
        record.extend(
            seasons
                .iter()
                .map(|(_, entries)| entries.get(row).copied().unwrap_or("").to_string()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_race_laps(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["event", "laps"])?;
    for (event, laps) in RACE_LAPS {
        writer.write_record([event.to_string(), laps.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Dark canvas with a red bar along the top edge.
fn write_placeholder(path: &Path) -> Result<()> {
    let img = image::RgbImage::from_fn(625, 400, |_, y| {
        if y < 12 {
            image::Rgb([0xDC, 0x00, 0x00])
        } else {
            image::Rgb([0x1E, 0x1E, 0x24])
        }
    });
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let data = Path::new("data");
    let img = Path::new("img");
    fs::create_dir_all(data)?;
    fs::create_dir_all(img)?;

    let events = data.join("events.csv");
    write_year_table(
        &events,
        &[("2022", EVENTS_2022), ("2023", EVENTS_2023), ("2024", EVENTS_2024)],
    )?;
    println!("Wrote {}", events.display());

    let drivers = data.join("drivers.csv");
    write_year_table(
        &drivers,
        &[("2022", DRIVERS_2022), ("2023", DRIVERS_2023), ("2024", DRIVERS_2024)],
    )?;
    println!("Wrote {}", drivers.display());

    let laps = data.join("race_laps.csv");
    write_race_laps(&laps)?;
    println!("Wrote {}", laps.display());

    let placeholder = img.join("placeholder.png");
    write_placeholder(&placeholder)?;
    println!("Wrote {}", placeholder.display());

    Ok(())
}
