use eframe::egui::{self, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – generated plot
// ---------------------------------------------------------------------------

/// Render the last generated plot, or the placeholder before the first run.
pub fn plot_view(ui: &mut Ui, state: &AppState) {
    if state.displayed.is_none() && !state.placeholder.exists() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Pick a year, event and drivers, then run an analysis");
        });
        return;
    }

    ui.centered_and_justified(|ui: &mut Ui| {
        ui.add(egui::Image::new(state.image_uri()).shrink_to_fit());
    });
}
