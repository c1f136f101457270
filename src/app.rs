use std::sync::Arc;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TelemetryApp {
    pub state: AppState,
}

impl TelemetryApp {
    pub fn new(cc: &eframe::CreationContext<'_>, mut state: AppState) -> Self {
        // Wake the UI as soon as a worker finishes, even without input.
        let ctx = cc.egui_ctx.clone();
        state.runner.set_notifier(Arc::new(move || ctx.request_repaint()));
        Self { state }
    }
}

impl eframe::App for TelemetryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Artifacts are overwritten under the same name; drop the cached copy.
        if let Some(artifact) = self.state.poll_run() {
            ctx.forget_image(&artifact.uri());
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selection ----
        egui::SidePanel::left("options_panel")
            .default_width(220.0)
            .resizable(false)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::plot_view(ui, &self.state);
        });
    }
}
