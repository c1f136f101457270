mod analysis;
mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui;

use analysis::backend::ScriptBackend;
use analysis::runner::AnalysisRunner;
use app::TelemetryApp;
use config::AppConfig;
use data::filter::FilterCascade;
use data::loader::load_dataset;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let state = build_state().inspect_err(|e| log::error!("Startup failed: {e:#}"))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([880.0, 525.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Formula 1 Telemetry Analytics",
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render png files from disk.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(TelemetryApp::new(cc, state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("running UI: {e}"))
}

/// Load config and dataset. A dataset that cannot be loaded is fatal.
fn build_state() -> Result<AppState> {
    let config = AppConfig::load()?;

    let dataset = load_dataset(
        &config.events_path(),
        &config.drivers_path(),
        &config.laps_path(),
    )
    .context("loading telemetry dataset")?;
    let cascade = FilterCascade::new(Arc::new(dataset));

    let backend = ScriptBackend::new(&config.plot_command)?;
    let runner = AnalysisRunner::new(
        cascade.clone(),
        Arc::new(backend),
        config.output_dir.clone(),
        config.image_extension.clone(),
    );

    Ok(AppState::new(cascade, runner, config.placeholder_image))
}
