use eframe::egui::{self, Color32, RichText, Ui};

use crate::analysis::{AnalysisType, Session};
use crate::config::desktop_dir;
use crate::data::filter::YEAR_SENTINEL;
use crate::state::AppState;

const LAP_SENTINEL: &str = "Select Lap";
const EVENT_SENTINEL: &str = "Select Location";
const DRIVER_SENTINEL: &str = "Select Driver";

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left options panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Analysis");
    ui.separator();

    let busy = state.runner.is_running();

    ui.add_enabled_ui(!busy, |ui: &mut Ui| {
        year_combo(ui, state);
        event_combo(ui, state);
        session_combo(ui, state);
        driver_combo(ui, state, 1);
        driver_combo(ui, state, 2);
        analysis_combo(ui, state);
        if state.shows_laps() {
            lap_combo(ui, state);
        }
    });

    ui.add_space(8.0);

    if busy {
        ui.horizontal(|ui: &mut Ui| {
            ui.spinner();
            ui.label("Generating plot…");
        });
    }

    // Disabled while running: a second trigger is never dispatched.
    let run = egui::Button::new(state.run_button_label());
    if ui.add_enabled(!busy, run).clicked() {
        state.run_analysis();
    }

    if state.current_artifact().is_some() && ui.button("Save Plot…").clicked() {
        save_plot_dialog(state);
    }
}

fn labelled(ui: &mut Ui, label: &str) {
    ui.add_space(4.0);
    ui.strong(label);
}

fn year_combo(ui: &mut Ui, state: &mut AppState) {
    labelled(ui, "Year:");
    let current = state.year_label();
    let mut picked = None;
    egui::ComboBox::from_id_salt("year")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for label in state.year_labels() {
                if ui.selectable_label(current == label, &label).clicked() {
                    picked = Some(label);
                }
            }
        });
    if let Some(label) = picked.filter(|l| *l != current) {
        state.select_year(&label);
    }
}

fn event_combo(ui: &mut Ui, state: &mut AppState) {
    labelled(ui, "Grand Prix Location:");
    let current = state.selection.event.clone();
    let mut picked = None;
    egui::ComboBox::from_id_salt("event")
        .selected_text(current.as_deref().unwrap_or(EVENT_SENTINEL))
        .show_ui(ui, |ui: &mut Ui| {
            for event in &state.event_options {
                if ui
                    .selectable_label(current.as_ref() == Some(event), event)
                    .clicked()
                {
                    picked = Some(event.clone());
                }
            }
        });
    if let Some(event) = picked.filter(|e| Some(e) != current.as_ref()) {
        state.select_event(&event);
    }
}

fn session_combo(ui: &mut Ui, state: &mut AppState) {
    labelled(ui, "Session:");
    egui::ComboBox::from_id_salt("session")
        .selected_text(state.selection.session.label())
        .show_ui(ui, |ui: &mut Ui| {
            for session in Session::ALL {
                ui.selectable_value(&mut state.selection.session, session, session.label());
            }
        });
}

fn driver_combo(ui: &mut Ui, state: &mut AppState, slot: u8) {
    labelled(ui, &format!("Driver {slot}:"));
    let colors = state.driver_colors.clone();
    let options = state.driver_options.clone();
    let selected = if slot == 1 {
        &mut state.selection.driver1
    } else {
        &mut state.selection.driver2
    };

    let text = match selected.as_deref() {
        Some(code) => RichText::new(code).color(colors.color_for(code)),
        None => RichText::new(DRIVER_SENTINEL),
    };
    egui::ComboBox::from_id_salt(("driver", slot))
        .selected_text(text)
        .show_ui(ui, |ui: &mut Ui| {
            for code in &options {
                let label = RichText::new(code).color(colors.color_for(code));
                if ui
                    .selectable_label(selected.as_ref() == Some(code), label)
                    .clicked()
                {
                    *selected = Some(code.clone());
                }
            }
        });
}

fn analysis_combo(ui: &mut Ui, state: &mut AppState) {
    labelled(ui, "Analysis Type:");
    let current = state.selection.analysis;
    egui::ComboBox::from_id_salt("analysis")
        .selected_text(current.label())
        .show_ui(ui, |ui: &mut Ui| {
            for analysis in AnalysisType::ALL {
                if ui.selectable_label(current == analysis, analysis.label()).clicked() {
                    state.select_analysis(analysis);
                }
            }
        });
}

fn lap_combo(ui: &mut Ui, state: &mut AppState) {
    labelled(ui, "Lap:");
    let current = state.selection.lap;
    let text = current.map_or_else(|| LAP_SENTINEL.to_string(), |l| l.to_string());
    egui::ComboBox::from_id_salt("lap")
        .selected_text(text)
        .height(300.0)
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), LAP_SENTINEL).clicked() {
                state.selection.lap = None;
            }
            for &lap in &state.lap_options {
                if ui.selectable_label(current == Some(lap), lap.to_string()).clicked() {
                    state.selection.lap = Some(lap);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let can_save = state.current_artifact().is_some();
            if ui.add_enabled(can_save, egui::Button::new("Save Plot…")).clicked() {
                save_plot_dialog(state);
                ui.close_menu();
            }
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        let seasons = state.cascade.years().len();
        ui.label(format!("{seasons} seasons loaded"));
        if state.selection.year.is_none() {
            ui.weak(format!("({YEAR_SENTINEL} to begin)"));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::from_rgb(0xDC, 0x00, 0x00)));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_plot_dialog(state: &mut AppState) {
    let mut dialog = rfd::FileDialog::new().set_title("Save plot to folder");
    if let Some(desktop) = desktop_dir() {
        dialog = dialog.set_directory(desktop);
    }
    if let Some(folder) = dialog.pick_folder() {
        state.export_to(&folder);
    }
}
