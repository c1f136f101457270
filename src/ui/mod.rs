/// egui rendering. All state lives in [`crate::state::AppState`]; these
/// functions only draw it and forward user input.
pub mod panels;
pub mod plot;
