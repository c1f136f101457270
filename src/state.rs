use std::path::{Path, PathBuf};

use crate::analysis::export::export_artifact;
use crate::analysis::runner::{AnalysisRunner, RunState};
use crate::analysis::{AnalysisType, ArtifactPath, Selection};
use crate::color::DriverColors;
use crate::data::filter::{FilterCascade, YEAR_SENTINEL};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub cascade: FilterCascade,
    pub runner: AnalysisRunner,

    /// Current dropdown values.
    pub selection: Selection,

    /// Options of the dependent dropdowns for the current year / event.
    pub event_options: Vec<String>,
    pub driver_options: Vec<String>,
    pub lap_options: Vec<u32>,

    /// Label tints for the current season's drivers.
    pub driver_colors: DriverColors,

    /// Shown until the first analysis succeeds.
    pub placeholder: PathBuf,

    /// Last artifact displayed in the central panel.
    pub displayed: Option<ArtifactPath>,

    /// Set when a run was refused because no year was chosen.
    pub year_rejected: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(cascade: FilterCascade, runner: AnalysisRunner, placeholder: PathBuf) -> Self {
        Self {
            cascade,
            runner,
            selection: Selection::default(),
            event_options: Vec::new(),
            driver_options: Vec::new(),
            lap_options: Vec::new(),
            driver_colors: DriverColors::default(),
            placeholder,
            displayed: None,
            year_rejected: false,
            status_message: None,
        }
    }

    /// Year dropdown entries: the sentinel followed by every dataset year.
    pub fn year_labels(&self) -> Vec<String> {
        std::iter::once(YEAR_SENTINEL.to_string())
            .chain(self.cascade.years().iter().map(|y| y.to_string()))
            .collect()
    }

    pub fn year_label(&self) -> String {
        self.selection
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| YEAR_SENTINEL.to_string())
    }

    /// Change the year and repopulate events and drivers. Everything that
    /// depends on the previous year is cleared first.
    pub fn select_year(&mut self, label: &str) {
        self.selection.year = None;
        self.selection.event = None;
        self.selection.driver1 = None;
        self.selection.driver2 = None;
        self.selection.lap = None;
        self.event_options.clear();
        self.driver_options.clear();
        self.lap_options.clear();
        self.driver_colors = DriverColors::default();

        if label == YEAR_SENTINEL {
            return;
        }

        let options = self.cascade.resolve_year(label).and_then(|year| {
            let events = self.cascade.events_for_year(label)?;
            let drivers = self.cascade.drivers_for_year(label)?;
            Ok((year, events, drivers))
        });
        let (year, events, drivers) = match options {
            Ok(options) => options,
            Err(e) => {
                log::error!("{e}");
                self.status_message = Some(e.to_string());
                return;
            }
        };

        self.selection.year = Some(year);
        self.year_rejected = false;
        self.status_message = None;
        self.driver_colors = DriverColors::new(&drivers);
        self.selection.driver1 = drivers.first().cloned();
        self.selection.driver2 = drivers.get(1).or(drivers.first()).cloned();
        self.driver_options = drivers;
        self.event_options = events;

        if let Some(first) = self.event_options.first().cloned() {
            self.select_event(&first);
        }
    }

    /// Change the Grand Prix and repopulate the lap list.
    pub fn select_event(&mut self, event: &str) {
        self.selection.event = Some(event.to_string());
        self.selection.lap = None;
        self.lap_options.clear();

        match self.cascade.lap_range_for_event(event) {
            Ok(laps) => self.lap_options = laps,
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    pub fn select_analysis(&mut self, analysis: AnalysisType) {
        self.selection.analysis = analysis;
    }

    /// Whether the lap dropdown should be visible.
    pub fn shows_laps(&self) -> bool {
        self.selection.analysis.needs_lap()
    }

    /// Start an analysis for the current selection.
    pub fn run_analysis(&mut self) {
        self.year_rejected = self.selection.year.is_none();
        match self.runner.start(&self.selection) {
            Ok(()) => self.status_message = None,
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// Collect a finished run, if any. Returns the artifact that replaced
    /// the displayed image so the caller can evict its cached texture.
    pub fn poll_run(&mut self) -> Option<ArtifactPath> {
        match self.runner.poll()? {
            Ok(path) => {
                self.displayed = Some(path.clone());
                self.status_message = None;
                Some(path)
            }
            Err(e) => {
                self.status_message = Some(e.to_string());
                None
            }
        }
    }

    /// The artifact of the last successful run, while it is current.
    pub fn current_artifact(&self) -> Option<&ArtifactPath> {
        match self.runner.state() {
            RunState::Succeeded(path) => Some(path),
            _ => None,
        }
    }

    /// Copy the current artifact into `dest_dir`.
    pub fn export_to(&mut self, dest_dir: &Path) {
        let Some(artifact) = self.current_artifact().cloned() else {
            self.status_message = Some("Nothing to save yet".to_string());
            return;
        };
        self.status_message = Some(match export_artifact(&artifact, dest_dir) {
            Ok(dest) => format!("Saved to {}", dest.display()),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                format!("Export failed: {e}")
            }
        });
    }

    pub fn run_button_label(&self) -> &'static str {
        match self.runner.state() {
            RunState::Running => "Running . . .",
            _ if self.year_rejected => "Run Analysis (Select Valid Year)",
            RunState::Succeeded(_) => "Run New Analysis",
            RunState::Idle => "Run Analysis",
        }
    }

    /// URI of the image for the central panel.
    pub fn image_uri(&self) -> String {
        match &self.displayed {
            Some(artifact) => artifact.uri(),
            None => format!("file://{}", self.placeholder.display()),
        }
    }
}
