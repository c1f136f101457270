/// Analysis layer: the user's selection, the plot backend and the runner
/// that drives it off the UI thread.
///
/// ```text
///   Selection ──validate──▶ PlotRequest ──worker thread──▶ PlotBackend
///                                                           │
///   UI thread ◀──── mpsc: Result<ArtifactPath, AnalysisError>┘
/// ```

pub mod backend;
pub mod export;
pub mod runner;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::data::model::Year;

// ---------------------------------------------------------------------------
// Fixed option sets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Race,
    Qualifying,
    Fp1,
    Fp2,
    Fp3,
}

impl Session {
    /// Sprint sessions are left out until their data is consistent.
    pub const ALL: [Session; 5] = [
        Session::Race,
        Session::Qualifying,
        Session::Fp1,
        Session::Fp2,
        Session::Fp3,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Session::Race => "Race",
            Session::Qualifying => "Qualifying",
            Session::Fp1 => "FP1",
            Session::Fp2 => "FP2",
            Session::Fp3 => "FP3",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisType {
    #[default]
    LapTime,
    FastestLap,
    FastestSectors,
    FullTelemetry,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 4] = [
        AnalysisType::LapTime,
        AnalysisType::FastestLap,
        AnalysisType::FastestSectors,
        AnalysisType::FullTelemetry,
    ];

    /// Display label; also the file stem of the generated artifact.
    pub fn label(self) -> &'static str {
        match self {
            AnalysisType::LapTime => "Lap Time",
            AnalysisType::FastestLap => "Fastest Lap",
            AnalysisType::FastestSectors => "Fastest Sectors",
            AnalysisType::FullTelemetry => "Full Telemetry",
        }
    }

    /// Only the sector breakdown is plotted for a single chosen lap.
    pub fn needs_lap(self) -> bool {
        matches!(self, AnalysisType::FastestSectors)
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Selection – what the user has picked so far
// ---------------------------------------------------------------------------

/// The dropdown state. `None` stands for a placeholder option such as
/// "Select Year".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub year: Option<Year>,
    pub event: Option<String>,
    pub session: Session,
    pub driver1: Option<String>,
    pub driver2: Option<String>,
    pub analysis: AnalysisType,
    pub lap: Option<u32>,
}

// ---------------------------------------------------------------------------
// Artifacts and errors
// ---------------------------------------------------------------------------

/// Path of a generated plot image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactPath(PathBuf);

impl ArtifactPath {
    /// `<output_dir>/<analysis label>.<extension>`
    pub fn for_analysis(output_dir: &Path, analysis: AnalysisType, extension: &str) -> Self {
        let ext = extension.trim_start_matches('.');
        ArtifactPath(output_dir.join(format!("{}.{ext}", analysis.label())))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// `file://` URI used as the image cache key in the UI.
    pub fn uri(&self) -> String {
        format!("file://{}", self.0.display())
    }
}

impl AsRef<Path> for ArtifactPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("an analysis is already running")]
    Busy,
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("analysis failed: {0}")]
    Failed(String),
}
