use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};

use super::{AnalysisType, Session};
use crate::data::model::Year;

/// A fully validated selection plus the file the plot must be written to.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub year: Year,
    pub event: String,
    pub session: Session,
    pub driver1: String,
    pub driver2: String,
    pub analysis: AnalysisType,
    pub lap: Option<u32>,
    pub output: PathBuf,
}

impl PlotRequest {
    /// Named arguments handed to an external plot generator.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--year".to_string(),
            self.year.to_string(),
            "--event".to_string(),
            self.event.clone(),
            "--session".to_string(),
            self.session.label().to_string(),
            "--driver1".to_string(),
            self.driver1.clone(),
            "--driver2".to_string(),
            self.driver2.clone(),
            "--analysis".to_string(),
            self.analysis.label().to_string(),
        ];
        if let Some(lap) = self.lap {
            args.push("--lap".to_string());
            args.push(lap.to_string());
        }
        args.push("--output".to_string());
        args.push(self.output.display().to_string());
        args
    }
}

// ---------------------------------------------------------------------------
// Backend seam
// ---------------------------------------------------------------------------

/// Something that renders a plot to `request.output`. Runs on the worker
/// thread and may block for as long as it needs.
pub trait PlotBackend: Send + Sync {
    fn render(&self, request: &PlotRequest) -> Result<()>;
}

/// Runs an external program, typically a Python plotting script.
#[derive(Debug, Clone)]
pub struct ScriptBackend {
    program: String,
    args: Vec<String>,
}

impl ScriptBackend {
    /// `command` is the program followed by its leading arguments.
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .context("plot command is empty")?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl PlotBackend for ScriptBackend {
    fn render(&self, request: &PlotRequest) -> Result<()> {
        log::debug!("Running {} {:?} {:?}", self.program, self.args, request.to_args());
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(request.to_args())
            .output()
            .with_context(|| format!("starting '{}'", self.program))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::debug!("{}: {}", self.program, stdout.trim());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            let tail: Vec<&str> = tail.into_iter().rev().collect();
            bail!("'{}' exited with {}: {}", self.program, output.status, tail.join("\n"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(lap: Option<u32>) -> PlotRequest {
        PlotRequest {
            year: Year(2023),
            event: "Italian Grand Prix".to_string(),
            session: Session::Race,
            driver1: "VER".to_string(),
            driver2: "LEC".to_string(),
            analysis: AnalysisType::LapTime,
            lap,
            output: PathBuf::from("plots/Lap Time.png"),
        }
    }

    #[test]
    fn args_carry_every_field() {
        let args = request(None).to_args();
        assert_eq!(&args[..4], &["--year", "2023", "--event", "Italian Grand Prix"]);
        assert!(!args.contains(&"--lap".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("plots/Lap Time.png"));

        let args = request(Some(12)).to_args();
        let pos = args.iter().position(|a| a == "--lap").unwrap();
        assert_eq!(args[pos + 1], "12");
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(ScriptBackend::new(&[]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_reports_stderr() {
        let backend = ScriptBackend::new(&[
            "sh".to_string(),
            "-c".to_string(),
            "echo 'no telemetry for session' >&2; exit 3".to_string(),
        ])
        .unwrap();
        let err = backend.render(&request(None)).unwrap_err();
        assert!(format!("{err:#}").contains("no telemetry for session"), "{err:#}");
    }

    #[cfg(unix)]
    #[test]
    fn script_receives_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(None);
        req.output = dir.path().join("Lap Time.png");
        // `sh -c SCRIPT NAME ARGS...`: the last positional argument is the output path.
        let backend = ScriptBackend::new(&[
            "sh".to_string(),
            "-c".to_string(),
            r#"for last; do :; done; printf plot > "$last""#.to_string(),
            "plot".to_string(),
        ])
        .unwrap();
        backend.render(&req).unwrap();
        assert_eq!(std::fs::read_to_string(&req.output).unwrap(), "plot");
    }
}
