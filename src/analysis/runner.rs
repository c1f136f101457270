use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use anyhow::Context;

use super::backend::{PlotBackend, PlotRequest};
use super::{AnalysisError, ArtifactPath, Selection};
use crate::data::filter::FilterCascade;

type RunResult = Result<ArtifactPath, AnalysisError>;

/// Called from the worker thread once a result has been sent.
pub type Notifier = Arc<dyn Fn() + Send + Sync>;

// ---------------------------------------------------------------------------
// Run state machine
// ---------------------------------------------------------------------------

/// `Idle → Running → Succeeded | Idle`. A failed run hands its error to the
/// caller of [`AnalysisRunner::poll`] and returns straight to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Succeeded(ArtifactPath),
}

// ---------------------------------------------------------------------------
// AnalysisRunner
// ---------------------------------------------------------------------------

/// Validates a [`Selection`] against the dataset and renders it on a worker
/// thread. At most one run is in flight; the result comes back over a
/// channel polled from the UI thread.
pub struct AnalysisRunner {
    cascade: FilterCascade,
    backend: Arc<dyn PlotBackend>,
    output_dir: PathBuf,
    extension: String,
    notifier: Option<Notifier>,
    state: RunState,
    pending: Option<Receiver<RunResult>>,
}

impl AnalysisRunner {
    pub fn new(
        cascade: FilterCascade,
        backend: Arc<dyn PlotBackend>,
        output_dir: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            cascade,
            backend,
            output_dir: output_dir.into(),
            extension: extension.into(),
            notifier: None,
            state: RunState::Idle,
            pending: None,
        }
    }

    /// Wake the UI when a result is ready (egui: `request_repaint`).
    pub fn set_notifier(&mut self, notifier: Notifier) {
        self.notifier = Some(notifier);
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Check the selection and build the request for the backend.
    ///
    /// Year, event and both drivers must be real options for the selected
    /// year; a lap is required only by analyses that plot a single lap.
    pub fn prepare(&self, selection: &Selection) -> Result<PlotRequest, AnalysisError> {
        let invalid = |msg: String| AnalysisError::InvalidSelection(msg);

        let year = selection
            .year
            .ok_or_else(|| invalid("select a valid race year".to_string()))?;
        let year_label = year.to_string();
        let events = self
            .cascade
            .events_for_year(&year_label)
            .map_err(|e| invalid(e.to_string()))?;
        let drivers = self
            .cascade
            .drivers_for_year(&year_label)
            .map_err(|e| invalid(e.to_string()))?;

        let event = selection
            .event
            .clone()
            .filter(|e| events.contains(e))
            .ok_or_else(|| invalid(format!("select a Grand Prix from {year}")))?;

        let driver = |d: &Option<String>, which: &str| {
            d.clone()
                .filter(|d| drivers.contains(d))
                .ok_or_else(|| invalid(format!("select {which} from the {year} grid")))
        };
        let driver1 = driver(&selection.driver1, "driver 1")?;
        let driver2 = driver(&selection.driver2, "driver 2")?;

        let lap = if selection.analysis.needs_lap() {
            let laps = self
                .cascade
                .lap_range_for_event(&event)
                .map_err(|e| invalid(e.to_string()))?;
            let lap = selection
                .lap
                .filter(|l| laps.contains(l))
                .ok_or_else(|| invalid(format!("select a lap of the {event}")))?;
            Some(lap)
        } else {
            None
        };

        let output = ArtifactPath::for_analysis(&self.output_dir, selection.analysis, &self.extension);

        Ok(PlotRequest {
            year,
            event,
            session: selection.session,
            driver1,
            driver2,
            analysis: selection.analysis,
            lap,
            output: output.as_path().to_path_buf(),
        })
    }

    /// Dispatch a run on a worker thread and enter `Running`.
    ///
    /// Rejected with [`AnalysisError::Busy`] while a run is in flight, and
    /// with [`AnalysisError::InvalidSelection`] before anything is dispatched.
    pub fn start(&mut self, selection: &Selection) -> Result<(), AnalysisError> {
        if self.is_running() {
            log::warn!("Analysis requested while another is running");
            return Err(AnalysisError::Busy);
        }
        let request = self.prepare(selection).inspect_err(|e| log::warn!("Run rejected: {e}"))?;

        let (tx, rx) = mpsc::channel();
        let backend = Arc::clone(&self.backend);
        let notifier = self.notifier.clone();

        log::info!(
            "Running '{}' for {} {} {} ({} vs {})",
            request.analysis,
            request.year,
            request.event,
            request.session,
            request.driver1,
            request.driver2
        );

        thread::Builder::new()
            .name("analysis".to_string())
            .spawn(move || {
                let result = execute(backend.as_ref(), &request);
                // The runner may have been dropped; nobody is left to tell.
                let _ = tx.send(result);
                if let Some(notify) = notifier {
                    notify();
                }
            })
            .map_err(|e| AnalysisError::Failed(format!("spawning worker thread: {e}")))?;

        self.pending = Some(rx);
        self.state = RunState::Running;
        Ok(())
    }

    /// Non-blocking check for a finished run. Returns `Some` exactly once
    /// per dispatched run.
    pub fn poll(&mut self) -> Option<RunResult> {
        let rx = self.pending.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                Err(AnalysisError::Failed("worker exited without a result".to_string()))
            }
        };
        Some(self.finish(result))
    }

    /// Block until the in-flight run finishes. `None` when nothing is running.
    ///
    /// The UI polls instead; this is for tests and headless callers.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn wait(&mut self) -> Option<RunResult> {
        let rx = self.pending.as_ref()?;
        let result = rx
            .recv()
            .unwrap_or_else(|_| Err(AnalysisError::Failed("worker exited without a result".to_string())));
        Some(self.finish(result))
    }

    /// Start a run and wait for it. Blocking counterpart of [`Self::start`]
    /// plus [`Self::poll`], used by tests and headless callers.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn run(&mut self, selection: &Selection) -> RunResult {
        self.start(selection)?;
        self.wait()
            .unwrap_or_else(|| Err(AnalysisError::Failed("run was not dispatched".to_string())))
    }

    fn finish(&mut self, result: RunResult) -> RunResult {
        self.pending = None;
        match &result {
            Ok(path) => {
                log::info!("Analysis written to {}", path.as_path().display());
                self.state = RunState::Succeeded(path.clone());
            }
            Err(e) => {
                log::error!("{e}");
                self.state = RunState::Idle;
            }
        }
        result
    }
}

/// Worker body: clear the previous artifact, render, then check that a
/// readable image was produced.
fn execute(backend: &dyn PlotBackend, request: &PlotRequest) -> RunResult {
    let output = &request.output;
    let prepare = || -> anyhow::Result<()> {
        if let Some(dir) = output.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
        }
        match std::fs::remove_file(output) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("removing stale plot {}", output.display()))
            }
            _ => Ok(()),
        }
    };

    prepare()
        .and_then(|()| backend.render(request))
        .and_then(|()| verify_artifact(output))
        .map(|()| ArtifactPath(output.clone()))
        .map_err(|e| AnalysisError::Failed(format!("{e:#}")))
}

fn verify_artifact(path: &Path) -> anyhow::Result<()> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("plot generator did not write {}", path.display()))?;
    anyhow::ensure!(meta.len() > 0, "plot generator wrote an empty {}", path.display());

    match image::image_dimensions(path) {
        Ok((w, h)) => log::debug!("Artifact {} is {w}x{h}", path.display()),
        // Formats without a compiled-in decoder are taken on trust.
        Err(image::ImageError::Unsupported(_)) => {}
        Err(e) => {
            return Err(e).with_context(|| format!("{} is not a readable image", path.display()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::analysis::{AnalysisType, Session};
    use crate::data::model::{Dataset, LapTable, Year, YearTable};

    fn dataset() -> Arc<Dataset> {
        let s = |v: &[&str]| v.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        Arc::new(Dataset {
            events: YearTable::from_columns([(
                Year(2023),
                s(&["Bahrain Grand Prix", "Italian Grand Prix"]),
            )]),
            drivers: YearTable::from_columns([(Year(2023), s(&["VER", "LEC", "HAM"]))]),
            laps: LapTable::from_rows([
                ("Bahrain Grand Prix".to_string(), 57),
                ("Italian Grand Prix".to_string(), 51),
            ]),
        })
    }

    fn monza() -> Selection {
        Selection {
            year: Some(Year(2023)),
            event: Some("Italian Grand Prix".to_string()),
            session: Session::Race,
            driver1: Some("VER".to_string()),
            driver2: Some("LEC".to_string()),
            analysis: AnalysisType::LapTime,
            lap: None,
        }
    }

    /// Writes a tiny PNG and counts invocations.
    #[derive(Default)]
    struct PngBackend {
        calls: AtomicUsize,
    }

    impl PlotBackend for PngBackend {
        fn render(&self, request: &PlotRequest) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            image::RgbImage::new(4, 3).save(&request.output)?;
            Ok(())
        }
    }

    struct FailingBackend;

    impl PlotBackend for FailingBackend {
        fn render(&self, _: &PlotRequest) -> anyhow::Result<()> {
            anyhow::bail!("session data not available")
        }
    }

    /// Blocks until the test releases it.
    struct GatedBackend {
        gate: Mutex<Receiver<()>>,
    }

    impl PlotBackend for GatedBackend {
        fn render(&self, request: &PlotRequest) -> anyhow::Result<()> {
            self.gate.lock().unwrap().recv()?;
            image::RgbImage::new(1, 1).save(&request.output)?;
            Ok(())
        }
    }

    fn runner(backend: Arc<dyn PlotBackend>, out: &Path) -> AnalysisRunner {
        AnalysisRunner::new(FilterCascade::new(dataset()), backend, out, "png")
    }

    #[test]
    fn full_selection_produces_lap_time_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("plots");
        let backend = Arc::new(PngBackend::default());
        let mut r = runner(backend.clone(), &out);

        let path = r.run(&monza()).unwrap();
        assert!(path.as_path().ends_with("Lap Time.png"));
        assert!(path.as_path().exists());
        assert_eq!(r.state(), &RunState::Succeeded(path));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn sentinel_year_fails_fast_without_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(PngBackend::default());
        let mut r = runner(backend.clone(), dir.path());

        let selection = Selection { year: None, ..monza() };
        let err = r.run(&selection).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidSelection(_)));
        assert_eq!(r.state(), &RunState::Idle);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn options_outside_the_year_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let r = runner(Arc::new(PngBackend::default()), dir.path());

        let wrong_driver = Selection { driver2: Some("VET".to_string()), ..monza() };
        assert!(matches!(r.prepare(&wrong_driver), Err(AnalysisError::InvalidSelection(_))));

        let no_event = Selection { event: None, ..monza() };
        assert!(matches!(r.prepare(&no_event), Err(AnalysisError::InvalidSelection(_))));
    }

    #[test]
    fn sector_analysis_requires_a_lap_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let r = runner(Arc::new(PngBackend::default()), dir.path());

        let sectors = Selection { analysis: AnalysisType::FastestSectors, ..monza() };
        assert!(r.prepare(&sectors).is_err());
        let beyond = Selection { lap: Some(52), ..sectors.clone() };
        assert!(r.prepare(&beyond).is_err());
        let ok = Selection { lap: Some(51), ..sectors };
        assert_eq!(r.prepare(&ok).unwrap().lap, Some(51));

        // Laps are ignored for analyses that do not use them.
        let lap_time = Selection { lap: Some(999), ..monza() };
        assert_eq!(r.prepare(&lap_time).unwrap().lap, None);
    }

    #[test]
    fn backend_failure_returns_to_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = runner(Arc::new(FailingBackend), dir.path());

        match r.run(&monza()) {
            Err(AnalysisError::Failed(msg)) => assert!(msg.contains("session data not available")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(r.state(), &RunState::Idle);
    }

    #[test]
    fn stale_artifact_does_not_mask_a_silent_backend() {
        struct Silent;
        impl PlotBackend for Silent {
            fn render(&self, _: &PlotRequest) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("Lap Time.png");
        image::RgbImage::new(1, 1).save(&stale).unwrap();

        let mut r = runner(Arc::new(Silent), dir.path());
        assert!(matches!(r.run(&monza()), Err(AnalysisError::Failed(_))));
        assert!(!stale.exists());
    }

    #[test]
    fn second_start_while_running_is_busy() {
        let dir = tempfile::tempdir().unwrap();
        let (release, gate) = mpsc::channel();
        let backend = Arc::new(GatedBackend { gate: Mutex::new(gate) });
        let mut r = runner(backend, dir.path());

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        r.set_notifier(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        r.start(&monza()).unwrap();
        assert!(r.is_running());
        assert_eq!(r.start(&monza()), Err(AnalysisError::Busy));
        assert!(r.poll().is_none());

        release.send(()).unwrap();
        let path = r.wait().unwrap().unwrap();
        assert!(path.as_path().exists());
        // The notifier fires just after the result is sent.
        for _ in 0..200 {
            if notified.load(Ordering::SeqCst) == 1 {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert!(r.poll().is_none());
        assert!(!r.is_running());
    }
}
