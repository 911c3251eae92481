//! The monitoring loop.
//!
//! One iteration ([`Monitor::tick`]) runs the whole pipeline for a single
//! instant: window check, capture, detection, filtering, artifact, cooldown
//! and dispatch. [`Monitor::run`] repeats it until a stop signal arrives,
//! sleeping on the stop channel between iterations so an interrupt is seen
//! immediately even during a long idle poll.

use chrono::{DateTime, Local};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::alert::{channels_from_config, ChannelResult, ChannelSlot, DetectionEvent, Dispatcher};
use crate::artifact::ArtifactStore;
use crate::config::NightwatchConfig;
use crate::cooldown::CooldownGate;
use crate::detect::{DetectionFilter, HumanDetector};
use crate::error::{ErrorKind, MonitorError};
use crate::ingest::CaptureGuard;
use crate::schedule::MonitoringWindow;

pub const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Outside the monitoring window.
    Waiting,
    /// Inside the window, inspecting frames.
    Active,
    /// Stop requested; capture released.
    Stopped,
}

/// What a single iteration did.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    Waiting,
    /// Frame inspected, nothing passed the filter.
    Clear,
    /// Detections kept, alert withheld by the cooldown gate.
    Suppressed {
        detections: usize,
        image: Option<PathBuf>,
        remaining: Duration,
    },
    /// Detections kept and a dispatch cycle completed.
    Alerted {
        detections: usize,
        image: Option<PathBuf>,
        results: Vec<ChannelResult>,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub frames_inspected: u64,
    pub detections: u64,
    pub alerts_dispatched: u64,
    pub alerts_suppressed: u64,
    pub iteration_errors: u64,
}

pub struct Monitor {
    window: MonitoringWindow,
    filter: DetectionFilter,
    gate: CooldownGate,
    dispatcher: Dispatcher,
    channels: Vec<ChannelSlot>,
    artifacts: ArtifactStore,
    capture: CaptureGuard,
    detector: Box<dyn HumanDetector>,
    active_poll: Duration,
    idle_poll: Duration,
    commit_without_channels: bool,
    state: LoopState,
    stats: MonitorStats,
    last_health_log: Instant,
}

impl Monitor {
    /// Build a monitor with the channels described by `cfg`.
    pub fn from_config(
        cfg: &NightwatchConfig,
        capture: CaptureGuard,
        detector: Box<dyn HumanDetector>,
    ) -> Self {
        Self::new(cfg, capture, detector, channels_from_config(cfg))
    }

    /// Build a monitor with an explicit channel list.
    pub fn new(
        cfg: &NightwatchConfig,
        capture: CaptureGuard,
        detector: Box<dyn HumanDetector>,
        channels: Vec<ChannelSlot>,
    ) -> Self {
        Self {
            window: cfg.window,
            filter: DetectionFilter::new(cfg.detection_threshold, cfg.min_detection_area),
            gate: CooldownGate::new(cfg.alert_cooldown),
            dispatcher: Dispatcher::new(cfg.channel_timeout),
            channels,
            artifacts: ArtifactStore::new(cfg.detections_dir.clone()),
            capture,
            detector,
            active_poll: cfg.active_poll,
            idle_poll: cfg.idle_poll,
            commit_without_channels: cfg.commit_cooldown_without_channels,
            state: LoopState::Waiting,
            stats: MonitorStats::default(),
            last_health_log: Instant::now(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    pub fn capture(&self) -> &CaptureGuard {
        &self.capture
    }

    /// Run one iteration of the pipeline as of `now`.
    ///
    /// Errors are per-iteration: the caller logs them and keeps looping.
    pub fn tick(&mut self, now: DateTime<Local>) -> Result<TickOutcome, MonitorError> {
        if !self.window.is_active(now.time()) {
            self.transition(LoopState::Waiting);
            return Ok(TickOutcome::Waiting);
        }
        self.transition(LoopState::Active);

        let frame = self
            .capture
            .next_frame()
            .map_err(|e| MonitorError::from_anyhow(ErrorKind::UnhandledIteration, &e))?;
        self.stats.frames_inspected += 1;

        let raw = self
            .detector
            .detect(&frame)
            .map_err(|e| MonitorError::from_anyhow(ErrorKind::Detection, &e))?;
        let detections = self.filter.apply(raw);
        if detections.is_empty() {
            return Ok(TickOutcome::Clear);
        }

        let count = detections.len();
        self.stats.detections += count as u64;
        log::info!("Detected {} human(s)", count);

        let image = match self.artifacts.save_annotated(&frame, &detections, now) {
            Ok(path) => Some(path),
            Err(e) => {
                log::error!("Could not save detection image; alerting without it: {:#}", e);
                None
            }
        };

        if !self.gate.try_enter(now) {
            let remaining = self.gate.remaining(now).unwrap_or(Duration::ZERO);
            self.stats.alerts_suppressed += 1;
            log::info!(
                "Alert suppressed: cooldown active ({}s remaining)",
                remaining.as_secs()
            );
            return Ok(TickOutcome::Suppressed {
                detections: count,
                image,
                remaining,
            });
        }

        let event = DetectionEvent::new(detections, now, image.clone());
        let results = self.dispatcher.dispatch(&event, &self.channels);
        if results.is_empty() && !self.commit_without_channels {
            log::warn!("No alert channel enabled; cooldown not started");
        } else {
            self.gate.commit(now);
        }
        self.stats.alerts_dispatched += 1;
        let delivered = results.iter().filter(|r| r.ok()).count();
        log::info!(
            "Alert cycle complete: {}/{} channel(s) delivered",
            delivered,
            results.len()
        );

        Ok(TickOutcome::Alerted {
            detections: count,
            image,
            results,
        })
    }

    /// Loop until `stop` yields a message or its sender is dropped, then
    /// release the camera.
    pub fn run(&mut self, stop: &Receiver<()>) {
        log::info!(
            "Monitoring window {} (cooldown {}s, detector {})",
            self.window,
            self.gate.cooldown().as_secs(),
            self.detector.name()
        );

        loop {
            let now = Local::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.tick(now)))
                .unwrap_or_else(|_| {
                    Err(MonitorError::new(
                        ErrorKind::UnhandledIteration,
                        "iteration panicked",
                    ))
                });
            if let Err(err) = outcome {
                self.stats.iteration_errors += 1;
                log::error!("{}", err);
            }
            self.log_health();

            let poll = match self.state {
                LoopState::Active => self.active_poll,
                _ => self.idle_poll,
            };
            match stop.recv_timeout(poll) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.shutdown();
    }

    /// Enter `Stopped` and release the camera. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.state != LoopState::Stopped {
            log::info!("Monitoring stopped");
            self.state = LoopState::Stopped;
        }
        self.capture.release();
    }

    fn transition(&mut self, next: LoopState) {
        if self.state == next {
            return;
        }
        match next {
            LoopState::Active => log::info!("Entering monitoring window {}", self.window),
            LoopState::Waiting => log::info!(
                "Outside monitoring window {}; waiting",
                self.window
            ),
            LoopState::Stopped => {}
        }
        self.state = next;
    }

    fn log_health(&mut self) {
        if self.state != LoopState::Active || self.last_health_log.elapsed() < HEALTH_LOG_INTERVAL {
            return;
        }
        let capture = self.capture.stats();
        log::info!(
            "health camera={} healthy={} frames={} detections={} alerts={} suppressed={} errors={}",
            capture.source,
            self.capture.is_healthy(),
            capture.frames_captured,
            self.stats.detections,
            self.stats.alerts_dispatched,
            self.stats.alerts_suppressed,
            self.stats.iteration_errors
        );
        self.last_health_log = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{BoundingBox, RawCandidate, StubBackend};
    use crate::ingest::{FrameSource, SyntheticSource};
    use chrono::TimeZone;
    use std::sync::mpsc;

    fn config(dir: &std::path::Path) -> NightwatchConfig {
        let mut cfg = NightwatchConfig::default();
        cfg.window = MonitoringWindow::parse("18:00", "08:00").unwrap();
        cfg.detections_dir = dir.to_path_buf();
        cfg.active_poll = Duration::from_millis(10);
        cfg.idle_poll = Duration::from_millis(10);
        cfg
    }

    fn capture() -> CaptureGuard {
        let mut source = SyntheticSource::new("stub://unit".to_string(), 64, 48);
        source.connect().unwrap();
        CaptureGuard::new(Box::new(source))
    }

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 1, 15, hour, minute, 0).unwrap()
    }

    #[test]
    fn transitions_follow_the_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = Monitor::new(
            &config(dir.path()),
            capture(),
            Box::new(StubBackend::new()),
            Vec::new(),
        );

        assert_eq!(monitor.tick(at(12, 0)).unwrap(), TickOutcome::Waiting);
        assert_eq!(monitor.state(), LoopState::Waiting);
        assert_eq!(monitor.stats().frames_inspected, 0);

        assert_eq!(monitor.tick(at(23, 0)).unwrap(), TickOutcome::Clear);
        assert_eq!(monitor.state(), LoopState::Active);
        assert_eq!(monitor.stats().frames_inspected, 1);

        assert_eq!(monitor.tick(at(8, 1)).unwrap(), TickOutcome::Waiting);
        assert_eq!(monitor.state(), LoopState::Waiting);
    }

    #[test]
    fn detector_failure_is_a_detection_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = Monitor::new(
            &config(dir.path()),
            capture(),
            Box::new(StubBackend::failing("model crashed")),
            Vec::new(),
        );
        let err = monitor.tick(at(23, 0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Detection);
        assert!(err.message.contains("model crashed"));
        assert_eq!(monitor.state(), LoopState::Active);
    }

    #[test]
    fn capture_after_release_is_an_iteration_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = Monitor::new(
            &config(dir.path()),
            capture(),
            Box::new(StubBackend::new()),
            Vec::new(),
        );
        monitor.shutdown();
        let err = monitor.tick(at(23, 0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnhandledIteration);
    }

    #[test]
    fn suppressed_detections_still_save_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let detector = StubBackend::with_candidates(vec![RawCandidate {
            bbox: BoundingBox::new(2, 2, 60, 60),
            confidence: 0.9,
        }]);
        let mut monitor = Monitor::new(
            &config(dir.path()),
            capture(),
            Box::new(detector),
            Vec::new(),
        );

        let first = monitor.tick(at(23, 0)).unwrap();
        assert!(matches!(first, TickOutcome::Alerted { ref results, .. } if results.is_empty()));
        assert_eq!(monitor.gate().last_alert_at(), Some(at(23, 0)));

        let second = monitor.tick(at(23, 1)).unwrap();
        match second {
            TickOutcome::Suppressed {
                detections,
                image,
                remaining,
            } => {
                assert_eq!(detections, 1);
                assert!(image.unwrap().exists());
                assert_eq!(remaining, Duration::from_secs(240));
            }
            other => panic!("expected suppression, got {:?}", other),
        }
        assert_eq!(monitor.stats().alerts_suppressed, 1);
    }

    #[test]
    fn run_stops_on_signal_and_releases_capture() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = Monitor::new(
            &config(dir.path()),
            capture(),
            Box::new(StubBackend::new()),
            Vec::new(),
        );
        let (tx, rx) = mpsc::channel();
        tx.send(()).unwrap();

        monitor.run(&rx);

        assert_eq!(monitor.state(), LoopState::Stopped);
        assert!(monitor.capture().is_released());
    }

    #[test]
    fn run_stops_when_signal_sender_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = Monitor::new(
            &config(dir.path()),
            capture(),
            Box::new(StubBackend::new()),
            Vec::new(),
        );
        let (tx, rx) = mpsc::channel::<()>();
        drop(tx);

        monitor.run(&rx);
        assert_eq!(monitor.state(), LoopState::Stopped);
    }
}
