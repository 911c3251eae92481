//! Frame acquisition.
//!
//! Sources produce RGB [`Frame`]s on demand:
//! - `stub://<name>`: synthetic scene with a figure walking through now and then
//! - `http(s)://...`: JPEG snapshot endpoint, polled once per frame
//! - `v4l2:///dev/videoN`: local V4L2 device (feature: ingest-v4l2)
//!
//! The monitor owns exactly one source for its whole lifetime, wrapped in a
//! [`CaptureGuard`] so the device is released exactly once on every exit path.

pub mod snapshot;
pub mod synthetic;
#[cfg(feature = "ingest-v4l2")]
pub mod v4l2;

use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use url::Url;

use crate::config::CaptureSettings;
use crate::error::{ErrorKind, MonitorError};
use crate::frame::Frame;

pub use snapshot::SnapshotSource;
pub use synthetic::SyntheticSource;
#[cfg(feature = "ingest-v4l2")]
pub use v4l2::V4l2Source;

/// Capture capability consumed by the monitor.
pub trait FrameSource: Send {
    /// Prepare the device. Called once before the first frame.
    fn connect(&mut self) -> Result<()>;

    /// Capture the next frame.
    fn next_frame(&mut self) -> Result<Frame>;

    /// Release the device.
    fn stop(&mut self);

    fn is_healthy(&self) -> bool {
        true
    }

    fn stats(&self) -> CaptureStats;
}

/// Statistics for a frame source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub frames_captured: u64,
    pub source: String,
}

/// Camera selected by capture URL scheme.
pub struct CameraSource {
    backend: CameraBackend,
}

enum CameraBackend {
    Synthetic(SyntheticSource),
    Snapshot(SnapshotSource),
    #[cfg(feature = "ingest-v4l2")]
    V4l2(V4l2Source),
}

impl CameraSource {
    pub fn new(settings: &CaptureSettings) -> Result<Self> {
        let url = Url::parse(&settings.url)
            .with_context(|| format!("parse capture url '{}'", settings.url))?;
        let backend = match url.scheme() {
            "stub" => CameraBackend::Synthetic(SyntheticSource::new(
                settings.url.clone(),
                settings.width,
                settings.height,
            )),
            "http" | "https" => CameraBackend::Snapshot(SnapshotSource::new(
                settings.url.clone(),
                settings.request_timeout(),
            )),
            "v4l2" => open_v4l2(settings, &url)?,
            other => {
                return Err(anyhow!(
                    "unsupported capture scheme '{}'; expected stub, http(s) or v4l2",
                    other
                ))
            }
        };
        Ok(Self { backend })
    }
}

#[cfg(feature = "ingest-v4l2")]
fn open_v4l2(settings: &CaptureSettings, url: &Url) -> Result<CameraBackend> {
    let config = v4l2::V4l2Config {
        device: url.path().to_string(),
        width: settings.width,
        height: settings.height,
    };
    Ok(CameraBackend::V4l2(V4l2Source::new(config)))
}

#[cfg(not(feature = "ingest-v4l2"))]
fn open_v4l2(_settings: &CaptureSettings, _url: &Url) -> Result<CameraBackend> {
    Err(anyhow!("v4l2 capture requires the ingest-v4l2 feature"))
}

impl FrameSource for CameraSource {
    fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.connect(),
            CameraBackend::Snapshot(source) => source.connect(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::V4l2(source) => source.connect(),
        }
    }

    fn next_frame(&mut self) -> Result<Frame> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.next_frame(),
            CameraBackend::Snapshot(source) => source.next_frame(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::V4l2(source) => source.next_frame(),
        }
    }

    fn stop(&mut self) {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.stop(),
            CameraBackend::Snapshot(source) => source.stop(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::V4l2(source) => source.stop(),
        }
    }

    fn is_healthy(&self) -> bool {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.is_healthy(),
            CameraBackend::Snapshot(source) => source.is_healthy(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::V4l2(source) => source.is_healthy(),
        }
    }

    fn stats(&self) -> CaptureStats {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.stats(),
            CameraBackend::Snapshot(source) => source.stats(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::V4l2(source) => source.stats(),
        }
    }
}

/// Exclusive owner of the capture resource.
///
/// `release` stops the source at most once; `Drop` covers every path that
/// skips the explicit call (early return, panic unwinding).
pub struct CaptureGuard {
    source: Box<dyn FrameSource>,
    released: bool,
}

impl CaptureGuard {
    pub fn new(source: Box<dyn FrameSource>) -> Self {
        Self {
            source,
            released: false,
        }
    }

    pub fn next_frame(&mut self) -> Result<Frame> {
        if self.released {
            return Err(anyhow!("capture already released"));
        }
        self.source.next_frame()
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.source.stop();
        log::info!("Camera stopped");
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn is_healthy(&self) -> bool {
        !self.released && self.source.is_healthy()
    }

    pub fn stats(&self) -> CaptureStats {
        self.source.stats()
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Build, connect and warm up the configured camera.
///
/// Any failure here is a [`ErrorKind::CaptureInit`] and aborts startup.
pub fn open_camera(settings: &CaptureSettings) -> Result<CaptureGuard, MonitorError> {
    let mut source = CameraSource::new(settings)
        .map_err(|e| MonitorError::from_anyhow(ErrorKind::CaptureInit, &e))?;
    source
        .connect()
        .map_err(|e| MonitorError::from_anyhow(ErrorKind::CaptureInit, &e))?;
    if settings.warmup_secs > 0 {
        std::thread::sleep(Duration::from_secs(settings.warmup_secs));
    }
    log::info!("Camera initialized successfully ({})", settings.url);
    Ok(CaptureGuard::new(Box::new(source)))
}
