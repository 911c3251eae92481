//! HTTP JPEG snapshot source.
//!
//! Polls a camera's still-image endpoint (`http(s)://host/snapshot.jpg`) once
//! per frame and decodes the JPEG in memory.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use std::io::Read;
use std::time::{Duration, Instant};

use super::{CaptureStats, FrameSource};
use crate::frame::Frame;

const MAX_JPEG_BYTES: u64 = 10 * 1024 * 1024;

pub struct SnapshotSource {
    url: String,
    agent: ureq::Agent,
    frame_count: u64,
    last_frame_at: Option<Instant>,
    last_error: Option<String>,
    stopped: bool,
}

impl SnapshotSource {
    pub fn new(url: String, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            url,
            agent,
            frame_count: 0,
            last_frame_at: None,
            last_error: None,
            stopped: false,
        }
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        let response = self
            .agent
            .get(&self.url)
            .call()
            .with_context(|| format!("fetch jpeg snapshot from {}", self.url))?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_JPEG_BYTES)
            .read_to_end(&mut bytes)
            .context("read jpeg snapshot")?;
        if bytes.is_empty() {
            return Err(anyhow!("empty jpeg snapshot"));
        }
        Ok(bytes)
    }

    fn capture(&mut self) -> Result<Frame> {
        if self.stopped {
            return Err(anyhow!("snapshot source stopped"));
        }
        let bytes = self.fetch()?;
        let image = image::load_from_memory(&bytes).context("decode jpeg snapshot")?;
        self.frame_count += 1;
        self.last_frame_at = Some(Instant::now());
        Ok(Frame::from_image(image.into_rgb8(), Local::now()))
    }
}

impl FrameSource for SnapshotSource {
    /// Fetch one snapshot so an unreachable camera fails at startup.
    fn connect(&mut self) -> Result<()> {
        let frame = self.capture()?;
        log::info!(
            "SnapshotSource: connected to {} ({}x{})",
            self.url,
            frame.width,
            frame.height
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        match self.capture() {
            Ok(frame) => {
                self.last_error = None;
                Ok(frame)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn is_healthy(&self) -> bool {
        !self.stopped && self.last_error.is_none()
    }

    fn stats(&self) -> CaptureStats {
        CaptureStats {
            frames_captured: self.frame_count,
            source: self.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{codecs::jpeg::JpegEncoder, ExtendedColorType, RgbImage};

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, image::Rgb([90, 90, 90]));
        let mut out = Vec::new();
        JpegEncoder::new(&mut out)
            .encode(image.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    fn serve(responses: Vec<(u16, Vec<u8>)>) -> String {
        let canned = responses
            .into_iter()
            .map(|(status, body)| (status, "image/jpeg", body))
            .collect();
        let (base, _requests) = crate::testutil::serve(canned);
        format!("{}/snapshot.jpg", base)
    }

    #[test]
    fn decodes_snapshot_frames() -> Result<()> {
        let jpeg = jpeg_bytes(32, 24);
        let url = serve(vec![(200, jpeg.clone()), (200, jpeg)]);
        let mut source = SnapshotSource::new(url, Duration::from_secs(5));
        source.connect()?;
        let frame = source.next_frame()?;
        assert_eq!((frame.width, frame.height), (32, 24));
        assert_eq!(source.stats().frames_captured, 2);
        assert!(source.is_healthy());
        Ok(())
    }

    #[test]
    fn http_error_marks_source_unhealthy() {
        let url = serve(vec![(503, b"busy".to_vec())]);
        let mut source = SnapshotSource::new(url, Duration::from_secs(5));
        assert!(source.next_frame().is_err());
        assert!(!source.is_healthy());
    }
}
