//! Synthetic frame source for `stub://` URLs.
//!
//! Renders a static gradient background. Every [`FIGURE_PERIOD`] frames an
//! upright bright figure appears at a random horizontal position and stays for
//! [`FIGURE_VISIBLE_FRAMES`] frames, which is enough for the motion backend to
//! produce a human-sized candidate.

use anyhow::Result;
use chrono::Local;
use rand::Rng;

use super::{CaptureStats, FrameSource};
use crate::frame::Frame;

pub const FIGURE_PERIOD: u64 = 30;
pub const FIGURE_VISIBLE_FRAMES: u64 = 3;
const FIGURE_LUMA: u8 = 225;

pub struct SyntheticSource {
    url: String,
    width: u32,
    height: u32,
    frame_count: u64,
    figure_x: u32,
    connected: bool,
}

impl SyntheticSource {
    pub fn new(url: String, width: u32, height: u32) -> Self {
        Self {
            url,
            width,
            height,
            frame_count: 0,
            figure_x: 0,
            connected: false,
        }
    }

    /// Figure size relative to the frame, roughly a person at mid distance.
    pub fn figure_size(&self) -> (u32, u32) {
        ((self.width / 10).max(1), (self.height / 3).max(1))
    }

    fn figure_visible(&self) -> bool {
        self.frame_count % FIGURE_PERIOD < FIGURE_VISIBLE_FRAMES && self.frame_count >= FIGURE_PERIOD
    }

    fn render(&mut self) -> Vec<u8> {
        let (fig_w, fig_h) = self.figure_size();
        if self.frame_count % FIGURE_PERIOD == 0 {
            let max_x = self.width.saturating_sub(fig_w);
            self.figure_x = rand::thread_rng().gen_range(0..=max_x);
        }
        let visible = self.figure_visible();
        let fig_y = self.height.saturating_sub(fig_h) / 2;

        let row_bytes = self.width as usize * 3;
        let mut pixels = vec![0u8; row_bytes * self.height as usize];
        for y in 0..self.height {
            let shade = (40 + (y * 40) / self.height.max(1)) as u8;
            for x in 0..self.width {
                let inside = visible
                    && x >= self.figure_x
                    && x < self.figure_x + fig_w
                    && y >= fig_y
                    && y < fig_y + fig_h;
                let value = if inside { FIGURE_LUMA } else { shade };
                let idx = y as usize * row_bytes + x as usize * 3;
                pixels[idx..idx + 3].copy_from_slice(&[value, value, value]);
            }
        }
        pixels
    }
}

impl FrameSource for SyntheticSource {
    /// Synthetic sources are always "connected".
    fn connect(&mut self) -> Result<()> {
        self.connected = true;
        log::info!("SyntheticSource: connected to {}", self.url);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        self.frame_count += 1;
        let pixels = self.render();
        Frame::new(pixels, self.width, self.height, Local::now())
    }

    fn stop(&mut self) {
        self.connected = false;
    }

    fn is_healthy(&self) -> bool {
        self.connected
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
    use crate::detect::{HumanDetector, MotionBackend};

    #[test]
    fn frames_match_configured_size() -> Result<()> {
        let mut source = SyntheticSource::new("stub://test".to_string(), 160, 120);
        source.connect()?;
        let frame = source.next_frame()?;
        assert_eq!((frame.width, frame.height), (160, 120));
        assert_eq!(frame.pixels().len(), 160 * 120 * 3);
        Ok(())
    }

    #[test]
    fn background_is_static_between_figures() -> Result<()> {
        let mut source = SyntheticSource::new("stub://test".to_string(), 64, 48);
        source.connect()?;
        let first = source.next_frame()?;
        let second = source.next_frame()?;
        assert_eq!(first.pixels(), second.pixels());
        Ok(())
    }

    #[test]
    fn figure_triggers_motion_candidate() -> Result<()> {
        let mut source = SyntheticSource::new("stub://test".to_string(), 320, 240);
        source.connect()?;
        let mut backend = MotionBackend::new();
        let mut found = Vec::new();
        for _ in 0..FIGURE_PERIOD + 1 {
            let frame = source.next_frame()?;
            found.extend(backend.detect(&frame)?);
        }
        assert!(!found.is_empty(), "figure never detected");
        let (fig_w, fig_h) = source.figure_size();
        assert!(found.iter().any(|c| c.bbox.area() >= u64::from(fig_w * fig_h)));
        Ok(())
    }

    #[test]
    fn stop_marks_unhealthy() -> Result<()> {
        let mut source = SyntheticSource::new("stub://test".to_string(), 8, 8);
        source.connect()?;
        assert!(source.is_healthy());
        source.stop();
        assert!(!source.is_healthy());
        Ok(())
    }
}
