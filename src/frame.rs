//! Captured frames.
//!
//! A `Frame` is a tightly packed RGB24 buffer plus its capture time. Sources
//! produce frames, detectors read them, and the artifact store renders an
//! annotated copy when a detection needs to be kept.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use image::{Rgb, RgbImage};

use crate::detect::Detection;

/// Box outline colour on annotated images.
pub const ANNOTATION_COLOR: [u8; 3] = [0, 255, 0];
/// Box outline thickness in pixels.
pub const ANNOTATION_THICKNESS: u32 = 2;

#[derive(Clone)]
pub struct Frame {
    data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Local>,
}

impl Frame {
    /// Wrap an RGB24 buffer. The buffer length must be `width * height * 3`.
    pub fn new(data: Vec<u8>, width: u32, height: u32, captured_at: DateTime<Local>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if data.len() != expected {
            return Err(anyhow!(
                "RGB frame length mismatch: expected {} bytes for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            captured_at,
        })
    }

    pub fn from_image(image: RgbImage, captured_at: DateTime<Local>) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
            captured_at,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Rec. 601 luma, one byte per pixel.
    pub fn luma(&self) -> Vec<u8> {
        self.data
            .chunks_exact(3)
            .map(|px| {
                let y = 299 * u32::from(px[0]) + 587 * u32::from(px[1]) + 114 * u32::from(px[2]);
                (y / 1000) as u8
            })
            .collect()
    }

    pub fn to_image(&self) -> Result<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", self.width, self.height))
    }

    /// Copy of the frame with a rectangle drawn around every detection.
    pub fn annotated(&self, detections: &[Detection]) -> Result<RgbImage> {
        let mut image = self.to_image()?;
        for detection in detections {
            draw_box(&mut image, detection);
        }
        Ok(image)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("captured_at", &self.captured_at)
            .finish_non_exhaustive()
    }
}

fn draw_box(image: &mut RgbImage, detection: &Detection) {
    let (width, height) = image.dimensions();
    let bbox = detection.bbox.clamped(width, height);
    if bbox.w == 0 || bbox.h == 0 {
        return;
    }
    let color = Rgb(ANNOTATION_COLOR);
    let x_end = bbox.x + bbox.w - 1;
    let y_end = bbox.y + bbox.h - 1;
    for t in 0..ANNOTATION_THICKNESS.min(bbox.w).min(bbox.h) {
        for x in bbox.x..=x_end {
            image.put_pixel(x, bbox.y + t, color);
            image.put_pixel(x, y_end - t, color);
        }
        for y in bbox.y..=y_end {
            image.put_pixel(bbox.x + t, y, color);
            image.put_pixel(x_end - t, y, color);
        }
    }
}
