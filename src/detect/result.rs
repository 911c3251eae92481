/// Axis-aligned box in frame pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Area in pixels. Computed in `u64` so full-frame boxes cannot overflow.
    pub fn area(&self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }

    /// Clamp the box so it lies entirely inside a `width` x `height` frame.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Self {
            x,
            y,
            w: self.w.min(width - x),
            h: self.h.min(height - y),
        }
    }
}

/// Unfiltered detector output for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawCandidate {
    pub bbox: BoundingBox,
    pub confidence: f32,
}

impl RawCandidate {
    pub fn new(bbox: BoundingBox, confidence: f32) -> Self {
        Self { bbox, confidence }
    }
}

/// A candidate that passed the confidence and area thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub confidence: f32,
}

impl From<RawCandidate> for Detection {
    fn from(candidate: RawCandidate) -> Self {
        Self {
            bbox: candidate.bbox,
            confidence: candidate.confidence,
        }
    }
}
