use anyhow::Result;

use crate::detect::result::RawCandidate;
use crate::frame::Frame;

/// Human detector backend.
///
/// Backends see the full frame and return every candidate they found, with no
/// thresholding applied. Confidence and size filtering happen afterwards in
/// [`crate::detect::DetectionFilter`], so the same backend can be tuned purely
/// from configuration.
pub trait HumanDetector: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<RawCandidate>>;

    /// Optional warm-up hook, called once before the first frame.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<D: HumanDetector + ?Sized> HumanDetector for Box<D> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<RawCandidate>> {
        (**self).detect(frame)
    }

    fn warm_up(&mut self) -> Result<()> {
        (**self).warm_up()
    }
}
