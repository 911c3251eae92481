pub mod motion;
pub mod stub;

#[cfg(feature = "backend-tract")]
pub mod tract;

use anyhow::{anyhow, Result};

pub use motion::MotionBackend;
pub use stub::StubBackend;

#[cfg(feature = "backend-tract")]
pub use tract::TractBackend;

use crate::config::DetectorSettings;
use crate::detect::backend::HumanDetector;

/// Build the backend named in the configuration.
///
/// `width` and `height` are the capture dimensions; model backends need them
/// to fix their input shape.
pub fn open_backend(
    settings: &DetectorSettings,
    width: u32,
    height: u32,
) -> Result<Box<dyn HumanDetector>> {
    match settings.backend.as_str() {
        "motion" => Ok(Box::new(MotionBackend::new())),
        "stub" => Ok(Box::new(StubBackend::new())),
        "tract" => open_tract(settings, width, height),
        other => Err(anyhow!(
            "unknown detector backend '{}'; expected motion, stub or tract",
            other
        )),
    }
}

#[cfg(feature = "backend-tract")]
fn open_tract(
    settings: &DetectorSettings,
    width: u32,
    height: u32,
) -> Result<Box<dyn HumanDetector>> {
    let model_path = settings
        .model_path
        .as_ref()
        .ok_or_else(|| anyhow!("detector.model_path is required for the tract backend"))?;
    Ok(Box::new(TractBackend::new(model_path, width, height)?))
}

#[cfg(not(feature = "backend-tract"))]
fn open_tract(
    _settings: &DetectorSettings,
    _width: u32,
    _height: u32,
) -> Result<Box<dyn HumanDetector>> {
    Err(anyhow!(
        "the tract detector requires the backend-tract feature"
    ))
}
