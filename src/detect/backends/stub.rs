use anyhow::{anyhow, Result};

use crate::detect::backend::HumanDetector;
use crate::detect::result::RawCandidate;
use crate::frame::Frame;

/// Stub backend for testing. Returns the same candidates for every frame,
/// or fails every call when built with [`StubBackend::failing`].
#[derive(Clone, Debug, Default)]
pub struct StubBackend {
    candidates: Vec<RawCandidate>,
    failure: Option<String>,
    calls: u64,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates(candidates: Vec<RawCandidate>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl HumanDetector for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<RawCandidate>> {
        self.calls += 1;
        match &self.failure {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok(self.candidates.clone()),
        }
    }
}
