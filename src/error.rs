//! Error taxonomy for the monitoring pipeline.
//!
//! Collaborators (capture, detection, channel transports) propagate
//! `anyhow::Error`. The monitor classifies a failure into an [`ErrorKind`] at
//! the loop boundary and decides from the kind whether to continue or abort.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Config file unreadable or invalid. Recovered by falling back to defaults.
    ConfigLoad,
    /// Camera or detector unavailable at startup. Fatal.
    CaptureInit,
    /// Detector failed on one frame. The frame is skipped.
    Detection,
    /// A channel failed to deliver (network, auth, bad response).
    ChannelDelivery,
    /// A channel did not finish before the per-channel deadline.
    ChannelTimeout,
    /// Anything else that went wrong during one loop iteration.
    UnhandledIteration,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::ConfigLoad => "CONFIG_LOAD",
            ErrorKind::CaptureInit => "CAPTURE_INIT",
            ErrorKind::Detection => "DETECTION",
            ErrorKind::ChannelDelivery => "CHANNEL_DELIVERY",
            ErrorKind::ChannelTimeout => "CHANNEL_TIMEOUT",
            ErrorKind::UnhandledIteration => "UNHANDLED_ITERATION",
        }
    }

    /// Only startup failures end the process.
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorKind::CaptureInit)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonitorError {
    pub kind: ErrorKind,
    pub message: String,
}

impl MonitorError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify an `anyhow` error, keeping its full context chain in the message.
    pub fn from_anyhow(kind: ErrorKind, err: &anyhow::Error) -> Self {
        Self::new(kind, format!("{:#}", err))
    }
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl std::error::Error for MonitorError {}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn only_capture_init_is_fatal() {
        for kind in [
            ErrorKind::ConfigLoad,
            ErrorKind::Detection,
            ErrorKind::ChannelDelivery,
            ErrorKind::ChannelTimeout,
            ErrorKind::UnhandledIteration,
        ] {
            assert!(!kind.is_fatal(), "{:?} must be recoverable", kind);
        }
        assert!(ErrorKind::CaptureInit.is_fatal());
    }

    #[test]
    fn from_anyhow_keeps_context_chain() {
        let err: anyhow::Error = Err::<(), _>(anyhow::anyhow!("connection refused"))
            .context("post to pushbullet")
            .unwrap_err();
        let classified = MonitorError::from_anyhow(ErrorKind::ChannelDelivery, &err);
        assert_eq!(
            classified.to_string(),
            "CHANNEL_DELIVERY: post to pushbullet: connection refused"
        );
    }
}
