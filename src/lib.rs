//! nightwatch
//!
//! A camera daemon that looks for people during a daily monitoring window
//! and alerts the operator over email, Pushbullet and Telegram.
//!
//! # Pipeline
//!
//! Each loop iteration flows one way:
//!
//! window check → capture → detector → filter → artifact → cooldown gate →
//! dispatcher → channels
//!
//! - [`schedule`]: the daily window, wrapping past midnight when start > end
//! - [`detect`]: detector backends and the confidence / area filter
//! - [`cooldown`]: the check-act-commit gate that limits alert rate
//! - [`alert`]: channels and the concurrent dispatcher with per-channel
//!   isolation
//! - [`monitor`]: the loop tying them together
//!
//! Capture ([`ingest`]), images ([`frame`], [`artifact`]), configuration,
//! errors and logging support the pipeline.

pub mod alert;
pub mod artifact;
pub mod config;
pub mod cooldown;
pub mod detect;
pub mod error;
pub mod frame;
pub mod ingest;
pub mod logging;
pub mod monitor;
pub mod schedule;

#[cfg(test)]
mod testutil;

pub use alert::{
    channels_from_config, Channel, ChannelResult, ChannelSlot, DetectionEvent, Dispatcher,
};
pub use artifact::ArtifactStore;
pub use config::NightwatchConfig;
pub use cooldown::CooldownGate;
pub use detect::{BoundingBox, Detection, DetectionFilter, HumanDetector, RawCandidate};
pub use error::{ErrorKind, MonitorError};
pub use frame::Frame;
pub use ingest::{open_camera, CaptureGuard, FrameSource};
pub use monitor::{LoopState, Monitor, TickOutcome};
pub use schedule::MonitoringWindow;
