//! Alert fan-out.
//!
//! A [`DetectionEvent`] is delivered to every enabled [`Channel`] by the
//! [`Dispatcher`]. Channels are independent: one failing or hanging never
//! affects the others, and every outcome comes back as a [`ChannelResult`].

mod dispatch;
pub mod email;
pub mod message;
pub mod pushbullet;
pub mod telegram;

use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::NightwatchConfig;
use crate::detect::Detection;
use crate::error::MonitorError;

pub use dispatch::Dispatcher;
pub use email::EmailChannel;
pub use pushbullet::PushbulletChannel;
pub use telegram::TelegramChannel;

/// Detections from one frame, ready to be announced.
#[derive(Clone, Debug)]
pub struct DetectionEvent {
    pub detections: Vec<Detection>,
    pub timestamp: DateTime<Local>,
    /// Annotated image on disk, when it could be saved.
    pub image: Option<PathBuf>,
}

impl DetectionEvent {
    pub fn new(detections: Vec<Detection>, timestamp: DateTime<Local>, image: Option<PathBuf>) -> Self {
        Self {
            detections,
            timestamp,
            image,
        }
    }

    pub fn count(&self) -> usize {
        self.detections.len()
    }
}

/// Delivery capability for one notification mechanism.
///
/// `send` runs on a dedicated worker thread and may block on network I/O.
/// Implementations should bound that I/O with the timeout they were built
/// with; the dispatcher stops waiting at its own deadline regardless.
pub trait Channel: Send + Sync {
    fn name(&self) -> &'static str;

    fn send(&self, event: &DetectionEvent) -> Result<()>;
}

/// A channel together with its enablement flag from the config.
#[derive(Clone)]
pub struct ChannelSlot {
    pub enabled: bool,
    pub channel: Arc<dyn Channel>,
}

impl ChannelSlot {
    pub fn new(enabled: bool, channel: Arc<dyn Channel>) -> Self {
        Self { enabled, channel }
    }

    pub fn name(&self) -> &'static str {
        self.channel.name()
    }
}

/// Outcome of one delivery attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelResult {
    pub channel: String,
    pub error: Option<MonitorError>,
}

impl ChannelResult {
    pub fn success(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            error: None,
        }
    }

    pub fn failure(channel: impl Into<String>, error: MonitorError) -> Self {
        Self {
            channel: channel.into(),
            error: Some(error),
        }
    }

    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Build the email, Pushbullet and Telegram channels from the config, in
/// that order, each carrying its `enabled` flag.
pub fn channels_from_config(cfg: &NightwatchConfig) -> Vec<ChannelSlot> {
    vec![
        ChannelSlot::new(
            cfg.email.enabled,
            Arc::new(EmailChannel::new(cfg.email.clone(), cfg.channel_timeout)),
        ),
        ChannelSlot::new(
            cfg.pushbullet.enabled,
            Arc::new(PushbulletChannel::new(
                cfg.pushbullet.clone(),
                cfg.channel_timeout,
            )),
        ),
        ChannelSlot::new(
            cfg.telegram.enabled,
            Arc::new(TelegramChannel::new(cfg.telegram.clone(), cfg.channel_timeout)),
        ),
    ]
}
