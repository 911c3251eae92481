//! Pushbullet push-notification channel.

use anyhow::{anyhow, Context, Result};
use serde_json::json;
use std::time::Duration;

use super::message::{push_body, PUSH_TITLE};
use super::{Channel, DetectionEvent};
use crate::config::PushbulletSettings;

pub struct PushbulletChannel {
    settings: PushbulletSettings,
    agent: ureq::Agent,
}

impl PushbulletChannel {
    pub fn new(settings: PushbulletSettings, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { settings, agent }
    }
}

impl Channel for PushbulletChannel {
    fn name(&self) -> &'static str {
        "pushbullet"
    }

    fn send(&self, event: &DetectionEvent) -> Result<()> {
        let payload = json!({
            "type": "note",
            "title": PUSH_TITLE,
            "body": push_body(event),
        });
        let result = self
            .agent
            .post(&self.settings.api_url)
            .set("Access-Token", &self.settings.api_key)
            .send_json(payload);
        match result {
            Ok(response) if response.status() == 200 => Ok(()),
            Ok(response) => {
                let status = response.status();
                let text = response.into_string().unwrap_or_default();
                Err(anyhow!("pushbullet returned {}: {}", status, text))
            }
            Err(ureq::Error::Status(status, response)) => {
                let text = response.into_string().unwrap_or_default();
                Err(anyhow!("pushbullet returned {}: {}", status, text))
            }
            Err(e) => Err(e).context("post to pushbullet"),
        }
    }
}
