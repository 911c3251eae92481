//! Telegram bot channel.

use anyhow::{anyhow, Context, Result};
use std::time::Duration;

use super::message::chat_text;
use super::{Channel, DetectionEvent};
use crate::config::TelegramSettings;

pub struct TelegramChannel {
    settings: TelegramSettings,
    agent: ureq::Agent,
}

impl TelegramChannel {
    pub fn new(settings: TelegramSettings, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { settings, agent }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.bot_token
        )
    }
}

impl Channel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn send(&self, event: &DetectionEvent) -> Result<()> {
        let text = chat_text(event);
        let result = self.agent.post(&self.endpoint()).send_form(&[
            ("chat_id", self.settings.chat_id.as_str()),
            ("text", text.as_str()),
        ]);
        match result {
            Ok(response) if response.status() == 200 => Ok(()),
            Ok(response) => {
                let status = response.status();
                let body = response.into_string().unwrap_or_default();
                Err(anyhow!("telegram returned {}: {}", status, body))
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(anyhow!("telegram returned {}: {}", status, body))
            }
            // The URL carries the bot token, so keep only the transport kind.
            Err(ureq::Error::Transport(transport)) => {
                Err(anyhow!("{}", transport.kind())).context("post to telegram")
            }
        }
    }
}
