use anyhow::{anyhow, Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ErrorKind, MonitorError};
use crate::schedule::{parse_time_of_day, MonitoringWindow};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_MONITORING_START: &str = "18:00";
const DEFAULT_MONITORING_END: &str = "08:00";
const DEFAULT_ALERT_COOLDOWN_SECS: u64 = 300;
const DEFAULT_DETECTION_THRESHOLD: f32 = 0.5;
const DEFAULT_MIN_DETECTION_AREA: u64 = 3000;
const DEFAULT_CHANNEL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ACTIVE_POLL_SECS: u64 = 1;
const DEFAULT_IDLE_POLL_SECS: u64 = 60;
const DEFAULT_DETECTIONS_DIR: &str = "detections";
const DEFAULT_CAPTURE_URL: &str = "stub://front_door";
const DEFAULT_CAPTURE_WIDTH: u32 = 640;
const DEFAULT_CAPTURE_HEIGHT: u32 = 480;
const DEFAULT_WARMUP_SECS: u64 = 2;
/// Largest accepted capture width or height (8K).
pub const MAX_CAPTURE_DIMENSION: u32 = 8192;
const DEFAULT_CAPTURE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DETECTOR_BACKEND: &str = "motion";
const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SENDER_EMAIL: &str = "your_email@gmail.com";
const DEFAULT_SENDER_PASSWORD: &str = "your_app_password";
const DEFAULT_RECIPIENT_EMAIL: &str = "alert@example.com";
const DEFAULT_PUSHBULLET_API_KEY: &str = "your_pushbullet_api_key";
pub const DEFAULT_PUSHBULLET_URL: &str = "https://api.pushbullet.com/v2/pushes";
const DEFAULT_TELEGRAM_BOT_TOKEN: &str = "your_bot_token";
const DEFAULT_TELEGRAM_CHAT_ID: &str = "your_chat_id";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

// -------------------- On-disk representation --------------------

#[derive(Debug, Deserialize, Serialize, Default)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    monitoring_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    monitoring_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alert_cooldown: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detection_threshold: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_detection_area: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit_cooldown_without_channels: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_poll_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    idle_poll_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detections_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capture: Option<CaptureConfigFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detector: Option<DetectorConfigFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<EmailConfigFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pushbullet: Option<PushbulletConfigFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    telegram: Option<TelegramConfigFile>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct CaptureConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warmup_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct DetectorConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct EmailConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    smtp_server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    smtp_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient_email: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct PushbulletConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct TelegramConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bot_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_base: Option<String>,
}

// -------------------- Resolved configuration --------------------

#[derive(Debug, Clone)]
pub struct NightwatchConfig {
    pub window: MonitoringWindow,
    pub alert_cooldown: Duration,
    pub detection_threshold: f32,
    pub min_detection_area: u64,
    /// Whether an alert cycle with no enabled channel still starts a cooldown.
    pub commit_cooldown_without_channels: bool,
    pub channel_timeout: Duration,
    pub active_poll: Duration,
    pub idle_poll: Duration,
    pub detections_dir: PathBuf,
    pub capture: CaptureSettings,
    pub detector: DetectorSettings,
    pub email: EmailSettings,
    pub pushbullet: PushbulletSettings,
    pub telegram: TelegramSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    /// `stub://name`, `http(s)://host/snapshot.jpg` or `v4l2:///dev/videoN`.
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Seconds to let the sensor settle before the first frame.
    pub warmup_secs: u64,
}

impl CaptureSettings {
    /// Per-request timeout for network cameras.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(DEFAULT_CAPTURE_TIMEOUT_SECS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorSettings {
    /// `motion`, `stub` or `tract`.
    pub backend: String,
    pub model_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushbulletSettings {
    pub enabled: bool,
    pub api_key: String,
    pub api_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramSettings {
    pub enabled: bool,
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl NightwatchConfig {
    /// Load and validate a config file. Every error, including a bad
    /// environment override, is returned to the caller.
    pub fn load(path: &Path) -> Result<Self> {
        let file = read_config_file(path)?;
        let mut cfg = Self::from_file(file)?;
        if let Some(err) = cfg.apply_env().into_iter().next() {
            return Err(err);
        }
        Ok(cfg)
    }

    /// Load the config the way the daemon does at startup.
    ///
    /// - missing file: the defaults are written to `path` and used
    /// - unreadable or invalid file: logged as `CONFIG_LOAD` and defaults are used
    /// - invalid environment override: logged as `CONFIG_LOAD` and skipped;
    ///   the rest of the configuration is kept
    pub fn load_or_init(path: &Path) -> Self {
        if !path.exists() {
            match write_default_config(path) {
                Ok(()) => log::info!("Created default config file: {}", path.display()),
                Err(e) => log::warn!(
                    "could not write default config file {}: {:#}",
                    path.display(),
                    e
                ),
            }
        }

        let mut cfg = match read_config_file(path).and_then(Self::from_file) {
            Ok(cfg) => cfg,
            Err(e) => {
                let err = MonitorError::from_anyhow(ErrorKind::ConfigLoad, &e);
                log::error!("Error loading config: {}; falling back to defaults", err);
                Self::default()
            }
        };
        for e in cfg.apply_env() {
            let err = MonitorError::from_anyhow(ErrorKind::ConfigLoad, &e);
            log::error!("Ignoring environment override: {}", err);
        }
        cfg
    }

    fn from_file(file: ConfigFile) -> Result<Self> {
        let start = file
            .monitoring_start
            .unwrap_or_else(|| DEFAULT_MONITORING_START.to_string());
        let end = file
            .monitoring_end
            .unwrap_or_else(|| DEFAULT_MONITORING_END.to_string());
        let window = MonitoringWindow::parse(&start, &end)
            .context("invalid monitoring_start/monitoring_end")?;

        let capture = file.capture.unwrap_or_default();
        let detector = file.detector.unwrap_or_default();
        let email = file.email.unwrap_or_default();
        let pushbullet = file.pushbullet.unwrap_or_default();
        let telegram = file.telegram.unwrap_or_default();

        let cfg = Self {
            window,
            alert_cooldown: Duration::from_secs(
                file.alert_cooldown.unwrap_or(DEFAULT_ALERT_COOLDOWN_SECS),
            ),
            detection_threshold: file
                .detection_threshold
                .unwrap_or(DEFAULT_DETECTION_THRESHOLD),
            min_detection_area: file
                .min_detection_area
                .unwrap_or(DEFAULT_MIN_DETECTION_AREA),
            commit_cooldown_without_channels: file
                .commit_cooldown_without_channels
                .unwrap_or(true),
            channel_timeout: Duration::from_secs(
                file.channel_timeout_secs
                    .unwrap_or(DEFAULT_CHANNEL_TIMEOUT_SECS),
            ),
            active_poll: Duration::from_secs(
                file.active_poll_secs.unwrap_or(DEFAULT_ACTIVE_POLL_SECS),
            ),
            idle_poll: Duration::from_secs(file.idle_poll_secs.unwrap_or(DEFAULT_IDLE_POLL_SECS)),
            detections_dir: file
                .detections_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DETECTIONS_DIR)),
            capture: CaptureSettings {
                url: capture
                    .url
                    .unwrap_or_else(|| DEFAULT_CAPTURE_URL.to_string()),
                width: capture.width.unwrap_or(DEFAULT_CAPTURE_WIDTH),
                height: capture.height.unwrap_or(DEFAULT_CAPTURE_HEIGHT),
                warmup_secs: capture.warmup_secs.unwrap_or(DEFAULT_WARMUP_SECS),
            },
            detector: DetectorSettings {
                backend: detector
                    .backend
                    .unwrap_or_else(|| DEFAULT_DETECTOR_BACKEND.to_string()),
                model_path: detector.model_path,
            },
            email: EmailSettings {
                enabled: email.enabled.unwrap_or(true),
                smtp_server: email
                    .smtp_server
                    .unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
                smtp_port: email.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
                sender_email: email
                    .sender_email
                    .unwrap_or_else(|| DEFAULT_SENDER_EMAIL.to_string()),
                sender_password: email
                    .sender_password
                    .unwrap_or_else(|| DEFAULT_SENDER_PASSWORD.to_string()),
                recipient_email: email
                    .recipient_email
                    .unwrap_or_else(|| DEFAULT_RECIPIENT_EMAIL.to_string()),
            },
            pushbullet: PushbulletSettings {
                enabled: pushbullet.enabled.unwrap_or(false),
                api_key: pushbullet
                    .api_key
                    .unwrap_or_else(|| DEFAULT_PUSHBULLET_API_KEY.to_string()),
                api_url: pushbullet
                    .api_url
                    .unwrap_or_else(|| DEFAULT_PUSHBULLET_URL.to_string()),
            },
            telegram: TelegramSettings {
                enabled: telegram.enabled.unwrap_or(false),
                bot_token: telegram
                    .bot_token
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_BOT_TOKEN.to_string()),
                chat_id: telegram
                    .chat_id
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_CHAT_ID.to_string()),
                api_base: telegram
                    .api_base
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            },
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply every valid `NIGHTWATCH_*` override. Invalid values leave the
    /// setting untouched and are returned.
    fn apply_env(&mut self) -> Vec<anyhow::Error> {
        let mut errors = Vec::new();
        let mut start = self.window.start;
        let mut end = self.window.end;
        for (key, slot) in [
            ("NIGHTWATCH_MONITORING_START", &mut start),
            ("NIGHTWATCH_MONITORING_END", &mut end),
        ] {
            if let Some(value) = non_empty_env(key) {
                match parse_time_of_day(&value) {
                    Ok(time) => *slot = time,
                    Err(e) => errors.push(e.context(format!("invalid {}", key))),
                }
            }
        }
        self.window = MonitoringWindow::new(start, end);
        if let Some(url) = non_empty_env("NIGHTWATCH_CAPTURE_URL") {
            self.capture.url = url;
        }
        if let Some(dir) = non_empty_env("NIGHTWATCH_DETECTIONS_DIR") {
            self.detections_dir = PathBuf::from(dir);
        }
        if let Some(cooldown) = non_empty_env("NIGHTWATCH_ALERT_COOLDOWN") {
            match cooldown.trim().parse::<u64>() {
                Ok(seconds) => self.alert_cooldown = Duration::from_secs(seconds),
                Err(_) => errors.push(anyhow!(
                    "NIGHTWATCH_ALERT_COOLDOWN must be an integer number of seconds, got '{}'",
                    cooldown
                )),
            }
        }
        errors
    }

    fn validate(&self) -> Result<()> {
        if !self.detection_threshold.is_finite() {
            return Err(anyhow!("detection_threshold must be a finite number"));
        }
        if self.active_poll.is_zero() || self.idle_poll.is_zero() {
            return Err(anyhow!("poll intervals must be greater than zero"));
        }
        if self.channel_timeout.is_zero() {
            return Err(anyhow!("channel_timeout_secs must be greater than zero"));
        }
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(anyhow!("capture width and height must be greater than zero"));
        }
        if self.capture.width > MAX_CAPTURE_DIMENSION || self.capture.height > MAX_CAPTURE_DIMENSION {
            return Err(anyhow!(
                "capture width and height must be at most {}",
                MAX_CAPTURE_DIMENSION
            ));
        }
        Ok(())
    }
}

impl Default for NightwatchConfig {
    fn default() -> Self {
        let start = NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN);
        let end = NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN);
        Self {
            window: MonitoringWindow::new(start, end),
            alert_cooldown: Duration::from_secs(DEFAULT_ALERT_COOLDOWN_SECS),
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            min_detection_area: DEFAULT_MIN_DETECTION_AREA,
            commit_cooldown_without_channels: true,
            channel_timeout: Duration::from_secs(DEFAULT_CHANNEL_TIMEOUT_SECS),
            active_poll: Duration::from_secs(DEFAULT_ACTIVE_POLL_SECS),
            idle_poll: Duration::from_secs(DEFAULT_IDLE_POLL_SECS),
            detections_dir: PathBuf::from(DEFAULT_DETECTIONS_DIR),
            capture: CaptureSettings {
                url: DEFAULT_CAPTURE_URL.to_string(),
                width: DEFAULT_CAPTURE_WIDTH,
                height: DEFAULT_CAPTURE_HEIGHT,
                warmup_secs: DEFAULT_WARMUP_SECS,
            },
            detector: DetectorSettings {
                backend: DEFAULT_DETECTOR_BACKEND.to_string(),
                model_path: None,
            },
            email: EmailSettings {
                enabled: true,
                smtp_server: DEFAULT_SMTP_SERVER.to_string(),
                smtp_port: DEFAULT_SMTP_PORT,
                sender_email: DEFAULT_SENDER_EMAIL.to_string(),
                sender_password: DEFAULT_SENDER_PASSWORD.to_string(),
                recipient_email: DEFAULT_RECIPIENT_EMAIL.to_string(),
            },
            pushbullet: PushbulletSettings {
                enabled: false,
                api_key: DEFAULT_PUSHBULLET_API_KEY.to_string(),
                api_url: DEFAULT_PUSHBULLET_URL.to_string(),
            },
            telegram: TelegramSettings {
                enabled: false,
                bot_token: DEFAULT_TELEGRAM_BOT_TOKEN.to_string(),
                chat_id: DEFAULT_TELEGRAM_CHAT_ID.to_string(),
                api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            },
        }
    }
}

/// The file written when no config exists yet. Endpoint overrides are left
/// out so operators only see the keys they are expected to edit.
fn default_config_file() -> ConfigFile {
    ConfigFile {
        monitoring_start: Some(DEFAULT_MONITORING_START.to_string()),
        monitoring_end: Some(DEFAULT_MONITORING_END.to_string()),
        alert_cooldown: Some(DEFAULT_ALERT_COOLDOWN_SECS),
        detection_threshold: Some(DEFAULT_DETECTION_THRESHOLD),
        min_detection_area: Some(DEFAULT_MIN_DETECTION_AREA),
        commit_cooldown_without_channels: Some(true),
        channel_timeout_secs: Some(DEFAULT_CHANNEL_TIMEOUT_SECS),
        active_poll_secs: Some(DEFAULT_ACTIVE_POLL_SECS),
        idle_poll_secs: Some(DEFAULT_IDLE_POLL_SECS),
        detections_dir: Some(PathBuf::from(DEFAULT_DETECTIONS_DIR)),
        capture: Some(CaptureConfigFile {
            url: Some(DEFAULT_CAPTURE_URL.to_string()),
            width: Some(DEFAULT_CAPTURE_WIDTH),
            height: Some(DEFAULT_CAPTURE_HEIGHT),
            warmup_secs: Some(DEFAULT_WARMUP_SECS),
        }),
        detector: Some(DetectorConfigFile {
            backend: Some(DEFAULT_DETECTOR_BACKEND.to_string()),
            model_path: None,
        }),
        email: Some(EmailConfigFile {
            enabled: Some(true),
            smtp_server: Some(DEFAULT_SMTP_SERVER.to_string()),
            smtp_port: Some(DEFAULT_SMTP_PORT),
            sender_email: Some(DEFAULT_SENDER_EMAIL.to_string()),
            sender_password: Some(DEFAULT_SENDER_PASSWORD.to_string()),
            recipient_email: Some(DEFAULT_RECIPIENT_EMAIL.to_string()),
        }),
        pushbullet: Some(PushbulletConfigFile {
            enabled: Some(false),
            api_key: Some(DEFAULT_PUSHBULLET_API_KEY.to_string()),
            api_url: None,
        }),
        telegram: Some(TelegramConfigFile {
            enabled: Some(false),
            bot_token: Some(DEFAULT_TELEGRAM_BOT_TOKEN.to_string()),
            chat_id: Some(DEFAULT_TELEGRAM_CHAT_ID.to_string()),
            api_base: None,
        }),
    }
}

/// Write the default configuration to `path`, creating parent directories.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create config directory {}", parent.display()))?;
    }
    let file = default_config_file();
    let rendered = if is_toml(path) {
        toml::to_string_pretty(&file).context("render default config as toml")?
    } else {
        serde_json::to_string_pretty(&file).context("render default config as json")?
    };
    std::fs::write(path, rendered)
        .with_context(|| format!("write default config file {}", path.display()))?;
    Ok(())
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = if is_toml(path) {
        toml::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_resolves_to_default_config() {
        let resolved = NightwatchConfig::from_file(default_config_file()).unwrap();
        let defaults = NightwatchConfig::default();
        assert_eq!(resolved.window, defaults.window);
        assert_eq!(resolved.alert_cooldown, defaults.alert_cooldown);
        assert_eq!(resolved.detection_threshold, defaults.detection_threshold);
        assert_eq!(resolved.min_detection_area, defaults.min_detection_area);
        assert_eq!(resolved.capture, defaults.capture);
        assert_eq!(resolved.detector, defaults.detector);
        assert_eq!(resolved.email, defaults.email);
        assert_eq!(resolved.pushbullet, defaults.pushbullet);
        assert_eq!(resolved.telegram, defaults.telegram);
    }

    #[test]
    fn empty_file_takes_every_default() {
        let cfg = NightwatchConfig::from_file(ConfigFile::default()).unwrap();
        assert_eq!(cfg.window.to_string(), "18:00-08:00");
        assert_eq!(cfg.alert_cooldown, Duration::from_secs(300));
        assert_eq!(cfg.detection_threshold, 0.5);
        assert_eq!(cfg.min_detection_area, 3000);
        assert!(cfg.commit_cooldown_without_channels);
        assert!(cfg.email.enabled);
        assert!(!cfg.pushbullet.enabled);
        assert!(!cfg.telegram.enabled);
    }

    #[test]
    fn partial_channel_block_merges_field_by_field() {
        let file: ConfigFile =
            serde_json::from_str(r#"{"telegram": {"enabled": true, "chat_id": "42"}}"#).unwrap();
        let cfg = NightwatchConfig::from_file(file).unwrap();
        assert!(cfg.telegram.enabled);
        assert_eq!(cfg.telegram.chat_id, "42");
        assert_eq!(cfg.telegram.bot_token, DEFAULT_TELEGRAM_BOT_TOKEN);
        assert_eq!(cfg.telegram.api_base, DEFAULT_TELEGRAM_API_BASE);
    }

    #[test]
    fn rejects_bad_window() {
        let file: ConfigFile = serde_json::from_str(r#"{"monitoring_start": "6pm"}"#).unwrap();
        let err = NightwatchConfig::from_file(file).unwrap_err();
        assert!(format!("{:#}", err).contains("monitoring_start"));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let file: ConfigFile = serde_json::from_str(r#"{"active_poll_secs": 0}"#).unwrap();
        assert!(NightwatchConfig::from_file(file).is_err());
    }

    #[test]
    fn rejects_oversized_capture() {
        let file: ConfigFile =
            serde_json::from_str(r#"{"capture": {"width": 100000, "height": 100000}}"#).unwrap();
        let err = NightwatchConfig::from_file(file).unwrap_err();
        assert!(err.to_string().contains("at most 8192"));

        let file: ConfigFile =
            serde_json::from_str(r#"{"capture": {"width": 8192, "height": 4320}}"#).unwrap();
        assert!(NightwatchConfig::from_file(file).is_ok());
    }

    #[test]
    fn toml_default_file_round_trips() {
        let rendered = toml::to_string_pretty(&default_config_file()).unwrap();
        let parsed: ConfigFile = toml::from_str(&rendered).unwrap();
        let cfg = NightwatchConfig::from_file(parsed).unwrap();
        assert_eq!(cfg.capture.url, DEFAULT_CAPTURE_URL);
    }
}
