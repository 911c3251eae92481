use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use tempfile::NamedTempFile;

use nightwatch::config::NightwatchConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "NIGHTWATCH_MONITORING_START",
        "NIGHTWATCH_MONITORING_END",
        "NIGHTWATCH_CAPTURE_URL",
        "NIGHTWATCH_DETECTIONS_DIR",
        "NIGHTWATCH_ALERT_COOLDOWN",
    ] {
        std::env::remove_var(key);
    }
}

fn config_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temp config");
    std::io::Write::write_all(&mut file, contents.as_bytes()).expect("write config");
    file
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = config_file(
        ".json",
        r#"{
            "monitoring_start": "21:30",
            "monitoring_end": "06:15",
            "alert_cooldown": 120,
            "detection_threshold": 0.7,
            "min_detection_area": 4500,
            "capture": {
                "url": "http://192.168.1.20/snapshot.jpg",
                "warmup_secs": 0
            },
            "email": {
                "enabled": false
            },
            "pushbullet": {
                "enabled": true,
                "api_key": "o.abc123"
            }
        }"#,
    );

    std::env::set_var("NIGHTWATCH_MONITORING_END", "07:00");
    std::env::set_var("NIGHTWATCH_DETECTIONS_DIR", "/var/lib/nightwatch/detections");
    std::env::set_var("NIGHTWATCH_ALERT_COOLDOWN", "600");

    let cfg = NightwatchConfig::load(file.path()).expect("load config");

    assert_eq!(cfg.window.to_string(), "21:30-07:00");
    assert_eq!(cfg.alert_cooldown, Duration::from_secs(600));
    assert_eq!(cfg.detection_threshold, 0.7);
    assert_eq!(cfg.min_detection_area, 4500);
    assert_eq!(cfg.capture.url, "http://192.168.1.20/snapshot.jpg");
    assert_eq!(cfg.capture.width, 640);
    assert_eq!(cfg.capture.warmup_secs, 0);
    assert_eq!(
        cfg.detections_dir,
        PathBuf::from("/var/lib/nightwatch/detections")
    );
    assert!(!cfg.email.enabled);
    assert_eq!(cfg.email.smtp_server, "smtp.gmail.com");
    assert!(cfg.pushbullet.enabled);
    assert_eq!(cfg.pushbullet.api_key, "o.abc123");
    assert!(!cfg.telegram.enabled);

    clear_env();
}

#[test]
fn loads_toml_config_by_extension() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = config_file(
        ".toml",
        r#"
monitoring_start = "00:00"
monitoring_end = "23:59"

[telegram]
enabled = true
bot_token = "123:abc"
chat_id = "-1001"
"#,
    );
    let cfg = NightwatchConfig::load(file.path()).expect("load toml config");

    assert_eq!(cfg.window.to_string(), "00:00-23:59");
    assert!(cfg.telegram.enabled);
    assert_eq!(cfg.telegram.chat_id, "-1001");
    assert_eq!(cfg.alert_cooldown, Duration::from_secs(300));
}

#[test]
fn missing_file_is_created_with_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let cfg = NightwatchConfig::load_or_init(&path);

    assert!(path.exists());
    assert_eq!(cfg.window.to_string(), "18:00-08:00");
    assert_eq!(cfg.alert_cooldown, Duration::from_secs(300));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["monitoring_start"], "18:00");
    assert_eq!(written["alert_cooldown"], 300);
    assert_eq!(written["email"]["smtp_port"], 587);
    assert_eq!(written["pushbullet"]["enabled"], false);

    // a second start reads the file it wrote
    let reloaded = NightwatchConfig::load(&path).unwrap();
    assert_eq!(reloaded.min_detection_area, 3000);
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = config_file(".json", r#"{"monitoring_start": "18:00", "#);
    assert!(NightwatchConfig::load(file.path()).is_err());

    let cfg = NightwatchConfig::load_or_init(file.path());
    assert_eq!(cfg.window.to_string(), "18:00-08:00");
    assert_eq!(cfg.detection_threshold, 0.5);
    // the broken file is left for the operator to fix
    let contents = std::fs::read_to_string(file.path()).unwrap();
    assert!(contents.ends_with(", "));
}

#[test]
fn invalid_env_override_keeps_file_settings() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = config_file(
        ".json",
        r#"{
            "monitoring_start": "20:00",
            "alert_cooldown": 45,
            "email": {"enabled": false},
            "telegram": {"enabled": true, "bot_token": "123:abc", "chat_id": "-1001"}
        }"#,
    );
    std::env::set_var("NIGHTWATCH_ALERT_COOLDOWN", "5m");
    std::env::set_var("NIGHTWATCH_MONITORING_END", "late");
    std::env::set_var("NIGHTWATCH_DETECTIONS_DIR", "/srv/detections");

    // strict load reports the bad override
    let err = NightwatchConfig::load(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("NIGHTWATCH_"));

    // startup load skips only the bad overrides
    let cfg = NightwatchConfig::load_or_init(file.path());
    assert!(!cfg.email.enabled);
    assert!(cfg.telegram.enabled);
    assert_eq!(cfg.telegram.chat_id, "-1001");
    assert_eq!(cfg.window.to_string(), "20:00-08:00");
    assert_eq!(cfg.alert_cooldown, Duration::from_secs(45));
    assert_eq!(cfg.detections_dir, PathBuf::from("/srv/detections"));

    clear_env();
}

#[test]
fn empty_env_values_are_ignored() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = config_file(".json", r#"{"capture": {"url": "stub://garage"}}"#);
    std::env::set_var("NIGHTWATCH_CAPTURE_URL", "");

    let cfg = NightwatchConfig::load(file.path()).unwrap();
    assert_eq!(cfg.capture.url, "stub://garage");

    clear_env();
}
