//! nightwatchd - human presence monitor daemon
//!
//! This daemon:
//! 1. Loads (or creates) the JSON/TOML configuration
//! 2. Opens the camera and the detector backend; failure here exits with 1
//! 3. During the monitoring window, inspects frames for people
//! 4. Saves an annotated image for every confirmed detection
//! 5. Alerts all enabled channels concurrently, at most once per cooldown
//! 6. Stops on Ctrl-C, releasing the camera, and exits with 0

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

use nightwatch::config::{NightwatchConfig, DEFAULT_CONFIG_PATH};
use nightwatch::detect::open_backend;
use nightwatch::error::{ErrorKind, MonitorError};
use nightwatch::{logging, open_camera, Monitor};

#[derive(Parser, Debug)]
#[command(author, version, about = "Watch a camera for people and send alerts")]
struct Args {
    /// Path to the JSON (or .toml) config file. Created with defaults if missing.
    #[arg(long, env = "NIGHTWATCH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Append log lines to this file as well as the console.
    #[arg(long, env = "NIGHTWATCH_LOG_FILE", default_value = "nightwatch.log")]
    log_file: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(Some(&args.log_file));

    let cfg = NightwatchConfig::load_or_init(&args.config);
    log::info!(
        "Configuration loaded from {} (window {}, cooldown {}s)",
        args.config.display(),
        cfg.window,
        cfg.alert_cooldown.as_secs()
    );

    let capture = match open_camera(&cfg.capture) {
        Ok(capture) => capture,
        Err(err) => {
            log::error!("{}", err);
            return ExitCode::from(1);
        }
    };

    let mut detector = match open_backend(&cfg.detector, cfg.capture.width, cfg.capture.height) {
        Ok(detector) => detector,
        Err(e) => {
            // capture is dropped here, which releases the camera
            log::error!("{}", MonitorError::from_anyhow(ErrorKind::CaptureInit, &e));
            return ExitCode::from(1);
        }
    };
    if let Err(e) = detector.warm_up() {
        log::error!("{}", MonitorError::from_anyhow(ErrorKind::CaptureInit, &e));
        return ExitCode::from(1);
    }
    log::info!("Detector backend '{}' ready", detector.name());

    let (tx, rx) = mpsc::channel();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = tx.send(());
    }) {
        log::error!("failed to install Ctrl-C handler: {}", e);
        return ExitCode::from(1);
    }

    let mut monitor = Monitor::from_config(&cfg, capture, detector);
    log::info!("nightwatchd running; press Ctrl-C to stop");
    monitor.run(&rx);
    log::info!("Shutdown complete");
    ExitCode::SUCCESS
}
