//! Log setup for the daemon: `env_logger` writing to the console and a file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Writer that copies every line to stderr and, when present, a log file.
pub struct TeeWriter {
    file: Option<File>,
}

impl TeeWriter {
    pub fn new(file: Option<File>) -> Self {
        Self { file }
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            // Stop writing to the file after the first failure.
            if file.write_all(buf).is_err() {
                self.file = None;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = self.file.as_mut() {
            let _ = file.flush();
        }
        Ok(())
    }
}

/// Install the global logger. Default level is `info`; `RUST_LOG` overrides it.
///
/// If `log_file` cannot be opened, logging continues on the console only.
pub fn init(log_file: Option<&Path>) {
    let mut open_error = None;
    let file = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                open_error = Some(format!("cannot open log file {}: {}", path.display(), e));
                None
            }
        }
    });

    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(TeeWriter::new(file))))
        .try_init();
    if result.is_err() {
        // Already initialized (tests, embedding); keep the existing logger.
        return;
    }
    if let Some(message) = open_error {
        log::warn!("{}; logging to console only", message);
    }
}
