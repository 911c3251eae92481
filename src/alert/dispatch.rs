use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::anyhow;

use super::{ChannelResult, ChannelSlot, DetectionEvent};
use crate::error::{ErrorKind, MonitorError};

/// Concurrent fan-out of one event to every enabled channel.
///
/// Each enabled channel gets its own worker thread. A worker that misses the
/// per-channel deadline is reported as a timeout, then given one more
/// deadline period to exit and joined. Only a worker stuck past both
/// periods is detached. The caller can treat the alert cycle as complete
/// when `dispatch` returns.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Deliver `event` to every enabled channel. Results follow the order of
    /// the enabled channels in `channels`.
    pub fn dispatch(&self, event: &DetectionEvent, channels: &[ChannelSlot]) -> Vec<ChannelResult> {
        for slot in channels.iter().filter(|slot| !slot.enabled) {
            log::info!("{} channel disabled; alert not sent to it", slot.name());
        }
        let enabled: Vec<&ChannelSlot> = channels.iter().filter(|slot| slot.enabled).collect();
        if enabled.is_empty() {
            log::warn!(
                "no alert channel enabled; {} detection(s) not sent",
                event.count()
            );
            return Vec::new();
        }

        let event = Arc::new(event.clone());
        let (tx, rx) = mpsc::channel::<(usize, ChannelResult)>();
        let mut results: Vec<Option<ChannelResult>> = enabled.iter().map(|_| None).collect();
        let mut workers = Vec::with_capacity(enabled.len());

        for (index, slot) in enabled.iter().enumerate() {
            let name = slot.name();
            let channel = Arc::clone(&slot.channel);
            let event = Arc::clone(&event);
            let tx = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("alert-{}", name))
                .spawn(move || {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| channel.send(&event)))
                        .unwrap_or_else(|_| Err(anyhow!("{} channel panicked", name)));
                    let result = match outcome {
                        Ok(()) => ChannelResult::success(name),
                        Err(e) => ChannelResult::failure(
                            name,
                            MonitorError::from_anyhow(ErrorKind::ChannelDelivery, &e),
                        ),
                    };
                    // The receiver is gone only when dispatch already gave up on us.
                    let _ = tx.send((index, result));
                });
            match spawned {
                Ok(handle) => workers.push((index, handle)),
                Err(e) => {
                    results[index] = Some(ChannelResult::failure(
                        name,
                        MonitorError::new(
                            ErrorKind::ChannelDelivery,
                            format!("failed to start {} worker: {}", name, e),
                        ),
                    ));
                }
            }
        }
        drop(tx);

        let deadline = Instant::now() + self.timeout;
        let mut pending = workers.len();
        while pending > 0 {
            let wait = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(wait) {
                Ok((index, result)) => {
                    results[index] = Some(result);
                    pending -= 1;
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let mut finished: Vec<bool> = results.iter().map(Option::is_some).collect();
        for (index, _) in &workers {
            if results[*index].is_none() {
                let name = enabled[*index].name();
                log::warn!("{} channel did not finish within {:?}", name, self.timeout);
                results[*index] = Some(ChannelResult::failure(
                    name,
                    MonitorError::new(
                        ErrorKind::ChannelTimeout,
                        format!("{} did not finish within {:?}", name, self.timeout),
                    ),
                ));
            }
        }

        // Transports time out on their own after `timeout`, so late workers
        // get one more period to exit and are joined. Their results stay
        // recorded as timeouts.
        if pending > 0 {
            let grace = Instant::now() + self.timeout;
            while pending > 0 {
                let wait = grace.saturating_duration_since(Instant::now());
                match rx.recv_timeout(wait) {
                    Ok((index, late)) => {
                        finished[index] = true;
                        pending -= 1;
                        log::info!(
                            "{} channel finished after its deadline ({})",
                            late.channel,
                            if late.ok() { "delivered" } else { "failed" }
                        );
                    }
                    Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        }

        for (index, handle) in workers {
            if finished[index] {
                let _ = handle.join();
            } else {
                log::error!(
                    "{} channel still running after {:?}; detaching its worker",
                    enabled[index].name(),
                    self.timeout * 2
                );
            }
        }

        let results: Vec<ChannelResult> = results.into_iter().flatten().collect();
        for result in &results {
            match &result.error {
                None => log::info!("{} alert sent successfully", result.channel),
                Some(err) => log::error!("{} alert failed: {}", result.channel, err),
            }
        }
        results
    }
}
