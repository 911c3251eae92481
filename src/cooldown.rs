//! Alert cooldown gate.
//!
//! Check, act, commit: the monitor asks [`CooldownGate::try_enter`] before a
//! dispatch and calls [`CooldownGate::commit`] only once every channel has
//! finished. A slow dispatch therefore never shortens the cooldown window.

use chrono::{DateTime, Local};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct CooldownGate {
    cooldown: Duration,
    /// `None` until the first committed alert.
    last_alert_at: Option<DateTime<Local>>,
}

impl CooldownGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_alert_at: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_alert_at(&self) -> Option<DateTime<Local>> {
        self.last_alert_at
    }

    /// True when an alert may be dispatched at `now`. Does not update state.
    pub fn try_enter(&self, now: DateTime<Local>) -> bool {
        self.remaining(now).is_none()
    }

    /// Time left before the gate opens, or `None` when it is open.
    ///
    /// A clock that stepped backwards past the last alert keeps the gate
    /// closed for the full cooldown measured from the committed time.
    pub fn remaining(&self, now: DateTime<Local>) -> Option<Duration> {
        let last = self.last_alert_at?;
        let elapsed = now.signed_duration_since(last);
        let elapsed = elapsed.to_std().unwrap_or(Duration::ZERO);
        if elapsed >= self.cooldown {
            None
        } else {
            Some(self.cooldown - elapsed)
        }
    }

    /// Record a completed dispatch cycle for the event seen at `now`.
    pub fn commit(&mut self, now: DateTime<Local>) {
        self.last_alert_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(seconds: i64) -> DateTime<Local> {
        Local.timestamp_opt(1_760_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn fresh_gate_is_open() {
        let gate = CooldownGate::new(Duration::from_secs(300));
        assert!(gate.try_enter(t(0)));
        assert_eq!(gate.last_alert_at(), None);
    }

    #[test]
    fn try_enter_does_not_commit() {
        let gate = CooldownGate::new(Duration::from_secs(300));
        assert!(gate.try_enter(t(0)));
        assert!(gate.try_enter(t(1)));
        assert_eq!(gate.last_alert_at(), None);
    }

    #[test]
    fn reopens_exactly_at_cooldown() {
        let mut gate = CooldownGate::new(Duration::from_secs(300));
        assert!(gate.try_enter(t(0)));
        gate.commit(t(0));

        assert!(!gate.try_enter(t(299)));
        assert_eq!(gate.remaining(t(299)), Some(Duration::from_secs(1)));
        assert!(gate.try_enter(t(300)));
        assert_eq!(gate.remaining(t(300)), None);
    }

    #[test]
    fn window_is_measured_from_the_committed_event_time() {
        let mut gate = CooldownGate::new(Duration::from_secs(300));
        assert!(gate.try_enter(t(0)));
        // the monitor commits the event timestamp once dispatch has joined
        gate.commit(t(0));
        assert_eq!(gate.last_alert_at(), Some(t(0)));
        assert!(!gate.try_enter(t(40)));
        assert_eq!(gate.remaining(t(40)), Some(Duration::from_secs(260)));
        assert!(gate.try_enter(t(300)));
    }

    #[test]
    fn clock_stepping_backwards_keeps_gate_closed() {
        let mut gate = CooldownGate::new(Duration::from_secs(300));
        gate.commit(t(1000));
        assert!(!gate.try_enter(t(900)));
        assert_eq!(gate.remaining(t(900)), Some(Duration::from_secs(300)));
    }

    #[test]
    fn zero_cooldown_is_always_open() {
        let mut gate = CooldownGate::new(Duration::ZERO);
        gate.commit(t(0));
        assert!(gate.try_enter(t(0)));
    }
}
