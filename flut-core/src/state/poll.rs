//! Flow-controlled snapshot polling.
//!
//! The scheduler never lets more than one `STATE` request be in flight:
//! a tick while a request is outstanding does nothing. The timer itself
//! lives in the driver; the scheduler only tracks whether it is armed.

use std::time::{Duration, Instant};

use tracing::warn;

use crate::protocol::{ClientRequest, Encoding};

/// Default polling rate, in snapshot requests per second.
pub const DEFAULT_UPDATE_FREQUENCY: f64 = 5.0;

// ── PollScheduler ────────────────────────────────────────────────

/// Decides when a snapshot request may be sent.
#[derive(Debug, Clone)]
pub struct PollScheduler {
    interval: Duration,
    /// Abandon an unanswered request after this long. `None` waits forever.
    timeout: Option<Duration>,
    encoding: Encoding,
    armed: bool,
    outstanding: bool,
    requested_at: Option<Instant>,
}

impl PollScheduler {
    /// Create a disarmed scheduler ticking every `interval`.
    pub fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            interval,
            timeout,
            encoding: Encoding::Rgba64,
            armed: false,
            outstanding: false,
            requested_at: None,
        }
    }

    /// Time between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the repeating timer should be running.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether a snapshot request is waiting for its answer.
    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    /// Arm the timer and return the dimension query to send first.
    pub fn start(&mut self) -> ClientRequest {
        self.armed = true;
        self.outstanding = false;
        self.requested_at = None;
        ClientRequest::Size
    }

    /// Handle one timer tick.
    ///
    /// Returns the snapshot request to send, with the outstanding flag
    /// already set, or `None` when the previous request is still open.
    pub fn tick(&mut self, now: Instant) -> Option<ClientRequest> {
        if !self.armed {
            return None;
        }

        if self.outstanding {
            let expired = match (self.timeout, self.requested_at) {
                (Some(timeout), Some(at)) => now.saturating_duration_since(at) >= timeout,
                _ => false,
            };
            if !expired {
                return None;
            }
            warn!("snapshot request unanswered for {:?}; requesting again", self.timeout);
        }

        self.outstanding = true;
        self.requested_at = Some(now);
        Some(ClientRequest::State(self.encoding))
    }

    /// The outstanding request was answered (or its answer rejected).
    pub fn complete(&mut self) {
        self.outstanding = false;
        self.requested_at = None;
    }

    /// Disarm the timer and forget any outstanding request.
    pub fn cancel(&mut self) {
        self.armed = false;
        self.complete();
    }
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs_f64(1.0 / DEFAULT_UPDATE_FREQUENCY), None)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> PollScheduler {
        PollScheduler::new(Duration::from_millis(200), None)
    }

    #[test]
    fn disarmed_tick_is_noop() {
        let mut s = scheduler();
        assert_eq!(s.tick(Instant::now()), None);
        assert!(!s.is_outstanding());
    }

    #[test]
    fn start_returns_size_query() {
        let mut s = scheduler();
        assert_eq!(s.start(), ClientRequest::Size);
        assert!(s.is_armed());
        assert!(!s.is_outstanding());
    }

    #[test]
    fn one_request_in_flight() {
        let mut s = scheduler();
        s.start();
        let now = Instant::now();
        assert_eq!(s.tick(now), Some(ClientRequest::State(Encoding::Rgba64)));
        assert!(s.is_outstanding());
        assert_eq!(s.tick(now + Duration::from_secs(60)), None);

        s.complete();
        assert_eq!(s.tick(now), Some(ClientRequest::State(Encoding::Rgba64)));
    }

    #[test]
    fn cancel_clears_everything() {
        let mut s = scheduler();
        s.start();
        s.tick(Instant::now());
        s.cancel();
        assert!(!s.is_armed());
        assert!(!s.is_outstanding());
        assert_eq!(s.tick(Instant::now()), None);
    }

    #[test]
    fn timeout_reissues_request() {
        let mut s = PollScheduler::new(Duration::from_millis(200), Some(Duration::from_secs(2)));
        s.start();
        let t0 = Instant::now();
        assert!(s.tick(t0).is_some());
        assert!(s.tick(t0 + Duration::from_secs(1)).is_none());
        assert_eq!(
            s.tick(t0 + Duration::from_secs(2)),
            Some(ClientRequest::State(Encoding::Rgba64))
        );
        assert!(s.is_outstanding());
        // The re-issued request restarts the clock.
        assert!(s.tick(t0 + Duration::from_secs(3)).is_none());
    }

    #[test]
    fn default_rate_is_five_per_second() {
        assert_eq!(PollScheduler::default().interval(), Duration::from_millis(200));
    }
}
