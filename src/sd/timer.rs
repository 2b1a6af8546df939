use std::fmt;
use std::time::Duration;

/// Identifies one arming of the client timer.
///
/// Every call to [`ScopedTimer::arm`] hands out a fresh token. An expiry is only
/// honoured if it carries the token of the arm that is still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    pub(crate) const fn new(value: u64) -> Self {
        TimerToken(value)
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Single-shot delayed callback.
///
/// Implementations deliver the expiry back to the machine's execution context
/// with the token they were scheduled with. After `cancel` the pending expiry
/// must not be delivered; cancelling when nothing is pending is a no-op.
pub trait TimerFacility {
    fn schedule(&mut self, delay: Duration, token: TimerToken);
    fn cancel(&mut self);
}

/// Owns the facility and the single outstanding arm.
///
/// Re-arming cancels first, so at most one expiry is ever pending. The pending
/// arm is cancelled when the owner is dropped.
pub struct ScopedTimer<T: TimerFacility> {
    facility: T,
    armed: Option<TimerToken>,
    next_token: u64,
}

impl<T: TimerFacility> ScopedTimer<T> {
    pub fn new(facility: T) -> Self {
        ScopedTimer {
            facility,
            armed: None,
            next_token: 1,
        }
    }

    pub fn arm(&mut self, delay: Duration) -> TimerToken {
        self.cancel();
        let token = TimerToken::new(self.next_token);
        self.next_token += 1;
        log::trace!(target: crate::logging::TARGET, "set_timer({} ms) {}", delay.as_millis(), token);
        self.facility.schedule(delay, token);
        self.armed = Some(token);
        token
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.armed.take() {
            log::trace!(target: crate::logging::TARGET, "cancel_timer {}", token);
            self.facility.cancel();
        }
    }

    /// Consumes the outstanding arm if `token` matches it.
    pub fn claim(&mut self, token: TimerToken) -> bool {
        if self.armed == Some(token) {
            self.armed = None;
            true
        } else {
            false
        }
    }

    /// Forgets the outstanding arm, treating it as fired.
    pub fn fired(&mut self) -> Option<TimerToken> {
        self.armed.take()
    }

    pub fn armed(&self) -> Option<TimerToken> {
        self.armed
    }

    pub fn facility(&self) -> &T {
        &self.facility
    }
}

impl<T: TimerFacility> Drop for ScopedTimer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
