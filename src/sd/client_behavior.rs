//! # Client behavior for one required service
//!
//! [`ClientBehavior`] tracks whether a remote service is usable and drives the
//! find-service retry cycle while it is not. It is a two-level state machine:
//!
//! ```text
//! Unavailable ── OfferService ──────────────▶ Available
//!   Waiting                                     Unrequested
//!   Initializing                                Requested
//!   Searching  ◀─ StopOfferService / down ──    (exit_on_down)
//! ```
//!
//! The flags and the retry counter live in one shared context owned by the top
//! level and lent to whichever sub-machine is active. Timer expiries are posted
//! back through [`ClientBehavior::timer_expired`] with the token of the arm that
//! produced them; stale tokens are dropped.

use std::collections::VecDeque;
use std::fmt;

use super::available::{self, AvailableState};
use super::backoff::RetryPolicy;
use super::events::Event;
use super::timer::{ScopedTimer, TimerFacility, TimerToken};
use super::unavailable::{self, UnavailableState};
use crate::error::IllegalTransition;
use crate::logging::TARGET;

const ILLEGAL_HISTORY: usize = 32;

/// Sends a find-service request for the monitored service. Fire-and-forget.
pub trait ServiceSearch {
    fn request_service_lookup(&mut self);
}

impl<F: FnMut()> ServiceSearch for F {
    fn request_service_lookup(&mut self) {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorState {
    /// Not started, or stopped. Events are ignored.
    Stopped,
    Unavailable(UnavailableState),
    Available(AvailableState),
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorState::Stopped => f.write_str("stopped"),
            BehaviorState::Unavailable(sub) => write!(f, "unavailable/{}", sub),
            BehaviorState::Available(sub) => write!(f, "available/{}", sub),
        }
    }
}

/// Result of delivering an event to a sub-machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step<S> {
    /// Entered `S` (possibly re-entered the current state); entry actions ran.
    Transit(S),
    /// Handled without a state change.
    Stay,
    /// Leave the enclosing super-state.
    Exit,
    /// No transition matches.
    Illegal,
}

/// State shared by both sub-machines.
pub(crate) struct Context<T: TimerFacility, S: ServiceSearch> {
    pub(crate) is_configured: bool,
    pub(crate) is_requested: bool,
    pub(crate) retry_count: u32,
    pub(crate) policy: RetryPolicy,
    pub(crate) timer: ScopedTimer<T>,
    pub(crate) search: S,
}

impl<T: TimerFacility, S: ServiceSearch> Context<T, S> {
    pub(crate) fn new(timer: T, search: S, policy: RetryPolicy) -> Self {
        Context {
            is_configured: false,
            is_requested: false,
            retry_count: 0,
            policy,
            timer: ScopedTimer::new(timer),
            search,
        }
    }

    pub(crate) fn set_configured(&mut self, is_configured: bool) {
        self.is_configured = is_configured;
    }

    pub(crate) fn set_requested(&mut self, is_requested: bool) {
        self.is_requested = is_requested;
    }

    pub(crate) fn is_configured_and_requested(&self) -> bool {
        self.is_configured && self.is_requested
    }

    pub(crate) fn is_repeating(&self) -> bool {
        self.policy.can_retry(self.retry_count)
    }
}

pub struct ClientBehavior<T: TimerFacility, S: ServiceSearch> {
    state: BehaviorState,
    ctx: Context<T, S>,
    illegal: VecDeque<IllegalTransition>,
    illegal_total: u64,
}

impl<T: TimerFacility, S: ServiceSearch> ClientBehavior<T, S> {
    pub fn new(timer: T, search: S, policy: RetryPolicy) -> Self {
        ClientBehavior {
            state: BehaviorState::Stopped,
            ctx: Context::new(timer, search, policy),
            illegal: VecDeque::with_capacity(ILLEGAL_HISTORY),
            illegal_total: 0,
        }
    }

    /// Enters `Unavailable/Waiting`. Does nothing if already running.
    pub fn start(&mut self) {
        if self.state != BehaviorState::Stopped {
            log::debug!(target: TARGET, "start() ignored, already in {}", self.state);
            return;
        }
        self.state = BehaviorState::Unavailable(unavailable::enter(&mut self.ctx));
    }

    /// Cancels the timer and ignores all further input until the next `start`.
    pub fn stop(&mut self) {
        self.ctx.timer.cancel();
        if self.state != BehaviorState::Stopped {
            log::debug!(target: TARGET, "stopped in {}", self.state);
        }
        self.state = BehaviorState::Stopped;
    }

    pub fn process_event(&mut self, event: Event) {
        let next = match self.state {
            BehaviorState::Stopped => {
                log::debug!(target: TARGET, "Ignoring {} while stopped", event.kind());
                return;
            }
            BehaviorState::Unavailable(sub) => match event {
                Event::OfferService => {
                    self.ctx.timer.cancel();
                    Some(BehaviorState::Available(available::enter(&mut self.ctx)))
                }
                _ => match unavailable::dispatch(sub, event, &mut self.ctx) {
                    Step::Transit(next) => Some(BehaviorState::Unavailable(next)),
                    Step::Stay | Step::Exit => None,
                    Step::Illegal => {
                        self.record_illegal(event);
                        None
                    }
                },
            },
            BehaviorState::Available(sub) => match event {
                Event::StopOfferService => {
                    Some(BehaviorState::Unavailable(unavailable::enter(&mut self.ctx)))
                }
                Event::TimeoutExpired => {
                    log::trace!(target: TARGET, "Timeout absorbed in {}", self.state);
                    None
                }
                _ => match available::dispatch(sub, event, &mut self.ctx) {
                    Step::Transit(next) => Some(BehaviorState::Available(next)),
                    Step::Stay => None,
                    Step::Exit => Some(BehaviorState::Unavailable(unavailable::enter(&mut self.ctx))),
                    Step::Illegal => {
                        self.record_illegal(event);
                        None
                    }
                },
            },
        };

        if let Some(next) = next {
            let now_available = matches!(next, BehaviorState::Available(_));
            if now_available != self.is_available() {
                log::info!(
                    target: TARGET,
                    "Service {}",
                    if now_available { "available" } else { "unavailable" }
                );
            }
            self.state = next;
        }
    }

    /// Delivers the expiry of the arm identified by `token`.
    ///
    /// Expiries of cancelled or superseded arms are discarded.
    pub fn timer_expired(&mut self, token: TimerToken) {
        if self.state == BehaviorState::Stopped {
            log::debug!(target: TARGET, "Timer {} expired after stop", token);
            return;
        }
        if !self.ctx.timer.claim(token) {
            log::debug!(target: TARGET, "Discarding stale timer {} in {}", token, self.state);
            return;
        }
        log::trace!(target: TARGET, "Timer expired {}", token);
        self.process_event(Event::TimeoutExpired);
    }

    fn record_illegal(&mut self, event: Event) {
        let illegal = IllegalTransition {
            state: self.state,
            event: event.kind(),
        };
        log::warn!(target: TARGET, "Received illegal event! {}", illegal);
        if self.illegal.len() == ILLEGAL_HISTORY {
            self.illegal.pop_front();
        }
        self.illegal.push_back(illegal);
        self.illegal_total += 1;
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, BehaviorState::Available(_))
    }

    pub fn is_configured(&self) -> bool {
        self.ctx.is_configured
    }

    pub fn is_requested(&self) -> bool {
        self.ctx.is_requested
    }

    pub fn retry_count(&self) -> u32 {
        self.ctx.retry_count
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.ctx.policy
    }

    pub fn armed_timer(&self) -> Option<TimerToken> {
        self.ctx.timer.armed()
    }

    pub fn timer_facility(&self) -> &T {
        self.ctx.timer.facility()
    }

    pub fn search(&self) -> &S {
        &self.ctx.search
    }

    /// Most recent illegal transitions, oldest first.
    pub fn illegal_transitions(&self) -> impl Iterator<Item = &IllegalTransition> {
        self.illegal.iter()
    }

    pub fn illegal_transition_count(&self) -> u64 {
        self.illegal_total
    }
}

impl<T: TimerFacility, S: ServiceSearch> fmt::Debug for ClientBehavior<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBehavior")
            .field("state", &self.state)
            .field("is_configured", &self.ctx.is_configured)
            .field("is_requested", &self.ctx.is_requested)
            .field("retry_count", &self.ctx.retry_count)
            .field("armed_timer", &self.ctx.timer.armed())
            .finish()
    }
}
