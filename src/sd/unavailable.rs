//! Sub-machine active while the required service is not offered.
//!
//! `Waiting` idles until the local interface is configured and the application
//! requests the service. `Initializing` waits out the settle delay, then
//! `Searching` sends a find-service request on every entry and re-enters itself
//! on timeout until the retry budget is spent.

use std::fmt;

use super::client_behavior::{Context, ServiceSearch, Step};
use super::events::Event;
use super::timer::TimerFacility;
use crate::logging::TARGET;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnavailableState {
    Waiting,
    Initializing,
    Searching,
}

impl fmt::Display for UnavailableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnavailableState::Waiting => "waiting",
            UnavailableState::Initializing => "initializing",
            UnavailableState::Searching => "searching",
        };
        f.write_str(name)
    }
}

/// Entry into the super-state: reset the retry budget and start in `Waiting`.
pub(crate) fn enter<T: TimerFacility, S: ServiceSearch>(ctx: &mut Context<T, S>) -> UnavailableState {
    log::debug!(target: TARGET, "unavailable");
    ctx.retry_count = 0;
    enter_waiting(ctx)
}

pub(crate) fn dispatch<T: TimerFacility, S: ServiceSearch>(
    state: UnavailableState,
    event: Event,
    ctx: &mut Context<T, S>,
) -> Step<UnavailableState> {
    use UnavailableState::*;

    match (state, event) {
        (Waiting, Event::Completion) => waiting_guard(ctx),
        (Waiting, Event::ConfigurationStatusChange { is_configured }) => {
            log::debug!(target: TARGET, "Received configuration change ({})", is_configured);
            ctx.set_configured(is_configured);
            waiting_guard(ctx)
        }
        (Waiting, Event::RequestChange { is_requested }) => {
            log::debug!(target: TARGET, "Received request change ({})", is_requested);
            ctx.set_requested(is_requested);
            waiting_guard(ctx)
        }
        (Initializing | Searching, Event::TimeoutExpired) => {
            ctx.timer.fired();
            if ctx.is_repeating() {
                Step::Transit(enter_searching(ctx))
            } else {
                log::info!(
                    target: TARGET,
                    "Service search exhausted after {} attempts, waiting for offer",
                    ctx.retry_count
                );
                Step::Stay
            }
        }
        (Initializing | Searching, Event::ConfigurationStatusChange { is_configured }) => {
            log::debug!(target: TARGET, "Received configuration change ({})", is_configured);
            ctx.set_configured(is_configured);
            restart_if_lost(ctx)
        }
        (Initializing | Searching, Event::RequestChange { is_requested }) => {
            log::debug!(target: TARGET, "Received request change ({})", is_requested);
            ctx.set_requested(is_requested);
            restart_if_lost(ctx)
        }
        _ => Step::Illegal,
    }
}

fn waiting_guard<T: TimerFacility, S: ServiceSearch>(ctx: &mut Context<T, S>) -> Step<UnavailableState> {
    if ctx.is_configured_and_requested() {
        Step::Transit(enter_initializing(ctx))
    } else {
        Step::Stay
    }
}

// Leaving the search cycle mid-flight re-enters the super-state, so the
// retry budget is fresh once the interface comes back.
fn restart_if_lost<T: TimerFacility, S: ServiceSearch>(ctx: &mut Context<T, S>) -> Step<UnavailableState> {
    if ctx.is_configured_and_requested() {
        Step::Stay
    } else {
        ctx.timer.cancel();
        Step::Transit(enter(ctx))
    }
}

fn enter_waiting<T: TimerFacility, S: ServiceSearch>(ctx: &mut Context<T, S>) -> UnavailableState {
    log::debug!(target: TARGET, "  waiting");
    match waiting_guard(ctx) {
        Step::Transit(next) => next,
        _ => UnavailableState::Waiting,
    }
}

fn enter_initializing<T: TimerFacility, S: ServiceSearch>(ctx: &mut Context<T, S>) -> UnavailableState {
    log::debug!(target: TARGET, "  initializing");
    ctx.timer.cancel();
    let delay = ctx.policy.initial_delay;
    ctx.timer.arm(delay);
    UnavailableState::Initializing
}

fn enter_searching<T: TimerFacility, S: ServiceSearch>(ctx: &mut Context<T, S>) -> UnavailableState {
    log::debug!(target: TARGET, "  searching");
    ctx.timer.cancel();
    ctx.search.request_service_lookup();
    ctx.retry_count += 1;
    let interval = ctx.policy.next_interval(ctx.retry_count);
    log::info!(
        target: TARGET,
        "Find service sent (attempt {}/{}), next check in {} ms",
        ctx.retry_count,
        ctx.policy.max_retries,
        interval.as_millis()
    );
    ctx.timer.arm(interval);
    UnavailableState::Searching
}
