//! Sub-machine active while the required service is offered.

use std::fmt;

use super::client_behavior::{Context, ServiceSearch, Step};
use super::events::Event;
use super::timer::TimerFacility;
use crate::logging::TARGET;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvailableState {
    Unrequested,
    Requested,
}

impl fmt::Display for AvailableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailableState::Unrequested => f.write_str("unrequested"),
            AvailableState::Requested => f.write_str("requested"),
        }
    }
}

pub(crate) fn enter<T: TimerFacility, S: ServiceSearch>(ctx: &mut Context<T, S>) -> AvailableState {
    log::debug!(target: TARGET, "available");
    enter_unrequested(ctx)
}

/// `Step::Exit` stands for the `exit_on_down` pseudo-state: the parent must
/// leave the available super-state.
pub(crate) fn dispatch<T: TimerFacility, S: ServiceSearch>(
    state: AvailableState,
    event: Event,
    ctx: &mut Context<T, S>,
) -> Step<AvailableState> {
    use AvailableState::*;

    match (state, event) {
        (Unrequested, Event::Completion) => requested_guard(ctx),
        (Unrequested, Event::RequestChange { is_requested }) => {
            ctx.set_requested(is_requested);
            requested_guard(ctx)
        }
        (Requested, Event::RequestChange { is_requested }) => {
            ctx.set_requested(is_requested);
            if ctx.is_requested {
                Step::Stay
            } else {
                Step::Transit(enter_unrequested(ctx))
            }
        }
        (_, Event::ConfigurationStatusChange { is_configured }) => {
            ctx.set_configured(is_configured);
            if ctx.is_configured {
                Step::Stay
            } else {
                log::debug!(target: TARGET, "  exit_on_down");
                Step::Exit
            }
        }
        (Unrequested, Event::OfferService) => Step::Transit(enter_unrequested(ctx)),
        (Requested, Event::OfferService) => Step::Transit(enter_requested()),
        _ => Step::Illegal,
    }
}

fn requested_guard<T: TimerFacility, S: ServiceSearch>(ctx: &mut Context<T, S>) -> Step<AvailableState> {
    if ctx.is_requested {
        Step::Transit(enter_requested())
    } else {
        Step::Stay
    }
}

fn enter_unrequested<T: TimerFacility, S: ServiceSearch>(ctx: &mut Context<T, S>) -> AvailableState {
    log::debug!(target: TARGET, "  unrequested");
    match requested_guard(ctx) {
        Step::Transit(next) => next,
        _ => AvailableState::Unrequested,
    }
}

fn enter_requested() -> AvailableState {
    log::debug!(target: TARGET, "  requested");
    AvailableState::Requested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sd::backoff::RetryPolicy;
    use crate::sd::tests::{CountingSearch, RecordingTimer};

    fn context() -> Context<RecordingTimer, CountingSearch> {
        Context::new(RecordingTimer::default(), CountingSearch::default(), RetryPolicy::default())
    }

    #[test]
    fn test_enter_follows_request_flag() {
        let mut ctx = context();
        assert_eq!(enter(&mut ctx), AvailableState::Unrequested);
        ctx.set_requested(true);
        assert_eq!(enter(&mut ctx), AvailableState::Requested);
    }

    #[test]
    fn test_request_toggles_substate() {
        let mut ctx = context();
        let step = dispatch(
            AvailableState::Unrequested,
            Event::RequestChange { is_requested: true },
            &mut ctx,
        );
        assert_eq!(step, Step::Transit(AvailableState::Requested));

        let step = dispatch(
            AvailableState::Requested,
            Event::RequestChange { is_requested: false },
            &mut ctx,
        );
        assert_eq!(step, Step::Transit(AvailableState::Unrequested));
        assert!(!ctx.is_requested);
    }

    #[test]
    fn test_configuration_down_exits_from_both_substates() {
        for state in [AvailableState::Unrequested, AvailableState::Requested] {
            let mut ctx = context();
            ctx.set_configured(true);
            let step = dispatch(state, Event::ConfigurationStatusChange { is_configured: false }, &mut ctx);
            assert_eq!(step, Step::Exit);
            assert!(!ctx.is_configured);
        }
    }

    #[test]
    fn test_configuration_up_only_updates_flag() {
        let mut ctx = context();
        let step = dispatch(
            AvailableState::Requested,
            Event::ConfigurationStatusChange { is_configured: true },
            &mut ctx,
        );
        assert_eq!(step, Step::Stay);
        assert!(ctx.is_configured);
    }

    #[test]
    fn test_repeated_offer_self_loops() {
        let mut ctx = context();
        let step = dispatch(AvailableState::Requested, Event::OfferService, &mut ctx);
        assert_eq!(step, Step::Transit(AvailableState::Requested));
    }

    #[test]
    fn test_completion_in_requested_is_illegal() {
        let mut ctx = context();
        assert_eq!(dispatch(AvailableState::Requested, Event::Completion, &mut ctx), Step::Illegal);
        assert_eq!(dispatch(AvailableState::Requested, Event::TimeoutExpired, &mut ctx), Step::Illegal);
    }
}
