//! Drives `ClientBehavior` through its public API with a caller-side timer,
//! the way an embedding event loop would.

use fusion_sd_client::{
    AvailableState, BehaviorState, ClientBehavior, Event, RetryPolicy, TimerFacility, TimerToken,
    UnavailableState,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Single-slot timer: remembers the pending (delay, token) until it is fired.
#[derive(Clone, Default)]
struct ManualTimer(Rc<RefCell<Option<(Duration, TimerToken)>>>);

impl ManualTimer {
    fn take(&self) -> Option<(Duration, TimerToken)> {
        self.0.borrow_mut().take()
    }

    fn pending(&self) -> Option<Duration> {
        self.0.borrow().map(|(delay, _)| delay)
    }
}

impl TimerFacility for ManualTimer {
    fn schedule(&mut self, delay: Duration, token: TimerToken) {
        *self.0.borrow_mut() = Some((delay, token));
    }

    fn cancel(&mut self) {
        self.0.borrow_mut().take();
    }
}

#[test]
fn test_full_lifecycle_with_external_timer() {
    let timer = ManualTimer::default();
    let lookups = Rc::new(RefCell::new(0u32));
    let counter = lookups.clone();
    let mut machine = ClientBehavior::new(
        timer.clone(),
        move || *counter.borrow_mut() += 1,
        RetryPolicy::default(),
    );

    machine.start();
    machine.process_event(Event::RequestChange { is_requested: true });
    machine.process_event(Event::ConfigurationStatusChange { is_configured: true });
    assert_eq!(timer.pending(), Some(Duration::from_secs(1)));

    let mut waits = Vec::new();
    while let Some((delay, token)) = timer.take() {
        waits.push(delay);
        machine.timer_expired(token);
    }
    assert_eq!(
        waits,
        vec![
            Duration::from_secs(1),
            Duration::from_secs(4),
            Duration::from_secs(8),
            Duration::from_secs(16),
        ]
    );
    assert_eq!(*lookups.borrow(), 3);
    assert_eq!(machine.state(), BehaviorState::Unavailable(UnavailableState::Searching));

    machine.process_event(Event::OfferService);
    assert_eq!(machine.state(), BehaviorState::Available(AvailableState::Requested));

    machine.process_event(Event::StopOfferService);
    assert_eq!(machine.state(), BehaviorState::Unavailable(UnavailableState::Initializing));
    assert_eq!(machine.retry_count(), 0);

    machine.stop();
    assert!(timer.pending().is_none());
    assert_eq!(machine.illegal_transition_count(), 0);
}

#[test]
fn test_state_display() {
    assert_eq!(
        BehaviorState::Unavailable(UnavailableState::Searching).to_string(),
        "unavailable/searching"
    );
    assert_eq!(BehaviorState::Stopped.to_string(), "stopped");
}
