use std::fmt;

/// Input accepted by the client behavior machine.
///
/// `Completion` is the "no event" pseudo-input: the machine delivers it to itself
/// right after entering a state that has a guarded completion transition
/// (`Waiting`, `Unrequested`). It can also be injected to force a guard re-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ConfigurationStatusChange { is_configured: bool },
    RequestChange { is_requested: bool },
    OfferService,
    StopOfferService,
    TimeoutExpired,
    Completion,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ConfigurationStatusChange { .. } => EventKind::ConfigurationStatusChange,
            Event::RequestChange { .. } => EventKind::RequestChange,
            Event::OfferService => EventKind::OfferService,
            Event::StopOfferService => EventKind::StopOfferService,
            Event::TimeoutExpired => EventKind::TimeoutExpired,
            Event::Completion => EventKind::Completion,
        }
    }
}

/// Payload-free tag of an [`Event`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ConfigurationStatusChange,
    RequestChange,
    OfferService,
    StopOfferService,
    TimeoutExpired,
    Completion,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::ConfigurationStatusChange => "ev_configuration_status_change",
            EventKind::RequestChange => "ev_request_change",
            EventKind::OfferService => "ev_offer_service",
            EventKind::StopOfferService => "ev_stop_offer_service",
            EventKind::TimeoutExpired => "ev_timeout_expired",
            EventKind::Completion => "none",
        };
        f.write_str(name)
    }
}
