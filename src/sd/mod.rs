//! # Service Discovery Client Behavior
//!
//! Per-service availability tracking and the find-service retry cycle.
//!
//! ## Key Types
//!
//! - [`ClientBehavior`] - Two-level availability state machine
//! - [`Event`] - Inputs the machine accepts
//! - [`RetryPolicy`] - Settle delay, backoff and retry budget
//! - [`TimerFacility`] / [`ServiceSearch`] - Collaborators the machine drives

pub mod available;
pub mod backoff;
pub mod client_behavior;
pub mod events;
pub mod timer;
pub mod unavailable;

pub use available::AvailableState;
pub use backoff::RetryPolicy;
pub use client_behavior::{BehaviorState, ClientBehavior, ServiceSearch};
pub use events::{Event, EventKind};
pub use timer::{ScopedTimer, TimerFacility, TimerToken};
pub use unavailable::UnavailableState;
