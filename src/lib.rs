pub mod error;
pub mod logging;
pub mod runtime;
pub mod sd;

pub use error::{ConfigError, IllegalTransition, RuntimeError};
pub use runtime::ClientBehaviorHandle;
pub use runtime::config::ClientBehaviorConfig;
pub use sd::{
    AvailableState, BehaviorState, ClientBehavior, Event, EventKind, RetryPolicy, ServiceSearch,
    TimerFacility, TimerToken, UnavailableState,
};
