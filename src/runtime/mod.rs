//! # Client Behavior Runtime
//!
//! Runs a [`ClientBehavior`] on its own tokio task.
//!
//! ## Key Types
//!
//! - [`ClientBehaviorHandle`] - Feeds events to the task and observes its state
//! - `TokioTimer` (internal) - Timer facility posting expiries back into the task
//! - [`config::ClientBehaviorConfig`] - Retry and timing configuration
//!
//! ## Lifecycle
//!
//! 1. Spawn: `ClientBehaviorHandle::spawn(&config, search)` (inside a tokio runtime)
//! 2. Drive: `handle.process_event(Event::RequestChange { is_requested: true })`
//! 3. Observe: `handle.state()` / `handle.wait_for_state(..)`
//! 4. Stop: `handle.stop().await`
//!
//! All input, including timer expiries, goes through one queue and is handled
//! by the task one command at a time, so the machine needs no locking.
//!
//! ## Example
//!
//! ```ignore
//! let handle = ClientBehaviorHandle::spawn(&ClientBehaviorConfig::default(), || send_find_service());
//! handle.process_event(Event::ConfigurationStatusChange { is_configured: true })?;
//! handle.process_event(Event::RequestChange { is_requested: true })?;
//! handle.wait_for_state(|s| matches!(s, BehaviorState::Available(_))).await?;
//! handle.stop().await;
//! ```

pub mod config;
pub(crate) mod timer;

use timer::TokioTimer;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::RuntimeError;
use crate::logging::TARGET;
use crate::sd::backoff::RetryPolicy;
use crate::sd::client_behavior::{BehaviorState, ClientBehavior, ServiceSearch};
use crate::sd::events::Event;
use crate::sd::timer::TimerToken;
use config::ClientBehaviorConfig;

pub(crate) enum Command {
    Event(Event),
    TimerExpired(TimerToken),
    Stop,
}

pub struct ClientBehaviorHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<BehaviorState>,
    task: Option<JoinHandle<()>>,
}

impl ClientBehaviorHandle {
    /// Starts the machine on a new task. Must be called within a tokio runtime.
    ///
    /// The reported state stays `Stopped` until the task has run `start()`.
    pub fn spawn<S>(config: &ClientBehaviorConfig, search: S) -> Self
    where
        S: ServiceSearch + Send + 'static,
    {
        let (commands, rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(BehaviorState::Stopped);
        let machine = ClientBehavior::new(TokioTimer::new(&commands), search, RetryPolicy::from(config));
        let task = tokio::spawn(drive(machine, rx, state_tx));

        ClientBehaviorHandle {
            commands,
            state,
            task: Some(task),
        }
    }

    pub fn process_event(&self, event: Event) -> Result<(), RuntimeError> {
        self.commands
            .send(Command::Event(event))
            .map_err(|_| RuntimeError::Closed)
    }

    /// Last state published by the task.
    pub fn state(&self) -> BehaviorState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<BehaviorState> {
        self.state.clone()
    }

    pub async fn wait_for_state<F>(&self, mut predicate: F) -> Result<BehaviorState, RuntimeError>
    where
        F: FnMut(BehaviorState) -> bool,
    {
        let mut state = self.state.clone();
        let reached = state
            .wait_for(|s| predicate(*s))
            .await
            .map_err(|_| RuntimeError::Closed)?;
        Ok(*reached)
    }

    /// Stops the machine, cancelling its timer, and waits for the task to end.
    /// Afterwards `process_event` fails with [`RuntimeError::Closed`].
    pub async fn stop(&mut self) {
        let _ = self.commands.send(Command::Stop);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::error!(target: TARGET, "Client behavior task failed: {}", e);
            }
        }
    }
}

async fn drive<S: ServiceSearch>(
    mut machine: ClientBehavior<TokioTimer, S>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<BehaviorState>,
) {
    machine.start();
    publish(&state, machine.state());

    while let Some(command) = commands.recv().await {
        match command {
            Command::Event(event) => machine.process_event(event),
            Command::TimerExpired(token) => machine.timer_expired(token),
            Command::Stop => break,
        }
        publish(&state, machine.state());
    }

    machine.stop();
    publish(&state, machine.state());
    log::debug!(
        target: TARGET,
        "Client behavior task finished ({} illegal events)",
        machine.illegal_transition_count()
    );
}

fn publish(state: &watch::Sender<BehaviorState>, current: BehaviorState) {
    state.send_if_modified(|published| {
        if *published == current {
            false
        } else {
            *published = current;
            true
        }
    });
}
