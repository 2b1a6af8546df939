use std::time::Duration;

use tokio::sync::mpsc::{UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;

use super::Command;
use crate::sd::timer::{TimerFacility, TimerToken};

/// [`TimerFacility`] backed by a tokio sleep task.
///
/// The expiry is posted into the owning machine's command queue, so it is
/// serialized with every other input. Holds only a weak sender: a pending
/// timer does not keep the machine's task alive.
pub struct TokioTimer {
    commands: WeakUnboundedSender<Command>,
    pending: Option<JoinHandle<()>>,
}

impl TokioTimer {
    pub(crate) fn new(commands: &UnboundedSender<Command>) -> Self {
        TokioTimer {
            commands: commands.downgrade(),
            pending: None,
        }
    }
}

impl TimerFacility for TokioTimer {
    fn schedule(&mut self, delay: Duration, token: TimerToken) {
        self.cancel();
        let commands = self.commands.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(Command::TimerExpired(token));
            }
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
