//! Single-consumer event loop for a player.
//!
//! [`PlayerHandle::spawn`] moves a controller onto a tokio task. Callers talk
//! to it over an mpsc channel and get answers back on oneshot channels.

use crate::controller::{EventOutcome, PlayerController, PlayerEvent};
use crate::widgets::ControlWidgets;
use crate::{Error, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

enum Command {
    Dispatch(PlayerEvent, oneshot::Sender<EventOutcome>),
    Widgets(oneshot::Sender<ControlWidgets>),
    Close(oneshot::Sender<()>),
}

/// An async handle to a controller running on its own event loop task.
///
/// The task owns the `PlayerController` and handles one command at a time,
/// so events are reacted to strictly in the order they were sent and a
/// reaction that awaits the host (play, PiP, fullscreen) finishes before the
/// next event is looked at.
#[derive(Clone)]
pub struct PlayerHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl PlayerHandle {
    /// Move `controller` onto a spawned task. Must be called inside a tokio
    /// runtime. The join handle yields the controller back after `close`.
    pub fn spawn(controller: PlayerController) -> (Self, JoinHandle<PlayerController>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<Command>();
        let task = tokio::spawn(run(controller, cmd_rx));
        (Self { cmd_tx }, task)
    }

    /// Queue an input event and wait for its reaction to finish.
    pub async fn send(&self, event: PlayerEvent) -> Result<EventOutcome> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Dispatch(event, tx))
            .map_err(|_| Error::Other("Player event loop has stopped".into()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Dispatch canceled: {}", e)))
    }

    /// Widget state after every previously sent event has been handled.
    pub async fn widgets(&self) -> Result<ControlWidgets> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Widgets(tx))
            .map_err(|_| Error::Other("Player event loop has stopped".into()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Widget query canceled: {}", e)))
    }

    /// Stop the event loop.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))
    }
}

async fn run(
    mut controller: PlayerController,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
) -> PlayerController {
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            Command::Dispatch(event, resp) => {
                let outcome = controller.dispatch(event).await;
                let _ = resp.send(outcome);
            }
            Command::Widgets(resp) => {
                let _ = resp.send(controller.widgets());
            }
            Command::Close(resp) => {
                let _ = resp.send(());
                break;
            }
        }
    }
    log::debug!("Player event loop finished");
    controller
}
