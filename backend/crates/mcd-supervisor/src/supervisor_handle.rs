use crate::{
    Notifier, ServerVersion, ShutdownKind, SupervisorCommand, SupervisorError, SupervisorResult,
    SupervisorStatus,
};

use std::sync::Arc;

use log::info;
use tokio::sync::{mpsc, oneshot, watch};

/// Cheap, cloneable access to a running [`Supervisor`](crate::Supervisor).
#[derive(Clone)]
pub struct SupervisorHandle {
    command_tx: mpsc::Sender<SupervisorCommand>,
    status_rx: watch::Receiver<SupervisorStatus>,
    notifier: Arc<dyn Notifier>,
}

impl SupervisorHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<SupervisorCommand>,
        status_rx: watch::Receiver<SupervisorStatus>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            command_tx,
            status_rx,
            notifier,
        }
    }

    async fn send(&self, command: SupervisorCommand) -> SupervisorResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| SupervisorError::channel_closed())
    }

    /// Install if nothing is installed yet, then start the server.
    ///
    /// Resolves once the server process is up.
    pub async fn start(&self) -> SupervisorResult<ServerVersion> {
        let (reply, rx) = oneshot::channel();
        self.send(SupervisorCommand::Start { reply }).await?;
        rx.await.map_err(|_| SupervisorError::channel_closed())?
    }

    /// Queue a shutdown. Returns as soon as the request is accepted; watch
    /// [`subscribe`](Self::subscribe) for completion.
    pub async fn shutdown(&self, kind: ShutdownKind) -> SupervisorResult<()> {
        info!("Queueing {kind} shutdown");
        self.send(SupervisorCommand::Shutdown { kind }).await
    }

    /// Move to `version`, which should already be provisioned. Resolves once
    /// the restarted server is up (or the alias swapped, when none was
    /// running).
    pub async fn update(&self, version: ServerVersion) -> SupervisorResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(SupervisorCommand::Update { version, reply })
            .await?;
        rx.await.map_err(|_| SupervisorError::channel_closed())?
    }

    pub async fn say(&self, message: impl Into<String>) -> SupervisorResult<()> {
        self.send(SupervisorCommand::Say {
            message: message.into(),
        })
        .await
    }

    /// Healthy while running, and while a shutdown for an update is under way.
    /// The result is also reported to the notifier.
    pub async fn health_check(&self) -> bool {
        let ok = self.status().is_healthy();
        self.notifier.on_health_checked(ok).await;
        ok
    }

    pub fn status(&self) -> SupervisorStatus {
        self.status_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SupervisorStatus> {
        self.status_rx.clone()
    }

    /// Whether the supervisor task has ended.
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }
}
