//! Shutdown triggers: OS signals and in-process requests from the webhooks.

use crate::error::{Result as ServerErrorResult, ServerError};

use mcd_supervisor::{ShutdownKind, SupervisorHandle};

use log::{info, warn};
use tokio::sync::broadcast;

/// Fan-in point for shutdown requests.
///
/// Raising never blocks; a forwarder task hands each request to the
/// supervisor, which queues it behind whatever it is doing.
#[derive(Clone)]
pub struct ShutdownSignal {
    shutdown_tx: broadcast::Sender<ShutdownKind>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(8);
        Self { shutdown_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownKind> {
        self.shutdown_tx.subscribe()
    }

    pub fn raise(&self, kind: ShutdownKind) {
        info!("{kind} shutdown requested");
        if self.shutdown_tx.send(kind).is_err() {
            warn!("No one is listening for shutdown requests");
        }
    }

    /// Start forwarding raised requests to the supervisor. Subscribes before
    /// returning, so nothing raised after this call is lost.
    pub fn forward_to(&self, handle: SupervisorHandle) -> tokio::task::JoinHandle<()> {
        let mut shutdown_rx = self.subscribe();

        tokio::spawn(async move {
            loop {
                match shutdown_rx.recv().await {
                    Ok(kind) => {
                        if let Err(e) = handle.shutdown(kind).await {
                            warn!("Dropping {kind} shutdown request: {e}");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Missed {skipped} shutdown requests");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// SIGQUIT asks for a graceful shutdown; SIGTERM and SIGINT for an immediate one.
#[cfg(unix)]
pub fn listen_os_signals(shutdown: ShutdownSignal) -> ServerErrorResult<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let install = |kind: SignalKind, name: &'static str| {
        signal(kind).map_err(|source| ServerError::Signal {
            signal: name,
            source,
        })
    };

    let mut quit = install(SignalKind::quit(), "SIGQUIT")?;
    let mut terminate = install(SignalKind::terminate(), "SIGTERM")?;
    let mut interrupt = install(SignalKind::interrupt(), "SIGINT")?;

    tokio::spawn(async move {
        loop {
            let kind = tokio::select! {
                Some(()) = quit.recv() => {
                    info!("Received SIGQUIT");
                    ShutdownKind::Graceful
                }
                Some(()) = terminate.recv() => {
                    info!("Received SIGTERM");
                    ShutdownKind::Immediate
                }
                Some(()) = interrupt.recv() => {
                    info!("Received SIGINT (Ctrl+C)");
                    ShutdownKind::Immediate
                }
                else => break,
            };
            shutdown.raise(kind);
        }
    });

    Ok(())
}

#[cfg(not(unix))]
pub fn listen_os_signals(shutdown: ShutdownSignal) -> ServerErrorResult<()> {
    tokio::spawn(async move {
        loop {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C");
                    shutdown.raise(ShutdownKind::Immediate);
                }
                Err(e) => {
                    log::error!("Failed to listen for Ctrl+C: {e}");
                    break;
                }
            }
        }
    });

    Ok(())
}
