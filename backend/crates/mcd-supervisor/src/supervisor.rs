//! The supervisor task.
//!
//! Owns the server process, the install layout and the update flag. Commands
//! arrive over a bounded channel and run to completion one at a time, so a
//! shutdown that has started always finishes before a queued start or update
//! is looked at.

use crate::{
    InstallLayout, Notifier, ProcessLauncher, Provisioner, ServerProcess, ServerVersion,
    ShutdownKind, SupervisorCommand, SupervisorError, SupervisorHandle, SupervisorResult,
    SupervisorState, SupervisorStatus, VersionSource,
};

use mcd_config::{ShutdownConfig, SupervisorConfig};

use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::{mpsc, oneshot, watch};

/// The collaborators the supervisor drives.
#[derive(Clone)]
pub struct Collaborators {
    pub version_source: Arc<dyn VersionSource>,
    pub provisioner: Arc<dyn Provisioner>,
    pub launcher: Arc<dyn ProcessLauncher>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct Supervisor {
    layout: InstallLayout,
    shutdown_config: ShutdownConfig,
    collaborators: Collaborators,
    process: Option<Box<dyn ServerProcess>>,
    version: Option<ServerVersion>,
    update_pending: bool,
    status_tx: watch::Sender<SupervisorStatus>,
    command_rx: mpsc::Receiver<SupervisorCommand>,
}

impl Supervisor {
    pub fn new(
        layout: InstallLayout,
        shutdown_config: ShutdownConfig,
        supervisor_config: &SupervisorConfig,
        collaborators: Collaborators,
    ) -> (Self, SupervisorHandle) {
        let (command_tx, command_rx) = mpsc::channel(supervisor_config.command_buffer);
        let (status_tx, status_rx) = watch::channel(SupervisorStatus::absent());

        let handle = SupervisorHandle::new(
            command_tx,
            status_rx,
            Arc::clone(&collaborators.notifier),
        );

        let supervisor = Self {
            layout,
            shutdown_config,
            collaborators,
            process: None,
            version: None,
            update_pending: false,
            status_tx,
            command_rx,
        };

        (supervisor, handle)
    }

    /// Process commands until every handle is dropped or an unrecoverable
    /// error occurs.
    pub async fn run(mut self) -> SupervisorResult<()> {
        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle(command).await?,
                    None => break,
                },
                code = child_exit(&mut self.process) => self.reap(code).await?,
            }
        }

        info!("All supervisor handles dropped, supervisor exiting");
        Ok(())
    }

    /// The server went away without being asked to.
    async fn reap(&mut self, code: SupervisorResult<Option<i32>>) -> SupervisorResult<()> {
        let code = code?;
        if let Some(mut process) = self.process.take() {
            process.close();
        }

        error!(
            "{} exited unexpectedly (exit code {code:?})",
            self.layout.binary_name()
        );
        self.version = None;
        self.collaborators.notifier.on_stopped().await;
        self.set_state(SupervisorState::Absent);
        Ok(())
    }

    async fn handle(&mut self, command: SupervisorCommand) -> SupervisorResult<()> {
        match command {
            SupervisorCommand::Start { reply } => match self.install_and_start().await {
                Ok(version) => {
                    let _ = reply.send(Ok(version));
                    Ok(())
                }
                Err(e) => Err(self.abort(e, reply)),
            },

            SupervisorCommand::Shutdown { kind } => match self.shutdown(kind).await {
                Ok(()) => Ok(()),
                Err(e) => {
                    error!("Shutdown failed: {e}");
                    Err(e)
                }
            },

            SupervisorCommand::Update { version, reply } => match self.update(version).await {
                Ok(()) => {
                    let _ = reply.send(Ok(()));
                    Ok(())
                }
                Err(e) if e.is_transient() => {
                    warn!("Update abandoned, server left as it was: {e}");
                    let _ = reply.send(Err(e));
                    Ok(())
                }
                Err(e) => Err(self.abort(e, reply)),
            },

            SupervisorCommand::Say { message } => {
                self.say(&message).await;
                Ok(())
            }
        }
    }

    /// Hand the real error to the waiting caller and end the task.
    fn abort<T>(
        &self,
        e: SupervisorError,
        reply: oneshot::Sender<SupervisorResult<T>>,
    ) -> SupervisorError {
        error!("Unrecoverable supervisor error: {e}");
        let message = e.to_string();
        let _ = reply.send(Err(e));
        SupervisorError::aborted(message)
    }

    async fn install_and_start(&mut self) -> SupervisorResult<ServerVersion> {
        if let Some(version) = &self.version {
            warn!("Start requested but {version} is already running");
            return Ok(version.clone());
        }

        let version = if self.layout.is_installed() {
            let version = self.layout.installed_version()?;
            info!("Found installed version {version}");
            version
        } else {
            self.install().await?
        };

        self.spawn_server(&version)?;
        self.announce_started(&version).await;

        Ok(version)
    }

    async fn install(&mut self) -> SupervisorResult<ServerVersion> {
        self.set_state(SupervisorState::Installing);
        info!("Installing latest Minecraft Bedrock Server...");

        let version = self.collaborators.version_source.fetch_remote_version().await?;
        self.collaborators.provisioner.provision(&version).await?;
        self.layout.activate(&version)?;

        Ok(version)
    }

    fn spawn_server(&mut self, version: &ServerVersion) -> SupervisorResult<()> {
        let program = self.layout.binary_path()?;
        let working_dir = self.layout.working_dir()?;

        let process = self.collaborators.launcher.launch(&program, &working_dir)?;
        info!(
            "Started {} {version} (PID {:?})",
            self.layout.binary_name(),
            process.id()
        );

        self.process = Some(process);
        self.version = Some(version.clone());
        Ok(())
    }

    async fn announce_started(&mut self, version: &ServerVersion) {
        self.set_state(SupervisorState::Running {
            version: version.clone(),
        });
        self.collaborators.notifier.on_started(version).await;
    }

    async fn shutdown(&mut self, kind: ShutdownKind) -> SupervisorResult<()> {
        let Some(mut process) = self.process.take() else {
            warn!("Shutdown ({kind}) requested but no server is running");
            return Ok(());
        };

        self.set_state(SupervisorState::ShuttingDown { kind });
        info!("Stopping {} ({kind})...", self.layout.binary_name());

        if kind == ShutdownKind::Graceful {
            let interval = self.shutdown_config.notice_interval();
            let step = self.shutdown_config.notice_interval_secs;

            for remaining in (1..=u64::from(self.shutdown_config.countdown_notices)).rev() {
                let notice = format!("say shutting down in {} seconds...", remaining * step);
                send_notice(process.as_mut(), &notice).await;
                tokio::time::sleep(interval).await;
            }
        }

        send_notice(process.as_mut(), "say shutting down NOW...").await;
        tokio::time::sleep(self.shutdown_config.final_notice_delay()).await;

        if process.has_exited()? {
            warn!("{} already exited, not sending stop", self.layout.binary_name());
        } else if let Err(e) = process.write_line("stop").await {
            if !process.has_exited()? {
                return Err(e);
            }
            warn!("{} exited before stop was sent", self.layout.binary_name());
        }
        let code = process.wait_for_exit().await?;
        process.close();

        self.collaborators.notifier.on_stopped().await;
        self.version = None;
        info!(
            "Stopped {} (exit code {code:?})",
            self.layout.binary_name()
        );

        self.set_state(SupervisorState::Absent);
        Ok(())
    }

    async fn update(&mut self, version: ServerVersion) -> SupervisorResult<()> {
        if self.version.as_ref() == Some(&version) {
            info!("Version {version} is already running");
            return Ok(());
        }

        let was_running = self.process.is_some();
        self.update_pending = was_running;
        self.set_state(SupervisorState::Updating {
            to: version.clone(),
        });

        if let Err(e) = self.collaborators.provisioner.provision(&version).await {
            self.update_pending = false;
            self.set_state(self.settled_state());
            return Err(e);
        }

        if was_running {
            info!("Stopping server to update to {version}");
            self.shutdown(ShutdownKind::Graceful).await?;
            self.set_state(SupervisorState::Installing);
        }

        self.layout.activate(&version)?;

        if was_running {
            self.spawn_server(&version)?;
            self.update_pending = false;
            self.announce_started(&version).await;
        } else {
            self.set_state(SupervisorState::Absent);
        }

        info!("Updated to Minecraft Bedrock version {version}");
        Ok(())
    }

    async fn say(&mut self, message: &str) {
        let Some(process) = self.process.as_mut() else {
            warn!("No server running, dropping message: {message}");
            return;
        };

        info!("Broadcasting: {message}");
        if let Err(e) = process.write_line(&format!("say {message}")).await {
            warn!("Failed to broadcast message: {e}");
        }
    }

    fn settled_state(&self) -> SupervisorState {
        match (&self.process, &self.version) {
            (Some(_), Some(version)) => SupervisorState::Running {
                version: version.clone(),
            },
            _ => SupervisorState::Absent,
        }
    }

    fn set_state(&self, state: SupervisorState) {
        self.status_tx.send_replace(SupervisorStatus {
            state,
            update_pending: self.update_pending,
        });
    }
}

/// Resolves when the running server exits; never, when there is none.
async fn child_exit(process: &mut Option<Box<dyn ServerProcess>>) -> SupervisorResult<Option<i32>> {
    match process {
        Some(process) => process.wait_for_exit().await,
        None => std::future::pending().await,
    }
}

/// Notices are cosmetic; a failed write is logged and the sequence goes on.
async fn send_notice(process: &mut dyn ServerProcess, notice: &str) {
    info!("{notice}");
    if let Err(e) = process.write_line(notice).await {
        warn!("Failed to send '{notice}': {e}");
    }
}
