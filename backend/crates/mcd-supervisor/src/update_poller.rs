//! Periodic check for a newer published server version.

use crate::{
    InstallLayout, Provisioner, ServerVersion, SupervisorHandle, SupervisorResult, VersionSource,
    needs_update,
};

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    UpToDate(ServerVersion),
    Available {
        installed: ServerVersion,
        remote: ServerVersion,
    },
}

pub struct UpdatePoller {
    handle: SupervisorHandle,
    layout: InstallLayout,
    version_source: Arc<dyn VersionSource>,
    provisioner: Arc<dyn Provisioner>,
    interval: Duration,
}

impl UpdatePoller {
    pub fn new(
        handle: SupervisorHandle,
        layout: InstallLayout,
        version_source: Arc<dyn VersionSource>,
        provisioner: Arc<dyn Provisioner>,
        interval: Duration,
    ) -> Self {
        Self {
            handle,
            layout,
            version_source,
            provisioner,
            interval,
        }
    }

    pub async fn check_for_update(&self) -> SupervisorResult<UpdateCheck> {
        let installed = self.layout.installed_version()?;
        let remote = self.version_source.fetch_remote_version().await?;

        info!("Installed: {installed}, available: {remote}");

        if needs_update(&installed, &remote) {
            Ok(UpdateCheck::Available { installed, remote })
        } else {
            Ok(UpdateCheck::UpToDate(installed))
        }
    }

    /// One poll cycle: compare versions, stage the new one and hand it to the
    /// supervisor. Returns the version moved to, if any.
    pub async fn poll_once(&self) -> SupervisorResult<Option<ServerVersion>> {
        let remote = match self.check_for_update().await? {
            UpdateCheck::UpToDate(version) => {
                info!("Minecraft Bedrock {version} is up to date");
                return Ok(None);
            }
            UpdateCheck::Available { installed, remote } => {
                info!("Updating Minecraft Bedrock from {installed} to {remote}");
                remote
            }
        };

        self.provisioner.provision(&remote).await?;
        self.handle.update(remote.clone()).await?;

        Ok(Some(remote))
    }

    /// Sleep, poll, repeat. Errors are logged and retried next cycle; the loop
    /// ends only when the supervisor is gone.
    pub async fn run(self) {
        info!(
            "Checking for updates every {}",
            humantime::format_duration(self.interval)
        );

        loop {
            tokio::time::sleep(self.interval).await;

            if self.handle.is_closed() {
                break;
            }

            if let Err(e) = self.poll_once().await {
                if self.handle.is_closed() {
                    break;
                }
                warn!("Update check failed, retrying next cycle: {e}");
            }
        }

        info!("Supervisor stopped, update poller exiting");
    }
}
