//! Lifecycle supervision for a Minecraft Bedrock dedicated server.
//!
//! A single [`Supervisor`] task owns the server process. Everything else
//! talks to it through a [`SupervisorHandle`]: the update poller, the liveness
//! waiter, webhooks and signal handlers.

mod error;
mod install_layout;
mod liveness;
mod notifier;
mod process;
mod provisioner;
mod server_version;
mod supervisor;
mod supervisor_command;
mod supervisor_handle;
mod supervisor_state;
mod update_poller;
mod version_source;

#[cfg(test)]
mod tests;

pub use error::{Result as SupervisorResult, SupervisorError};
pub use install_layout::{DataLinkOutcome, InstallLayout};
pub use liveness::LivenessWaiter;
pub use notifier::{DiscordNotifier, LogNotifier, Notifier, from_config as notifier_from_config};
pub use process::{ChildLauncher, ChildProcess, ProcessLauncher, SERVER_LOG_TARGET, ServerProcess};
pub use provisioner::{BedrockProvisioner, Provisioner};
pub use server_version::{ServerVersion, needs_update};
pub use supervisor::{Collaborators, Supervisor};
pub use supervisor_command::{ShutdownKind, SupervisorCommand};
pub use supervisor_handle::SupervisorHandle;
pub use supervisor_state::{SupervisorState, SupervisorStatus};
pub use update_poller::{UpdateCheck, UpdatePoller};
pub use version_source::{BedrockVersionSource, VersionSource};
