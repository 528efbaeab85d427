use crate::{ServerVersion, SupervisorResult};

use std::fmt;

use tokio::sync::oneshot;

/// How the running server is brought down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownKind {
    /// Countdown notices first, then the final notice and `stop`
    Graceful,
    /// Final notice and `stop` only
    Immediate,
}

impl fmt::Display for ShutdownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownKind::Graceful => f.write_str("graceful"),
            ShutdownKind::Immediate => f.write_str("immediate"),
        }
    }
}

/// Requests processed one at a time by the supervisor task.
#[derive(Debug)]
pub enum SupervisorCommand {
    /// Install when needed, then start the server
    Start {
        reply: oneshot::Sender<SupervisorResult<ServerVersion>>,
    },
    /// Stop the running server; a no-op when none is running
    Shutdown { kind: ShutdownKind },
    /// Move to `version`, restarting the server if one is running
    Update {
        version: ServerVersion,
        reply: oneshot::Sender<SupervisorResult<()>>,
    },
    /// Broadcast a chat message to connected players
    Say { message: String },
}
