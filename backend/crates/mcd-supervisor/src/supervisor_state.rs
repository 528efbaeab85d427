use crate::{ServerVersion, ShutdownKind};

/// Lifecycle state of the supervised server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorState {
    /// No server process
    Absent,
    /// Provisioning and linking an install before start
    Installing,
    /// Server process is up
    Running { version: ServerVersion },
    /// Countdown / stop sequence in progress
    ShuttingDown { kind: ShutdownKind },
    /// Staging a new version; the running server is untouched so far
    Updating { to: ServerVersion },
}

/// State and update flag, always published together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorStatus {
    pub state: SupervisorState,
    /// The current shutdown belongs to an update and a restart will follow
    pub update_pending: bool,
}

impl SupervisorStatus {
    pub fn absent() -> Self {
        Self {
            state: SupervisorState::Absent,
            update_pending: false,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SupervisorState::Running { .. })
    }

    /// No server and nothing left to restart: the program may exit.
    pub fn is_finished(&self) -> bool {
        self.state == SupervisorState::Absent && !self.update_pending
    }

    pub fn is_healthy(&self) -> bool {
        self.is_running() || self.update_pending
    }

    pub fn version(&self) -> Option<&ServerVersion> {
        match &self.state {
            SupervisorState::Running { version } => Some(version),
            _ => None,
        }
    }
}
