use crate::signals::ShutdownSignal;

use mcd_supervisor::SupervisorHandle;

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct AppState {
    pub handle: SupervisorHandle,
    pub shutdown: ShutdownSignal,
    /// Seconds announced by the first countdown notice of a graceful shutdown
    pub countdown_secs: u64,
}
