pub mod app_state;
pub mod cli;
pub mod error;
pub mod health;
pub mod logger;
pub mod routes;
pub mod signals;
pub mod webhooks;

pub use app_state::AppState;
pub use cli::Cli;
pub use error::{Result as ServerErrorResult, ServerError};
pub use routes::build_router;
pub use signals::{ShutdownSignal, listen_os_signals};
