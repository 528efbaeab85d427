use mcd_server::{AppState, Cli, ShutdownSignal, build_router, listen_os_signals, logger};

use mcd_config::{Config, LogLevel};
use mcd_supervisor::{
    BedrockProvisioner, BedrockVersionSource, ChildLauncher, Collaborators, InstallLayout,
    LivenessWaiter, Supervisor, UpdatePoller, notifier_from_config,
};

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            // The logger may not be up yet
            eprintln!("minecraftd: {e}");
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode, Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Load and validate configuration
    let config_dir = match cli.config_dir {
        Some(ref dir) => dir.clone(),
        None => Config::config_dir()?,
    };
    let mut config = Config::load_from(&config_dir)?;
    if let Some(ref level) = cli.log_level {
        let Ok(level) = level.parse::<LogLevel>();
        config.logging.level = level;
    }
    if cli.no_webhooks {
        config.webhook.enabled = false;
    }
    config.validate()?;

    let log_file = config.logging.file.as_ref().map(|name| config_dir.join(name));
    logger::initialize(config.logging.level, log_file, config.logging.colored)?;

    info!("Starting minecraftd v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    // Collaborators
    let layout = InstallLayout::new(&config.install);
    let version_source = Arc::new(BedrockVersionSource::new(&config.update)?);
    let provisioner = Arc::new(BedrockProvisioner::new(&config.update, layout.clone())?);
    let collaborators = Collaborators {
        version_source: version_source.clone(),
        provisioner: provisioner.clone(),
        launcher: Arc::new(ChildLauncher),
        notifier: notifier_from_config(&config.notifier),
    };

    let (supervisor, handle) = Supervisor::new(
        layout.clone(),
        config.shutdown.clone(),
        &config.supervisor,
        collaborators,
    );
    let mut supervisor_task = tokio::spawn(supervisor.run());

    // Shutdown triggers are live before the first start, so a signal during
    // install is queued rather than lost
    let shutdown = ShutdownSignal::new();
    shutdown.forward_to(handle.clone());
    listen_os_signals(shutdown.clone())?;

    if config.webhook.enabled {
        let state = AppState {
            handle: handle.clone(),
            shutdown: shutdown.clone(),
            countdown_secs: config.shutdown.countdown_secs(),
        };
        let bind_addr = config.webhook.bind_addr();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| mcd_server::ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;
        info!("Webhooks listening on {}", listener.local_addr()?);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, build_router(state)).await {
                error!("Webhook server stopped: {e}");
            }
        });
    } else {
        warn!("Webhooks DISABLED");
    }

    // Install (first run) and start
    let version = match handle.start().await {
        Ok(version) => version,
        Err(e) => {
            error!("Failed to start Minecraft Bedrock server: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    info!("Minecraft Bedrock server {version} is running");

    tokio::spawn(
        UpdatePoller::new(
            handle.clone(),
            layout,
            version_source,
            provisioner,
            Duration::from_secs(config.update.poll_interval_secs),
        )
        .run(),
    );

    let waiter = LivenessWaiter::new(&handle, config.supervisor.liveness_interval());

    tokio::select! {
        () = waiter.wait() => {
            info!("minecraftd exiting");
            Ok(ExitCode::SUCCESS)
        }
        outcome = &mut supervisor_task => {
            match outcome {
                Ok(Ok(())) => error!("Supervisor stopped unexpectedly"),
                Ok(Err(e)) => error!("Supervisor failed: {e}"),
                Err(e) => error!("Supervisor task panicked: {e}"),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
