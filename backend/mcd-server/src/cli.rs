use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "minecraftd")]
#[command(about = "Keeps a Minecraft Bedrock dedicated server installed, running and up to date")]
#[command(version)]
pub struct Cli {
    /// Directory holding minecraftd.toml (defaults to the current directory)
    #[arg(long, env = "MCD_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Override the configured log level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Do not serve the webhook endpoints
    #[arg(long)]
    pub no_webhooks: bool,
}
