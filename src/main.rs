use anyhow::{Context, Result};
use clap::Parser;
use jobportal_client::cli::{handle_portal_command, PortalCli};
use jobportal_client::ConfigManager;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = PortalCli::parse();
    let config = ConfigManager::load()?;

    if let Some(parent) = config.environment.log_file.parent() {
        std::fs::create_dir_all(parent).context("Failed to create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.environment.log_file)
        .with_context(|| {
            format!(
                "Failed to open log file: {}",
                config.environment.log_file.display()
            )
        })?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jobportal_client=debug,info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(filter)
        .init();

    info!("API: {}", config.service.api_url);
    info!(
        "Credential store: {}",
        config.environment.credentials_db_path.display()
    );

    handle_portal_command(cli, config).await
}
