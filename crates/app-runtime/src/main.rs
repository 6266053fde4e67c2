//! # G2KY Application
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `G2KY_CONFIG` (default `config/default.toml`)
//!    and apply `G2KY__SECTION__KEY` environment overrides
//! 2. Start every capability in order
//! 3. Log every bus event
//! 4. Serve `/host`, `/storage` and `/chatui` until Ctrl+C
//! 5. Stop every capability in reverse order

use std::path::PathBuf;

use anyhow::{Context, Result};
use app_runtime::{install_event_logging, ApplicationContainer};
use shared_config::{ConfigurationSource, ENV_PREFIX};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_CONFIG: &str = "config/default.toml";

fn config_path() -> PathBuf {
    std::env::var_os("G2KY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let path = config_path();
    let config = ConfigurationSource::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        .with_env_overrides(ENV_PREFIX);

    let application = ApplicationContainer::new(config);
    info!("Initialized Application");

    application
        .start()
        .await
        .context("Failed to start application")?;

    let served = serve(&application).await;
    if let Err(e) = &served {
        error!(error = %e, "[app] Web gateway failed");
    }

    application.stop().await;
    served
}

async fn serve(application: &ApplicationContainer) -> Result<()> {
    install_event_logging(application.bus());

    let addr = application
        .web_config()
        .context("Invalid web configuration")?
        .addr();
    let gateway = application
        .web_gateway()
        .context("Failed to build web gateway")?;

    info!(%addr, "Application is running. Press Ctrl+C to stop.");
    gateway
        .serve(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "[app] Failed to listen for Ctrl+C");
            }
        })
        .await
        .context("Web gateway stopped with an error")
}
