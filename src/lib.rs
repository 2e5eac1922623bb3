pub mod api;
pub mod config;
pub mod consultation;
pub mod core_state;
pub mod doctors;
pub mod events;
pub mod models;
pub mod notifications;
pub mod on_call;
pub mod specialists;
pub mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::core_state::CoreState;

/// Start the service and block until Ctrl-C.
pub async fn run() -> Result<(), String> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = ServerConfig::from_env();
    let bind = config.bind;
    let core = Arc::new(CoreState::from_config(config).map_err(|e| format!("Startup failed: {e}"))?);

    let mut server = api::start_server(core, bind).await?;
    tracing::info!(addr = %server.addr(), "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.wait().await;
    Ok(())
}
