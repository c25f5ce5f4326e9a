//! Tenhou client binary.
//!
//! Reads its settings from the environment (see [`ClientConfig::from_env`]),
//! plays matches until Ctrl-C or a fatal error, and exits non-zero on the
//! latter.

use std::sync::Arc;

use tenhou_client::{ClientConfig, TenhouClient, Tsumogiri};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tenhou_client=debug,tenhou_transport=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting tenhou client");

    let config = ClientConfig::from_env()?;
    tracing::info!(url = %config.ws_url, user = config.user_name(), "connecting");
    let client = TenhouClient::connect(config, Arc::new(Tsumogiri)).await?;

    let shutdown = client.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("keyboard interrupt");
            shutdown.shutdown();
        }
    });

    client.run_forever().await?;
    Ok(())
}
