use std::sync::Arc;

use anyhow::{Context, Result};
use lead_core::RelayConfig;
use lead_relay::{RelayState, ServerConfig, TelegramSender, relay_router};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    lead_telemetry::install("lead-relay", env!("CARGO_PKG_VERSION"))?;

    let relay = RelayConfig::from_env().context("load telegram relay config")?;
    let server = ServerConfig::from_env()?;
    let sender = TelegramSender::new(&relay).context("build telegram http client")?;
    tracing::info!(api_base = %relay.api_base, chat_id = %relay.chat_id, "lead-relay booting");

    let app = relay_router(RelayState::new(relay, Arc::new(sender)));
    let listener = TcpListener::bind(server.addr)
        .await
        .with_context(|| format!("bind {}", server.addr))?;
    tracing::info!("lead-relay listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("lead-relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
