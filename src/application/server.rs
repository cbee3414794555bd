use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::application::routes::app_router;
use crate::application::state::{AppState, AppStateConfig};
use crate::infrastructure::stability::{StabilityClient, StabilityConfig};

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub stability_url: String,
    pub stability_api_key: String,
    pub engine_id: String,
    pub request_timeout: Duration,
    pub parallel_panels: bool,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    if config.stability_api_key.trim().is_empty() {
        anyhow::bail!("STABILITY_API_KEY must not be empty");
    }

    let generator = StabilityClient::new(StabilityConfig {
        base_url: config.stability_url,
        api_key: config.stability_api_key,
        engine_id: config.engine_id,
        timeout: config.request_timeout,
    })
    .context("failed to build image provider client")?;
    let endpoint = generator.endpoint().to_string();

    let state = AppState::new(AppStateConfig {
        generator: Arc::new(generator),
        parallel_panels: config.parallel_panels,
    });

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        provider = %endpoint,
        timeout_secs = config.request_timeout.as_secs(),
        parallel_panels = config.parallel_panels,
        "starting HTTP server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("server shutdown complete");

    Ok(())
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
