use anyhow::Context;
use tracing::{info, warn};

use stockhub_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockhub_observability::init();

    let config = ApiConfig::from_env();
    let app = stockhub_api::app::build_app(config.clone()).await;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    let addr = listener.local_addr()?;

    info!("listening on {addr}");
    info!("viewer page: http://{addr}/");
    info!("admin page: http://{addr}/admin");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl-C handler; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
