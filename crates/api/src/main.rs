use anyhow::Context;

use basekit_api::app::{AppServices, build_app};
use basekit_api::config::Config;
use basekit_core::AppEnvironment;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logging comes up before the rest of the config is validated so that
    // configuration problems are logged too.
    let environment = std::env::var("APP_ENV")
        .ok()
        .and_then(|raw| raw.parse::<AppEnvironment>().ok())
        .unwrap_or_default();
    basekit_observability::init(environment);

    let config = Config::from_env().inspect_err(|e| tracing::error!(error = %e, "configuration rejected"))?;

    let services = AppServices::from_config(&config).await?;
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind 0.0.0.0:{}", config.port))?;

    let addr = listener.local_addr()?;
    tracing::info!(
        addr = %addr,
        environment = %config.environment,
        prefix = %config.base_path(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
