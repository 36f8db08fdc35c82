use anyhow::Context;

use rolodex_api::app::{build_app, services::AppServices};
use rolodex_infra::{load_dotenv, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` may carry RUST_LOG / LOG_FORMAT, so it is loaded before tracing.
    let dotenv = load_dotenv();
    rolodex_observability::init();
    if let Err(e) = dotenv {
        tracing::warn!("failed to load .env file: {e}");
    }

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = AppServices::from_config(&config.store)
        .await
        .context("failed to initialise store")?;

    let app = build_app(&config, services);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        mode = %config.mode,
        store = ?config.store,
        api_keys = config.api_keys.len(),
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
