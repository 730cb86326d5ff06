use anyhow::Context;

use itemflow_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    itemflow_observability::init();

    let config = ApiConfig::from_env()?;
    let app = itemflow_api::app::build_app_from_config(&config.store).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
