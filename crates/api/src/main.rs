use anyhow::Context;

use catalog_infra::config::CatalogConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CatalogConfig::from_env().context("failed to load configuration")?;
    catalog_observability::init(config.log_format);

    let app = catalog_api::app::build_app(&config).await?;

    let addr = config.api.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        environment = %config.environment,
        storage = ?config.storage.backend,
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
