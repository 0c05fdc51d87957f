use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use grails_api::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    grails_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.is_development() {
        tracing::warn!("ENVIRONMENT not set; using the development signing key");
    }

    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .context("invalid DATABASE_URL")?;

    let app = grails_api::app::build_app(&config, pool)
        .await
        .context("service registration failed")?;

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
