/// API сервер приложений прогноза спроса

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use demand_forecast::{config::AppConfig, server, DemandApps};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // Инициализация логирования
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "compact" {
        subscriber.compact().init();
    } else {
        subscriber.pretty().init();
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let apps = DemandApps::new(config).context("Failed to initialize demand apps")?;
    let app = server::router(server::AppState::new(apps));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
