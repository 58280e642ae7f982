use api::config::Config;
use api::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env();
    if config.auth.is_open() {
        tracing::warn!("no auth tokens configured, running open (every caller is admin)");
    }

    let state = AppState::new(&config);
    let app = api::router(state);

    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
