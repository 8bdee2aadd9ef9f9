mod pages;
mod routes;
mod session;

use earnings_news_core::config::Settings;
use earnings_news_core::pipeline::AnthropicFactory;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    if settings.anthropic_api_key.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY not set; non-demo requests must supply a key");
    }

    let port = settings.port.unwrap_or(3000);
    let state = routes::AppState {
        factory: Arc::new(AnthropicFactory::new(settings.clone())),
        reports: Arc::new(session::ReportStore::new(settings.session_capacity)),
        settings: Arc::new(settings),
    };

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "earnings news ui listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
