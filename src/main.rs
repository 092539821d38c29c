use market_dynamics::config::Config;
use market_dynamics::sources::{build_fetcher, PriceSeriesFetcher};
use market_dynamics::{app, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_dynamics=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("Starting Market Dynamics server on {}:{}", config.host, config.port);
    info!(
        "Engine: window={}, normalization output={}, fetch concurrency={}, timeout={}s",
        config.policy.window,
        config.policy.normalization_output,
        config.fetch.concurrency,
        config.fetch.timeout_secs
    );

    let fetcher = build_fetcher(&config.fetch)?;
    info!("Price provider: {} ({})", fetcher.name(), config.fetch.yahoo_base_url);

    let addr = config.bind_addr();
    let state = AppState::new(config, fetcher);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Market Dynamics server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
