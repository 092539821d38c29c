//! Market Dynamics - relative strength z-score server for equities and ETFs

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use axum::Router;
use config::Config;
use services::{EtfHoldings, ZScoreEngine};
use sources::PriceSeriesFetcher;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<ZScoreEngine>,
    pub holdings: Arc<EtfHoldings>,
}

impl AppState {
    /// Build state around `fetcher`, applying the engine settings in `config`.
    pub fn new(config: Config, fetcher: Arc<dyn PriceSeriesFetcher>) -> Self {
        let engine = ZScoreEngine::new(fetcher)
            .with_policy(config.policy)
            .with_concurrency(config.fetch.concurrency)
            .with_timeout(config.fetch.timeout());

        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            holdings: Arc::new(EtfHoldings::builtin()),
        }
    }
}

/// Full HTTP application: API routes plus CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
