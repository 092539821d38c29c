use crate::services::Preset;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct HoldingsQuery {
    pub ticker: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HoldingsResponse {
    /// Constituents of one ETF.
    Single { ticker: String, holdings: Vec<String> },
    /// Every ETF with known holdings.
    List { etfs: Vec<String> },
}

/// GET /api/etf-holdings[?ticker=XLK]
async fn get_holdings(
    State(state): State<AppState>,
    Query(query): Query<HoldingsQuery>,
) -> Json<HoldingsResponse> {
    let response = match query.ticker.as_deref().map(str::trim) {
        Some(ticker) if !ticker.is_empty() => HoldingsResponse::Single {
            ticker: ticker.to_uppercase(),
            holdings: state.holdings.holdings(ticker).to_vec(),
        },
        _ => HoldingsResponse::List {
            etfs: state.holdings.etfs().into_iter().map(String::from).collect(),
        },
    };
    Json(response)
}

/// GET /api/presets/sector-rotation
async fn get_sector_rotation(State(state): State<AppState>) -> Json<Preset> {
    Json(state.holdings.sector_rotation())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/etf-holdings", get(get_holdings))
        .route("/api/presets/sector-rotation", get(get_sector_rotation))
}
