pub mod health;
pub mod holdings;
pub mod rating;
pub mod zscore;

use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(zscore::router())
        .merge(rating::router())
        .merge(holdings::router())
}
