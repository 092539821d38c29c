use crate::error::{AppError, Result};
use crate::services::rating;
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RatingQuery {
    pub z: f64,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub z: f64,
    pub rating: f64,
}

/// GET /api/rating?z=1.5
async fn get_rating(
    query: std::result::Result<Query<RatingQuery>, QueryRejection>,
) -> Result<Json<RatingResponse>> {
    let Query(RatingQuery { z }) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if z.is_nan() {
        return Err(AppError::BadRequest("z must be a number".to_string()));
    }
    Ok(Json(RatingResponse {
        z,
        rating: rating(z),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/rating", get(get_rating))
}
