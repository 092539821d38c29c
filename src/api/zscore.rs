use crate::error::{AppError, Result};
use crate::services::{csv_filename, rating, to_csv_all};
use crate::types::{EngineResult, ZScoreRequest, ZScoreResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::info;

/// Unwrap a JSON body, reporting malformed input as 400.
fn body(payload: std::result::Result<Json<ZScoreRequest>, JsonRejection>) -> Result<ZScoreRequest> {
    payload
        .map(|Json(request)| request)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

async fn run(state: &AppState, request: &ZScoreRequest) -> Result<EngineResult> {
    info!(
        "Z-score request: {:?} vs {} ({} .. {})",
        request.tickers, request.normalization_ticker, request.start_date, request.end_date
    );
    Ok(state.engine.run_request(request).await?)
}

/// POST /api/zscore
async fn calculate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ZScoreRequest>, JsonRejection>,
) -> Result<Json<ZScoreResponse>> {
    let request = body(payload)?;
    let result = run(&state, &request).await?;
    Ok(Json(result.to_response()))
}

/// POST /api/zscore/ratings
async fn ratings(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ZScoreRequest>, JsonRejection>,
) -> Result<Json<ZScoreResponse>> {
    let request = body(payload)?;
    let result = run(&state, &request).await?;
    Ok(Json(result.map_values(rating)))
}

/// POST /api/zscore/csv
async fn export_csv(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ZScoreRequest>, JsonRejection>,
) -> Result<Response> {
    let request = body(payload)?;
    let result = run(&state, &request).await?;

    let filename = csv_filename(chrono::Utc::now().date_naive());
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];
    Ok((headers, to_csv_all(&result)).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/zscore", post(calculate))
        .route("/api/calculate-zscore", post(calculate))
        .route("/api/zscore/csv", post(export_csv))
        .route("/api/zscore/ratings", post(ratings))
}
