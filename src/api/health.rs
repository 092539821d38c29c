use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Liveness plus the engine settings this instance runs with.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    provider: &'static str,
    zscore_window: String,
    normalization_output: String,
}

/// GET /api/health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let policy = state.engine.policy();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.engine.provider(),
        zscore_window: policy.window.to_string(),
        normalization_output: policy.normalization_output.to_string(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::InMemoryFetcher;
    use crate::config::Config;
    use std::sync::Arc;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok",
            version: "1.0.0",
            provider: "memory",
            zscore_window: "full".to_string(),
            normalization_output: "zeros".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"version\":\"1.0.0\""));
        assert!(json.contains("\"zscoreWindow\":\"full\""));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let state = AppState::new(Config::default(), Arc::new(InMemoryFetcher::new()));
        let Json(response) = health(State(state)).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(response.provider, "memory");
        assert_eq!(response.normalization_output, "zeros");
    }
}
