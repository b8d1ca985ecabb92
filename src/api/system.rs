use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};

/// GET /api/health
/// Liveness probe; also pings the database. Public.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success("ok"))).into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::<()>::error("Database unreachable")),
            )
                .into_response()
        }
    }
}

/// GET /api/system/status
/// Version, uptime, and record counts across the catalog.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let counts = state.store().entity_counts().await?;

    let status = SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        cases: counts.cases,
        criminals: counts.criminals,
        evidence: counts.evidence,
        statutes: counts.statutes,
        crimes: counts.crimes,
    };

    Ok(Json(ApiResponse::success(status)))
}
