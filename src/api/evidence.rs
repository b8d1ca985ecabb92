use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_required;
use super::{ApiError, ApiResponse, AppState, EvidenceDto, EvidenceListQuery, MessageResponse};
use crate::db::{EvidenceUpdate, NewEvidence};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvidenceRequest {
    pub case_id: String,
    pub title: String,
    pub filename: Option<String>,
    pub tags: Option<Vec<String>>,
    pub summary: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdateEvidenceRequest {
    pub title: Option<String>,
    pub filename: Option<String>,
    pub tags: Option<Vec<String>>,
    pub summary: Option<String>,
}

/// GET /api/evidence?case_id={id}
/// Without the filter, returns the full evidence catalog.
pub async fn list_evidence(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EvidenceListQuery>,
) -> Result<Json<ApiResponse<Vec<EvidenceDto>>>, ApiError> {
    if let Some(case_id) = &query.case_id
        && !state.store().case_exists(case_id).await?
    {
        return Err(ApiError::not_found("Case", case_id));
    }

    let items = state.store().list_evidence(query.case_id.as_deref()).await?;
    let dtos = items.into_iter().map(EvidenceDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/evidence
/// The referenced case must exist; a dangling reference is a 404, not a
/// constraint error.
pub async fn create_evidence(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
    Json(payload): Json<CreateEvidenceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = validate_required(&payload.title, "Title")?;
    let case_id = validate_required(&payload.case_id, "Case ID")?;

    if !state.store().case_exists(&case_id).await? {
        return Err(ApiError::not_found("Case", &case_id));
    }

    let evidence = state
        .store()
        .create_evidence(
            NewEvidence {
                case_id,
                title,
                filename: payload.filename,
                tags: payload.tags,
                summary: payload.summary,
            },
            &user.id,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(EvidenceDto::from(evidence))),
    ))
}

/// GET /api/evidence/{id}
pub async fn get_evidence(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EvidenceDto>>, ApiError> {
    let evidence = state
        .store()
        .get_evidence(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Evidence", &id))?;

    Ok(Json(ApiResponse::success(EvidenceDto::from(evidence))))
}

/// PUT /api/evidence/{id}
pub async fn update_evidence(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateEvidenceRequest>,
) -> Result<Json<ApiResponse<EvidenceDto>>, ApiError> {
    let update = EvidenceUpdate {
        title: match payload.title {
            Some(title) => Some(validate_required(&title, "Title")?),
            None => None,
        },
        filename: payload.filename,
        tags: payload.tags,
        summary: payload.summary,
    };

    let evidence = state
        .store()
        .update_evidence(&id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Evidence", &id))?;

    Ok(Json(ApiResponse::success(EvidenceDto::from(evidence))))
}

/// DELETE /api/evidence/{id}
pub async fn delete_evidence(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let deleted = state.store().delete_evidence(&id).await?;
    if !deleted {
        return Err(ApiError::not_found("Evidence", &id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Evidence deleted".to_string(),
    })))
}
