use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{validate_required, validate_status};
use super::{ApiError, ApiResponse, AppState, CaseDto, MessageResponse};
use crate::db::{CaseUpdate, NewCase};

const CASE_STATUSES: [&str; 4] = ["open", "pending", "closed", "archived"];

#[derive(Deserialize)]
pub struct CreateCaseRequest {
    pub title: String,
    pub description: String,
    pub status: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdateCaseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// GET /api/cases
/// Lists only the caller's cases, newest activity first.
pub async fn list_cases(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<CaseDto>>>, ApiError> {
    let cases = state.store().list_cases_for_user(&user.id).await?;
    let dtos = cases.into_iter().map(CaseDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/cases
/// Responds 201 with the created record; validation failures write nothing.
pub async fn create_case(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
    Json(payload): Json<CreateCaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = validate_required(&payload.title, "Title")?;
    let description = validate_required(&payload.description, "Description")?;
    let status = match payload.status {
        Some(status) => Some(validate_status(&status, &CASE_STATUSES)?),
        None => None,
    };

    let case = state
        .store()
        .create_case(
            NewCase {
                title,
                description,
                status,
            },
            &user.id,
        )
        .await?;

    tracing::info!("Case {} created by {}", case.case_number, user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CaseDto::from(case))),
    ))
}

/// GET /api/cases/{id}
/// A case owned by someone else is indistinguishable from a missing one.
pub async fn get_case(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CaseDto>>, ApiError> {
    let case = state
        .store()
        .get_owned_case(&id, &user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Case", &id))?;

    Ok(Json(ApiResponse::success(CaseDto::from(case))))
}

/// PUT /api/cases/{id}
pub async fn update_case(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCaseRequest>,
) -> Result<Json<ApiResponse<CaseDto>>, ApiError> {
    let update = CaseUpdate {
        title: match payload.title {
            Some(title) => Some(validate_required(&title, "Title")?),
            None => None,
        },
        description: match payload.description {
            Some(description) => Some(validate_required(&description, "Description")?),
            None => None,
        },
        status: match payload.status {
            Some(status) => Some(validate_status(&status, &CASE_STATUSES)?),
            None => None,
        },
    };

    let case = state
        .store()
        .update_owned_case(&id, &user.id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Case", &id))?;

    Ok(Json(ApiResponse::success(CaseDto::from(case))))
}

/// DELETE /api/cases/{id}
pub async fn delete_case(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let deleted = state.store().delete_owned_case(&id, &user.id).await?;
    if !deleted {
        return Err(ApiError::not_found("Case", &id));
    }

    tracing::info!("Case {} deleted by {}", id, user.id);

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Case deleted".to_string(),
    })))
}
