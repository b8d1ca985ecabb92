use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_required;
use super::{ApiError, ApiResponse, AppState, MessageResponse, StatuteDto};
use crate::db::{NewStatute, StatuteUpdate};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStatuteRequest {
    pub title: String,
    pub section_number: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatuteRequest {
    pub title: Option<String>,
    pub section_number: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

/// GET /api/statutes
pub async fn list_statutes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<StatuteDto>>>, ApiError> {
    let statutes = state.store().list_statutes().await?;
    let dtos = statutes.into_iter().map(StatuteDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/statutes
pub async fn create_statute(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
    Json(payload): Json<CreateStatuteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = validate_required(&payload.title, "Title")?;

    let statute = state
        .store()
        .create_statute(
            NewStatute {
                title,
                section_number: payload.section_number,
                description: payload.description,
                content: payload.content,
            },
            &user.id,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(StatuteDto::from(statute))),
    ))
}

/// GET /api/statutes/{id}
pub async fn get_statute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<StatuteDto>>, ApiError> {
    let statute = state
        .store()
        .get_statute(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Statute", &id))?;

    Ok(Json(ApiResponse::success(StatuteDto::from(statute))))
}

/// PUT /api/statutes/{id}
pub async fn update_statute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatuteRequest>,
) -> Result<Json<ApiResponse<StatuteDto>>, ApiError> {
    let update = StatuteUpdate {
        title: match payload.title {
            Some(title) => Some(validate_required(&title, "Title")?),
            None => None,
        },
        section_number: payload.section_number,
        description: payload.description,
        content: payload.content,
    };

    let statute = state
        .store()
        .update_statute(&id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Statute", &id))?;

    Ok(Json(ApiResponse::success(StatuteDto::from(statute))))
}

/// DELETE /api/statutes/{id}
/// Cascades to crime records charged under the statute.
pub async fn delete_statute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let deleted = state.store().delete_statute(&id).await?;
    if !deleted {
        return Err(ApiError::not_found("Statute", &id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Statute deleted".to_string(),
    })))
}
