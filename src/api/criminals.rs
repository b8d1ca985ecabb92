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
use super::{ApiError, ApiResponse, AppState, CrimeDto, CriminalDto, MessageResponse};
use crate::db::{CriminalUpdate, NewCriminal};

const THREAT_LEVELS: [&str; 3] = ["low", "medium", "high"];
const CRIMINAL_STATUSES: [&str; 3] = ["active", "incarcerated", "released"];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCriminalRequest {
    pub first_name: String,
    pub last_name: String,
    pub aliases: Option<Vec<String>>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub threat_level: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCriminalRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub aliases: Option<Vec<String>>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub threat_level: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// GET /api/criminals
/// The criminal registry is a shared catalog, not owner-scoped.
pub async fn list_criminals(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CriminalDto>>>, ApiError> {
    let criminals = state.store().list_criminals().await?;
    let dtos = criminals.into_iter().map(CriminalDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/criminals
pub async fn create_criminal(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
    Json(payload): Json<CreateCriminalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let first_name = validate_required(&payload.first_name, "First name")?;
    let last_name = validate_required(&payload.last_name, "Last name")?;
    let threat_level = match payload.threat_level {
        Some(level) => Some(validate_status(&level, &THREAT_LEVELS)?),
        None => None,
    };

    let criminal = state
        .store()
        .create_criminal(
            NewCriminal {
                first_name,
                last_name,
                aliases: payload.aliases,
                date_of_birth: payload.date_of_birth,
                address: payload.address,
                threat_level,
                notes: payload.notes,
            },
            &user.id,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CriminalDto::from(criminal))),
    ))
}

/// GET /api/criminals/{id}
pub async fn get_criminal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CriminalDto>>, ApiError> {
    let criminal = state
        .store()
        .get_criminal(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Criminal", &id))?;

    Ok(Json(ApiResponse::success(CriminalDto::from(criminal))))
}

/// GET /api/criminals/{id}/crimes
pub async fn list_criminal_crimes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<CrimeDto>>>, ApiError> {
    if !state.store().criminal_exists(&id).await? {
        return Err(ApiError::not_found("Criminal", &id));
    }

    let crimes = state.store().list_crimes_for_criminal(&id).await?;
    let dtos = crimes.into_iter().map(CrimeDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// PUT /api/criminals/{id}
pub async fn update_criminal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCriminalRequest>,
) -> Result<Json<ApiResponse<CriminalDto>>, ApiError> {
    let update = CriminalUpdate {
        first_name: match payload.first_name {
            Some(name) => Some(validate_required(&name, "First name")?),
            None => None,
        },
        last_name: match payload.last_name {
            Some(name) => Some(validate_required(&name, "Last name")?),
            None => None,
        },
        aliases: payload.aliases,
        date_of_birth: payload.date_of_birth,
        address: payload.address,
        threat_level: match payload.threat_level {
            Some(level) => Some(validate_status(&level, &THREAT_LEVELS)?),
            None => None,
        },
        status: match payload.status {
            Some(status) => Some(validate_status(&status, &CRIMINAL_STATUSES)?),
            None => None,
        },
        notes: payload.notes,
    };

    let criminal = state
        .store()
        .update_criminal(&id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Criminal", &id))?;

    Ok(Json(ApiResponse::success(CriminalDto::from(criminal))))
}

/// DELETE /api/criminals/{id}
/// Cascades to the criminal's crime records.
pub async fn delete_criminal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let deleted = state.store().delete_criminal(&id).await?;
    if !deleted {
        return Err(ApiError::not_found("Criminal", &id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Criminal deleted".to_string(),
    })))
}
