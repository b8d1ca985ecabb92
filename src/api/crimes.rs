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
use super::{ApiError, ApiResponse, AppState, CrimeDto, MessageResponse};
use crate::db::{CrimeUpdate, NewCrime};

const CRIME_STATUSES: [&str; 4] = ["pending", "charged", "convicted", "acquitted"];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCrimeRequest {
    pub criminal_id: String,
    pub statute_id: String,
    pub case_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub charge_level: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCrimeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub charge_level: Option<String>,
    pub status: Option<String>,
}

/// GET /api/crimes
pub async fn list_crimes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CrimeDto>>>, ApiError> {
    let crimes = state.store().list_crimes().await?;
    let dtos = crimes.into_iter().map(CrimeDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/crimes
/// A crime links a criminal to a statute, optionally within a case. All
/// referenced records must exist before anything is written.
pub async fn create_crime(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
    Json(payload): Json<CreateCrimeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_required(&payload.name, "Name")?;
    let criminal_id = validate_required(&payload.criminal_id, "Criminal ID")?;
    let statute_id = validate_required(&payload.statute_id, "Statute ID")?;

    if !state.store().criminal_exists(&criminal_id).await? {
        return Err(ApiError::not_found("Criminal", &criminal_id));
    }
    if !state.store().statute_exists(&statute_id).await? {
        return Err(ApiError::not_found("Statute", &statute_id));
    }
    if let Some(case_id) = &payload.case_id
        && !state.store().case_exists(case_id).await?
    {
        return Err(ApiError::not_found("Case", case_id));
    }

    let crime = state
        .store()
        .create_crime(
            NewCrime {
                criminal_id,
                statute_id,
                case_id: payload.case_id,
                name,
                description: payload.description,
                charge_level: payload.charge_level,
            },
            &user.id,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CrimeDto::from(crime))),
    ))
}

/// GET /api/crimes/{id}
pub async fn get_crime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CrimeDto>>, ApiError> {
    let crime = state
        .store()
        .get_crime(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Crime", &id))?;

    Ok(Json(ApiResponse::success(CrimeDto::from(crime))))
}

/// PUT /api/crimes/{id}
pub async fn update_crime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCrimeRequest>,
) -> Result<Json<ApiResponse<CrimeDto>>, ApiError> {
    let update = CrimeUpdate {
        name: match payload.name {
            Some(name) => Some(validate_required(&name, "Name")?),
            None => None,
        },
        description: payload.description,
        charge_level: payload.charge_level,
        status: match payload.status {
            Some(status) => Some(validate_status(&status, &CRIME_STATUSES)?),
            None => None,
        },
    };

    let crime = state
        .store()
        .update_crime(&id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Crime", &id))?;

    Ok(Json(ApiResponse::success(CrimeDto::from(crime))))
}

/// DELETE /api/crimes/{id}
pub async fn delete_crime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let deleted = state.store().delete_crime(&id).await?;
    if !deleted {
        return Err(ApiError::not_found("Crime", &id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Crime deleted".to_string(),
    })))
}
