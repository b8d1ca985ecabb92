use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_email, validate_password, validate_required};
use super::{ApiError, ApiResponse, AppState, MessageResponse, UserDto};
use crate::db::SESSION_TTL_SECS;
use crate::services::{AuthenticatedUser, RegisterInput};

pub const SESSION_COOKIE: &str = "session";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(alias = "currentPassword")]
    pub current_password: String,
    #[serde(alias = "newPassword")]
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
}

/// The authenticated identity, inserted as a request extension by
/// [`auth_middleware`] for every protected route.
#[derive(Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware that checks:
/// 1. `session` cookie (from login)
/// 2. `Authorization: Bearer <token>` header
///
/// Both carry the same opaque session token. Validation may refresh the
/// session's expiry as a side effect.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = extract_session_token(request.headers())
        && let Some(user) = state.shared.auth_service.validate_session(&token).await
    {
        tracing::Span::current().record("user_id", &user.id);
        request.extensions_mut().insert(CurrentUser(user));
        return Ok(next.run(request).await);
    }

    Err(ApiError::unauthorized("Not authenticated"))
}

/// Extract the session token from the cookie or Authorization header.
fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = session_cookie_value(headers) {
        return Some(token);
    }

    if let Some(auth_header) = headers.get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

fn session_cookie_value(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then(|| value.to_string())
        })
        .next()
}

// ============================================================================
// Cookie helpers
// ============================================================================

/// `Set-Cookie` value carrying the session token for browser clients.
fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that expires the session cookie immediately.
fn clear_session_cookie(secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn with_session_cookie(response: Response, cookie: String) -> Response {
    let mut response = response;
    if let Ok(value) = cookie.parse() {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/register
/// Create an account and issue its first session.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let email = validate_email(&payload.email)?.to_string();
    let min_length = state.config().read().await.security.min_password_length;
    validate_password(&payload.password, min_length)?;

    let name = match payload.name {
        Some(name) => Some(validate_required(&name, "Name")?),
        None => None,
    };

    let user = state
        .shared
        .auth_service
        .register(RegisterInput {
            email,
            password: payload.password,
            name,
        })
        .await?;

    tracing::info!("New account registered: {}", user.email);
    respond_with_session(&state, user).await
}

/// POST /api/login
/// Verify credentials and issue a fresh session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let email = validate_email(&payload.email)?;
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state
        .shared
        .auth_service
        .login(email, &payload.password)
        .await?;

    respond_with_session(&state, user).await
}

/// Shared tail of register and login: serialize the user and attach the
/// session cookie.
async fn respond_with_session(
    state: &Arc<AppState>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    let secure = state.config().read().await.server.secure_cookies;
    let token = user
        .session
        .as_ref()
        .map(|s| s.token.clone())
        .ok_or_else(|| ApiError::internal("Session was not issued"))?;

    let body = Json(ApiResponse::success(user));
    Ok(with_session_cookie(
        body.into_response(),
        session_cookie(&token, secure),
    ))
}

/// POST /api/logout
/// Delete the current session if one is presented. Always succeeds and
/// always clears the cookie, so stale clients converge to logged out.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(token) = extract_session_token(&headers) {
        state.shared.auth_service.logout(&token).await?;
    }

    let secure = state.config().read().await.server.secure_cookies;
    let body = Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    }));
    Ok(with_session_cookie(
        body.into_response(),
        clear_session_cookie(secure),
    ))
}

/// GET /api/auth/me
/// Current user profile (requires authentication).
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let profile = state
        .store()
        .get_user_by_id(&user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load user: {e}")))?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    Ok(Json(ApiResponse::success(UserDto::from(profile))))
}

/// PUT /api/auth/me
/// Update the current user's display name and bio.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let name = match payload.name {
        Some(name) => Some(validate_required(&name, "Name")?),
        None => None,
    };

    let profile = state
        .store()
        .update_user_profile(&user.id, name, payload.bio)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to update profile: {e}")))?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    Ok(Json(ApiResponse::success(UserDto::from(profile))))
}

/// PUT /api/auth/password
/// Change password after verifying the current one.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    axum::Extension(CurrentUser(user)): axum::Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .shared
        .auth_service
        .change_password(&user.id, &payload.current_password, &payload.new_password)
        .await?;

    tracing::info!("Password changed for user: {}", user.email);

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cookie_carries_session_attributes() {
        let cookie = session_cookie("abc123", false);
        assert!(cookie.starts_with("session=abc123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=2592000"));
        assert!(!cookie.contains("Secure"));

        let secure = session_cookie("abc123", true);
        assert!(secure.ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(false);
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.starts_with("session=;"));
    }

    #[test]
    fn token_extracted_from_cookie_and_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=tok123"),
        );
        assert_eq!(extract_session_token(&headers).as_deref(), Some("tok123"));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok456"),
        );
        assert_eq!(extract_session_token(&headers).as_deref(), Some("tok456"));

        assert!(extract_session_token(&HeaderMap::new()).is_none());
    }
}
