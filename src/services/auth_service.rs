//! Domain service for authentication and account management.
//!
//! Handles registration, login, session issue/validation/invalidation, and
//! password changes. Session records are persisted; a process restart loses
//! nothing and multiple instances can share the same database.

use serde::Serialize;
use thiserror::Error;

use crate::db::{Session, User};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Registration payload after handler-level validation.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// A user together with the session that authenticates them.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    #[serde(skip)]
    pub session: Option<Session>,
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn from_parts(user: User, session: Option<Session>) -> Self {
        Self {
            session,
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account and issues its first session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] when the email is already in use.
    async fn register(&self, input: RegisterInput) -> Result<AuthenticatedUser, AuthError>;

    /// Verifies credentials and issues a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on any mismatch; callers
    /// cannot distinguish unknown email from wrong password.
    async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedUser, AuthError>;

    /// Maps an opaque token to an authenticated identity.
    ///
    /// Every failure mode (unknown token, expired session, database error)
    /// collapses to `None`; callers treat that as the only unauthenticated
    /// signal.
    async fn validate_session(&self, token: &str) -> Option<AuthenticatedUser>;

    /// Deletes a session by token. Idempotent.
    async fn logout(&self, token: &str) -> Result<(), AuthError>;

    /// Changes a user's password after verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is wrong
    /// or the new password is invalid.
    async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
