//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::debug;

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store};
use crate::services::auth_service::{AuthError, AuthService, AuthenticatedUser, RegisterInput};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, input: RegisterInput) -> Result<AuthenticatedUser, AuthError> {
        let user = self
            .store
            .create_user(
                NewUser {
                    email: input.email,
                    password: input.password,
                    name: input.name,
                },
                &self.security,
            )
            .await?
            .ok_or(AuthError::EmailTaken)?;

        let session = self.store.create_session(&user.id).await?;

        Ok(AuthenticatedUser::from_parts(user, Some(session)))
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedUser, AuthError> {
        let user = self
            .store
            .verify_credentials(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let session = self.store.create_session(&user.id).await?;

        Ok(AuthenticatedUser::from_parts(user, Some(session)))
    }

    async fn validate_session(&self, token: &str) -> Option<AuthenticatedUser> {
        // Lookup failures degrade to unauthenticated rather than erroring
        match self.store.validate_session_token(token).await {
            Ok(Some((session, user))) => Some(AuthenticatedUser::from_parts(user, Some(session))),
            Ok(None) => None,
            Err(e) => {
                debug!("Session validation failed: {e}");
                None
            }
        }
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.store.invalidate_session(token).await?;
        Ok(())
    }

    async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "New password must be at least {} characters",
                self.security.min_password_length
            )));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let verified = self
            .store
            .verify_credentials(&user.email, current_password)
            .await?;

        if verified.is_none() {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(user_id, new_password, &self.security)
            .await?;

        Ok(())
    }
}
