use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use super::user::User;
use crate::entities::{prelude::Users, sessions};

/// Sessions live for 30 days from issue.
pub const SESSION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// A session validated with less than 15 days remaining gets a fresh TTL.
pub const REFRESH_WINDOW_SECS: i64 = 15 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: i64,
}

impl From<sessions::Model> for Session {
    fn from(model: sessions::Model) -> Self {
        Self {
            token: model.token,
            user_id: model.user_id,
            expires_at: model.expires_at,
        }
    }
}

pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Issue a new session for a user. Collisions are not handled beyond
    /// relying on 256 bits of token randomness.
    pub async fn create(&self, user_id: &str) -> Result<Session> {
        let now = chrono::Utc::now();

        let model = sessions::ActiveModel {
            token: Set(generate_session_token()),
            user_id: Set(user_id.to_string()),
            expires_at: Set(now.timestamp() + SESSION_TTL_SECS),
            created_at: Set(now.to_rfc3339()),
        };

        let inserted = model
            .insert(&self.conn)
            .await
            .context("Failed to insert session")?;

        Ok(Session::from(inserted))
    }

    /// Map a bearer token to its session and user.
    ///
    /// Expired sessions are deleted on discovery. Sessions validated inside
    /// the refresh window get their expiry pushed out by a full TTL
    /// (write-through; no CAS guard, a concurrent refresh is benign).
    pub async fn validate(&self, token: &str) -> Result<Option<(Session, User)>> {
        let Some((session, user)) = sessions::Entity::find_by_id(token)
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query session")?
        else {
            return Ok(None);
        };

        // A session row without a user should be impossible under the FK,
        // but treat it as unauthenticated rather than erroring.
        let Some(user) = user else {
            self.invalidate(token).await?;
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();

        if now >= session.expires_at {
            self.invalidate(token).await?;
            return Ok(None);
        }

        let session = if now >= session.expires_at - REFRESH_WINDOW_SECS {
            let mut active: sessions::ActiveModel = session.into();
            active.expires_at = Set(now + SESSION_TTL_SECS);
            let refreshed = active
                .update(&self.conn)
                .await
                .context("Failed to refresh session expiry")?;
            Session::from(refreshed)
        } else {
            Session::from(session)
        };

        Ok(Some((session, User::from(user))))
    }

    /// Delete a session by token. Idempotent: deleting an absent token is
    /// not an error.
    pub async fn invalidate(&self, token: &str) -> Result<()> {
        sessions::Entity::delete_many()
            .filter(sessions::Column::Token.eq(token))
            .exec(&self.conn)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    /// Delete every session belonging to a user.
    pub async fn invalidate_for_user(&self, user_id: &str) -> Result<u64> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete user sessions")?;

        Ok(result.rows_affected)
    }

    /// Remove all expired sessions. Run periodically by the maintenance
    /// scheduler; validation also removes them lazily.
    pub async fn purge_expired(&self) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();

        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(now))
            .exec(&self.conn)
            .await
            .context("Failed to purge expired sessions")?;

        Ok(result.rows_affected)
    }
}

/// Generate a random session token (64-char hex string).
#[must_use]
pub fn generate_session_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_64_hex_chars() {
        let token = generate_session_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_session_token(), generate_session_token());
    }
}
