use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};
use wardennet::db::{NewUser, REFRESH_WINDOW_SECS, SESSION_TTL_SECS, Store};
use wardennet::entities::sessions;

async fn test_store() -> Store {
    Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to open store")
}

async fn seed_user(store: &Store, email: &str) -> String {
    let config = wardennet::config::SecurityConfig::default();
    store
        .create_user(
            NewUser {
                email: email.to_string(),
                password: "Password123!".to_string(),
                name: None,
            },
            &config,
        )
        .await
        .expect("create_user failed")
        .expect("email already taken")
        .id
}

/// Rewrites a session's expiry directly, bypassing the repository.
async fn set_expires_at(store: &Store, token: &str, expires_at: i64) {
    let model = sessions::Entity::find_by_id(token.to_string())
        .one(&store.conn)
        .await
        .unwrap()
        .expect("session row missing");
    let mut active: sessions::ActiveModel = model.into();
    active.expires_at = Set(expires_at);
    active.update(&store.conn).await.unwrap();
}

#[tokio::test]
async fn created_session_has_full_ttl() {
    let store = test_store().await;
    let user_id = seed_user(&store, "a@example.com").await;

    let before = Utc::now().timestamp();
    let session = store.create_session(&user_id).await.unwrap();
    let after = Utc::now().timestamp();

    assert_eq!(session.token.len(), 64);
    assert!(session.token.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(session.expires_at >= before + SESSION_TTL_SECS);
    assert!(session.expires_at <= after + SESSION_TTL_SECS);
}

#[tokio::test]
async fn valid_token_resolves_to_user() {
    let store = test_store().await;
    let user_id = seed_user(&store, "a@example.com").await;
    let session = store.create_session(&user_id).await.unwrap();

    let (resolved, user) = store
        .validate_session_token(&session.token)
        .await
        .unwrap()
        .expect("session should validate");
    assert_eq!(resolved.user_id, user_id);
    assert_eq!(user.id, user_id);
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let store = test_store().await;
    let result = store.validate_session_token("deadbeef").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn expired_session_is_rejected_and_removed() {
    let store = test_store().await;
    let user_id = seed_user(&store, "a@example.com").await;
    let session = store.create_session(&user_id).await.unwrap();

    set_expires_at(&store, &session.token, Utc::now().timestamp() - 1).await;

    let result = store.validate_session_token(&session.token).await.unwrap();
    assert!(result.is_none());

    // The row is gone, not just ignored
    let row = sessions::Entity::find_by_id(session.token.clone())
        .one(&store.conn)
        .await
        .unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn session_inside_refresh_window_is_extended() {
    let store = test_store().await;
    let user_id = seed_user(&store, "a@example.com").await;
    let session = store.create_session(&user_id).await.unwrap();

    // 10 days remaining, inside the 15-day refresh window
    let ten_days = 10 * 24 * 60 * 60;
    set_expires_at(&store, &session.token, Utc::now().timestamp() + ten_days).await;

    let (refreshed, _) = store
        .validate_session_token(&session.token)
        .await
        .unwrap()
        .expect("session should validate");
    assert!(refreshed.expires_at > Utc::now().timestamp() + REFRESH_WINDOW_SECS);

    // The extension is persisted
    let row = sessions::Entity::find_by_id(session.token.clone())
        .one(&store.conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.expires_at, refreshed.expires_at);
}

#[tokio::test]
async fn session_outside_refresh_window_is_untouched() {
    let store = test_store().await;
    let user_id = seed_user(&store, "a@example.com").await;
    let session = store.create_session(&user_id).await.unwrap();

    // 20 days remaining, outside the refresh window
    let twenty_days = 20 * 24 * 60 * 60;
    let fixed_expiry = Utc::now().timestamp() + twenty_days;
    set_expires_at(&store, &session.token, fixed_expiry).await;

    let (validated, _) = store
        .validate_session_token(&session.token)
        .await
        .unwrap()
        .expect("session should validate");
    assert_eq!(validated.expires_at, fixed_expiry);
}

#[tokio::test]
async fn invalidate_is_idempotent() {
    let store = test_store().await;
    let user_id = seed_user(&store, "a@example.com").await;
    let session = store.create_session(&user_id).await.unwrap();

    store.invalidate_session(&session.token).await.unwrap();
    assert!(
        store
            .validate_session_token(&session.token)
            .await
            .unwrap()
            .is_none()
    );

    // Second invalidation of the same token is a no-op
    store.invalidate_session(&session.token).await.unwrap();
}

#[tokio::test]
async fn invalidate_for_user_removes_all_sessions() {
    let store = test_store().await;
    let user_id = seed_user(&store, "a@example.com").await;
    let s1 = store.create_session(&user_id).await.unwrap();
    let s2 = store.create_session(&user_id).await.unwrap();
    assert_ne!(s1.token, s2.token);

    let removed = store.invalidate_sessions_for_user(&user_id).await.unwrap();
    assert_eq!(removed, 2);

    assert!(store.validate_session_token(&s1.token).await.unwrap().is_none());
    assert!(store.validate_session_token(&s2.token).await.unwrap().is_none());
}

#[tokio::test]
async fn purge_removes_only_expired_sessions() {
    let store = test_store().await;
    let user_id = seed_user(&store, "a@example.com").await;
    let live = store.create_session(&user_id).await.unwrap();
    let dead = store.create_session(&user_id).await.unwrap();
    set_expires_at(&store, &dead.token, Utc::now().timestamp() - 60).await;

    let purged = store.purge_expired_sessions().await.unwrap();
    assert_eq!(purged, 1);

    assert!(store.validate_session_token(&live.token).await.unwrap().is_some());
    let row = sessions::Entity::find_by_id(dead.token.clone())
        .one(&store.conn)
        .await
        .unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn deleting_user_cascades_to_sessions() {
    let store = test_store().await;
    let user_id = seed_user(&store, "a@example.com").await;
    let session = store.create_session(&user_id).await.unwrap();

    wardennet::entities::users::Entity::delete_by_id(user_id)
        .exec(&store.conn)
        .await
        .unwrap();

    let row = sessions::Entity::find_by_id(session.token.clone())
        .one(&store.conn)
        .await
        .unwrap();
    assert!(row.is_none());
}
