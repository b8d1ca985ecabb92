use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod cases;
mod crimes;
mod criminals;
mod error;
mod evidence;
mod observability;
mod statutes;
mod system;
mod types;
mod validation;

mod assets;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config().read().await;
        config.server.cors_allowed_origins.clone()
    };

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/health", get(system::health))
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .fallback(assets::serve_asset)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/me", put(auth::update_profile))
        .route("/auth/password", put(auth::change_password))
        .route("/cases", get(cases::list_cases))
        .route("/cases", post(cases::create_case))
        .route("/cases/{id}", get(cases::get_case))
        .route("/cases/{id}", put(cases::update_case))
        .route("/cases/{id}", delete(cases::delete_case))
        .route("/criminals", get(criminals::list_criminals))
        .route("/criminals", post(criminals::create_criminal))
        .route("/criminals/{id}", get(criminals::get_criminal))
        .route("/criminals/{id}", put(criminals::update_criminal))
        .route("/criminals/{id}", delete(criminals::delete_criminal))
        .route("/criminals/{id}/crimes", get(criminals::list_criminal_crimes))
        .route("/evidence", get(evidence::list_evidence))
        .route("/evidence", post(evidence::create_evidence))
        .route("/evidence/{id}", get(evidence::get_evidence))
        .route("/evidence/{id}", put(evidence::update_evidence))
        .route("/evidence/{id}", delete(evidence::delete_evidence))
        .route("/statutes", get(statutes::list_statutes))
        .route("/statutes", post(statutes::create_statute))
        .route("/statutes/{id}", get(statutes::get_statute))
        .route("/statutes/{id}", put(statutes::update_statute))
        .route("/statutes/{id}", delete(statutes::delete_statute))
        .route("/crimes", get(crimes::list_crimes))
        .route("/crimes", post(crimes::create_crime))
        .route("/crimes/{id}", get(crimes::get_crime))
        .route("/crimes/{id}", put(crimes::update_crime))
        .route("/crimes/{id}", delete(crimes::delete_crime))
        .route("/system/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
