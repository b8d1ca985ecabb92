pub mod auth_service;
pub mod auth_service_impl;

pub use auth_service::{AuthError, AuthService, AuthenticatedUser, RegisterInput};
pub use auth_service_impl::SeaOrmAuthService;
