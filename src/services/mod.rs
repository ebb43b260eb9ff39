pub mod auth_service;
pub use auth_service::{AuthError, AuthService, MIN_PASSWORD_LEN};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;
