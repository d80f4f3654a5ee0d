//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the catalog/admin services
//! - `routes/`: HTTP handlers, public pages and `admin/`
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{middleware::from_fn, routing::get, Extension, Router};
use tower::ServiceBuilder;

use kinoteka_infra::Settings;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from settings (public entrypoint used by `main.rs`).
pub async fn build_app(settings: &Settings) -> Result<Router, services::StartupError> {
    let services = Arc::new(services::build_services(settings).await?);
    Ok(router(services, &settings.jwt_secret))
}

/// Router over already-built services.
pub fn router(services: Arc<services::AppServices>, jwt_secret: &str) -> Router {
    let jwt = Arc::new(kinoteka_auth::Hs256JwtValidator::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Admin routes: require a valid bearer token.
    let admin = routes::admin::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/movies", routes::movies::router())
        .nest("/admin", admin)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(middleware::request_span))
                .layer(Extension(services)),
        )
}
