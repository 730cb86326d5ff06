//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/clock/service wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use itemflow_infra::StoreConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router around already-wired services.
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

/// Wire services from configuration and build the router (used by `main.rs`).
pub async fn build_app_from_config(store: &StoreConfig) -> anyhow::Result<Router> {
    let services = services::build_services(store).await?;
    Ok(build_app(Arc::new(services)))
}
