//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, hub and mutation dispatcher, built once per process
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;

pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Spawns the hub's broadcast loop, so this must run inside a tokio runtime.
pub async fn build_app(config: ApiConfig) -> Router {
    let services = Arc::new(services::AppServices::build(&config));

    routes::router()
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
