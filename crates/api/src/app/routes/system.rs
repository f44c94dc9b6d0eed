use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::errors;
use crate::app::services::AppServices;

/// GET /health
///
/// Also reports the hub's live subscriber count, which doubles as a liveness probe
/// for the broadcast loop.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.hub().subscriber_count().await {
        Ok(subscribers) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "subscribers": subscribers,
            })),
        )
            .into_response(),
        Err(e) => errors::hub_error_to_response(e),
    }
}
