use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};

use stockhub_infra::MutationVerb;
use stockhub_inventory::StockItem;

use crate::app::errors;
use crate::app::services::AppServices;

/// GET /api/stocks
///
/// Point-in-time copy of the inventory; order unspecified.
pub async fn list_stocks(
    Extension(services): Extension<Arc<AppServices>>,
) -> Json<Vec<StockItem>> {
    Json(services.dispatcher().list())
}

/// POST | PUT | DELETE /api/stock
///
/// The body is decoded before the method is checked, so a malformed body is a 400
/// even for methods the endpoint does not support (405).
pub async fn mutate_stock(
    Extension(services): Extension<Arc<AppServices>>,
    method: Method,
    body: Bytes,
) -> axum::response::Response {
    let verb = MutationVerb::from_http_method(method.as_str());

    match services.dispatcher().execute(&verb, &body).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}
