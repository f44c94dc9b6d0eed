use axum::{
    routing::{any, get},
    Router,
};

pub mod pages;
pub mod sse;
pub mod stock;
pub mod system;
pub mod ws;

/// Router for every endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/", get(pages::viewer))
        .route("/admin", get(pages::admin))
        .route("/health", get(system::health))
        .route("/ws", get(ws::websocket))
        .route("/stream", get(sse::stream))
        .route("/api/stocks", get(stock::list_stocks))
        .route("/api/stock", any(stock::mutate_stock))
}
