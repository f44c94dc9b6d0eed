//! WebSocket push channel.
//!
//! Server → client: one text frame per change event. Client → server frames are read
//! and discarded; they only exist so a disconnect is noticed promptly.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use stockhub_events::Hub;

use crate::app::services::AppServices;

/// GET /ws
pub async fn websocket(
    Extension(services): Extension<Arc<AppServices>>,
    ws: WebSocketUpgrade,
) -> Response {
    let hub = services.hub().clone();
    ws.on_upgrade(move |socket| serve_viewer(socket, hub))
}

async fn serve_viewer(socket: WebSocket, hub: Hub) {
    let mut subscription = match hub.subscribe().await {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "rejecting viewer connection");
            return;
        }
    };
    let id = subscription.id();
    info!(subscriber_id = %id, "viewer connected");

    let (mut sink, mut inbound) = socket.split();

    let push = async {
        while let Some(event) = subscription.recv().await {
            let text = match event.to_json() {
                Ok(text) => text,
                Err(e) => {
                    warn!(subscriber_id = %id, error = %e, "failed to encode change event");
                    continue;
                }
            };
            if let Err(e) = sink.send(Message::Text(text)).await {
                warn!(subscriber_id = %id, error = %e, "write to viewer failed");
                break;
            }
        }
        // Queue closed by the hub (overflow) or write failed.
        let _ = sink.close().await;
    };

    let drain = async {
        while let Some(frame) = inbound.next().await {
            match frame {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!(subscriber_id = %id, error = %e, "viewer read failed");
                    break;
                }
            }
        }
    };

    tokio::select! {
        _ = push => {}
        _ = drain => {}
    }

    let _ = hub.unregister(id).await;
    info!(subscriber_id = %id, "viewer disconnected");
}
