//! Server-Sent Events push channel (same events as `/ws`, one SSE event per change).

use std::{
    convert::Infallible,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use axum::{
    extract::Extension,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse,
    },
};
use futures::Stream;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tracing::{info, warn};

use stockhub_core::SubscriberId;
use stockhub_events::{ChangeEvent, Hub, Subscription};

use crate::app::errors;
use crate::app::services::AppServices;

/// GET /stream
pub async fn stream(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let subscription = match services.hub().subscribe().await {
        Ok(s) => s,
        Err(e) => return errors::hub_error_to_response(e),
    };
    let id = subscription.id();
    info!(subscriber_id = %id, "sse viewer connected");

    let events = ViewerStream::new(services.hub().clone(), subscription).filter_map(move |event| {
        match event.to_json() {
            Ok(data) => Some(Ok::<_, Infallible>(
                SseEvent::default().event(event.kind.as_str()).data(data),
            )),
            Err(e) => {
                warn!(subscriber_id = %id, error = %e, "failed to encode change event");
                None
            }
        }
    });

    Sse::new(events)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
        .into_response()
}

/// Subscription as a stream; unregisters from the hub when the response body is dropped.
struct ViewerStream {
    events: ReceiverStream<Arc<ChangeEvent>>,
    hub: Hub,
    id: SubscriberId,
}

impl ViewerStream {
    fn new(hub: Hub, subscription: Subscription) -> Self {
        Self {
            id: subscription.id(),
            events: ReceiverStream::new(subscription.into_receiver()),
            hub,
        }
    }
}

impl Stream for ViewerStream {
    type Item = Arc<ChangeEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

impl Drop for ViewerStream {
    fn drop(&mut self) {
        let (hub, id) = (self.hub.clone(), self.id);
        info!(subscriber_id = %id, "sse viewer disconnected");
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = hub.unregister(id).await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockhub_events::HubConfig;

    #[tokio::test]
    async fn dropping_the_stream_unregisters_the_viewer() {
        let (hub, _loop) = Hub::spawn(HubConfig::default());
        let stream = ViewerStream::new(hub.clone(), hub.subscribe().await.unwrap());
        assert_eq!(hub.subscriber_count().await.unwrap(), 1);

        drop(stream);

        for _ in 0..100 {
            if hub.subscriber_count().await.unwrap() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("viewer still registered after its stream was dropped");
    }
}
