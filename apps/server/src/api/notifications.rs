use std::{
    convert::Infallible,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use axum::{
    extract::{Path, State},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Router,
};
use isuride_core::notifications::{
    chair_topic, ride_topic, NotificationBus, RideStatusEvent, RideStatusEventData,
};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};

use crate::{error::ApiResult, main_lib::AppState};

/// Events buffered per stream before the bus's delivery task waits on the client.
const STREAM_BUFFER: usize = 16;

/// A bus subscription exposed as a stream. Dropping it (client disconnect)
/// unsubscribes the topic, which removes every sink registered on it.
struct TopicStream<S> {
    inner: S,
    bus: Arc<NotificationBus>,
    topic: String,
}

impl<S: Stream + Unpin> Stream for TopicStream<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl<S> Drop for TopicStream<S> {
    fn drop(&mut self) {
        tracing::debug!("Notification stream for {} closed", self.topic);
        self.bus.unsubscribe(&self.topic);
    }
}

fn subscribe_topic(
    bus: Arc<NotificationBus>,
    topic: String,
) -> TopicStream<ReceiverStream<Arc<RideStatusEvent>>> {
    let (tx, rx) = mpsc::channel::<Arc<RideStatusEvent>>(STREAM_BUFFER);
    bus.subscribe(topic.clone(), Arc::new(tx));
    TopicStream {
        inner: ReceiverStream::new(rx),
        bus,
        topic,
    }
}

fn into_sse<S>(events: S) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>>
where
    S: Stream<Item = Arc<RideStatusEvent>> + Send + 'static,
{
    let stream = events.filter_map(|event| match SseEvent::default().json_data(&event.data) {
        Ok(sse_event) => Some(Ok(sse_event)),
        Err(err) => {
            tracing::error!("Failed to serialize SSE payload for {}: {}", event.topic, err);
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

// The ride stream opens with the ride's current state so a client that
// connects late still sees where the ride is. The subscription is taken
// before the snapshot is read, so a change in between is delivered (possibly
// twice) rather than lost. An early return drops it and unsubscribes.
async fn ride_notifications(
    Path(ride_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>> {
    let events = subscribe_topic(state.bus.clone(), ride_topic(&ride_id));
    let ride = state.ride_service.get_ride(&ride_id)?;
    let status = state.ride_service.current_status(&ride_id)?;
    let snapshot = Arc::new(RideStatusEvent {
        topic: events.topic.clone(),
        data: RideStatusEventData { ride, status },
    });
    Ok(into_sse(tokio_stream::iter(Some(snapshot)).chain(events)))
}

async fn chair_notifications(
    Path(chair_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>> {
    state.chair_service.get_chair(&chair_id)?;
    Ok(into_sse(subscribe_topic(
        state.bus.clone(),
        chair_topic(&chair_id),
    )))
}

pub fn app_router() -> Router<Arc<AppState>> {
    Router::new().route("/rides/{ride_id}/notification", get(ride_notifications))
}

pub fn chair_router() -> Router<Arc<AppState>> {
    Router::new().route("/chairs/{chair_id}/notification", get(chair_notifications))
}
