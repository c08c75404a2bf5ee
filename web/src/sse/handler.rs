use crate::AppState;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use log::*;
use std::convert::Infallible;

/// GET a long-lived event stream for a topic
///
/// The subscription is registered before the response is returned, so anything published
/// after this handler completes reaches the stream. The stream ends after one idle timeout.
#[utoipa::path(
    get,
    path = "/{topic}",
    params(
        ("topic" = String, Path, description = "Topic to subscribe to; created on first use")
    ),
    responses(
        (status = 200, description = "Stream of `msg` events followed by a final `timeout` event", content_type = "text/event-stream", body = String)
    )
)]
pub(crate) async fn subscribe(
    State(app_state): State<AppState>,
    Path(topic): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = app_state.broker_ref().subscribe(&topic);

    debug!(
        "Established SSE stream for subscriber {} on topic {topic}",
        subscription.id()
    );

    let stream =
        ::sse::stream::event_stream(subscription, app_state.config.subscription_timeout());

    Sse::new(stream).keep_alive(KeepAlive::default())
}
