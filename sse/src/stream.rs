//! Drives one subscription as an SSE stream.
//!
//! Each iteration waits for the next event or the idle timeout, whichever comes first.
//! An event becomes a `msg` frame and the loop continues. A timeout produces a single
//! `timeout` frame and ends the stream. The subscription is released on every exit:
//! explicitly when the loop ends, or through its `Drop` when the HTTP layer drops the
//! stream after the client goes away.

use crate::message::Frame;
use crate::subscription::{Delivery, Subscription};
use async_stream::stream;
use axum::response::sse::Event as SseEvent;
use futures::{Stream, StreamExt};
use log::*;
use std::convert::Infallible;
use std::time::Duration;

/// Default idle-stream timeout.
pub const DEFAULT_SUBSCRIPTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Frames for one subscriber until it times out or its queue closes.
pub fn frames(mut subscription: Subscription, idle_timeout: Duration) -> impl Stream<Item = Frame> {
    stream! {
        loop {
            match subscription.next_timeout(idle_timeout).await {
                Delivery::Event(event) => {
                    yield Frame::Message(event);
                }
                Delivery::TimedOut(elapsed) => {
                    debug!("Subscription {} idle for {elapsed:?}, closing stream", subscription.id());
                    yield Frame::Timeout(elapsed);
                    break;
                }
                Delivery::Closed => break,
            }
        }

        subscription.close();
    }
}

/// [`frames`] encoded as axum SSE events.
pub fn event_stream(
    subscription: Subscription,
    idle_timeout: Duration,
) -> impl Stream<Item = Result<SseEvent, Infallible>> {
    frames(subscription, idle_timeout).map(|frame| Ok::<_, Infallible>(SseEvent::from(frame)))
}
