//! In-process publish/subscribe broker that feeds Server-Sent Events streams.
//!
//! # Architecture
//!
//! - **Broker**: topic registry keyed by name plus a single broker-wide event id counter.
//!   Topics are created lazily on first subscribe and never removed. Publishing to a topic
//!   nobody ever subscribed to fails with `TopicNotFound`.
//! - **Topic**: the subscribers of one name behind a reader/writer lock. Subscriber ids are
//!   topic-scoped and never reused.
//! - **Subscription**: one subscriber's bounded FIFO queue and a weak back-reference to its
//!   topic for detaching. Released exactly once, by `close()` or on drop.
//! - **Stream**: turns a subscription into SSE frames with a one-shot idle timeout.
//!
//! # Message Flow
//!
//! 1. `GET /{topic}` calls `Broker::subscribe` and hands the subscription to `stream::event_stream`
//! 2. `POST /{topic}` calls `Broker::publish`, which assigns the next event id and fans the
//!    event out to every subscriber registered at that moment
//! 3. The stream yields one `msg` frame per event until the idle timeout fires, then sends a
//!    `timeout` frame and ends
//!
//! All events are ephemeral: a subscriber only sees what is published while it is attached.
//!
//! # Example
//!
//! ```rust,ignore
//! let broker = Broker::default();
//! let mut subscription = broker.subscribe("alerts");
//!
//! let id = broker.publish("alerts", "fire").await?;
//! assert_eq!(subscription.next().await.map(|e| e.id()), Some(id));
//! ```

pub mod broker;
pub mod error;
pub mod message;
pub mod stream;
pub mod subscription;
pub mod topic;

pub use broker::{Broker, DEFAULT_QUEUE_CAPACITY};
pub use message::{Event, EventId, Frame};
pub use stream::DEFAULT_SUBSCRIPTION_TIMEOUT;
pub use subscription::{Delivery, SubscriberId, Subscription};
pub use topic::{QueueFullPolicy, Topic};
