use crate::error::{Error, Result};
use crate::message::EventId;
use crate::subscription::Subscription;
use crate::topic::{QueueFullPolicy, Topic};
use dashmap::DashMap;
use log::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default per-subscriber queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Topic registry and broker-wide event id allocator.
///
/// Topics are created on first subscribe and are never removed.
pub struct Broker {
    topics: DashMap<Arc<str>, Arc<Topic>>,
    last_event_id: AtomicU64,
    queue_capacity: usize,
    queue_full_policy: QueueFullPolicy,
}

impl Broker {
    pub fn new(queue_capacity: usize, queue_full_policy: QueueFullPolicy) -> Self {
        Self {
            topics: DashMap::new(),
            last_event_id: AtomicU64::new(0),
            queue_capacity,
            queue_full_policy,
        }
    }

    /// Subscribe to `topic`, creating it if this is the first subscriber ever.
    ///
    /// Concurrent first subscribes to the same name all land on one `Topic`.
    pub fn subscribe(&self, topic: &str) -> Subscription {
        let topic = self
            .topics
            .entry(Arc::from(topic))
            .or_insert_with(|| {
                info!("Creating topic {topic}");
                Arc::new(Topic::new(
                    topic,
                    self.queue_capacity,
                    self.queue_full_policy,
                ))
            })
            .value()
            .clone();

        topic.subscribe()
    }

    /// Publish `payload` to every current subscriber of `topic` and return the event id.
    ///
    /// Fails with `TopicNotFound` if the topic was never subscribed to; no topic is created.
    pub async fn publish(&self, topic: &str, payload: impl Into<Arc<str>>) -> Result<EventId> {
        let target = self
            .topics
            .get(topic)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::topic_not_found(topic))?;

        let event_id = self.last_event_id.fetch_add(1, Ordering::SeqCst) + 1;
        let delivered = target.publish(event_id, payload.into()).await;

        debug!("Event {event_id} on topic {topic} delivered to {delivered} subscriber(s)");
        Ok(event_id)
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Number of live subscribers on `topic`, or `None` if it has never existed.
    pub fn subscriber_count(&self, topic: &str) -> Option<usize> {
        self.topics
            .get(topic)
            .map(|entry| entry.value().subscriber_count())
    }

    /// The most recently assigned event id, or 0 before the first publish.
    pub fn last_event_id(&self) -> EventId {
        self.last_event_id.load(Ordering::SeqCst)
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn queue_full_policy(&self) -> QueueFullPolicy {
        self.queue_full_policy
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY, QueueFullPolicy::default())
    }
}
