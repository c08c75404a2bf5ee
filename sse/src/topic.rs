use crate::message::{Event, EventId};
use crate::subscription::{SubscriberId, Subscription};
use log::*;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc::{self, error::TrySendError, Sender};

/// What a publish does when a subscriber's queue is already at capacity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueueFullPolicy {
    /// Wait for the subscriber to make room. A slow subscriber stalls the publisher.
    #[default]
    Block,
    /// Discard the new event for that subscriber only.
    DropNewest,
}

#[derive(Debug, PartialEq, Eq)]
pub struct QueueFullPolicyParseError;

impl FromStr for QueueFullPolicy {
    type Err = QueueFullPolicyParseError;
    fn from_str(policy: &str) -> Result<QueueFullPolicy, Self::Err> {
        match policy.to_lowercase().as_str() {
            "block" => Ok(QueueFullPolicy::Block),
            "drop-newest" | "drop_newest" => Ok(QueueFullPolicy::DropNewest),
            _ => Err(QueueFullPolicyParseError),
        }
    }
}

impl fmt::Display for QueueFullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueueFullPolicy::Block => write!(f, "block"),
            QueueFullPolicy::DropNewest => write!(f, "drop-newest"),
        }
    }
}

/// Subscriber map plus the id counter, mutated together under the topic's write lock.
#[derive(Default)]
struct Subscribers {
    senders: HashMap<SubscriberId, Sender<Event>>,
    last_id: SubscriberId,
}

/// All subscribers of one topic name.
///
/// Subscribe and detach take the write lock. Publish takes the read lock only long enough
/// to snapshot the current senders, so publishers run concurrently and never hold the
/// lock while waiting on a full queue.
pub struct Topic {
    name: Arc<str>,
    queue_capacity: usize,
    queue_full_policy: QueueFullPolicy,
    subscribers: RwLock<Subscribers>,
}

impl Topic {
    pub fn new(
        name: impl Into<Arc<str>>,
        queue_capacity: usize,
        queue_full_policy: QueueFullPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            // tokio's bounded channel rejects a zero capacity
            queue_capacity: queue_capacity.max(1),
            queue_full_policy,
            subscribers: RwLock::new(Subscribers::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a new subscriber with an empty queue. Always succeeds.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.queue_capacity);

        let id = {
            let mut subscribers = self.write_subscribers();
            subscribers.last_id += 1;
            let id = subscribers.last_id;
            subscribers.senders.insert(id, sender);
            id
        };

        debug!("Subscriber {id} attached to topic {}", self.name);
        Subscription::new(id, Arc::downgrade(self), receiver)
    }

    /// Fan an event out to every subscriber registered at the time of the call.
    ///
    /// Returns how many subscriber queues accepted the event.
    pub async fn publish(&self, event_id: EventId, payload: Arc<str>) -> usize {
        let event = Event::new(event_id, payload);
        let senders: Vec<(SubscriberId, Sender<Event>)> = {
            let subscribers = self.read_subscribers();
            subscribers
                .senders
                .iter()
                .map(|(id, sender)| (*id, sender.clone()))
                .collect()
        };

        let mut delivered = 0;
        for (subscriber_id, sender) in senders {
            let accepted = match self.queue_full_policy {
                QueueFullPolicy::Block => sender.send(event.clone()).await.is_ok(),
                QueueFullPolicy::DropNewest => match sender.try_send(event.clone()) {
                    Ok(()) => true,
                    Err(TrySendError::Full(_)) => {
                        warn!(
                            "Queue full for subscriber {subscriber_id} on topic {}, dropping event {event_id}",
                            self.name
                        );
                        false
                    }
                    Err(TrySendError::Closed(_)) => false,
                },
            };

            if accepted {
                delivered += 1;
            } else {
                trace!("Event {event_id} not delivered to subscriber {subscriber_id}");
            }
        }

        trace!(
            "Published event {event_id} to {delivered} subscriber(s) of topic {}",
            self.name
        );
        delivered
    }

    /// Remove a subscriber. Unknown ids are ignored.
    pub(crate) fn detach(&self, id: SubscriberId) {
        if self.write_subscribers().senders.remove(&id).is_some() {
            debug!("Subscriber {id} detached from topic {}", self.name);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.read_subscribers().senders.len()
    }

    // Critical sections never panic, so a poisoned lock still guards a consistent map.
    fn read_subscribers(&self) -> RwLockReadGuard<'_, Subscribers> {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_subscribers(&self) -> RwLockWriteGuard<'_, Subscribers> {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
