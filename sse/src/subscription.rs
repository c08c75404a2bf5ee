use crate::message::Event;
use crate::topic::Topic;
use log::*;
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;

/// Identifier for a subscriber, unique within its owning topic and never reused.
pub type SubscriberId = u64;

/// Outcome of waiting on a subscription with an idle timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Event(Event),
    /// No event arrived within the window. Carries the elapsed timeout.
    TimedOut(Duration),
    /// The queue was closed; nothing more will arrive.
    Closed,
}

/// A single subscriber's mailbox: the receiving end of its bounded event queue plus
/// a back-reference to the owning topic, used only to detach.
///
/// The topic owns the sending half; this handle never keeps the topic alive.
/// Releasing happens exactly once, either through [`Subscription::close`] or on drop.
pub struct Subscription {
    id: SubscriberId,
    topic: Weak<Topic>,
    receiver: Receiver<Event>,
    released: bool,
}

impl Subscription {
    pub(crate) fn new(id: SubscriberId, topic: Weak<Topic>, receiver: Receiver<Event>) -> Self {
        Self {
            id,
            topic,
            receiver,
            released: false,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Waits for the next event in publish order. Returns `None` once the queue is closed.
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Races the next event against `timeout`, whichever resolves first.
    pub async fn next_timeout(&mut self, timeout: Duration) -> Delivery {
        match tokio::time::timeout(timeout, self.receiver.recv()).await {
            Ok(Some(event)) => Delivery::Event(event),
            Ok(None) => Delivery::Closed,
            Err(_) => Delivery::TimedOut(timeout),
        }
    }

    /// Takes an already queued event without waiting.
    pub fn try_next(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }

    /// Detaches from the owning topic and releases the queue.
    ///
    /// Consumes the handle, so a subscription cannot be closed twice.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        // Detach first so no new publish can pick this subscriber up, then close the
        // queue to fail any publisher still waiting on it.
        if let Some(topic) = self.topic.upgrade() {
            topic.detach(self.id);
        }
        self.receiver.close();

        debug!("Released subscription {}", self.id);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("released", &self.released)
            .finish()
    }
}
