use axum::response::sse::Event as SseEvent;
use std::sync::Arc;
use std::time::Duration;

/// Broker-wide event identifier. Starts at 1 and strictly increases across all topics.
pub type EventId = u64;

/// Trait for getting the SSE event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

/// A published message. Immutable once created; each subscriber queue gets its own clone,
/// which shares the payload allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    id: EventId,
    payload: Arc<str>,
}

impl Event {
    pub fn new(id: EventId, payload: Arc<str>) -> Self {
        Self { id, payload }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// What a stream consumer is sent on each iteration of its receive loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A delivered event, sent as `id`, `event: msg` and `data` lines.
    Message(Event),
    /// Nothing arrived within the idle timeout. Carries the timeout that elapsed.
    Timeout(Duration),
}

impl Frame {
    /// The `data` field for this frame.
    pub fn data(&self) -> String {
        match self {
            Frame::Message(event) => event.payload().to_string(),
            Frame::Timeout(duration) => humantime::format_duration(*duration).to_string(),
        }
    }
}

impl EventType for Frame {
    fn event_type(&self) -> &'static str {
        match self {
            Frame::Message(_) => "msg",
            Frame::Timeout(_) => "timeout",
        }
    }
}

impl From<Frame> for SseEvent {
    fn from(frame: Frame) -> Self {
        let event = match &frame {
            Frame::Message(event) => SseEvent::default().id(event.id().to_string()),
            Frame::Timeout(_) => SseEvent::default(),
        };

        event.event(frame.event_type()).data(frame.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_frame_uses_payload_as_data() {
        let frame = Frame::Message(Event::new(7, Arc::from("fire")));

        assert_eq!(frame.event_type(), "msg");
        assert_eq!(frame.data(), "fire");
    }

    #[test]
    fn test_timeout_frame_carries_duration() {
        assert_eq!(Frame::Timeout(Duration::from_secs(30)).data(), "30s");
        assert_eq!(Frame::Timeout(Duration::from_millis(10)).data(), "10ms");
        assert_eq!(Frame::Timeout(Duration::from_secs(1)).event_type(), "timeout");
    }
}
