use crate::connection::ConnectionId;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Trait for getting the wire-level type discriminator of an event
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

/// One frame on the wire: `{"type": "...", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub message_type: String,
    pub payload: Value,
}

impl Message {
    /// Build a message from any serializable payload.
    pub fn new<P>(message_type: impl Into<String>, payload: &P) -> Result<Self, Error>
    where
        P: Serialize + ?Sized,
    {
        Ok(Self {
            message_type: message_type.into(),
            payload: serde_json::to_value(payload)?,
        })
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Application events pushed to subscribers.
///
/// Payloads carry the domain object exactly as the REST API serializes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// First frame on every socket, tells the client its own connection id so it
    /// can ask to be excluded from broadcasts it triggers itself.
    Connected { connection_id: ConnectionId },
    PostCreated { post: Value },
    PostUpdated { post: Value },
    PostDeleted { post_id: String },
}

impl EventType for Event {
    fn event_type(&self) -> &'static str {
        match self {
            Event::Connected { .. } => "Connected",
            Event::PostCreated { .. } => "Post_Created",
            Event::PostUpdated { .. } => "Post_Updated",
            Event::PostDeleted { .. } => "Post_Deleted",
        }
    }
}

impl From<Event> for Message {
    fn from(event: Event) -> Self {
        let message_type = event.event_type().to_string();
        let payload = match event {
            Event::Connected { connection_id } => {
                json!({ "connection_id": connection_id.as_str() })
            }
            Event::PostCreated { post } | Event::PostUpdated { post } => post,
            Event::PostDeleted { post_id } => json!({ "id": post_id }),
        };

        Message {
            message_type,
            payload,
        }
    }
}

/// A message to fan out, plus the one connection (if any) that must not receive it.
#[derive(Debug, Clone)]
pub struct BroadcastMessage {
    pub message: Message,
    pub exclude: Option<ConnectionId>,
}
