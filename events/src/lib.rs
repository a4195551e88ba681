//! Event system infrastructure for the post feed.
//!
//! This crate decouples domain logic from delivery concerns (like the WebSocket
//! hub).
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing all business events in the system
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates (entity, domain, etc.),
//! avoiding circular dependencies. Entity data is carried as serialized JSON values.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A type alias that represents any Entity's internal id field data type.
/// This matches the definition in the entity crate to maintain compatibility.
pub type Id = Uuid;

/// Domain events emitted after a write has been committed.
///
/// `origin_connection_id` is the hub connection id the requesting client
/// supplied, if any. Delivery skips that connection.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A new post was stored. Carries the complete serialized post.
    PostCreated {
        post: Value,
        origin_connection_id: Option<String>,
    },
    /// A post's content changed. Carries the complete updated post.
    PostUpdated {
        post: Value,
        origin_connection_id: Option<String>,
    },
    /// A post was removed; only its id survives.
    PostDeleted {
        post_id: Id,
        origin_connection_id: Option<String>,
    },
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Returns a publisher that also notifies `handler`.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHandler {
        name: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn handle(&self, event: &DomainEvent) {
            let kind = match event {
                DomainEvent::PostCreated { .. } => "created",
                DomainEvent::PostUpdated { .. } => "updated",
                DomainEvent::PostDeleted { .. } => "deleted",
            };
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{kind}", self.name));
        }
    }

    #[tokio::test]
    async fn handlers_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let publisher = EventPublisher::new()
            .with_handler(Arc::new(RecordingHandler {
                name: "first",
                seen: seen.clone(),
            }))
            .with_handler(Arc::new(RecordingHandler {
                name: "second",
                seen: seen.clone(),
            }));

        publisher
            .publish(DomainEvent::PostDeleted {
                post_id: Uuid::new_v4(),
                origin_connection_id: None,
            })
            .await;

        assert_eq!(publisher.handler_count(), 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:deleted".to_string(), "second:deleted".to_string()]
        );
    }

    #[tokio::test]
    async fn publishing_without_handlers_is_a_no_op() {
        EventPublisher::default()
            .publish(DomainEvent::PostCreated {
                post: serde_json::json!({}),
                origin_connection_id: None,
            })
            .await;
    }
}
