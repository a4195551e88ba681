use crate::connection::ConnectionId;
use crate::message::Event;
use crate::Hub;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;

/// Handles domain events by converting them to hub events and broadcasting them to
/// every connected client.
///
/// The client whose request caused the change (if it told us its connection id)
/// is left out, it already has the result from the HTTP response.
pub struct HubDomainEventHandler {
    hub: Hub,
}

impl HubDomainEventHandler {
    pub fn new(hub: Hub) -> Self {
        Self { hub }
    }
}

fn exclusion(origin_connection_id: &Option<String>) -> Option<ConnectionId> {
    origin_connection_id.as_deref().map(ConnectionId::from)
}

#[async_trait]
impl EventHandler for HubDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::PostCreated {
                post,
                origin_connection_id,
            } => {
                debug!("Handling PostCreated event");

                self.hub.send_event(
                    Event::PostCreated { post: post.clone() },
                    exclusion(origin_connection_id),
                );
            }

            DomainEvent::PostUpdated {
                post,
                origin_connection_id,
            } => {
                debug!("Handling PostUpdated event");

                self.hub.send_event(
                    Event::PostUpdated { post: post.clone() },
                    exclusion(origin_connection_id),
                );
            }

            DomainEvent::PostDeleted {
                post_id,
                origin_connection_id,
            } => {
                debug!("Handling PostDeleted event for post {post_id}");

                self.hub.send_event(
                    Event::PostDeleted {
                        post_id: post_id.to_string(),
                    },
                    exclusion(origin_connection_id),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;
    use crate::connection::Frame;
    use events::EventPublisher;
    use futures::channel::mpsc as transport;
    use futures::StreamExt;
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn next_text(outgoing: &mut transport::UnboundedReceiver<Frame>) -> Value {
        loop {
            match outgoing.next().await {
                Some(Frame::Text(text)) => return serde_json::from_str(&text).unwrap(),
                Some(_) => continue,
                None => panic!("transport closed before a text frame arrived"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn published_events_reach_subscribers_except_the_origin() {
        let hub = Hub::start(HubConfig::default()).unwrap();
        let publisher =
            EventPublisher::new().with_handler(Arc::new(HubDomainEventHandler::new(hub.clone())));

        let (origin_sink, mut origin_out) = transport::unbounded();
        let (_origin_in, origin_stream) = transport::unbounded::<Result<Frame, String>>();
        let origin = hub
            .attach(ConnectionId::new(), origin_sink, origin_stream)
            .unwrap();

        let (other_sink, mut other_out) = transport::unbounded();
        let (_other_in, other_stream) = transport::unbounded::<Result<Frame, String>>();
        hub.attach(ConnectionId::new(), other_sink, other_stream)
            .unwrap();

        let post_id = uuid::Uuid::new_v4();
        publisher
            .publish(DomainEvent::PostCreated {
                post: json!({ "id": post_id.to_string(), "post_content": "hello" }),
                origin_connection_id: Some(origin.to_string()),
            })
            .await;
        publisher
            .publish(DomainEvent::PostDeleted {
                post_id,
                origin_connection_id: None,
            })
            .await;

        assert_eq!(
            next_text(&mut other_out).await,
            json!({
                "type": "Post_Created",
                "payload": { "id": post_id.to_string(), "post_content": "hello" }
            })
        );
        assert_eq!(
            next_text(&mut other_out).await,
            json!({ "type": "Post_Deleted", "payload": { "id": post_id.to_string() } })
        );
        assert_eq!(next_text(&mut origin_out).await["type"], "Post_Deleted");

        hub.shutdown().await;
    }
}
