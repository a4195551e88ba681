//! Post operations. Every successful write is followed by a domain event so that
//! connected clients learn about it.
use crate::error::Error;
use crate::posts::Model;
use crate::Id;
use events::{DomainEvent, EventPublisher};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::post::{find_by_id, find_page};

fn validate_content(post_model: &Model) -> Result<(), Error> {
    if post_model.post_content.trim().is_empty() {
        return Err(Error::invalid("post_content must not be empty"));
    }
    Ok(())
}

fn to_payload(post: &Model) -> Option<serde_json::Value> {
    match serde_json::to_value(post) {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Failed to serialize post {} for broadcast: {e}", post.id);
            None
        }
    }
}

/// Stores a new post for `user_id` and announces it.
///
/// `origin_connection_id` is the requesting client's own WebSocket connection, if it
/// told us, so it is not notified of its own post.
pub async fn create(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    post_model: Model,
    user_id: Id,
    origin_connection_id: Option<String>,
) -> Result<Model, Error> {
    validate_content(&post_model)?;

    let post = entity_api::post::create(db, post_model, user_id).await?;

    if let Some(payload) = to_payload(&post) {
        event_publisher
            .publish(DomainEvent::PostCreated {
                post: payload,
                origin_connection_id,
            })
            .await;
    }

    Ok(post)
}

pub async fn update(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    id: Id,
    user_id: Id,
    post_model: Model,
    origin_connection_id: Option<String>,
) -> Result<Model, Error> {
    validate_content(&post_model)?;

    let post = entity_api::post::update(db, id, user_id, post_model).await?;

    if let Some(payload) = to_payload(&post) {
        event_publisher
            .publish(DomainEvent::PostUpdated {
                post: payload,
                origin_connection_id,
            })
            .await;
    }

    Ok(post)
}

pub async fn delete_by_id(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    id: Id,
    user_id: Id,
    origin_connection_id: Option<String>,
) -> Result<(), Error> {
    entity_api::post::delete_by_id(db, id, user_id).await?;

    event_publisher
        .publish(DomainEvent::PostDeleted {
            post_id: id,
            origin_connection_id,
        })
        .await;

    Ok(())
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use async_trait::async_trait;
    use events::EventHandler;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingHandler {
        events: Mutex<Vec<DomainEvent>>,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn handle(&self, event: &DomainEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn publisher() -> (EventPublisher, Arc<RecordingHandler>) {
        let handler = Arc::new(RecordingHandler::default());
        (EventPublisher::new().with_handler(handler.clone()), handler)
    }

    fn post_model(content: &str) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            post_content: content.to_owned(),
            user_id: Id::new_v4(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_publishes_the_stored_post() -> Result<(), Error> {
        let post = post_model("hello");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post.clone()]])
            .into_connection();
        let (publisher, handler) = publisher();

        let created = create(
            &db,
            &publisher,
            post.clone(),
            post.user_id,
            Some("conn-1".to_string()),
        )
        .await?;

        assert_eq!(created.id, post.id);
        let events = handler.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            DomainEvent::PostCreated {
                post: payload,
                origin_connection_id,
            } => {
                assert_eq!(payload["id"], post.id.to_string());
                assert_eq!(payload["post_content"], "hello");
                assert_eq!(origin_connection_id.as_deref(), Some("conn-1"));
            }
            other => panic!("unexpected event {other:?}"),
        }

        Ok(())
    }

    #[tokio::test]
    async fn create_with_empty_content_is_invalid_and_publishes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let (publisher, handler) = publisher();

        let err = create(&db, &publisher, post_model("   "), Id::new_v4(), None)
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid))
        );
        assert!(handler.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_publishes_the_updated_post() -> Result<(), Error> {
        let post = post_model("before");
        let updated = Model {
            post_content: "after".to_owned(),
            ..post.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post.clone()], [updated.clone()]])
            .into_connection();
        let (publisher, handler) = publisher();

        update(&db, &publisher, post.id, post.user_id, updated, None).await?;

        let events = handler.events.lock().unwrap();
        assert!(matches!(
            &events[..],
            [DomainEvent::PostUpdated { post, .. }] if post["post_content"] == "after"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn failed_update_publishes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();
        let (publisher, handler) = publisher();

        let err = update(
            &db,
            &publisher,
            Id::new_v4(),
            Id::new_v4(),
            post_model("after"),
            None,
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
        );
        assert!(handler.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_publishes_the_deleted_id() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let (publisher, handler) = publisher();
        let id = Id::new_v4();

        delete_by_id(&db, &publisher, id, Id::new_v4(), None).await?;

        let events = handler.events.lock().unwrap();
        assert!(matches!(
            &events[..],
            [DomainEvent::PostDeleted { post_id, origin_connection_id: None }] if *post_id == id
        ));

        Ok(())
    }
}
