use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;
use entity::users::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::Deserialize;
use utoipa::ToSchema;

/// Email and password submitted to both sign up and login.
#[derive(Clone, Deserialize, ToSchema)]
#[schema(as = entity_api::user::Credentials)] // OpenAPI schema
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// The password never ends up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"********")
            .finish()
    }
}

pub async fn create(db: &impl ConnectionTrait, credentials: Credentials) -> Result<Model, Error> {
    debug!("New User to be inserted with email: {}", credentials.email);

    let now = Utc::now();
    let user_active_model: ActiveModel = ActiveModel {
        id: Set(Id::new_v4()),
        email: Set(credentials.email),
        password: Set(generate_hash(credentials.password)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(user_active_model.insert(db).await?)
}

pub async fn find_by_email(db: &impl ConnectionTrait, email: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Looks the user up by email and checks the password against the stored hash.
/// An unknown email and a wrong password are indistinguishable to the caller.
pub async fn authenticate(
    db: &impl ConnectionTrait,
    credentials: &Credentials,
) -> Result<Model, Error> {
    match find_by_email(db, &credentials.email).await? {
        Some(user) => {
            verify_password(&credentials.password, &user.password).await?;
            Ok(user)
        }
        None => {
            warn!("Authentication failed, unknown user: {}", credentials.email);
            Err(Error {
                source: None,
                error_kind: EntityApiErrorKind::RecordUnauthenticated,
            })
        }
    }
}

pub async fn verify_password(password_to_verify: &str, password_hash: &str) -> Result<(), Error> {
    match password_auth::verify_password(password_to_verify, password_hash) {
        Ok(_) => Ok(()),
        Err(_) => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordUnauthenticated,
        }),
    }
}

pub fn generate_hash(password: String) -> String {
    password_auth::generate_hash(password)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user_model(password: &str) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            email: "test@domain.com".to_string(),
            password: generate_hash(password.to_string()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "test@domain.com".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_new_user_model() -> Result<(), Error> {
        let user = user_model("password");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .into_connection();

        let created = create(&db, credentials("password")).await?;

        assert_eq!(created.id, user.id);
        assert_eq!(created.email, user.email);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_email_returns_none_for_an_unknown_email() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        assert_eq!(find_by_email(&db, "nobody@domain.com").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_not_found_for_an_unknown_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let err = find_by_id(&db, Id::new_v4()).await.unwrap_err();

        assert_eq!(err.error_kind, EntityApiErrorKind::RecordNotFound);
    }

    #[tokio::test]
    async fn authenticate_accepts_the_right_password() -> Result<(), Error> {
        let user = user_model("password");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .into_connection();

        let authenticated = authenticate(&db, &credentials("password")).await?;

        assert_eq!(authenticated.id, user.id);

        Ok(())
    }

    #[tokio::test]
    async fn authenticate_rejects_a_wrong_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model("password")]])
            .into_connection();

        let err = authenticate(&db, &credentials("wrong")).await.unwrap_err();

        assert_eq!(err.error_kind, EntityApiErrorKind::RecordUnauthenticated);
    }

    #[tokio::test]
    async fn authenticate_rejects_an_unknown_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let err = authenticate(&db, &credentials("password"))
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, EntityApiErrorKind::RecordUnauthenticated);
    }

    #[test]
    fn credentials_debug_output_hides_the_password() {
        let output = format!("{:?}", credentials("hunter2"));
        assert!(!output.contains("hunter2"));
    }
}
