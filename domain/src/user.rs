use crate::error::Error;
use crate::jwt::{self, Jwt};
use crate::users;
use email_address::EmailAddress;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;

pub use entity_api::user::{find_by_id, Credentials};

/// Registers a new user. A taken email address surfaces as a conflict.
pub async fn sign_up(
    db: &DatabaseConnection,
    credentials: Credentials,
) -> Result<users::Model, Error> {
    if !EmailAddress::is_valid(&credentials.email) {
        return Err(Error::invalid("email address is not valid"));
    }
    if credentials.password.is_empty() {
        return Err(Error::invalid("password must not be empty"));
    }

    let user = entity_api::user::create(db, credentials).await?;
    info!("Signed up user {}", user.id);

    Ok(user)
}

/// Checks the credentials and issues a token for the user they belong to.
pub async fn login(
    db: &DatabaseConnection,
    config: &Config,
    credentials: Credentials,
) -> Result<Jwt, Error> {
    let user = entity_api::user::authenticate(db, &credentials).await?;
    debug!("User {} logged in", user.id);

    jwt::generate_token(config, user.id)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use crate::Id;
    use chrono::Utc;
    use clap::Parser;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn user_model(password: &str) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Id::new_v4(),
            email: "test@domain.com".to_string(),
            password: entity_api::user::generate_hash(password.to_string()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn sign_up_rejects_an_invalid_email_without_touching_the_database() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = sign_up(&db, credentials("not-an-email", "password"))
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid))
        );
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn sign_up_returns_the_created_user() -> Result<(), Error> {
        let user = user_model("password");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .into_connection();

        let created = sign_up(&db, credentials("test@domain.com", "password")).await?;

        assert_eq!(created.id, user.id);

        Ok(())
    }

    #[tokio::test]
    async fn login_issues_a_token_for_the_user() -> Result<(), Error> {
        let user = user_model("password");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .into_connection();
        let config = Config::try_parse_from(["post_feed_rs"])
            .unwrap()
            .set_jwt_secret("secret".to_string());

        let jwt = login(&db, &config, credentials("test@domain.com", "password")).await?;

        let claims = jwt::validate_token(&config, &jwt.token)?;
        assert_eq!(claims.sub, user.id.to_string());

        Ok(())
    }

    #[tokio::test]
    async fn login_with_a_wrong_password_is_unauthenticated() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model("password")]])
            .into_connection();
        let config = Config::try_parse_from(["post_feed_rs"])
            .unwrap()
            .set_jwt_secret("secret".to_string());

        let err = login(&db, &config, credentials("test@domain.com", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Unauthenticated
            ))
        );
    }
}
