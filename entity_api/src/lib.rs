use chrono::Utc;
use log::*;
use password_auth::generate_hash;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

pub use entity::{jwt, posts, users, Id};

pub mod error;
pub mod post;
pub mod user;

pub(crate) fn uuid_parse_str(uuid_str: &str) -> Result<Id, error::Error> {
    Id::parse_str(uuid_str).map_err(|_| error::Error {
        source: None,
        error_kind: error::EntityApiErrorKind::InvalidQueryTerm,
    })
}

/// Parses a post or user id that arrived as free text (ex. a JWT subject).
pub fn parse_id(id_str: &str) -> Result<Id, error::Error> {
    uuid_parse_str(id_str)
}

/// Inserts a pair of demo users and a handful of posts for local development.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    let now = Utc::now();

    let demo_users = [
        ("ada@post-feed.dev", "password"),
        ("grace@post-feed.dev", "password"),
    ];

    for (index, (email, password)) in demo_users.into_iter().enumerate() {
        let user = users::ActiveModel {
            id: Set(Id::new_v4()),
            email: Set(email.to_owned()),
            password: Set(generate_hash(password)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await?;

        info!("Seeded user {}", user.email);

        for n in 1..=3 {
            posts::ActiveModel {
                id: Set(Id::new_v4()),
                post_content: Set(format!("Post #{n} from {}", user.email)),
                user_id: Set(user.id),
                created_at: Set((now + chrono::Duration::seconds((index * 3 + n) as i64)).into()),
                updated_at: Set(now.into()),
            }
            .insert(db)
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uuid_parse_str_parses_valid_uuid() {
        let uuid_str = "a98c3295-0933-44cb-89db-7db0f7250fb1";
        let uuid = uuid_parse_str(uuid_str).unwrap();
        assert_eq!(uuid.to_string(), uuid_str);
    }

    #[tokio::test]
    async fn uuid_parse_str_returns_error_for_invalid_uuid() {
        let uuid_str = "invalid";
        let result = uuid_parse_str(uuid_str);
        assert!(result.is_err());
    }
}
