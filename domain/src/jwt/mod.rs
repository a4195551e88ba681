//! This module provides functionality for handling JSON Web Tokens (JWTs) within the domain layer.
//!
//! Tokens are HS256-signed with the configured `jwt_secret` and carry the user id as their
//! subject. They are issued by [`generate_token`] on login and checked by [`validate_token`]
//! for every protected request.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain::jwt::{generate_token, validate_token};
//!
//! let jwt = generate_token(&config, user.id)?;
//! let claims = validate_token(&config, &format!("Bearer {}", jwt.token))?;
//! assert_eq!(claims.sub, user.id.to_string());
//! ```

use crate::error::{AuthErrorKind, DomainErrorKind, Error, InternalErrorKind};
use chrono::Utc;
use entity::Id;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use service::config::Config;

// re-export the Jwt struct from the entity module
pub use claims::AppClaims;
pub use entity::jwt::Jwt;

mod claims;

const BEARER_PREFIX: &str = "Bearer ";

fn jwt_secret(config: &Config) -> Result<&str, Error> {
    config.jwt_secret().ok_or_else(|| {
        warn!("Failed to get jwt secret from config");
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    })
}

/// Issues a token for `user_id` that expires after `jwt_expiry_seconds`.
pub fn generate_token(config: &Config, user_id: Id) -> Result<Jwt, Error> {
    let secret = jwt_secret(config)?;
    let now = Utc::now().timestamp() as usize;

    let claims = AppClaims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + config.jwt_expiry_seconds as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(Jwt {
        token,
        sub: claims.sub,
    })
}

/// Validates the signature and expiry of a token taken from an `Authorization` header.
/// Both a bare token and `Bearer <token>` are accepted.
pub fn validate_token(config: &Config, header_value: &str) -> Result<AppClaims, Error> {
    let secret = jwt_secret(config)?;

    let header_value = header_value.trim_start();
    let token = header_value
        .strip_prefix(BEARER_PREFIX)
        .unwrap_or(header_value)
        .trim();

    if token.is_empty() {
        return Err(Error::auth(AuthErrorKind::MissingToken));
    }

    decode::<AppClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|err| {
        debug!("Rejected JWT: {err}");
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Auth(AuthErrorKind::InvalidToken),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config(secret: Option<&str>) -> Config {
        let config = Config::try_parse_from(["post_feed_rs"]).unwrap();
        match secret {
            Some(secret) => config.set_jwt_secret(secret.to_string()),
            None => config,
        }
    }

    #[test]
    fn generated_token_validates_with_or_without_bearer_prefix() {
        let config = config(Some("secret"));
        let user_id = Id::new_v4();

        let jwt = generate_token(&config, user_id).unwrap();

        let claims = validate_token(&config, &jwt.token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.exp - claims.iat, config.jwt_expiry_seconds as usize);

        let claims = validate_token(&config, &format!("Bearer {}", jwt.token)).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(jwt.sub, user_id.to_string());
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let jwt = generate_token(&config(Some("one")), Id::new_v4()).unwrap();

        let err = validate_token(&config(Some("two")), &jwt.token).unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Auth(AuthErrorKind::InvalidToken)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = config(Some("secret"));
        let claims = AppClaims {
            sub: Id::new_v4().to_string(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let err = validate_token(&config, &token).unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Auth(AuthErrorKind::InvalidToken)
        );
    }

    #[test]
    fn empty_header_is_a_missing_token() {
        let err = validate_token(&config(Some("secret")), "Bearer ").unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Auth(AuthErrorKind::MissingToken)
        );
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        let err = generate_token(&config(None), Id::new_v4()).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
    }
}
