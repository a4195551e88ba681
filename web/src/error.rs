use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{DomainErrorKind, EntityErrorKind, Error as DomainError, InternalErrorKind};

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => {
                        (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
                    }
                    EntityErrorKind::Invalid => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE ENTITY").into_response()
                    }
                    EntityErrorKind::Unauthenticated => {
                        (StatusCode::UNAUTHORIZED, "UNAUTHORIZED").into_response()
                    }
                    EntityErrorKind::Conflict => {
                        (StatusCode::FORBIDDEN, "Email is being used!").into_response()
                    }
                    EntityErrorKind::Other(description) => {
                        error!("Entity error: {description}");
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                    }
                },
                InternalErrorKind::Config => {
                    error!("Server is missing required configuration");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
                InternalErrorKind::Other(description) => {
                    error!("Internal error: {description}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            DomainErrorKind::Auth(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED").into_response(),
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::error::AuthErrorKind;

    fn status_of(error_kind: DomainErrorKind) -> StatusCode {
        Error(DomainError {
            source: None,
            error_kind,
        })
        .into_response()
        .status()
    }

    fn entity(kind: EntityErrorKind) -> DomainErrorKind {
        DomainErrorKind::Internal(InternalErrorKind::Entity(kind))
    }

    #[test]
    fn entity_errors_map_to_client_statuses() {
        assert_eq!(status_of(entity(EntityErrorKind::NotFound)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(entity(EntityErrorKind::Invalid)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(entity(EntityErrorKind::Unauthenticated)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(entity(EntityErrorKind::Conflict)), StatusCode::FORBIDDEN);
    }

    #[test]
    fn token_problems_are_unauthorized() {
        assert_eq!(
            status_of(DomainErrorKind::Auth(AuthErrorKind::MissingToken)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(DomainErrorKind::Auth(AuthErrorKind::InvalidToken)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn configuration_and_unexpected_errors_are_server_errors() {
        assert_eq!(
            status_of(DomainErrorKind::Internal(InternalErrorKind::Config)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(entity(EntityErrorKind::Other("boom".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
