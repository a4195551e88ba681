use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::error::{
    AuthErrorKind, DomainErrorKind, EntityErrorKind, Error as DomainError, InternalErrorKind,
};
use domain::{jwt, user as UserApi, users, Id};
use log::*;
use service::AppState;

/// Authentication middleware that returns 401 Unauthorized unless the request carries a
/// valid JWT in its `Authorization` header.
///
/// The user the token was issued to is loaded and stored in the request extensions,
/// where the `AuthenticatedUser` extractor picks it up.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&app_state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => match e.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Config) => {
                error!("Cannot authenticate requests without a configured JWT secret");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
            _ => {
                debug!("Rejecting unauthenticated request: {e}");
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
        },
    }
}

async fn authenticate(app_state: &AppState, headers: &HeaderMap) -> Result<users::Model, DomainError> {
    let header_value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let claims = jwt::validate_token(&app_state.config, header_value)?;
    let user_id = Id::parse_str(&claims.sub)
        .map_err(|_| DomainError::auth(AuthErrorKind::InvalidToken))?;

    match UserApi::find_by_id(app_state.db_conn_ref(), user_id).await {
        Ok(user) => Ok(user),
        Err(e) => {
            let e = DomainError::from(e);
            if e.error_kind
                == DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
            {
                // The token outlived its user.
                Err(DomainError::auth(AuthErrorKind::InvalidToken))
            } else {
                Err(e)
            }
        }
    }
}
