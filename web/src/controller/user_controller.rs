use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::Error;
use axum::response::IntoResponse;
use log::*;

/// GET the currently authenticated User
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Successfully retrieved the current User", body = domain::users::Model),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Result<impl IntoResponse, Error> {
    debug!("GET current User {}", user.id);

    Ok(ApiResponse::ok(user))
}
