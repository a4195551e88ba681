use crate::controller::ApiResponse;
use crate::{AppState, Error};
use axum::{extract::State, response::IntoResponse, Json};
use domain::user::{self as UserApi, Credentials};
use log::*;
use serde_json::json;

/// Creates a new account.
///
/// Test this with curl: curl -v \
/// --header "Content-Type: application/json" \
/// --data '{"email": "jim@example.com", "password": "secret"}' \
/// --request POST http://localhost:4000/signup
#[utoipa::path(
    post,
    path = "/signup",
    request_body = domain::user::Credentials,
    responses(
        (status = 201, description = "Successfully signed up a new user"),
        (status = 403, description = "Email is already in use"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn signup(
    State(app_state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Sign up from: {credentials:?}");

    let user = UserApi::sign_up(app_state.db_conn_ref(), credentials).await?;

    Ok(ApiResponse::created(json!({ "id": user.id, "email": user.email })))
}

/// Logs the user in and returns a signed JWT.
///
/// The token must be passed back to the server on every protected API call, e.g.:
/// curl -v --header "Authorization: Bearer <id_token>" --request GET http://localhost:4000/api/v1/me
#[utoipa::path(
    post,
    path = "/login",
    request_body = domain::user::Credentials,
    responses(
        (status = 200, description = "Logs in and returns an id_token", body = domain::jwts::Jwt),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Login for: {}", credentials.email);

    let jwt = UserApi::login(app_state.db_conn_ref(), &app_state.config, credentials)
        .await
        .inspect_err(|e| warn!("Login failed: {e}"))?;

    Ok(ApiResponse::ok(jwt))
}
