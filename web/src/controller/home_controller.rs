use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// GET the API's welcome message
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message")
    )
)]
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the post feed API",
        "status": "Connected",
    }))
}
