use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, origin_connection::OriginConnection,
};
use crate::params::post::IndexParams;
use crate::{AppState, Error};
use domain::{post as PostApi, posts::Model, Id};
use log::*;

/// GET a page of Posts, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved a page of Posts", body = [domain::posts::Model]),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    let page = params.page.unwrap_or_default();
    debug!("GET Posts page {page}");

    let posts = PostApi::find_page(
        app_state.db_conn_ref(),
        page,
        app_state.config.posts_page_size,
    )
    .await?;

    Ok(ApiResponse::ok(json!({ "page": page, "posts": posts })))
}

/// GET a particular Post specified by its id.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(
        ("id" = String, Path, description = "Post id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a specific Post by its id", body = domain::posts::Model),
        (status = 404, description = "Post not found"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Post by id: {id}");

    let post = PostApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(ApiResponse::ok(post))
}

/// POST create a new Post owned by the current user
///
/// Subscribers are sent a `Post_Created` event, except the connection named in the
/// optional `x-connection-id` header.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = domain::posts::Model,
    responses(
        (status = 201, description = "Successfully Created a New Post", body = domain::posts::Model),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    AuthenticatedUser(user): AuthenticatedUser,
    OriginConnection(origin): OriginConnection,
    State(app_state): State<AppState>,
    Json(post_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a New Post for user {}", user.id);

    let post = PostApi::create(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        post_model,
        user.id,
        origin,
    )
    .await?;

    debug!("New Post: {post:?}");

    Ok(ApiResponse::created(post))
}

/// PUT update the content of one of the current user's Posts
#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of the Post to update"),
    ),
    request_body = domain::posts::Model,
    responses(
        (status = 200, description = "Successfully Updated Post", body = domain::posts::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found or not owned by the current user"),
        (status = 422, description = "Unprocessable Entity")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update(
    AuthenticatedUser(user): AuthenticatedUser,
    OriginConnection(origin): OriginConnection,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(post_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Post with id: {id}");

    let post = PostApi::update(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        id,
        user.id,
        post_model,
        origin,
    )
    .await?;

    debug!("Updated Post: {post:?}");

    Ok(ApiResponse::ok(post))
}

/// DELETE one of the current user's Posts
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of the Post to delete"),
    ),
    responses(
        (status = 200, description = "Successfully Deleted Post"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found or not owned by the current user")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete(
    AuthenticatedUser(user): AuthenticatedUser,
    OriginConnection(origin): OriginConnection,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Post with id: {id}");

    PostApi::delete_by_id(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        id,
        user.id,
        origin,
    )
    .await?;

    Ok(ApiResponse::ok(json!({ "id": id })))
}
