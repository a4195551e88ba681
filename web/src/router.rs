use crate::{
    controller::{
        health_check_controller, home_controller, post_controller, user_controller,
        user_session_controller,
    },
    middleware::auth::require_auth,
    ws::handler::ws_handler,
    AppState,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Post Feed API"
        ),
        paths(
            home_controller::index,
            health_check_controller::health_check,
            user_session_controller::signup,
            user_session_controller::login,
            user_controller::me,
            post_controller::index,
            post_controller::read,
            post_controller::create,
            post_controller::update,
            post_controller::delete,
        ),
        components(
            schemas(
                domain::posts::Model,
                domain::users::Model,
                domain::user::Credentials,
                domain::jwts::Jwt,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "post_feed", description = "Post feed API with real-time WebSocket updates")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines the bearer JWT authentication requirement for gaining access to our
// protected API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("id_token returned from a successful login"))
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(home_routes())
        .merge(health_routes())
        .merge(user_session_routes(app_state.clone()))
        .merge(user_routes(app_state.clone()))
        .merge(post_routes(app_state.clone()))
        .merge(ws_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn home_routes() -> Router {
    Router::new().route("/", get(home_controller::index))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn user_session_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/signup", post(user_session_controller::signup))
        .route("/login", post(user_session_controller::login))
        .with_state(app_state)
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/v1/me", get(user_controller::me))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn post_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/v1/posts", post(post_controller::create))
        .route("/api/v1/posts/:id", put(post_controller::update))
        .route("/api/v1/posts/:id", delete(post_controller::delete))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .merge(
            // Reading the feed does not require an account
            Router::new()
                .route("/api/v1/posts", get(post_controller::index))
                .route("/api/v1/posts/:id", get(post_controller::read)),
        )
        .with_state(app_state)
}

fn ws_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}
