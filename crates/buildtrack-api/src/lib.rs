pub mod auth;
pub mod dev;
pub mod email;
pub mod error;
pub mod favorites;
pub mod images;
pub mod logs;
pub mod middleware;
pub mod profile;
pub mod projects;
pub mod state;
pub mod storage;
pub mod users;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use state::{AppState, AppStateInner};

use crate::middleware::require_auth;

/// Full HTTP surface. Media is served read-only under `/media`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/password-reset", post(auth::request_password_reset))
        .route("/auth/password-reset/confirm", post(auth::confirm_password_reset));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/profile", patch(profile::update_profile))
        .route("/profile/password", post(profile::change_password))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user).patch(users::update_user).delete(users::delete_user),
        )
        .route("/projects", get(projects::list_projects).post(projects::create_project))
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .patch(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/projects/{id}/images",
            get(images::list_images)
                .post(images::upload_image)
                .layer(DefaultBodyLimit::max(images::MAX_IMAGE_SIZE)),
        )
        .route("/projects/{id}/gallery-periods", get(images::gallery_periods))
        .route("/images/{id}", delete(images::delete_image))
        .route("/favorites", get(favorites::list_favorites))
        .route(
            "/favorites/{image_id}",
            put(favorites::add_favorite).delete(favorites::remove_favorite),
        )
        .route("/favorites/{image_id}/toggle", post(favorites::toggle_favorite))
        .route("/logs", get(logs::list_logs).post(logs::create_log))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let mut app = Router::new().merge(public_routes).merge(protected_routes);

    if state.dev_endpoints {
        app = app
            .route("/api/test-email", post(dev::test_email))
            .route("/api/logs", get(dev::recent_logs));
    }

    app.nest_service("/media", ServeDir::new(state.media.dir()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
