use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::{accounts, handlers, AppState};

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/group/:slug/", get(handlers::group_posts))
        .route("/profile/:username/", get(handlers::profile))
        .route("/posts/:post_id/", get(handlers::post_detail))
        .route(
            "/posts/:post_id/edit/",
            get(handlers::post_edit_form).post(handlers::post_edit),
        )
        .route(
            "/create/",
            get(handlers::post_create_form).post(handlers::post_create),
        )
        .route("/about/author/", get(handlers::about_author))
        .route("/about/tech/", get(handlers::about_tech))
        .route("/auth/login/", get(accounts::login_form).post(accounts::login))
        .route("/auth/logout/", post(accounts::logout))
        .route("/auth/signup/", get(accounts::signup_form).post(accounts::signup))
        .route("/health", get(handlers::health))
}
