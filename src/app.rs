use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/notifications/:id", get(handlers::detail_page))
        .route("/notifications/:id/approve", post(handlers::approve_form))
        .route("/notifications/:id/decline", post(handlers::decline_form))
        .route("/notifications/:id/delete", post(handlers::delete_form))
        .route("/api/notifications", get(handlers::list_notifications))
        .route(
            "/api/notifications/:id",
            get(handlers::get_notification).delete(handlers::delete),
        )
        .route("/api/notifications/:id/approve", post(handlers::approve))
        .route("/api/notifications/:id/decline", post(handlers::decline))
        .with_state(state)
}
