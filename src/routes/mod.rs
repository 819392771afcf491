mod api;
mod pages;

pub use api::*;
pub use pages::*;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/open", get(open_submission))
        .route("/submissions/:submission_id", get(view_submission))
        .route("/api/submissions/:submission_id/review", get(review_panel))
        .route("/api/submissions/:submission_id/review/events", get(review_events))
        .route("/api/submissions/:submission_id/review/request", post(request_review))
        .route("/api/submissions/:submission_id/review/cancel", post(cancel_review))
        .route("/api/submissions/:submission_id/review/refresh", post(refresh_review))
        .route("/api/submissions/:submission_id/review/close", post(close_review))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
