use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

use crate::review::{ReviewController, ReviewPanel};
use crate::state::AppState;

pub async fn review_panel(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<u64>,
) -> Json<ReviewPanel> {
    let controller = state.views.open(submission_id).await;
    Json(panel_of(&controller))
}

/// Streams one panel per controller update.
pub async fn review_events(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<u64>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let controller = state.views.open(submission_id).await;
    let stream = WatchStream::new(controller.subscribe())
        .map(|view| Event::default().json_data(ReviewPanel::from_view(&view)));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn request_review(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<u64>,
) -> Json<ReviewPanel> {
    let controller = state.views.open(submission_id).await;
    controller.request_review().await;
    Json(panel_of(&controller))
}

pub async fn cancel_review(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<u64>,
) -> Json<ReviewPanel> {
    let controller = state.views.open(submission_id).await;
    controller.cancel_review().await;
    Json(panel_of(&controller))
}

pub async fn refresh_review(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<u64>,
) -> Json<ReviewPanel> {
    let controller = state.views.open(submission_id).await;
    controller.refresh().await;
    Json(panel_of(&controller))
}

pub async fn close_review(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<u64>,
) -> Json<serde_json::Value> {
    let closed = state.views.close(submission_id).await;
    Json(serde_json::json!({ "closed": closed }))
}

fn panel_of(controller: &ReviewController) -> ReviewPanel {
    ReviewPanel::from_view(&controller.view())
}
