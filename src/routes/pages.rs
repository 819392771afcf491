use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;

use crate::api::ApiError;
use crate::review::ReviewPanel;
use crate::state::AppState;

pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let user = match state.api.me().await {
        Ok(user) => user,
        Err(e) => return error_page(&e),
    };

    let mut ctx = Context::new();
    ctx.insert("user_name", user.display_name());
    ctx.insert("username", &user.username);
    ctx.insert("api_url", &state.config.api_url);
    render_template("index.html", ctx).into_response()
}

#[derive(Deserialize)]
pub struct OpenForm {
    submission_id: u64,
}

pub async fn open_submission(Query(form): Query<OpenForm>) -> impl IntoResponse {
    Redirect::to(&format!("/submissions/{}", form.submission_id))
}

pub async fn view_submission(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<u64>,
) -> Response {
    let submission = match state.api.get_submission(submission_id).await {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Failed to load submission {}: {}", submission_id, e);
            return error_page(&e);
        }
    };

    let controller = state.views.open(submission_id).await;
    let panel = ReviewPanel::from_view(&controller.view());

    let mut ctx = Context::new();
    ctx.insert("submission", &submission);
    ctx.insert("panel", &panel);
    render_template("submission.html", ctx).into_response()
}

fn error_page(err: &ApiError) -> Response {
    let (status, title) = match err {
        ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Not signed in"),
        ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
        ApiError::Network(_) => (StatusCode::BAD_GATEWAY, "Backend unavailable"),
        _ => (StatusCode::BAD_GATEWAY, "Backend error"),
    };

    let mut ctx = Context::new();
    ctx.insert("title", title);
    ctx.insert("message", &err.to_string());
    (status, render_template("error.html", ctx)).into_response()
}

fn render_template(name: &str, ctx: Context) -> Html<String> {
    let tera = crate::templates::get_tera();
    let rendered = tera.render(name, &ctx).unwrap_or_else(|e| {
        tracing::error!("Template {} failed to render: {}", name, e);
        format!("Template error: {}", name)
    });
    Html(rendered)
}
