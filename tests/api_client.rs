use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use classroom_review::api::{ApiClient, ApiError, ReviewRequestStatus};
use classroom_review::review::{FailureKind, ReviewController, ReviewState};
use classroom_review::session::Session;

const TOKEN: &str = "good-token";

fn authorized(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {}", TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "invalid token"})),
        )
            .into_response()),
    }
}

async fn me(headers: HeaderMap) -> Response {
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    Json(json!({
        "id": 3,
        "username": "jdoe",
        "email": "jdoe@example.com",
        "full_name": "Jo Doe",
        "is_admin": false
    }))
    .into_response()
}

async fn submission(headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    match id {
        5 => Json(json!({
            "id": 5,
            "assignment_id": 11,
            "student_id": 3,
            "repo_url": "https://git.example.com/jdoe/hw1",
            "status": "submitted",
            "submitted_at": "2024-03-01T12:00:00Z",
            "assignment": {
                "id": 11,
                "course_id": 2,
                "title": "Linked lists",
                "deadline": "2024-03-10T23:59:00Z",
                "max_points": 100
            }
        }))
        .into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn review_status(headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    match id {
        1 => Json(json!({
            "has_active_request": true,
            "seconds_remaining": 120,
            "review_request": {"id": 7, "status": "pending", "requested_at": "2024-01-01T00:00:00Z"}
        }))
        .into_response(),
        2 => Json(json!({"has_active_request": false})).into_response(),
        _ => (StatusCode::OK, "<html>login</html>").into_response(),
    }
}

async fn request_review(headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    match id {
        1 => (
            StatusCode::CREATED,
            Json(json!({
                "seconds_to_cancel": 300,
                "cancel_deadline": "2024-01-01T00:05:00Z",
                "review_request": {"id": 9, "status": "pending"}
            })),
        )
            .into_response(),
        _ => (
            StatusCode::CONFLICT,
            Json(json!({"message": "active review request already exists"})),
        )
            .into_response(),
    }
}

async fn cancel_review(headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    match id {
        7 => Json(json!({"message": "review request cancelled"})).into_response(),
        8 => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "review request not found"})),
        )
            .into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "cancellation period has expired"})),
        )
            .into_response(),
    }
}

async fn spawn_backend() -> SocketAddr {
    let api = Router::new()
        .route("/auth/me", get(me))
        .route("/submissions/:id", get(submission))
        .route("/reviews/:id/status", get(review_status))
        .route("/reviews/:id/request", post(request_review))
        .route("/reviews/:id/cancel", post(cancel_review));
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, token: &str) -> ApiClient {
    ApiClient::new(
        &format!("http://{}/api/", addr),
        Session::new(token),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn parses_pending_status() {
    let addr = spawn_backend().await;
    let api = client(addr, TOKEN);

    let status = api.get_review_status(1).await.unwrap();
    assert!(status.has_active_request);
    assert_eq!(status.seconds_remaining, Some(120));
    let request = status.review_request.unwrap();
    assert_eq!(request.id, 7);
    assert_eq!(request.status, ReviewRequestStatus::Pending);

    let empty = api.get_review_status(2).await.unwrap();
    assert!(!empty.has_active_request);
    assert!(empty.review_request.is_none());
}

#[tokio::test]
async fn non_json_body_is_an_invalid_response() {
    let addr = spawn_backend().await;
    let err = client(addr, TOKEN).get_review_status(3).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)), "{:?}", err);
}

#[tokio::test]
async fn request_review_returns_cancel_window() {
    let addr = spawn_backend().await;
    let response = client(addr, TOKEN).request_review(1).await.unwrap();

    assert_eq!(response.seconds_to_cancel, 300);
    assert_eq!(response.review_request.map(|r| r.id), Some(9));
}

#[tokio::test]
async fn conflict_carries_server_message() {
    let addr = spawn_backend().await;
    let err = client(addr, TOKEN).request_review(2).await.unwrap_err();

    match err {
        ApiError::Conflict(message) => {
            assert_eq!(message, "active review request already exists")
        }
        other => panic!("expected conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn cancel_maps_status_codes() {
    let addr = spawn_backend().await;
    let api = client(addr, TOKEN);

    api.cancel_review(7).await.unwrap();
    assert!(matches!(
        api.cancel_review(8).await,
        Err(ApiError::NotFound(m)) if m == "review request not found"
    ));
    assert!(matches!(
        api.cancel_review(9).await,
        Err(ApiError::Rejected(m)) if m == "cancellation period has expired"
    ));
}

#[tokio::test]
async fn bad_token_is_unauthorized() {
    let addr = spawn_backend().await;
    let err = client(addr, "stale-token").me().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(m) if m == "invalid token"));
}

#[tokio::test]
async fn me_and_submission_decode() {
    let addr = spawn_backend().await;
    let api = client(addr, TOKEN);

    let user = api.me().await.unwrap();
    assert_eq!(user.display_name(), "Jo Doe");

    let submission = api.get_submission(5).await.unwrap();
    assert_eq!(submission.student_id, 3);
    let assignment = submission.assignment.unwrap();
    assert_eq!(assignment.title, "Linked lists");
    assert_eq!(assignment.max_points, 100);
}

#[tokio::test]
async fn empty_server_error_uses_reason_phrase() {
    let addr = spawn_backend().await;
    let err = client(addr, TOKEN).get_submission(6).await.unwrap_err();

    match err {
        ApiError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal server error");
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn refused_connection_is_a_network_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr, TOKEN).get_review_status(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "{:?}", err);
}

#[tokio::test]
async fn controller_drives_real_client() {
    let addr = spawn_backend().await;
    let api = Arc::new(client(addr, TOKEN));

    let pending = ReviewController::new(1, api.clone());
    pending.refresh().await;
    let view = pending.view();
    assert_eq!(
        view.state,
        Some(ReviewState::Pending {
            seconds_remaining: 120
        })
    );
    assert_eq!(view.request_id, Some(7));
    assert!(pending.is_clock_running());
    pending.close();
    assert!(!pending.is_clock_running());

    let conflicted = ReviewController::new(2, api);
    conflicted.refresh().await;
    conflicted.request_review().await;
    let view = conflicted.view();
    assert_eq!(view.state, Some(ReviewState::NoRequest));
    assert_eq!(view.last_error.map(|e| e.kind), Some(FailureKind::Conflict));
    conflicted.close();
}
