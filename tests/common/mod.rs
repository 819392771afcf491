#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use classroom_review::api::{ApiError, RequestReviewResponse, Result, ReviewStatus};
use classroom_review::review::ReviewStatusSource;

/// In-memory stand-in for the classroom backend.
///
/// Successful commands move the fake's own status the way the real backend
/// would; tests can override it at any point with `set_status`.
pub struct FakeBackend {
    status: Mutex<ReviewStatus>,
    fetch_failures: Mutex<VecDeque<ApiError>>,
    fetch_latencies: Mutex<VecDeque<Duration>>,
    request_results: Mutex<VecDeque<Result<RequestReviewResponse>>>,
    cancel_results: Mutex<VecDeque<Result<()>>>,
    next_request_id: AtomicU64,
    pub fetches: AtomicUsize,
    pub requests: AtomicUsize,
    pub cancelled: Mutex<Vec<u64>>,
}

impl FakeBackend {
    pub fn new(status: ReviewStatus) -> Self {
        Self {
            status: Mutex::new(status),
            fetch_failures: Mutex::new(VecDeque::new()),
            fetch_latencies: Mutex::new(VecDeque::new()),
            request_results: Mutex::new(VecDeque::new()),
            cancel_results: Mutex::new(VecDeque::new()),
            next_request_id: AtomicU64::new(100),
            fetches: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
            cancelled: Mutex::new(Vec::new()),
        }
    }

    pub fn set_status(&self, status: ReviewStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn fail_next_fetch(&self, err: ApiError) {
        self.fetch_failures.lock().unwrap().push_back(err);
    }

    pub fn delay_next_fetch(&self, latency: Duration) {
        self.fetch_latencies.lock().unwrap().push_back(latency);
    }

    pub fn queue_request_result(&self, result: Result<RequestReviewResponse>) {
        self.request_results.lock().unwrap().push_back(result);
    }

    pub fn queue_cancel_result(&self, result: Result<()>) {
        self.cancel_results.lock().unwrap().push_back(result);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn cancelled_ids(&self) -> Vec<u64> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReviewStatusSource for FakeBackend {
    async fn fetch_status(&self, _submission_id: u64) -> Result<ReviewStatus> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // The snapshot is taken when the request reaches the server.
        let snapshot = self.status.lock().unwrap().clone();
        let failure = self.fetch_failures.lock().unwrap().pop_front();
        let latency = self.fetch_latencies.lock().unwrap().pop_front();

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(snapshot),
        }
    }

    async fn request_review(&self, _submission_id: u64) -> Result<RequestReviewResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let result = self
            .request_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RequestReviewResponse::new(300)));

        if let Ok(response) = &result {
            let id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
            self.set_status(ReviewStatus::pending(id, response.seconds_to_cancel));
        }
        result
    }

    async fn cancel_review(&self, request_id: u64) -> Result<()> {
        let result = self
            .cancel_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()));

        if result.is_ok() {
            self.cancelled.lock().unwrap().push(request_id);
            self.set_status(ReviewStatus::none());
        }
        result
    }
}

/// Lets spawned follow-up polls run without moving the countdown noticeably.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
