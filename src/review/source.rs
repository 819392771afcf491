use async_trait::async_trait;

use crate::api::{ApiClient, RequestReviewResponse, Result, ReviewStatus};

/// Authoritative review state and the two review commands.
///
/// Implementations must not cache: every `fetch_status` is a fresh snapshot.
#[async_trait]
pub trait ReviewStatusSource: Send + Sync {
    async fn fetch_status(&self, submission_id: u64) -> Result<ReviewStatus>;

    /// Creates a pending request. Fails with `Conflict` if one is already active.
    async fn request_review(&self, submission_id: u64) -> Result<RequestReviewResponse>;

    /// Cancels a pending request. Fails with `NotFound` or `Conflict` once the
    /// request has left `pending`.
    async fn cancel_review(&self, request_id: u64) -> Result<()>;
}

#[async_trait]
impl ReviewStatusSource for ApiClient {
    async fn fetch_status(&self, submission_id: u64) -> Result<ReviewStatus> {
        self.get_review_status(submission_id).await
    }

    async fn request_review(&self, submission_id: u64) -> Result<RequestReviewResponse> {
        ApiClient::request_review(self, submission_id).await
    }

    async fn cancel_review(&self, request_id: u64) -> Result<()> {
        ApiClient::cancel_review(self, request_id).await
    }
}
