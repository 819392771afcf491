use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::{ApiError, Result};
use super::models::{ErrorBody, RequestReviewResponse, ReviewStatus, Submission, User};
use crate::session::Session;

/// HTTP client for the classroom backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn me(&self) -> Result<User> {
        let response = self.send(self.request(Method::GET, "/auth/me")).await?;
        decode(response).await
    }

    pub async fn get_submission(&self, submission_id: u64) -> Result<Submission> {
        let path = format!("/submissions/{}", submission_id);
        let response = self.send(self.request(Method::GET, &path)).await?;
        decode(response).await
    }

    pub async fn get_review_status(&self, submission_id: u64) -> Result<ReviewStatus> {
        let path = format!("/reviews/{}/status", submission_id);
        let response = self.send(self.request(Method::GET, &path)).await?;
        decode(response).await
    }

    pub async fn request_review(&self, submission_id: u64) -> Result<RequestReviewResponse> {
        let path = format!("/reviews/{}/request", submission_id);
        let response = self.send(self.request(Method::POST, &path)).await?;
        decode(response).await
    }

    pub async fn cancel_review(&self, request_id: u64) -> Result<()> {
        let path = format!("/reviews/{}/cancel", request_id);
        self.send(self.request(Method::POST, &path)).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(self.session.token())
            .header("content-type", "application/json")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url().path());

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                if text.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_lowercase()
                } else {
                    text.trim().to_string()
                }
            });

        warn!("Backend returned {}: {}", status.as_u16(), message);
        Err(ApiError::from_status(status, message))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}
