use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewRequestStatus {
    Pending,
    Submitted,
    Reviewed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub id: u64,
    pub status: ReviewRequestStatus,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Point-in-time snapshot returned by `GET /reviews/{submission_id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStatus {
    pub has_active_request: bool,
    #[serde(default, deserialize_with = "non_negative_seconds")]
    pub seconds_remaining: Option<u32>,
    #[serde(default)]
    pub review_request: Option<ReviewRequest>,
}

impl ReviewStatus {
    pub fn none() -> Self {
        Self {
            has_active_request: false,
            seconds_remaining: None,
            review_request: None,
        }
    }

    pub fn pending(request_id: u64, seconds_remaining: u32) -> Self {
        Self {
            has_active_request: true,
            seconds_remaining: Some(seconds_remaining),
            review_request: Some(ReviewRequest {
                id: request_id,
                status: ReviewRequestStatus::Pending,
                reviewed_at: None,
            }),
        }
    }

    pub fn submitted(request_id: u64) -> Self {
        Self {
            has_active_request: true,
            seconds_remaining: None,
            review_request: Some(ReviewRequest {
                id: request_id,
                status: ReviewRequestStatus::Submitted,
                reviewed_at: None,
            }),
        }
    }

    pub fn reviewed(request_id: u64, reviewed_at: DateTime<Utc>) -> Self {
        Self {
            has_active_request: false,
            seconds_remaining: None,
            review_request: Some(ReviewRequest {
                id: request_id,
                status: ReviewRequestStatus::Reviewed,
                reviewed_at: Some(reviewed_at),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestReviewResponse {
    #[serde(deserialize_with = "required_non_negative_seconds")]
    pub seconds_to_cancel: u32,
    /// The created request, when the backend echoes it back.
    #[serde(default)]
    pub review_request: Option<ReviewRequest>,
}

impl RequestReviewResponse {
    pub fn new(seconds_to_cancel: u32) -> Self {
        Self {
            seconds_to_cancel,
            review_request: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub course_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_points: u32,
}

/// Submission details, only used for display around the review panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: u64,
    pub assignment_id: u64,
    pub student_id: u64,
    #[serde(default)]
    pub repo_url: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignment: Option<Assignment>,
}

/// Error body shape used by the backend (`{"message": "..."}`).
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

fn non_negative_seconds<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<i64> = Option::deserialize(deserializer)?;
    Ok(raw.map(clamp_seconds))
}

fn required_non_negative_seconds<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(clamp_seconds(raw))
}

fn clamp_seconds(raw: i64) -> u32 {
    raw.clamp(0, u32::MAX as i64) as u32
}
