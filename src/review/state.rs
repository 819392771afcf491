//! Lifecycle states as seen by one submission view.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{ApiError, ReviewRequestStatus, ReviewStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReviewState {
    NoRequest,
    Pending { seconds_remaining: u32 },
    Submitted,
    Reviewed { reviewed_at: Option<DateTime<Utc>> },
}

impl ReviewState {
    /// Derives the displayed state from an authoritative snapshot.
    pub fn from_snapshot(snapshot: &ReviewStatus) -> Self {
        let Some(request) = &snapshot.review_request else {
            return ReviewState::NoRequest;
        };

        match request.status {
            ReviewRequestStatus::Reviewed => ReviewState::Reviewed {
                reviewed_at: request.reviewed_at,
            },
            ReviewRequestStatus::Pending if snapshot.has_active_request => ReviewState::Pending {
                seconds_remaining: snapshot.seconds_remaining.unwrap_or(0),
            },
            ReviewRequestStatus::Submitted if snapshot.has_active_request => ReviewState::Submitted,
            _ => ReviewState::NoRequest,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ReviewState::Pending { .. })
    }

    pub fn seconds_remaining(&self) -> Option<u32> {
        match self {
            ReviewState::Pending { seconds_remaining } => Some(*seconds_remaining),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Refresh,
    Request,
    Cancel,
}

impl std::fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReviewAction::Refresh => "refresh",
            ReviewAction::Request => "request",
            ReviewAction::Cancel => "cancel",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Transient; the user may retry. Local state is left alone.
    NetworkFailure,
    /// The backend moved first; the next poll decides what to show.
    Conflict,
    /// The request id is stale. Handled like `Conflict`.
    NotFound,
}

impl FailureKind {
    pub fn needs_reconcile(&self) -> bool {
        matches!(self, FailureKind::Conflict | FailureKind::NotFound)
    }
}

/// Last failure reported by the controller, kept alongside the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewError {
    pub action: ReviewAction,
    pub kind: FailureKind,
    pub message: String,
}

impl ReviewError {
    pub fn new(action: ReviewAction, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            action,
            kind,
            message: message.into(),
        }
    }

    pub fn from_api(action: ReviewAction, err: &ApiError) -> Self {
        let kind = match err {
            ApiError::NotFound(_) => FailureKind::NotFound,
            ApiError::Conflict(_) | ApiError::Rejected(_) => FailureKind::Conflict,
            ApiError::Network(_)
            | ApiError::Unauthorized(_)
            | ApiError::Server { .. }
            | ApiError::InvalidResponse(_) => FailureKind::NetworkFailure,
        };
        Self::new(action, kind, err.to_string())
    }
}

impl std::fmt::Display for ReviewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.action, self.message)
    }
}

/// Everything the rendering layer needs; published on every change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReviewView {
    /// `None` until the first snapshot has been applied.
    pub state: Option<ReviewState>,
    pub request_id: Option<u64>,
    pub last_error: Option<ReviewError>,
    pub requesting: bool,
    pub cancelling: bool,
}
