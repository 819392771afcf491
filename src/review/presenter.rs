use serde::Serialize;

use super::state::{ReviewState, ReviewView};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewPanel {
    pub status: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub countdown: Option<String>,
    pub can_request: bool,
    pub can_cancel: bool,
    pub busy: bool,
    pub reviewed_at: Option<String>,
    pub error: Option<String>,
}

impl ReviewPanel {
    pub fn from_view(view: &ReviewView) -> Self {
        let busy = view.requesting || view.cancelling;
        let (status, label, color) = status_label_color(view.state.as_ref());

        let countdown = view
            .state
            .and_then(|s| s.seconds_remaining())
            .map(format_time);
        let can_cancel = !view.cancelling
            && matches!(view.state, Some(ReviewState::Pending { seconds_remaining }) if seconds_remaining > 0);
        let can_request = !view.requesting
            && matches!(
                view.state,
                Some(ReviewState::NoRequest) | Some(ReviewState::Reviewed { .. })
            );
        let reviewed_at = match view.state {
            Some(ReviewState::Reviewed { reviewed_at }) => {
                reviewed_at.map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
            }
            _ => None,
        };

        Self {
            status,
            label,
            color,
            countdown,
            can_request,
            can_cancel,
            busy,
            reviewed_at,
            error: view.last_error.as_ref().map(|e| e.to_string()),
        }
    }
}

fn status_label_color(state: Option<&ReviewState>) -> (&'static str, &'static str, &'static str) {
    match state {
        None => ("loading", "Loading review status...", "gray"),
        Some(ReviewState::NoRequest) => ("none", "No active request", "gray"),
        Some(ReviewState::Pending { .. }) => ("pending", "Pending (can cancel)", "yellow"),
        Some(ReviewState::Submitted) => ("submitted", "Waiting for Review", "blue"),
        Some(ReviewState::Reviewed { .. }) => ("reviewed", "Reviewed", "green"),
    }
}

/// `m:ss`, e.g. `4:05`.
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
