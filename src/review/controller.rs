//! Review-request lifecycle for one submission view.
//!
//! The backend owns the review request. The controller keeps a local
//! projection of the last applied snapshot, runs the cancel-window countdown
//! while that snapshot says `pending`, and re-polls whenever its own guess
//! could be wrong: after every command and when the countdown runs out.
//!
//! Commands are not serialized. Ordering between concurrent polls is settled
//! by sequence numbers: a snapshot is applied only if nothing issued later
//! has been applied first. After `close()` every late response is dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::clock::{Clock, ClockEvent};
use super::source::ReviewStatusSource;
use super::state::{FailureKind, ReviewAction, ReviewError, ReviewState, ReviewView};
use crate::api::ReviewStatus;

#[derive(Clone)]
pub struct ReviewController {
    inner: Arc<Inner>,
}

struct Inner {
    submission_id: u64,
    source: Arc<dyn ReviewStatusSource>,
    core: Mutex<Core>,
    updates: watch::Sender<ReviewView>,
}

struct Core {
    view: ReviewView,
    clock: Clock,
    /// Bumped on every start/stop so ticks from a replaced run are ignored.
    clock_generation: u64,
    polls_issued: u64,
    polls_applied: u64,
    requests_in_flight: u32,
    cancels_in_flight: u32,
    closed: bool,
}

impl ReviewController {
    pub fn new(submission_id: u64, source: Arc<dyn ReviewStatusSource>) -> Self {
        Self::with_clock(submission_id, source, Clock::new())
    }

    pub fn with_clock(submission_id: u64, source: Arc<dyn ReviewStatusSource>, clock: Clock) -> Self {
        let (updates, _rx) = watch::channel(ReviewView::default());
        Self {
            inner: Arc::new(Inner {
                submission_id,
                source,
                core: Mutex::new(Core {
                    view: ReviewView::default(),
                    clock,
                    clock_generation: 0,
                    polls_issued: 0,
                    polls_applied: 0,
                    requests_in_flight: 0,
                    cancels_in_flight: 0,
                    closed: false,
                }),
                updates,
            }),
        }
    }

    pub fn submission_id(&self) -> u64 {
        self.inner.submission_id
    }

    pub fn view(&self) -> ReviewView {
        self.lock().view.clone()
    }

    /// Receives the view every time it changes.
    pub fn subscribe(&self) -> watch::Receiver<ReviewView> {
        self.inner.updates.subscribe()
    }

    pub fn is_clock_running(&self) -> bool {
        self.lock().clock.is_running()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Polls the backend and adopts the snapshot unless it is stale.
    pub async fn refresh(&self) {
        let seq = {
            let mut core = self.lock();
            if core.closed {
                return;
            }
            core.polls_issued += 1;
            core.polls_issued
        };

        let result = self.inner.source.fetch_status(self.inner.submission_id).await;

        let mut core = self.lock();
        if core.closed {
            debug!(
                "Dropping review status for closed view of submission {}",
                self.inner.submission_id
            );
            return;
        }
        if seq <= core.polls_applied {
            debug!(
                "Dropping stale review status #{} for submission {} (#{} already applied)",
                seq, self.inner.submission_id, core.polls_applied
            );
            return;
        }

        match result {
            Ok(snapshot) => {
                core.polls_applied = seq;
                // Command failures stay visible until the next command succeeds.
                let poll_failed = core
                    .view
                    .last_error
                    .as_ref()
                    .is_some_and(|e| e.action == ReviewAction::Refresh);
                if poll_failed {
                    core.view.last_error = None;
                }
                self.apply_snapshot(&mut core, &snapshot);
            }
            Err(e) => {
                let error = ReviewError::from_api(ReviewAction::Refresh, &e);
                warn!(
                    "Review status poll for submission {} failed: {}",
                    self.inner.submission_id, error
                );
                core.view.last_error = Some(error);
            }
        }
        self.publish(&core);
    }

    /// Asks for a review and seeds the countdown from the response.
    pub async fn request_review(&self) {
        {
            let mut core = self.lock();
            if core.closed {
                return;
            }
            core.requests_in_flight += 1;
            core.view.requesting = true;
            self.publish(&core);
        }

        let result = self
            .inner
            .source
            .request_review(self.inner.submission_id)
            .await;

        let mut core = self.lock();
        core.requests_in_flight = core.requests_in_flight.saturating_sub(1);
        core.view.requesting = core.requests_in_flight > 0;
        if core.closed {
            debug!(
                "Dropping review request result for closed view of submission {}",
                self.inner.submission_id
            );
            return;
        }

        let reconcile = match result {
            Ok(response) => {
                let seconds = response.seconds_to_cancel;
                info!(
                    "Review requested for submission {} ({}s to cancel)",
                    self.inner.submission_id, seconds
                );
                core.view.last_error = None;
                core.view.request_id = response.review_request.map(|r| r.id);
                core.view.state = Some(ReviewState::Pending {
                    seconds_remaining: seconds,
                });
                // Anything polled before this response is older than it.
                core.polls_applied = core.polls_issued;
                if seconds > 0 {
                    self.start_clock(&mut core, seconds);
                } else {
                    self.stop_clock(&mut core);
                }
                true
            }
            Err(e) => self.record_failure(&mut core, ReviewError::from_api(ReviewAction::Request, &e)),
        };

        self.publish(&core);
        drop(core);
        if reconcile {
            self.schedule_refresh();
        }
    }

    /// Cancels the pending request while the window is still open.
    pub async fn cancel_review(&self) {
        let request_id = {
            let mut core = self.lock();
            if core.closed {
                return;
            }

            let outcome = match (core.view.state, core.view.request_id) {
                (Some(ReviewState::Pending { seconds_remaining }), Some(id)) if seconds_remaining > 0 => {
                    Ok(id)
                }
                (Some(ReviewState::Pending { seconds_remaining: 0 }), _) => {
                    Err("the cancellation window has elapsed")
                }
                (Some(ReviewState::Pending { .. }), None) => Err("the review request is not known yet"),
                _ => Err("there is no pending review request"),
            };

            match outcome {
                Ok(id) => {
                    core.cancels_in_flight += 1;
                    core.view.cancelling = true;
                    self.publish(&core);
                    id
                }
                Err(reason) => {
                    let error = ReviewError::new(ReviewAction::Cancel, FailureKind::Conflict, reason);
                    let reconcile = self.record_failure(&mut core, error);
                    self.publish(&core);
                    drop(core);
                    if reconcile {
                        self.schedule_refresh();
                    }
                    return;
                }
            }
        };

        let result = self.inner.source.cancel_review(request_id).await;

        let mut core = self.lock();
        core.cancels_in_flight = core.cancels_in_flight.saturating_sub(1);
        core.view.cancelling = core.cancels_in_flight > 0;
        if core.closed {
            debug!(
                "Dropping cancel result for closed view of submission {}",
                self.inner.submission_id
            );
            return;
        }

        let reconcile = match result {
            Ok(()) => {
                info!(
                    "Review request {} for submission {} cancelled",
                    request_id, self.inner.submission_id
                );
                core.view.last_error = None;
                self.stop_clock(&mut core);
                core.view.state = Some(ReviewState::NoRequest);
                core.view.request_id = None;
                core.polls_applied = core.polls_issued;
                true
            }
            Err(e) => self.record_failure(&mut core, ReviewError::from_api(ReviewAction::Cancel, &e)),
        };

        self.publish(&core);
        drop(core);
        if reconcile {
            self.schedule_refresh();
        }
    }

    /// Tears the view down. Later responses and ticks are ignored.
    pub fn close(&self) {
        let mut core = self.lock();
        if core.closed {
            return;
        }
        core.closed = true;
        self.stop_clock(&mut core);
        info!("Closed review view for submission {}", self.inner.submission_id);
    }

    fn apply_snapshot(&self, core: &mut Core, snapshot: &ReviewStatus) {
        let state = ReviewState::from_snapshot(snapshot);

        match state {
            ReviewState::Pending { seconds_remaining } if seconds_remaining > 0 => {
                self.start_clock(core, seconds_remaining);
            }
            _ => self.stop_clock(core),
        }

        core.view.request_id = match state {
            ReviewState::NoRequest => None,
            _ => snapshot.review_request.as_ref().map(|r| r.id),
        };

        if core.view.state.map(|s| std::mem::discriminant(&s)) != Some(std::mem::discriminant(&state)) {
            info!(
                "Submission {} review state: {:?} -> {:?}",
                self.inner.submission_id, core.view.state, state
            );
        }
        core.view.state = Some(state);
    }

    /// Returns whether a reconciling poll should follow.
    fn record_failure(&self, core: &mut Core, error: ReviewError) -> bool {
        warn!(
            "Review command for submission {} failed: {}",
            self.inner.submission_id, error
        );
        let reconcile = error.kind.needs_reconcile();
        core.view.last_error = Some(error);
        reconcile
    }

    fn start_clock(&self, core: &mut Core, seconds: u32) {
        core.clock_generation += 1;
        let generation = core.clock_generation;
        let weak = Arc::downgrade(&self.inner);

        core.clock.start(seconds, move |event| {
            if let Some(inner) = weak.upgrade() {
                ReviewController { inner }.on_clock_event(generation, event);
            }
        });
    }

    fn stop_clock(&self, core: &mut Core) {
        core.clock.cancel();
        core.clock_generation += 1;
    }

    fn on_clock_event(&self, generation: u64, event: ClockEvent) {
        let mut core = self.lock();
        if core.closed || generation != core.clock_generation {
            return;
        }

        match event {
            ClockEvent::Tick(remaining) => {
                if let Some(ReviewState::Pending { .. }) = core.view.state {
                    core.view.state = Some(ReviewState::Pending {
                        seconds_remaining: remaining,
                    });
                    self.publish(&core);
                }
            }
            ClockEvent::Expired => {
                info!(
                    "Cancel window for submission {} elapsed locally, reconciling",
                    self.inner.submission_id
                );
                self.stop_clock(&mut core);
                drop(core);
                self.schedule_refresh();
            }
        }
    }

    fn schedule_refresh(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.refresh().await;
        });
    }

    fn publish(&self, core: &Core) {
        let view = &core.view;
        self.inner.updates.send_if_modified(|current| {
            if current == view {
                false
            } else {
                *current = view.clone();
                true
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, Core> {
        self.inner
            .core
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
