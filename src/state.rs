use crate::api::ApiClient;
use crate::config::Config;
use crate::review::{ReviewController, ReviewStatusSource};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub config: Arc<Config>,
    pub views: Arc<ViewRegistry>,
}

/// One review controller per open submission view.
pub struct ViewRegistry {
    source: Arc<dyn ReviewStatusSource>,
    views: Mutex<HashMap<u64, ReviewController>>,
}

impl ViewRegistry {
    pub fn new(source: Arc<dyn ReviewStatusSource>) -> Self {
        Self {
            source,
            views: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the controller for `submission_id`, creating and polling it
    /// once if the view was not open yet.
    pub async fn open(&self, submission_id: u64) -> ReviewController {
        let (controller, created) = {
            let mut views = self.views.lock().await;
            match views.get(&submission_id) {
                Some(existing) => (existing.clone(), false),
                None => {
                    let controller = ReviewController::new(submission_id, self.source.clone());
                    views.insert(submission_id, controller.clone());
                    (controller, true)
                }
            }
        };

        if created {
            tracing::info!("Opened review view for submission {}", submission_id);
            controller.refresh().await;
        }
        controller
    }

    pub async fn get(&self, submission_id: u64) -> Option<ReviewController> {
        self.views.lock().await.get(&submission_id).cloned()
    }

    /// Tears the view down. Returns false if it was not open.
    pub async fn close(&self, submission_id: u64) -> bool {
        let removed = self.views.lock().await.remove(&submission_id);
        match removed {
            Some(controller) => {
                controller.close();
                true
            }
            None => false,
        }
    }

    pub async fn close_all(&self) {
        let drained: Vec<ReviewController> = self.views.lock().await.drain().map(|(_, c)| c).collect();
        for controller in drained {
            controller.close();
        }
    }

    pub async fn len(&self) -> usize {
        self.views.lock().await.len()
    }
}
