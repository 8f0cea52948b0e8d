use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::table::TableView;
use crate::core::config;

/// Watches the activation of the requests page
///
/// The entrance animation plays on every inactive → active edge, after a
/// short delay so the page is laid out first.
pub struct ActivationObserver {
    active: AtomicBool,
    delay: Duration,
    view: Arc<dyn TableView>,
}

impl ActivationObserver {
    pub fn new(view: Arc<dyn TableView>) -> Self {
        Self::with_delay(view, config::table::entrance_delay())
    }

    pub fn with_delay(view: Arc<dyn TableView>, delay: Duration) -> Self {
        Self {
            active: AtomicBool::new(false),
            delay,
            view,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Page class changed; returns whether the animation was played
    pub async fn on_class_change(&self, is_active: bool) -> bool {
        let was_active = self.active.swap(is_active, Ordering::SeqCst);
        if !is_active || was_active {
            return false;
        }

        tokio::time::sleep(self.delay).await;
        log::debug!("[Requests] Page activated, playing entrance");
        self.view.play_entrance();
        true
    }
}
