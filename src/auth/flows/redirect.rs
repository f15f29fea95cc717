//! Cancellable delayed navigation.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use super::{Navigator, Route};

/// At most one pending navigation. Scheduling again replaces it; dropping
/// the timer cancels it.
#[derive(Debug, Default)]
pub struct RedirectTimer {
    handle: Option<JoinHandle<()>>,
}

impl RedirectTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigate to `route` once `delay` has elapsed. Must be called inside a
    /// tokio runtime.
    pub fn schedule(&mut self, navigator: Arc<dyn Navigator>, route: Route, delay: Duration) {
        self.cancel();
        let deadline = Instant::now() + delay;
        self.handle = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            debug!(path = route.path(), "redirect: navigating");
            navigator.navigate(route);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("redirect: cancelled");
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RedirectTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "redirect_test.rs"]
mod tests;
