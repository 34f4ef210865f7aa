//! Application lifecycle.
//!
//! Owns the single live teardown. Starting the next application always
//! closes the previous one first, then cleans the page, then starts; the
//! transition's currency is re-checked after every step that may have let a
//! newer navigation in.

use crate::config::CleanPage;
use crate::metrics;
use crate::scheduler::{Scheduler, Token};
use tracing::{debug, info};
use waypoint_protocol::{Application, Teardown};

/// Holds the running application's teardown.
pub struct Lifecycle {
    handle: Teardown,
    clean_page: CleanPage,
}

impl Lifecycle {
    /// Create a lifecycle with no running application.
    #[must_use]
    pub fn new(clean_page: CleanPage) -> Self {
        Self {
            handle: Teardown::None,
            clean_page,
        }
    }

    /// Whether an application with a non-trivial teardown is running.
    #[must_use]
    pub fn has_teardown(&self) -> bool {
        !self.handle.is_none()
    }

    /// Close the running application and start `app`.
    ///
    /// Returns `false` if the transition was superseded before the start
    /// step; the previous application stays closed and nothing is started.
    pub async fn run_next(&mut self, scheduler: &Scheduler, token: Token, app: Application) -> bool {
        let previous = std::mem::take(&mut self.handle);
        if !previous.is_none() {
            debug!(%token, "Closing previous application");
        }
        previous.close().await;

        if !scheduler.is_current(token) {
            debug!(%token, "Superseded while closing; not starting");
            metrics::record_aborted();
            return false;
        }

        (self.clean_page)();

        if !scheduler.is_current(token) {
            debug!(%token, "Superseded while cleaning; not starting");
            metrics::record_aborted();
            return false;
        }

        self.handle = app.start();
        metrics::record_started();
        info!(%token, teardown = ?self.handle, "Application started");
        true
    }

    /// Close the running application, leaving nothing running.
    pub async fn close(&mut self) {
        std::mem::take(&mut self.handle).close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use waypoint_protocol::Route;

    type Log = Arc<Mutex<Vec<String>>>;

    fn lifecycle(log: &Log) -> Lifecycle {
        let log = log.clone();
        Lifecycle::new(Arc::new(move || log.lock().unwrap().push("clean".into())))
    }

    fn app(log: &Log, name: &'static str) -> Application {
        let log = log.clone();
        Application::new(move || {
            log.lock().unwrap().push(format!("start {name}"));
            let log = log.clone();
            Teardown::deferred(move || async move {
                tokio::task::yield_now().await;
                log.lock().unwrap().push(format!("close {name}"));
            })
        })
    }

    #[tokio::test]
    async fn test_close_clean_start_order() {
        let log: Log = Arc::default();
        let (scheduler, _rx) = Scheduler::new();
        let mut lifecycle = lifecycle(&log);

        let first = scheduler.enqueue(Route::from(["a"]), 0);
        assert!(lifecycle.run_next(&scheduler, first, app(&log, "a")).await);
        let second = scheduler.enqueue(Route::from(["b"]), 0);
        assert!(lifecycle.run_next(&scheduler, second, app(&log, "b")).await);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["clean", "start a", "close a", "clean", "start b"]
        );
        assert!(lifecycle.has_teardown());
    }

    #[tokio::test]
    async fn test_superseded_during_close_aborts_without_clean() {
        let log: Log = Arc::default();
        let (scheduler, _rx) = Scheduler::new();
        let scheduler = Arc::new(scheduler);
        let mut lifecycle = lifecycle(&log);

        let first = scheduler.enqueue(Route::from(["a"]), 0);
        let sched = scheduler.clone();
        let closing = Application::new(move || {
            Teardown::sync(move || {
                sched.enqueue(Route::from(["c"]), 0);
            })
        });
        assert!(lifecycle.run_next(&scheduler, first, closing).await);

        let second = scheduler.enqueue(Route::from(["b"]), 0);
        assert!(!lifecycle.run_next(&scheduler, second, app(&log, "b")).await);

        // Only the first clean ran; "b" never started and nothing is left to close.
        assert_eq!(*log.lock().unwrap(), vec!["clean"]);
        assert!(!lifecycle.has_teardown());
    }

    #[tokio::test]
    async fn test_missing_teardown_is_noop() {
        let log: Log = Arc::default();
        let (scheduler, _rx) = Scheduler::new();
        let mut lifecycle = lifecycle(&log);

        let token = scheduler.enqueue(Route::from(["a"]), 0);
        assert!(lifecycle.run_next(&scheduler, token, Application::noop()).await);
        assert!(!lifecycle.has_teardown());
        lifecycle.close().await;
    }
}
