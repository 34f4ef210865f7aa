//! Application start and teardown capabilities.
//!
//! An [`Application`] is what a successful app request yields: a single-use
//! start function. Starting it returns a [`Teardown`] that the navigator
//! invokes before the next application starts.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::fmt;
use std::future::Future;

type StartFn = Box<dyn FnOnce() -> Teardown + Send>;

/// A single-use application start function.
pub struct Application {
    start: StartFn,
}

impl Application {
    /// Wrap a start function.
    pub fn new<F>(start: F) -> Self
    where
        F: FnOnce() -> Teardown + Send + 'static,
    {
        Self {
            start: Box::new(start),
        }
    }

    /// An application whose start does nothing and needs no teardown.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|| Teardown::None)
    }

    /// Run the start function, consuming the application.
    #[must_use = "the teardown must be stored to close the application later"]
    pub fn start(self) -> Teardown {
        (self.start)()
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Application(..)")
    }
}

/// The teardown capability of a running application.
#[derive(Default)]
pub enum Teardown {
    /// Nothing to close.
    #[default]
    None,
    /// Closes synchronously.
    Sync(Box<dyn FnOnce() + Send>),
    /// Closes once the returned future resolves.
    Deferred(Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>),
}

impl Teardown {
    /// A teardown that completes as soon as `f` returns.
    pub fn sync<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Teardown::Sync(Box::new(f))
    }

    /// A teardown that completes when the future produced by `f` resolves.
    pub fn deferred<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Teardown::Deferred(Box::new(move || f().boxed()))
    }

    /// Whether this teardown does nothing.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Teardown::None)
    }

    /// Close the application and wait for its cleanup to finish.
    pub async fn close(self) {
        match self {
            Teardown::None => {}
            Teardown::Sync(f) => f(),
            Teardown::Deferred(f) => f().await,
        }
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Teardown::None => f.write_str("Teardown::None"),
            Teardown::Sync(_) => f.write_str("Teardown::Sync(..)"),
            Teardown::Deferred(_) => f.write_str("Teardown::Deferred(..)"),
        }
    }
}

impl From<()> for Teardown {
    fn from((): ()) -> Self {
        Teardown::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_start_yields_teardown() {
        let closed = Arc::new(AtomicBool::new(false));
        let flag = closed.clone();
        let app = Application::new(move || Teardown::sync(move || flag.store(true, Ordering::SeqCst)));

        let teardown = app.start();
        assert!(!closed.load(Ordering::SeqCst));
        teardown.close().await;
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_deferred_teardown_awaits_future() {
        let closed = Arc::new(AtomicBool::new(false));
        let flag = closed.clone();
        let teardown = Teardown::deferred(move || async move {
            tokio::task::yield_now().await;
            flag.store(true, Ordering::SeqCst);
        });

        teardown.close().await;
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_noop_application() {
        let teardown = Application::noop().start();
        assert!(teardown.is_none());
        teardown.close().await;
    }
}
