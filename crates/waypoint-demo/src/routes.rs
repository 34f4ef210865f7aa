//! The demo's application table and the page they render to.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::info;
use waypoint_bus::{Bus, BusError, Request, WILDCARD};
use waypoint_protocol::{Application, Route, Teardown};

/// How long the stateful application takes to tear down.
pub const STATEFUL_TEARDOWN: Duration = Duration::from_secs(1);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct PageState {
    text: String,
    classes: Vec<String>,
}

/// The single content area applications render into.
#[derive(Debug, Default)]
pub struct Page {
    state: Mutex<PageState>,
}

impl Page {
    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the content area with a fresh, empty one.
    pub fn clean(&self) {
        *self.state() = PageState::default();
        info!("Page cleaned");
    }

    /// Render `text` and tag the page with `class`.
    pub fn render(&self, text: impl Into<String>, class: &str) {
        let mut state = self.state();
        state.text = text.into();
        state.classes.push(class.to_string());
        info!(class, text = %state.text, "Page rendered");
    }

    /// Current text.
    #[must_use]
    pub fn text(&self) -> String {
        self.state().text.clone()
    }

    /// Current classes.
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.state().classes.clone()
    }
}

fn under(app_route: &Route, segments: &[&str]) -> Route {
    app_route.concat(&Route::from(segments))
}

/// Mount the demo applications under `app_route`:
///
/// | route | reply |
/// |---|---|
/// | `index` | index page |
/// | `document/**` | document page |
/// | `stateful/**` | document page with a one second teardown |
/// | `redirect/**` | 301 to the captured route |
/// | `throw/**` | 500 with the captured route as message |
/// | `bad/route` | status 999 |
/// | `error` | error page showing `body.error` |
///
/// # Errors
///
/// Returns an error if the bus refuses a mount.
pub fn mount_routes(bus: &Bus, app_route: &Route, page: &Arc<Page>) -> Result<(), BusError> {
    let p = page.clone();
    bus.mount(under(app_route, &["index"]), move |req: Request| {
        let page = p.clone();
        req.respond(Application::new(move || {
            page.render("This is the index page.", "index");
            Teardown::None
        }));
    })?;

    let p = page.clone();
    bus.mount(under(app_route, &["document", WILDCARD]), move |req: Request| {
        let page = p.clone();
        let name = req.params.to_string();
        req.respond(Application::new(move || {
            page.render(
                format!("You are now looking at the document {name}"),
                "document",
            );
            Teardown::None
        }));
    })?;

    let p = page.clone();
    bus.mount(under(app_route, &["stateful", WILDCARD]), move |req: Request| {
        let page = p.clone();
        let name = req.params.to_string();
        req.respond(Application::new(move || {
            page.render(
                format!("You are now looking at the STATEFUL document {name}"),
                "document",
            );
            Teardown::deferred(move || async move {
                info!(document = %name, "Cleaning up");
                page.render(
                    format!("Cleaning up the state of {name} before leaving"),
                    "cleaning",
                );
                tokio::time::sleep(STATEFUL_TEARDOWN).await;
                info!(document = %name, "Done cleaning");
            })
        }));
    })?;

    bus.mount(under(app_route, &["redirect", WILDCARD]), |req: Request| {
        req.respond_with(req.params.clone(), 301);
    })?;

    bus.mount(under(app_route, &["throw", WILDCARD]), |req: Request| {
        req.respond_with(req.params.to_string(), 500);
    })?;

    bus.mount(under(app_route, &["bad", "route"]), |req: Request| {
        req.respond_with("This is not valid", 999);
    })?;

    let p = page.clone();
    bus.mount(under(app_route, &["error"]), move |req: Request| {
        let page = p.clone();
        let message = req.body["error"].as_str().unwrap_or_default().to_string();
        req.respond(Application::new(move || {
            page.render(format!("Oops, that's an error: {message}"), "error");
            Teardown::None
        }));
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use waypoint_protocol::StatusCode;

    const TIMEOUT: Duration = Duration::from_millis(10);

    fn setup() -> (Bus, Arc<Page>) {
        let bus = Bus::new();
        let page = Arc::new(Page::default());
        mount_routes(&bus, &Route::from(["app"]), &page).unwrap();
        (bus, page)
    }

    #[tokio::test]
    async fn test_document_renders_captured_route() {
        let (bus, page) = setup();
        let reply = bus
            .request(&Route::from(["app", "document", "a", "b"]), json!({}), TIMEOUT)
            .await;
        assert_eq!(reply.status, StatusCode::OK);

        let teardown = reply.body.into_application().unwrap().start();
        assert!(teardown.is_none());
        assert_eq!(page.text(), "You are now looking at the document a/b");
        assert_eq!(page.classes(), vec!["document".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stateful_teardown_is_deferred() {
        let (bus, page) = setup();
        let reply = bus
            .request(&Route::from(["app", "stateful", "draft"]), json!({}), TIMEOUT)
            .await;
        let teardown = reply.body.into_application().unwrap().start();
        assert!(!teardown.is_none());

        let started = tokio::time::Instant::now();
        teardown.close().await;
        assert!(started.elapsed() >= STATEFUL_TEARDOWN);
        assert!(page.classes().contains(&"cleaning".to_string()));
    }

    #[tokio::test]
    async fn test_redirect_and_failures() {
        let (bus, _page) = setup();

        let reply = bus
            .request(&Route::from(["app", "redirect", "index"]), json!({}), TIMEOUT)
            .await;
        assert_eq!(reply.status, StatusCode::MOVED_PERMANENTLY);
        assert_eq!(reply.body.as_route(), Some(Route::from(["index"])));

        let reply = bus
            .request(&Route::from(["app", "throw", "broken"]), json!({}), TIMEOUT)
            .await;
        assert_eq!(reply.status, StatusCode::INTERNAL_ERROR);
        assert_eq!(reply.body.to_string(), "broken");

        let reply = bus
            .request(&Route::from(["app", "bad", "route"]), json!({}), TIMEOUT)
            .await;
        assert_eq!(reply.status, StatusCode::from(999));
    }

    #[tokio::test]
    async fn test_error_app_shows_message() {
        let (bus, page) = setup();
        let reply = bus
            .request(
                &Route::from(["app", "error"]),
                json!({ "error": "500 : broken" }),
                TIMEOUT,
            )
            .await;
        let _teardown = reply.body.into_application().unwrap().start();
        assert_eq!(page.text(), "Oops, that's an error: 500 : broken");
    }

    #[test]
    fn test_page_clean() {
        let page = Page::default();
        page.render("hello", "index");
        page.clean();
        assert_eq!(page.text(), "");
        assert!(page.classes().is_empty());
    }
}
