//! Scripted browsing session.

use crate::config::{Action, Config};
use crate::routes::{mount_routes, Page};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use waypoint_bus::{Bus, Request, WILDCARD};
use waypoint_core::navigator::{ERROR_SEGMENT, NAVIGATE_SEGMENT};
use waypoint_core::{Navigator, NavigatorConfig};
use waypoint_host::MemoryHost;
use waypoint_protocol::Route;

/// Where a session ended up.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Final address.
    pub address: String,
    /// Final page text.
    pub page: String,
    /// Session history, oldest first.
    pub history: Vec<String>,
}

/// Play `config.script` against a fresh bus, host and navigator.
///
/// # Errors
///
/// Returns an error if the route table cannot be mounted.
pub async fn run(config: Config) -> Result<Summary> {
    let bus = Arc::new(Bus::new());
    let page = Arc::new(Page::default());
    mount_routes(&bus, &config.navigator.app_route, &page)?;

    bus.mount([ERROR_SEGMENT, WILDCARD], |req: Request| {
        warn!(
            route = %req.params,
            message = %req.body["message"],
            "Navigation error reported"
        );
    })?;

    let host = Arc::new(MemoryHost::new(&config.start_url));
    let clean = page.clone();
    let navigator_config =
        NavigatorConfig::from_settings(config.navigator.clone()).with_clean_page(move || {
            clean.clean();
        });
    let navigator = Navigator::new(host.clone(), bus.clone(), navigator_config);
    navigator.mount_on(&bus)?;
    navigator.start();

    for step in &config.script {
        tokio::time::sleep(step.delay()).await;
        info!(action = ?step.action, "Script step");
        match &step.action {
            Action::Visit { fragment } => host.set_fragment(fragment),
            Action::Back => {
                if !host.back() {
                    warn!("Nothing to go back to");
                }
            }
            Action::Forward => {
                if !host.forward() {
                    warn!("Nothing to go forward to");
                }
            }
            Action::Navigate { route } => {
                let to = Route::from([NAVIGATE_SEGMENT]).concat(route);
                bus.send(&to, serde_json::Value::Null);
            }
        }
    }

    tokio::time::sleep(config.settle()).await;

    let summary = Summary {
        address: host.address(),
        page: page.text(),
        history: host.entries(),
    };
    for (index, entry) in summary.history.iter().enumerate() {
        info!(index, entry = %entry, "History entry");
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScriptStep;

    fn step(action: Action) -> ScriptStep {
        ScriptStep {
            action,
            delay_ms: 100,
        }
    }

    fn visit(fragment: &str) -> ScriptStep {
        step(Action::Visit {
            fragment: fragment.to_string(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_starts_at_index() {
        let config = Config {
            script: Vec::new(),
            ..Config::default()
        };
        let summary = run(config).await.unwrap();
        assert_eq!(summary.address, "somepage#index");
        assert_eq!(summary.page, "This is the index page.");
        assert_eq!(summary.history, vec!["somepage#index".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_redirect_and_back() {
        let config = Config {
            script: vec![
                visit("document/readme"),
                visit("redirect/document/moved"),
                step(Action::Back),
            ],
            ..Config::default()
        };
        let summary = run(config).await.unwrap();
        assert_eq!(summary.address, "somepage#document/readme");
        assert_eq!(summary.page, "You are now looking at the document readme");
        assert_eq!(
            summary.history,
            vec![
                "somepage#index".to_string(),
                "somepage#document/readme".to_string(),
                "somepage#document/moved".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_error_page() {
        let config = Config {
            start_url: "somepage#throw/broken".to_string(),
            script: Vec::new(),
            ..Config::default()
        };
        let summary = run(config).await.unwrap();
        assert_eq!(summary.page, "Oops, that's an error: 500 : broken");
        assert_eq!(summary.address, "somepage#throw/broken");
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_navigate_over_bus() {
        let config = Config {
            script: vec![step(Action::Navigate {
                route: Route::from(["document", "final"]),
            })],
            ..Config::default()
        };
        let summary = run(config).await.unwrap();
        assert_eq!(summary.address, "somepage#document/final");
        assert_eq!(summary.page, "You are now looking at the document final");
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_script_runs() {
        let summary = run(Config::default()).await.unwrap();
        assert_eq!(summary.address, "somepage#document/final");
    }
}
