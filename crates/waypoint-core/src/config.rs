//! Navigator configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use waypoint_protocol::Route;

/// Timeout for the error-application request.
///
/// Fixed, independent of [`AppOptions::timeout_ms`].
pub const ERROR_APP_TIMEOUT: Duration = Duration::from_millis(100);

/// Segment appended to the application route to reach the error application.
pub const ERROR_APP_SEGMENT: &str = "error";

/// Maximum number of consecutive 301 hops before giving up.
pub const MAX_REDIRECTS: u32 = 16;

/// Callback that clears the page between closing one application and
/// starting the next.
pub type CleanPage = Arc<dyn Fn() + Send + Sync>;

/// Request tuning for application requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppOptions {
    /// Application request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl AppOptions {
    /// The request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Serializable navigator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigatorSettings {
    /// Prefix under which applications are resolved.
    #[serde(default = "default_app_route")]
    pub app_route: Route,

    /// Fallback "home" route.
    #[serde(default = "default_index_route")]
    pub index_route: Route,

    /// Application request tuning.
    #[serde(default)]
    pub app_options: AppOptions,

    /// Value sent as the body of every application request.
    #[serde(default = "default_globals")]
    pub globals: serde_json::Value,
}

// Default value functions
fn default_timeout_ms() -> u64 {
    10
}

fn default_app_route() -> Route {
    Route::from(["app"])
}

fn default_index_route() -> Route {
    Route::from(["index"])
}

fn default_globals() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            app_route: default_app_route(),
            index_route: default_index_route(),
            app_options: AppOptions::default(),
            globals: default_globals(),
        }
    }
}

/// Immutable navigator configuration.
#[derive(Clone)]
pub struct NavigatorConfig {
    /// Prefix under which applications are resolved.
    pub app_route: Route,
    /// Fallback "home" route.
    pub index_route: Route,
    /// Application request tuning.
    pub app_options: AppOptions,
    /// Invoked between closing the previous application and starting the next.
    pub clean_page: CleanPage,
    /// Value sent as the body of every application request.
    pub globals: serde_json::Value,
}

impl NavigatorConfig {
    /// Build a configuration from settings, with a no-op `clean_page`.
    #[must_use]
    pub fn from_settings(settings: NavigatorSettings) -> Self {
        Self {
            app_route: settings.app_route,
            index_route: settings.index_route,
            app_options: settings.app_options,
            clean_page: Arc::new(|| {}),
            globals: settings.globals,
        }
    }

    /// Replace the `clean_page` callback.
    #[must_use]
    pub fn with_clean_page<F>(mut self, clean_page: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.clean_page = Arc::new(clean_page);
        self
    }

    /// Replace the globals.
    #[must_use]
    pub fn with_globals(mut self, globals: serde_json::Value) -> Self {
        self.globals = globals;
        self
    }

    /// Replace the application request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.app_options.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// The route of the error application.
    #[must_use]
    pub fn error_app_route(&self) -> Route {
        self.app_route.clone().child(ERROR_APP_SEGMENT)
    }

    /// Globals merged with `{ "error": message }`.
    ///
    /// Non-object globals are replaced by the error object.
    #[must_use]
    pub fn error_body(&self, message: &str) -> serde_json::Value {
        let mut map = match &self.globals {
            serde_json::Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        map.insert(
            "error".to_string(),
            serde_json::Value::String(message.to_string()),
        );
        serde_json::Value::Object(map)
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self::from_settings(NavigatorSettings::default())
    }
}

impl fmt::Debug for NavigatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigatorConfig")
            .field("app_route", &self.app_route)
            .field("index_route", &self.index_route)
            .field("app_options", &self.app_options)
            .field("globals", &self.globals)
            .finish_non_exhaustive()
    }
}
