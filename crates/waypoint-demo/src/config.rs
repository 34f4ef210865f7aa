//! Demo configuration.
//!
//! Configuration is loaded from:
//! - `--config <path>` (that file only)
//! - otherwise `waypoint.toml` from the first search path that has one,
//!   layered with environment variables (`WAYPOINT_*`, nested keys joined
//!   with `__`)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use waypoint_core::NavigatorSettings;
use waypoint_protocol::Route;

/// Config file search paths, in order.
const CONFIG_PATHS: [&str; 3] = [
    "waypoint.toml",
    "/etc/waypoint/waypoint.toml",
    "~/.config/waypoint/waypoint.toml",
];

/// Command-line usage.
const USAGE: &str = "Usage: waypoint [--config <path>]";

/// Environment variable prefix.
const ENV_PREFIX: &str = "WAYPOINT";

/// Demo configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address the session starts at, e.g. `somepage#document/readme`.
    #[serde(default = "default_start_url")]
    pub start_url: String,

    /// Steps to play after the navigator starts.
    #[serde(default = "default_script")]
    pub script: Vec<ScriptStep>,

    /// How long to wait after the last step before finishing.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Navigator settings.
    #[serde(default)]
    pub navigator: NavigatorSettings,
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// What to do.
    #[serde(flatten)]
    pub action: Action,

    /// Delay before the step, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl ScriptStep {
    /// The delay before the step.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// A scripted browsing action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Type a fragment into the address bar.
    Visit {
        /// The fragment, with or without `#`.
        fragment: String,
    },
    /// Press back.
    Back,
    /// Press forward.
    Forward,
    /// Ask for navigation over the bus.
    Navigate {
        /// Route to navigate to.
        route: Route,
    },
}

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable the Prometheus endpoint.
    #[serde(default)]
    pub enabled: bool,

    /// Metrics port.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_start_url() -> String {
    "somepage".to_string()
}

fn default_delay_ms() -> u64 {
    500
}

fn default_settle_ms() -> u64 {
    2_000
}

fn default_metrics_port() -> u16 {
    9090
}

fn visit(fragment: &str) -> ScriptStep {
    ScriptStep {
        action: Action::Visit {
            fragment: fragment.to_string(),
        },
        delay_ms: default_delay_ms(),
    }
}

fn default_script() -> Vec<ScriptStep> {
    vec![
        visit("document/readme"),
        visit("stateful/draft"),
        visit("redirect/document/moved"),
        // Leaving stateful/draft takes a second to tear down.
        ScriptStep {
            action: Action::Back,
            delay_ms: 1_500,
        },
        visit("throw/broken"),
        visit("bad/route"),
        visit("nowhere"),
        ScriptStep {
            action: Action::Navigate {
                route: Route::from(["document", "final"]),
            },
            delay_ms: default_delay_ms(),
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_url: default_start_url(),
            script: default_script(),
            settle_ms: default_settle_ms(),
            metrics: MetricsConfig::default(),
            navigator: NavigatorSettings::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, layered with
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed, or an
    /// environment override has the wrong type.
    pub fn load() -> Result<Self> {
        let path = CONFIG_PATHS
            .iter()
            .map(|path| shellexpand::tilde(path).into_owned())
            .find(|path| Path::new(path).exists());
        Self::layered(path.as_deref())
    }

    /// Build configuration from an optional file plus environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an override cannot be deserialized.
    pub fn layered(path: Option<&str>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            info!("Loading configuration from {}", path);
            builder = builder.add_source(::config::File::new(path, ::config::FileFormat::Toml));
        }

        builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Load configuration from a specific file, without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration as selected by command-line `args` (program name
    /// excluded): none searches the default paths, `--config <path>` reads
    /// that file only.
    ///
    /// # Errors
    ///
    /// Returns an error on any other arguments, or if loading fails.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        match args.as_slice() {
            [] => Self::load(),
            [flag, path] if flag == "--config" => Self::from_file(path),
            _ => bail!("Unrecognized arguments: {}\n{USAGE}", args.join(" ")),
        }
    }

    /// How long to wait after the last step.
    #[must_use]
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.start_url, "somepage");
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.port, 9090);
        assert_eq!(config.navigator.index_route, Route::from(["index"]));
        assert!(!config.script.is_empty());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            start_url = "somepage#document/readme"
            settle_ms = 100

            [[script]]
            action = "visit"
            fragment = "stateful/draft"
            delay_ms = 10

            [[script]]
            action = "back"

            [[script]]
            action = "navigate"
            route = ["document", "other"]

            [navigator]
            index_route = ["home"]

            [navigator.app_options]
            timeout_ms = 50
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.start_url, "somepage#document/readme");
        assert_eq!(config.settle(), Duration::from_millis(100));
        assert_eq!(
            config.script,
            vec![
                ScriptStep {
                    action: Action::Visit {
                        fragment: "stateful/draft".into()
                    },
                    delay_ms: 10,
                },
                ScriptStep {
                    action: Action::Back,
                    delay_ms: 500,
                },
                ScriptStep {
                    action: Action::Navigate {
                        route: Route::from(["document", "other"])
                    },
                    delay_ms: 500,
                },
            ]
        );
        assert_eq!(config.navigator.index_route, Route::from(["home"]));
        assert_eq!(config.navigator.app_route, Route::from(["app"]));
        assert_eq!(config.navigator.app_options.timeout_ms, 50);
    }

    #[test]
    fn test_config_from_file() {
        let path = std::env::temp_dir().join(format!("waypoint-test-{}.toml", std::process::id()));
        std::fs::write(&path, "start_url = \"page#index\"\n[metrics]\nenabled = true\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.start_url, "page#index");
        assert!(config.metrics.enabled);

        let layered = Config::layered(path.to_str()).unwrap();
        assert_eq!(layered.start_url, "page#index");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::from_file("/nonexistent/waypoint.toml").is_err());
    }

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| (*arg).to_string()).collect()
    }

    #[test]
    fn test_unrecognized_arguments_are_rejected() {
        for bad in [
            args(&["--confg", "waypoint.toml"]),
            args(&["--help"]),
            args(&["--config"]),
            args(&["--config", "a.toml", "extra"]),
        ] {
            let err = Config::from_args(bad.clone()).unwrap_err();
            assert!(
                err.to_string().contains("Unrecognized arguments"),
                "{bad:?}: {err}"
            );
        }
    }

    #[test]
    fn test_config_flag_reads_that_file() {
        let path = std::env::temp_dir().join(format!("waypoint-args-{}.toml", std::process::id()));
        std::fs::write(&path, "start_url = \"page#document/a\"\n").unwrap();

        let config =
            Config::from_args(args(&["--config", path.to_str().unwrap()])).unwrap();
        assert_eq!(config.start_url, "page#document/a");

        std::fs::remove_file(&path).unwrap();
        assert!(Config::from_args(args(&["--config", "/nonexistent/waypoint.toml"])).is_err());
    }
}
