//! # Waypoint Demo
//!
//! Drives a scripted browsing session against the navigator: an in-memory
//! host, an in-process bus with a small route table, and a list of address
//! bar edits, back/forward steps and bus navigations.
//!
//! ## Usage
//!
//! ```bash
//! # Run the built-in script
//! waypoint
//!
//! # Run with a specific config file
//! waypoint --config /path/to/waypoint.toml
//!
//! # Run with environment variables
//! WAYPOINT_START_URL='somepage#document/readme' WAYPOINT_METRICS__ENABLED=true waypoint
//! ```

mod config;
mod metrics;
mod routes;
mod session;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waypoint=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_args(std::env::args().skip(1))?;

    tracing::info!("Starting Waypoint session at {}", config.start_url);

    // Initialize metrics
    metrics::init_metrics();
    if config.metrics.enabled {
        metrics::start_metrics_server(config.metrics.port)?;
    }

    let summary = session::run(config).await?;
    tracing::info!(
        address = %summary.address,
        page = %summary.page,
        history = summary.history.len(),
        "Session finished"
    );

    Ok(())
}
