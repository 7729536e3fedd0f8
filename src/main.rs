//! # Skysync
//!
//! Runs every sync variant in one process: the timeline first, then trends,
//! sharing a single Bluesky session. A variant whose webhook URL is not set is
//! skipped; if neither is set the process exits without contacting Bluesky.
//!
//! ## Environment Variables
//!
//! - `BSKY_IDENTIFIER`, `BSKY_APP_PASSWORD`: Account credentials (required
//!   once any variant is enabled)
//! - `TRMNL_CUSTOM_PLUGIN_TIMELINE_WEBHOOK_URL`: Enables the timeline sync
//! - `TRMNL_CUSTOM_PLUGIN_TRENDS_WEBHOOK_URL`: Enables the trends sync
//! - `RUST_LOG`: Log level (defaults to `info`)
//!
//! ## Example Usage
//!
//! ```bash
//! # Sync everything that is configured
//! cargo run
//!
//! # With debug logging, including mapped payloads
//! RUST_LOG=debug cargo run
//! ```

use skysync::{init_logging, run_cli, ResourceKey};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    run_cli(&[ResourceKey::Timeline, ResourceKey::Trends]).await
}
