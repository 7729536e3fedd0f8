//! Bluesky Trends Sync
//!
//! Fetches the current trending topics and sends them to the trends plugin
//! webhook. Exits quietly when `TRMNL_CUSTOM_PLUGIN_TRENDS_WEBHOOK_URL` is not
//! set.

use skysync::{init_logging, run_cli, ResourceKey};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    run_cli(&[ResourceKey::Trends]).await
}
