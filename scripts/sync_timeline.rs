//! Bluesky Timeline Sync
//!
//! Fetches the home timeline, keeps plain posts, and sends the newest ones to
//! the timeline plugin webhook. Exits quietly when
//! `TRMNL_CUSTOM_PLUGIN_TIMELINE_WEBHOOK_URL` is not set.

use skysync::{init_logging, run_cli, ResourceKey};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    run_cli(&[ResourceKey::Timeline]).await
}
