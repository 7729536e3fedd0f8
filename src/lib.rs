//! # Skysync Library
//!
//! A batch job that reads a Bluesky account's home timeline or the current
//! trending topics, reshapes them for a small display, and pushes them to a
//! TRMNL custom plugin webhook.
//!
//! ## Pipeline
//!
//! Every run is strictly sequential: create a session, fetch one resource per
//! enabled sync variant, publish it, exit. Nothing is stored between runs and
//! failed requests are not retried.
//!
//! ## Configuration
//!
//! The following configuration is required:
//! - `BSKY_IDENTIFIER`: Account handle or DID
//! - `BSKY_APP_PASSWORD`: App password for the account
//!
//! Each sync variant is enabled by its webhook URL:
//! - `TRMNL_CUSTOM_PLUGIN_TIMELINE_WEBHOOK_URL`
//! - `TRMNL_CUSTOM_PLUGIN_TRENDS_WEBHOOK_URL`
//!
//! See [`SyncConfig::from_env`] for the optional tuning variables.

pub mod bsky;
pub mod config;
pub mod error;
pub mod http;
pub mod sync;
pub mod webhook;

// Re-export commonly used types and functions
pub use bsky::{
    build_bearer_header, create_session, get_timeline, get_trends, DisplayPost, DisplayTrend,
    Session, TrendsView,
};
pub use config::{Credentials, EmbedFilter, ResourceKey, SyncConfig};
pub use error::{AuthError, ConfigError, FetchError, PublishError, RequestError, SyncError};
pub use sync::{build_client, init_logging, run_all, run_cli, run_sync, SyncOutcome};
pub use webhook::{build_envelope, publish, DisplayPolicy, WebhookResponse};
