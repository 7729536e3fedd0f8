//! Sync job runner.
//!
//! A sync is one linear pass: check that the resource has a destination,
//! authenticate, fetch, publish. The first error ends the run.

use log::{debug, error, info};
use reqwest::Client;
use std::process::ExitCode;

use crate::bsky::{create_session, get_timeline, get_trends, Session};
use crate::config::{ResourceKey, SyncConfig};
use crate::error::{ConfigError, SyncError};
use crate::http::ResponseBody;
use crate::webhook::{publish, WebhookResponse};

/// Result of a sync that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The resource was delivered.
    Published { status_code: u16, body: ResponseBody },
    /// The resource has no usable webhook configured; nothing was sent.
    Skipped { reason: String },
}

impl From<WebhookResponse> for SyncOutcome {
    fn from(response: WebhookResponse) -> Self {
        SyncOutcome::Published {
            status_code: response.status_code,
            body: response.body,
        }
    }
}

/// Builds the HTTP client used for every request of a run.
pub fn build_client() -> Result<Client, SyncError> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(SyncError::Client)
}

/// Runs one sync variant end to end.
///
/// # Parameters
///
/// - `client`: HTTP client for the run
/// - `config`: Credentials, webhooks and fetch settings
/// - `key`: Which resource to sync
///
/// # Returns
///
/// - `Ok(SyncOutcome::Skipped)`: If the resource has no valid webhook; no request is made
/// - `Ok(SyncOutcome::Published)`: If the resource was delivered
/// - `Err(SyncError)`: On the first failing stage
pub async fn run_sync(
    client: &Client,
    config: &SyncConfig,
    key: ResourceKey,
) -> Result<SyncOutcome, SyncError> {
    if config.webhook(key).is_none() {
        return Ok(skipped(key, config.webhook_error(key)));
    }

    let session = create_session(client, config, &config.credentials).await?;
    log_session(&session);

    sync_with_session(client, config, &session, key).await
}

/// Runs every enabled sync variant, sharing one session.
///
/// Variants run in order; the first failure stops the run. When no variant
/// is enabled no session is created.
pub async fn run_all(
    client: &Client,
    config: &SyncConfig,
    keys: &[ResourceKey],
) -> Result<Vec<(ResourceKey, SyncOutcome)>, SyncError> {
    let enabled: Vec<ResourceKey> = keys
        .iter()
        .copied()
        .filter(|key| config.webhook(*key).is_some())
        .collect();

    let mut outcomes: Vec<(ResourceKey, SyncOutcome)> = keys
        .iter()
        .copied()
        .filter(|key| !enabled.contains(key))
        .map(|key| (key, skipped(key, config.webhook_error(key))))
        .collect();

    if enabled.is_empty() {
        info!("No sync variants are enabled");
        return Ok(outcomes);
    }

    let session = create_session(client, config, &config.credentials).await?;
    log_session(&session);

    for key in enabled {
        let outcome = sync_with_session(client, config, &session, key).await?;
        outcomes.push((key, outcome));
    }

    Ok(outcomes)
}

async fn sync_with_session(
    client: &Client,
    config: &SyncConfig,
    session: &Session,
    key: ResourceKey,
) -> Result<SyncOutcome, SyncError> {
    let webhook_url = config.webhook(key);
    let policy = config.display_policy();

    let response = match key {
        ResourceKey::Timeline => {
            let timeline = get_timeline(client, config, &session.access_jwt).await?;
            info!("Bluesky timeline: {} displayable posts", timeline.len());
            log_pretty("timeline", &timeline);
            publish(client, key, &timeline, webhook_url, &policy).await?
        }
        ResourceKey::Trends => {
            let trends = get_trends(client, config, &session.access_jwt).await?;
            info!("Bluesky trends: {} topics", trends.trends.len());
            log_pretty("trends", &trends);
            publish(client, key, &trends.trends, webhook_url, &policy).await?
        }
    };

    info!("Webhook response status code: {}", response.status_code);
    info!("Webhook response body: {}", response.body);
    Ok(response.into())
}

fn skipped(key: ResourceKey, webhook_error: Option<&ConfigError>) -> SyncOutcome {
    let reason = match webhook_error {
        Some(e) => e.to_string(),
        None => format!(
            "{} environment variable is not defined",
            key.webhook_var()
        ),
    };
    info!("{}. Skipping {} sync.", reason, key);
    SyncOutcome::Skipped { reason }
}

fn log_session(session: &Session) {
    info!("Session created for @{} ({})", session.handle, session.did);
    debug!("Session: {:?}", session);
}

fn log_pretty<T: serde::Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(pretty) => debug!("Mapped {}: {}", label, pretty),
        Err(e) => error!("Failed to render mapped {} for logging: {}", label, e),
    }
}

/// Entry point shared by the binaries.
///
/// Loads the configuration, runs the requested variants and reports the
/// result. A variant without a webhook is skipped before the credentials are
/// even looked at; missing credentials for an enabled variant are fatal.
///
/// # Returns
///
/// `ExitCode::SUCCESS` on success or graceful skip, `ExitCode::FAILURE` otherwise
pub async fn run_cli(keys: &[ResourceKey]) -> ExitCode {
    SyncConfig::load_dotenv();

    let any_enabled = keys.iter().any(|key| {
        std::env::var(key.webhook_var())
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false)
    });
    if !any_enabled {
        for key in keys {
            skipped(*key, None);
        }
        info!("Exiting gracefully.");
        return ExitCode::SUCCESS;
    }

    match load_and_run(keys).await {
        Ok(outcomes) => {
            for (key, outcome) in outcomes {
                match outcome {
                    SyncOutcome::Published { status_code, .. } => {
                        info!("{} sync completed (webhook status {})", key, status_code)
                    }
                    SyncOutcome::Skipped { .. } => info!("{} sync skipped", key),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("An error occurred in main execution: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn load_and_run(keys: &[ResourceKey]) -> Result<Vec<(ResourceKey, SyncOutcome)>, SyncError> {
    let config = SyncConfig::from_env()?;
    let client = build_client()?;
    run_all(&client, &config, keys).await
}

/// Initializes `env_logger` with `info` as the default level.
///
/// `RUST_LOG` overrides the default, e.g. `RUST_LOG=debug`.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
