//! Configuration module for the sync job.
//!
//! All settings are read from the process environment once, at startup, into a
//! [`SyncConfig`] that is then handed to every component. A `.env` file in the
//! working directory is loaded first when present.

use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::env;
use url::Url;

use crate::error::ConfigError;
use crate::webhook::DisplayPolicy;

pub const IDENTIFIER_VAR: &str = "BSKY_IDENTIFIER";
pub const APP_PASSWORD_VAR: &str = "BSKY_APP_PASSWORD";
pub const SERVICE_URL_VAR: &str = "BSKY_SERVICE_URL";
pub const TIMELINE_LIMIT_VAR: &str = "BSKY_TIMELINE_LIMIT";
pub const TRENDS_LIMIT_VAR: &str = "BSKY_TRENDS_LIMIT";
pub const EMBED_FILTER_VAR: &str = "BSKY_EMBED_FILTER";
pub const TIMELINE_WEBHOOK_VAR: &str = "TRMNL_CUSTOM_PLUGIN_TIMELINE_WEBHOOK_URL";
pub const TRENDS_WEBHOOK_VAR: &str = "TRMNL_CUSTOM_PLUGIN_TRENDS_WEBHOOK_URL";
pub const TIMELINE_CAP_VAR: &str = "TRMNL_TIMELINE_CAP";

pub const DEFAULT_SERVICE_URL: &str = "https://bsky.social";
pub const DEFAULT_TIMELINE_LIMIT: u32 = 100;
pub const DEFAULT_TRENDS_LIMIT: u32 = 5;
pub const DEFAULT_TIMELINE_CAP: usize = 5;

/// The kinds of resource the job can publish. Each one is keyed by its name
/// inside the webhook's `merge_variables`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKey {
    Timeline,
    Trends,
}

impl ResourceKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKey::Timeline => "timeline",
            ResourceKey::Trends => "trends",
        }
    }

    /// Environment variable holding this resource's webhook URL.
    pub fn webhook_var(&self) -> &'static str {
        match self {
            ResourceKey::Timeline => TIMELINE_WEBHOOK_VAR,
            ResourceKey::Trends => TRENDS_WEBHOOK_VAR,
        }
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which embed references exclude a timeline post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedFilter {
    /// Exclude posts with an embed on either the feed wrapper or the record.
    #[default]
    Strict,
    /// Exclude posts only when the feed wrapper carries an embed view.
    WrapperOnly,
}

impl std::str::FromStr for EmbedFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(EmbedFilter::Strict),
            "wrapper" | "wrapper_only" => Ok(EmbedFilter::WrapperOnly),
            other => Err(format!("expected 'strict' or 'wrapper', got '{}'", other)),
        }
    }
}

/// Account credentials. The secret is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Credentials {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &mask_secret(&self.secret))
            .finish()
    }
}

/// Everything the job needs to run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub credentials: Credentials,
    /// Base URL of the account's service, e.g. `https://bsky.social`.
    pub service_url: Url,
    /// Destination for each enabled resource. A missing key disables that sync.
    pub webhooks: BTreeMap<ResourceKey, Url>,
    /// Webhook variables that were set but did not parse. Each one disables
    /// only its own resource.
    pub webhook_errors: BTreeMap<ResourceKey, ConfigError>,
    /// `limit` sent with the timeline request.
    pub timeline_limit: u32,
    /// `limit` sent with the trends request.
    pub trends_limit: u32,
    /// How many timeline posts the webhook payload may carry.
    pub timeline_display_cap: usize,
    pub embed_filter: EmbedFilter,
}

impl SyncConfig {
    /// Creates a configuration with defaults for everything but the credentials.
    pub fn new(credentials: Credentials) -> Result<Self, ConfigError> {
        Ok(SyncConfig {
            credentials,
            service_url: parse_url(SERVICE_URL_VAR, DEFAULT_SERVICE_URL)?,
            webhooks: BTreeMap::new(),
            webhook_errors: BTreeMap::new(),
            timeline_limit: DEFAULT_TIMELINE_LIMIT,
            trends_limit: DEFAULT_TRENDS_LIMIT,
            timeline_display_cap: DEFAULT_TIMELINE_CAP,
            embed_filter: EmbedFilter::default(),
        })
    }

    /// Loads the configuration from the environment, reading `.env` first.
    ///
    /// # Required Environment Variables
    ///
    /// - `BSKY_IDENTIFIER`: Handle or DID of the account
    /// - `BSKY_APP_PASSWORD`: App password for the account
    ///
    /// # Optional Environment Variables
    ///
    /// - `BSKY_SERVICE_URL`: Service base URL (default `https://bsky.social`)
    /// - `TRMNL_CUSTOM_PLUGIN_TIMELINE_WEBHOOK_URL`: Enables the timeline sync
    /// - `TRMNL_CUSTOM_PLUGIN_TRENDS_WEBHOOK_URL`: Enables the trends sync
    /// - `BSKY_TIMELINE_LIMIT`: Timeline page size (default 100)
    /// - `BSKY_TRENDS_LIMIT`: Number of trends requested (default 5)
    /// - `TRMNL_TIMELINE_CAP`: Posts sent to the webhook (default 5)
    /// - `BSKY_EMBED_FILTER`: `strict` or `wrapper` (default `strict`)
    ///
    /// # Returns
    ///
    /// - `Ok(SyncConfig)`: If the credentials are present and every shared value parses.
    ///   A malformed webhook URL only disables its own resource.
    /// - `Err(ConfigError)`: If a credential is missing or a shared value is malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load_dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads `.env` from the working directory into the environment, if present.
    ///
    /// Variables already set in the environment take precedence.
    pub fn load_dotenv() {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => warn!("Failed to read .env file: {}", e),
        }
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        info!("Loading sync configuration");

        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let identifier = get(IDENTIFIER_VAR).ok_or_else(|| {
            error!("{} environment variable must be set", IDENTIFIER_VAR);
            ConfigError::Missing(IDENTIFIER_VAR)
        })?;
        let secret = get(APP_PASSWORD_VAR).ok_or_else(|| {
            error!("{} environment variable must be set", APP_PASSWORD_VAR);
            ConfigError::Missing(APP_PASSWORD_VAR)
        })?;
        info!("Found credentials for identifier: {}", identifier);
        debug!("App password (masked): {}", mask_secret(&secret));

        let service_url = match get(SERVICE_URL_VAR) {
            Some(raw) => parse_url(SERVICE_URL_VAR, &raw)?,
            None => parse_url(SERVICE_URL_VAR, DEFAULT_SERVICE_URL)?,
        };

        let mut webhooks = BTreeMap::new();
        let mut webhook_errors = BTreeMap::new();
        for key in [ResourceKey::Timeline, ResourceKey::Trends] {
            match get(key.webhook_var()) {
                Some(raw) => match parse_url(key.webhook_var(), &raw) {
                    Ok(url) => {
                        webhooks.insert(key, url);
                        info!("Webhook configured for {}", key);
                    }
                    Err(e) => {
                        error!("{} - {} sync is disabled", e, key);
                        webhook_errors.insert(key, e);
                    }
                },
                None => info!(
                    "{} is not set - {} sync is disabled",
                    key.webhook_var(),
                    key
                ),
            }
        }

        let timeline_limit = parse_or(
            TIMELINE_LIMIT_VAR,
            get(TIMELINE_LIMIT_VAR),
            DEFAULT_TIMELINE_LIMIT,
        )?;
        let trends_limit = parse_or(TRENDS_LIMIT_VAR, get(TRENDS_LIMIT_VAR), DEFAULT_TRENDS_LIMIT)?;
        let timeline_display_cap =
            parse_or(TIMELINE_CAP_VAR, get(TIMELINE_CAP_VAR), DEFAULT_TIMELINE_CAP)?;
        let embed_filter = parse_or(EMBED_FILTER_VAR, get(EMBED_FILTER_VAR), EmbedFilter::Strict)?;

        let config = SyncConfig {
            credentials: Credentials { identifier, secret },
            service_url,
            webhooks,
            webhook_errors,
            timeline_limit,
            trends_limit,
            timeline_display_cap,
            embed_filter,
        };

        info!(
            "Sync configuration loaded: service {}, timeline limit {}, trends limit {}, display cap {}, embed filter {:?}",
            config.service_url,
            config.timeline_limit,
            config.trends_limit,
            config.timeline_display_cap,
            config.embed_filter
        );

        Ok(config)
    }

    /// Sets the webhook for a resource, enabling its sync.
    pub fn with_webhook(mut self, key: ResourceKey, url: Url) -> Self {
        self.webhook_errors.remove(&key);
        self.webhooks.insert(key, url);
        self
    }

    pub fn webhook(&self, key: ResourceKey) -> Option<&Url> {
        self.webhooks.get(&key)
    }

    /// The parse error of a webhook variable that was set but malformed.
    pub fn webhook_error(&self, key: ResourceKey) -> Option<&ConfigError> {
        self.webhook_errors.get(&key)
    }

    /// How many items of a resource the webhook payload may carry.
    pub fn display_policy(&self) -> DisplayPolicy {
        DisplayPolicy {
            timeline_cap: self.timeline_display_cap,
        }
    }

    /// Builds the full URL of an XRPC method on the configured service.
    pub fn xrpc_url(&self, method: &str) -> String {
        format!(
            "{}/xrpc/{}",
            self.service_url.as_str().trim_end_matches('/'),
            method
        )
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Masks a secret for logging, keeping at most the first and last four characters.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 16 {
        let prefix: String = chars[..4].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else if chars.len() > 8 {
        let prefix: String = chars[..4].iter().collect();
        format!("{}...", prefix)
    } else {
        "...".to_string()
    }
}
