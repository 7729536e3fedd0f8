//! Error types for the sync job.
//!
//! Every component reports failures to its caller through one of these enums.
//! The shared request helper produces [`RequestError`]; each component wraps it
//! in its own error type so the job runner can tell which stage failed.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single HTTP exchange issued by the shared request helper.
#[derive(Error, Debug)]
pub enum RequestError {
    /// The request never produced a response (DNS, TLS, connection reset, ...).
    #[error("Problem with {context} request: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The remote side answered with a non-2xx status.
    #[error("{}", status_message(.prefix, .status, .detail))]
    Status {
        prefix: &'static str,
        status: StatusCode,
        detail: ErrorDetail,
    },

    /// A 2xx response whose body was required to be JSON but was not.
    #[error("Failed to parse JSON response: {source}. Raw data: {raw}")]
    Parse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    /// The outbound body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl RequestError {
    /// Returns the HTTP status when the failure was a non-2xx response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// What the remote side said about a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// The body was a JSON object; `error` and `message` are the upstream fields.
    Remote {
        error: Option<String>,
        message: String,
    },
    /// The body was not a JSON object.
    Unparseable(String),
}

impl ErrorDetail {
    /// Classifies a raw error body.
    ///
    /// A JSON object contributes its `error` code and `message`; when
    /// `message` is missing or empty the raw body stands in for it. Anything
    /// that is not a JSON object counts as unparseable.
    pub fn from_body(raw: &str) -> Self {
        let object = match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(object)) => object,
            _ => return ErrorDetail::Unparseable(raw.to_string()),
        };

        let error = object
            .get("error")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let message = object
            .get("message")
            .and_then(|v| v.as_str())
            .filter(|message| !message.is_empty())
            .map_or_else(|| raw.to_string(), str::to_string);
        ErrorDetail::Remote { error, message }
    }
}

fn status_message(prefix: &str, status: &StatusCode, detail: &ErrorDetail) -> String {
    match detail {
        ErrorDetail::Remote { error, message } => format!(
            "{} status: {} - {}: {}",
            prefix,
            status.as_u16(),
            error.as_deref().unwrap_or(""),
            message
        ),
        ErrorDetail::Unparseable(raw) => format!(
            "{} status: {} - Unable to parse error response: {}",
            prefix,
            status.as_u16(),
            raw
        ),
    }
}

/// Session creation failures.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Identifier and app password are both required to create a session")]
    MissingCredentials,

    #[error("Session creation failed: {0}")]
    Request(#[from] RequestError),
}

/// Resource retrieval failures.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Access JWT is required to get {0}")]
    MissingToken(&'static str),

    #[error("Fetching {resource} failed: {source}")]
    Request {
        resource: &'static str,
        #[source]
        source: RequestError,
    },
}

/// Webhook delivery failures.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Webhook URL must be provided")]
    MissingWebhookUrl,

    #[error("Webhook delivery failed: {0}")]
    Request(#[from] RequestError),
}

/// Problems with the process configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Any failure that ends a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
