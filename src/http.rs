//! Shared request plumbing.
//!
//! Session creation, resource fetches and webhook delivery all go through
//! [`send_json_request`]: issue one request, read the body, classify 2xx versus
//! error, and parse the body as JSON where the caller needs it. There is no
//! retry; a failed exchange is final for that invocation.

use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ErrorDetail, RequestError};

/// Lifecycle of a single request, used for logging.
///
/// `Idle -> Sent -> {Succeeded | Failed}`; `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Sent,
    Succeeded,
    Failed,
}

/// How a 2xx body should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPolicy {
    /// The body must parse as JSON or the request fails.
    RequireJson,
    /// JSON is parsed when possible, otherwise the raw text is returned.
    Lenient,
}

/// A 2xx response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{}", value),
            ResponseBody::Text(text) => write!(f, "{}", text),
        }
    }
}

/// A successful exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: u16,
    pub body: ResponseBody,
    /// The body exactly as received.
    pub raw: String,
}

impl JsonResponse {
    /// Deserializes the body into `T`, keeping the raw body on failure.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        let parsed = match &self.body {
            ResponseBody::Json(value) => T::deserialize(value),
            ResponseBody::Text(raw) => serde_json::from_str(raw),
        };
        parsed.map_err(|source| RequestError::Parse {
            source,
            raw: self.raw.clone(),
        })
    }
}

/// Identifies a request in logs and error messages.
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    /// Human-readable name, e.g. `"get_timeline"`.
    pub name: &'static str,
    /// Noun used in transport errors ("Problem with {context} request").
    pub context: &'static str,
    /// Prefix of the non-2xx error message.
    pub error_prefix: &'static str,
}

impl Operation {
    /// An operation against the upstream API.
    pub const fn upstream(name: &'static str) -> Self {
        Operation {
            name,
            context: "upstream",
            error_prefix: "HTTP error!",
        }
    }

    /// A delivery to the webhook.
    pub const fn webhook(name: &'static str) -> Self {
        Operation {
            name,
            context: "webhook",
            error_prefix: "Webhook HTTP error!",
        }
    }
}

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// # Parameters
///
/// - `text`: The text to sanitize
/// - `max_len`: Maximum length in characters before truncation
///
/// # Returns
///
/// A sanitized string safe for logging
pub fn sanitize_for_logging(text: &str, max_len: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.chars().count() > max_len {
        let truncated: String = sanitized.chars().take(max_len).collect();
        format!(
            "{}... [truncated, {} total bytes]",
            truncated,
            text.len()
        )
    } else {
        sanitized
    }
}

/// Sends a request and classifies the response.
///
/// The request is sent exactly once. A 2xx response succeeds when its body
/// satisfies `policy`; every other outcome is an error carrying the cause.
///
/// # Parameters
///
/// - `request_builder`: A fully configured request ready to send
/// - `operation`: Names the request for logs and error messages
/// - `policy`: Whether a 2xx body has to be JSON
///
/// # Returns
///
/// - `Ok(JsonResponse)`: Status code and body of a successful exchange
/// - `Err(RequestError)`: Transport failure, non-2xx status, or unparseable body
pub async fn send_json_request(
    request_builder: reqwest::RequestBuilder,
    operation: Operation,
    policy: BodyPolicy,
) -> Result<JsonResponse, RequestError> {
    let mut state = RequestState::Idle;
    debug!("Request '{}' state: {:?}", operation.name, state);

    let result = exchange(request_builder, operation, policy, &mut state).await;

    state = if result.is_ok() {
        RequestState::Succeeded
    } else {
        RequestState::Failed
    };
    debug!("Request '{}' state: {:?}", operation.name, state);

    result
}

async fn exchange(
    request_builder: reqwest::RequestBuilder,
    operation: Operation,
    policy: BodyPolicy,
    state: &mut RequestState,
) -> Result<JsonResponse, RequestError> {
    let transport = |source| RequestError::Transport {
        context: operation.context,
        source,
    };

    info!("Sending request for operation: {}", operation.name);
    *state = RequestState::Sent;
    debug!("Request '{}' state: {:?}", operation.name, state);

    let response = request_builder.send().await.map_err(transport)?;
    let status = response.status();
    info!(
        "Received response with status: {} for operation: {}",
        status, operation.name
    );

    let raw = response.text().await.map_err(transport)?;
    debug!(
        "Response body for '{}': {}",
        operation.name,
        sanitize_for_logging(&raw, 500)
    );

    if !status.is_success() {
        error!("Operation '{}' failed - Status: {}", operation.name, status);
        return Err(RequestError::Status {
            prefix: operation.error_prefix,
            status,
            detail: ErrorDetail::from_body(&raw),
        });
    }

    let body = match serde_json::from_str::<Value>(&raw) {
        Ok(value) => ResponseBody::Json(value),
        Err(source) => match policy {
            BodyPolicy::RequireJson => {
                error!(
                    "Operation '{}' returned a body that is not JSON",
                    operation.name
                );
                return Err(RequestError::Parse { source, raw });
            }
            BodyPolicy::Lenient => {
                info!(
                    "Response for '{}' was not JSON, or empty. Status: {}",
                    operation.name, status
                );
                ResponseBody::Text(raw.clone())
            }
        },
    };

    info!("Operation '{}' completed successfully", operation.name);
    Ok(JsonResponse {
        status: status.as_u16(),
        body,
        raw,
    })
}
