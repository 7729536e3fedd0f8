//! Webhook delivery for TRMNL custom plugins.
//!
//! The plugin reads its data from `merge_variables`, so every payload has the
//! shape `{"merge_variables": {"<resource>": [...]}}`.

use log::{debug, info};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Map, Value};
use url::Url;

use crate::config::ResourceKey;
use crate::error::{PublishError, RequestError};
use crate::http::{send_json_request, BodyPolicy, Operation, ResponseBody};

/// The webhook's answer to a delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookResponse {
    pub status_code: u16,
    pub body: ResponseBody,
}

/// How many items of each resource a payload may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPolicy {
    /// The timeline keeps its first `timeline_cap` items.
    pub timeline_cap: usize,
}

impl Default for DisplayPolicy {
    fn default() -> Self {
        DisplayPolicy {
            timeline_cap: crate::config::DEFAULT_TIMELINE_CAP,
        }
    }
}

impl DisplayPolicy {
    /// The item limit for a resource; `None` means unlimited.
    pub fn limit(&self, key: ResourceKey) -> Option<usize> {
        match key {
            ResourceKey::Timeline => Some(self.timeline_cap),
            ResourceKey::Trends => None,
        }
    }

    /// Limits a payload according to the resource's display policy.
    ///
    /// The timeline keeps its first `timeline_cap` items; trends are sent whole.
    pub fn apply<'a, T>(&self, key: ResourceKey, items: &'a [T]) -> &'a [T] {
        match self.limit(key) {
            Some(cap) => &items[..items.len().min(cap)],
            None => items,
        }
    }
}

/// Builds the webhook envelope for a resource.
///
/// # Returns
///
/// `{"merge_variables": {"<key>": [items...]}}` with the display policy applied
pub fn build_envelope<T: Serialize>(
    key: ResourceKey,
    items: &[T],
    policy: &DisplayPolicy,
) -> Result<Value, serde_json::Error> {
    let mut merge_variables = Map::new();
    merge_variables.insert(
        key.as_str().to_string(),
        serde_json::to_value(policy.apply(key, items))?,
    );
    Ok(json!({ "merge_variables": merge_variables }))
}

/// Posts a resource to its webhook.
///
/// A single POST is made. Success depends only on the status code; a 2xx
/// body that is not JSON is returned as text.
///
/// # Parameters
///
/// - `client`: HTTP client shared by the run
/// - `key`: Name of the resource inside `merge_variables`
/// - `items`: Mapped display items, in display order
/// - `webhook_url`: Destination; `None` is a caller error
/// - `policy`: Per-resource item limits
///
/// # Returns
///
/// - `Ok(WebhookResponse)`: Status code and body of the webhook's answer
/// - `Err(PublishError)`: Missing URL, transport failure, or non-2xx status
pub async fn publish<T: Serialize>(
    client: &Client,
    key: ResourceKey,
    items: &[T],
    webhook_url: Option<&Url>,
    policy: &DisplayPolicy,
) -> Result<WebhookResponse, PublishError> {
    let webhook_url = webhook_url.ok_or(PublishError::MissingWebhookUrl)?;

    let envelope = build_envelope(key, items, policy).map_err(RequestError::Encode)?;
    let sent = envelope["merge_variables"][key.as_str()]
        .as_array()
        .map_or(0, |items| items.len());
    info!(
        "Publishing {} {} items ({} mapped) to webhook {}",
        sent,
        key,
        items.len(),
        webhook_host(webhook_url)
    );
    debug!(
        "Webhook payload: {}",
        serde_json::to_string_pretty(&envelope).map_err(RequestError::Encode)?
    );

    let request_builder = client.post(webhook_url.clone()).json(&envelope);
    let response = send_json_request(
        request_builder,
        Operation::webhook("publish"),
        BodyPolicy::Lenient,
    )
    .await?;

    Ok(WebhookResponse {
        status_code: response.status,
        body: response.body,
    })
}

// Plugin URLs embed a secret UUID in the path; log only the host.
fn webhook_host(url: &Url) -> &str {
    url.host_str().unwrap_or("<no host>")
}
