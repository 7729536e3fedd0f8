//! Trending topics retrieval.

use log::info;
use reqwest::Client;
use serde_json::{Map, Value};

use crate::config::SyncConfig;
use crate::error::{FetchError, RequestError};
use crate::http::{send_json_request, BodyPolicy, Operation};

use super::session::build_bearer_header;
use super::types::{DisplayTrend, Trend, TrendsView};

pub const GET_TRENDS_METHOD: &str = "app.bsky.unspecced.getTrends";

/// Maps a trends response body, keeping every top-level field except `trends`
/// as-is. A body without `trends` yields an empty list.
pub fn map_trends(body: Map<String, Value>) -> Result<TrendsView, RequestError> {
    let mut extra = body;
    let raw_trends = extra.remove("trends");

    let trends = match raw_trends {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => {
            let raw = value.to_string();
            serde_json::from_value::<Vec<Trend>>(value)
                .map_err(|source| RequestError::Parse { source, raw })?
                .into_iter()
                .map(DisplayTrend::from)
                .collect()
        }
    };

    Ok(TrendsView { trends, extra })
}

/// Fetches the current trending topics.
///
/// # Parameters
///
/// - `client`: HTTP client shared by the run
/// - `config`: Service URL and trend count
/// - `access_jwt`: Bearer token from the session
///
/// # Returns
///
/// - `Ok(TrendsView)`: Mapped trends in upstream order plus pass-through fields
/// - `Err(FetchError)`: Missing token, non-2xx response, or unparseable body
pub async fn get_trends(
    client: &Client,
    config: &SyncConfig,
    access_jwt: &str,
) -> Result<TrendsView, FetchError> {
    if access_jwt.is_empty() {
        return Err(FetchError::MissingToken("trends"));
    }

    let url = config.xrpc_url(GET_TRENDS_METHOD);
    info!(
        "Fetching trends from {} with limit {}",
        url, config.trends_limit
    );

    let request_builder = client
        .get(&url)
        .query(&[("limit", config.trends_limit)])
        .header("Authorization", build_bearer_header(access_jwt));

    let to_fetch_error = |source| FetchError::Request {
        resource: "trends",
        source,
    };

    let response = send_json_request(
        request_builder,
        Operation::upstream("get_trends"),
        BodyPolicy::RequireJson,
    )
    .await
    .map_err(to_fetch_error)?;

    let body: Map<String, Value> = response.parse().map_err(to_fetch_error)?;
    let view = map_trends(body).map_err(to_fetch_error)?;

    info!("Fetched {} trends", view.trends.len());
    Ok(view)
}
