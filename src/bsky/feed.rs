//! Home timeline retrieval and filtering.
//!
//! The display only shows plain text posts, so replies, reposts and posts
//! with embedded media or link cards are dropped before mapping.

use log::{debug, info, warn};
use reqwest::Client;

use crate::config::{EmbedFilter, SyncConfig};
use crate::error::FetchError;
use crate::http::{send_json_request, BodyPolicy, Operation};

use super::session::build_bearer_header;
use super::types::{DisplayPost, FeedEntry, FeedReason, FeedViewPost, TimelineResponse};

pub const GET_TIMELINE_METHOD: &str = "app.bsky.feed.getTimeline";

/// Decides whether a feed entry may be shown.
///
/// An entry is kept only if it is not a reply, was not reposted into the
/// feed, and carries no embed that `filter` considers disqualifying. Other
/// reasons, such as a pinned post, do not exclude an entry.
pub fn is_displayable(entry: &FeedEntry, filter: EmbedFilter) -> bool {
    if entry.is_reply {
        return false;
    }

    if entry.repost_reason.as_ref().is_some_and(FeedReason::is_repost) {
        return false;
    }

    match filter {
        EmbedFilter::Strict => !entry.embed.is_present(),
        EmbedFilter::WrapperOnly => !entry.embed.on_wrapper(),
    }
}

/// Filters and maps raw feed entries, preserving feed order.
///
/// Entries that do not deserialize as feed posts are skipped with a warning.
pub fn map_timeline(feed: Vec<serde_json::Value>, filter: EmbedFilter) -> Vec<DisplayPost> {
    let total = feed.len();
    let mut skipped_malformed = 0;

    let posts: Vec<DisplayPost> = feed
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<FeedViewPost>(raw) {
            Ok(item) => Some(FeedEntry::from(item)),
            Err(e) => {
                skipped_malformed += 1;
                warn!("Skipping malformed feed item: {}", e);
                None
            }
        })
        .filter(|entry| {
            let keep = is_displayable(entry, filter);
            if !keep {
                debug!(
                    "Excluding post by @{} (reply: {}, reason: {:?}, embed: {:?})",
                    entry.post.author.handle, entry.is_reply, entry.repost_reason, entry.embed
                );
            }
            keep
        })
        .map(|entry| DisplayPost::from(entry.post))
        .collect();

    info!(
        "Timeline filtered: {} of {} items kept ({} malformed)",
        posts.len(),
        total,
        skipped_malformed
    );
    posts
}

/// Fetches the account's home timeline and maps it for display.
///
/// # Parameters
///
/// - `client`: HTTP client shared by the run
/// - `config`: Service URL, page size and embed filter
/// - `access_jwt`: Bearer token from the session
///
/// # Returns
///
/// - `Ok(Vec<DisplayPost>)`: Displayable posts in feed order (possibly empty)
/// - `Err(FetchError)`: Missing token, non-2xx response, or unparseable body
pub async fn get_timeline(
    client: &Client,
    config: &SyncConfig,
    access_jwt: &str,
) -> Result<Vec<DisplayPost>, FetchError> {
    if access_jwt.is_empty() {
        return Err(FetchError::MissingToken("timeline"));
    }

    let url = config.xrpc_url(GET_TIMELINE_METHOD);
    info!(
        "Fetching timeline from {} with limit {}",
        url, config.timeline_limit
    );

    let request_builder = client
        .get(&url)
        .query(&[("limit", config.timeline_limit)])
        .header("Authorization", build_bearer_header(access_jwt));

    let to_fetch_error = |source| FetchError::Request {
        resource: "timeline",
        source,
    };

    let response = send_json_request(
        request_builder,
        Operation::upstream("get_timeline"),
        BodyPolicy::RequireJson,
    )
    .await
    .map_err(to_fetch_error)?;

    let timeline: TimelineResponse = response.parse().map_err(to_fetch_error)?;
    if let Some(cursor) = &timeline.cursor {
        debug!("Timeline cursor: {}", cursor);
    }

    Ok(map_timeline(timeline.feed, config.embed_filter))
}
