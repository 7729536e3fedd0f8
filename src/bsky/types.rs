//! Wire and display types for the Bluesky API.
//!
//! Raw types mirror the upstream JSON closely enough to deserialize the parts
//! the job reads; everything else is ignored. Display types are the narrow
//! shapes sent to the webhook.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const POST_RECORD_TYPE: &str = "app.bsky.feed.post";
pub const REASON_REPOST_TYPE: &str = "app.bsky.feed.defs#reasonRepost";
pub const REASON_PIN_TYPE: &str = "app.bsky.feed.defs#reasonPin";

/// Response of `com.atproto.server.createSession`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_jwt: String,
    pub refresh_jwt: String,
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("handle", &self.handle)
            .field("did", &self.did)
            .field("access_jwt", &"[REDACTED]")
            .field("refresh_jwt", &"[REDACTED]")
            .finish()
    }
}

/// Response of `app.bsky.feed.getTimeline`.
///
/// Entries stay raw so one malformed item does not discard the whole page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineResponse {
    #[serde(default)]
    pub feed: Vec<Value>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// One entry of a feed: a post plus an optional reason it appears.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedViewPost {
    pub post: PostView,
    #[serde(default)]
    pub reason: Option<TypedObject>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub author: Author,
    pub record: PostRecord,
    #[serde(default)]
    pub embed: Option<Value>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub repost_count: Option<u64>,
    #[serde(default)]
    pub reply_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostRecord {
    #[serde(rename = "$type", default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub reply: Option<Value>,
    #[serde(default)]
    pub embed: Option<Value>,
}

/// Any object tagged with an upstream `$type`.
#[derive(Debug, Clone, Deserialize)]
pub struct TypedObject {
    #[serde(rename = "$type", default)]
    pub object_type: Option<String>,
}

/// Why an entry appears in the feed, when it is not simply authored by a followee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedReason {
    Repost,
    Pin,
    Other(String),
}

impl FeedReason {
    pub fn is_repost(&self) -> bool {
        matches!(self, FeedReason::Repost)
    }

    fn from_tag(tag: &str) -> Self {
        match tag {
            REASON_REPOST_TYPE => FeedReason::Repost,
            REASON_PIN_TYPE => FeedReason::Pin,
            other => FeedReason::Other(other.to_string()),
        }
    }
}

/// Where a post carries an embed reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    None,
    /// Only the hydrated view on the feed wrapper.
    Wrapper,
    /// Only the raw record.
    Record,
    Both,
}

impl EmbedKind {
    fn from_flags(wrapper: bool, record: bool) -> Self {
        match (wrapper, record) {
            (false, false) => EmbedKind::None,
            (true, false) => EmbedKind::Wrapper,
            (false, true) => EmbedKind::Record,
            (true, true) => EmbedKind::Both,
        }
    }

    pub fn on_wrapper(&self) -> bool {
        matches!(self, EmbedKind::Wrapper | EmbedKind::Both)
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, EmbedKind::None)
    }
}

/// A feed entry with its filter discriminators made explicit.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub is_reply: bool,
    pub repost_reason: Option<FeedReason>,
    pub embed: EmbedKind,
    pub post: PostView,
}

impl From<FeedViewPost> for FeedEntry {
    fn from(item: FeedViewPost) -> Self {
        let record = &item.post.record;
        let is_reply =
            record.record_type.as_deref() == Some(POST_RECORD_TYPE) && record.reply.is_some();
        let embed = EmbedKind::from_flags(item.post.embed.is_some(), record.embed.is_some());
        let repost_reason = item
            .reason
            .as_ref()
            .and_then(|reason| reason.object_type.as_deref())
            .map(FeedReason::from_tag);

        FeedEntry {
            is_reply,
            repost_reason,
            embed,
            post: item.post,
        }
    }
}

/// A timeline post as shown on the display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPost {
    pub author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repost_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u64>,
}

impl From<PostView> for DisplayPost {
    fn from(post: PostView) -> Self {
        let author_name = post
            .author
            .display_name
            .filter(|name| !name.is_empty())
            .unwrap_or(post.author.handle);

        DisplayPost {
            author_name,
            author_avatar: post.author.avatar,
            text: post.record.text,
            like_count: post.like_count,
            repost_count: post.repost_count,
            comment_count: post.reply_count,
        }
    }
}

/// A trending topic as returned by `app.bsky.unspecced.getTrends`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub post_count: Option<u64>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A trending topic as shown on the display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTrend {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl From<Trend> for DisplayTrend {
    fn from(trend: Trend) -> Self {
        DisplayTrend {
            display_name: trend.display_name,
            post_count: trend.post_count,
            started_at: trend.started_at,
            status: trend.status,
        }
    }
}

/// Mapped trends plus every other top-level field of the upstream response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendsView {
    pub trends: Vec<DisplayTrend>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
