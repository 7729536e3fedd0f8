//! Bluesky API integration module.
//!
//! This module contains functions for talking to a Bluesky service over XRPC:
//! creating a session, fetching the home timeline and fetching trending topics.

mod feed;
mod session;
mod trends;
pub mod types;

pub use feed::{get_timeline, is_displayable, map_timeline, GET_TIMELINE_METHOD};
pub use session::{build_bearer_header, create_session, CREATE_SESSION_METHOD};
pub use trends::{get_trends, map_trends, GET_TRENDS_METHOD};
pub use types::{DisplayPost, DisplayTrend, Session, TrendsView};
