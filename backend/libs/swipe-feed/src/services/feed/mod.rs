// ============================================
// Swipe Feed
// ============================================
//
// Drives one browsing session:
// 1. Fetch the newest posts for the viewer's category filter that the
//    session has not seen and the viewer did not write
// 2. Drop the previous author when someone else is available
// 3. Draw through the preference-weighted selector
// 4. Apply the configured fallback when the draw selects nothing
//
// An empty candidate set ends the feed (`NextItem::Exhausted`); a draw
// that picks nothing from a non-empty set does not (`NextItem::NoSelection`).
//
// Likes are written through to the content store before they count
// toward the session's preferences.

pub mod swipe_feed;

pub use swipe_feed::{NextItem, SwipeFeed};

use crate::store::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Post is not the one currently shown: {0}")]
    NotShown(Uuid),

    #[error("Content store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, FeedError>;
