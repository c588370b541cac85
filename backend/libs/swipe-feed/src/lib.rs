//! Preference-weighted swipe feed
//!
//! Tracks how a viewer reacts to posts during a browsing session and uses
//! those reactions to pick the category of the next post:
//! - **Preferences**: per-category like counts plus a total decision count
//! - **Selector**: weighted draw over an ordered category partition
//! - **Feed**: candidate fetch, fallback when a draw selects nothing,
//!   seen-post and author diversity filtering
//! - **Sessions**: one lock per live session
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use swipe_feed::{Engagement, FeedConfig, InMemoryContentStore, NextItem, SessionRegistry};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(InMemoryContentStore::new());
//!     let registry = SessionRegistry::new(store, FeedConfig::default());
//!     let session = registry.start(Uuid::new_v4());
//!
//!     if let Ok(NextItem::Item(post)) = registry.next_item(session.session_id).await {
//!         let _ = registry
//!             .record_engagement(session.session_id, post.post_id, Engagement::Like)
//!             .await;
//!     }
//! }
//! ```

pub mod config;
pub mod models;
pub mod services;
pub mod store;

pub use config::{ConfigError, FallbackPolicy, FeedConfig};
pub use models::{Category, CategoryFilter, ContentItem, Engagement, UserSession};
pub use services::{
    pick_next_category, pick_with_roll, select_category, FeedError, NextItem, Pick,
    PreferenceState, SessionError, SessionRegistry, SwipeFeed, SwipeOutcome,
};
pub use store::{CandidateQuery, ContentStore, InMemoryContentStore, StoreError};
