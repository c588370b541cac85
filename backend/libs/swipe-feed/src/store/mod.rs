// ============================================
// Content Store
// ============================================
//
// Seam between the swipe feed and wherever posts live. The feed only
// needs newest-first candidates per category filter, a per-viewer like
// toggle, and an upload path for seeding.
//
// Exclusions are applied by the store before the limit, so posts a
// session has already seen never crowd out older unseen ones.

pub mod memory;

pub use memory::InMemoryContentStore;

use crate::models::{CategoryFilter, ContentItem};
use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Post not found: {0}")]
    PostNotFound(Uuid),

    #[error("Duplicate post: {0}")]
    DuplicatePost(Uuid),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Which posts a feed wants next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateQuery {
    pub filter: CategoryFilter,
    /// Posts to leave out, e.g. those a session already showed
    pub exclude_posts: HashSet<Uuid>,
    /// Author whose posts to leave out, e.g. the viewer
    pub exclude_author: Option<Uuid>,
    pub limit: usize,
}

impl CandidateQuery {
    pub fn new(filter: CategoryFilter, limit: usize) -> Self {
        Self {
            filter,
            limit,
            ..Self::default()
        }
    }

    pub fn excluding_posts(mut self, posts: impl IntoIterator<Item = Uuid>) -> Self {
        self.exclude_posts.extend(posts);
        self
    }

    pub fn excluding_author(mut self, author_id: Uuid) -> Self {
        self.exclude_author = Some(author_id);
        self
    }

    /// Whether `item` passes the filter and every exclusion.
    pub fn admits(&self, item: &ContentItem) -> bool {
        self.filter.matches(item.category)
            && !self.exclude_posts.contains(&item.post_id)
            && self.exclude_author != Some(item.author_id)
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Newest posts admitted by `query`, at most `query.limit` of them.
    async fn fetch_candidates(&self, query: CandidateQuery) -> Result<Vec<ContentItem>>;

    /// Set or clear `user_id`'s like on a post. Idempotent.
    async fn set_like(&self, user_id: Uuid, post_id: Uuid, liked: bool) -> Result<()>;

    async fn publish(&self, item: ContentItem) -> Result<()>;
}
