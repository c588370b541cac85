use super::{CandidateQuery, ContentStore, Result, StoreError};
use crate::models::ContentItem;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    posts: HashMap<Uuid, ContentItem>,
    likers: HashMap<Uuid, HashSet<Uuid>>,
}

/// Process-local store, used for tests and local runs.
#[derive(Default)]
pub struct InMemoryContentStore {
    inner: RwLock<Inner>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `posts`. Later duplicates replace earlier ones.
    pub fn with_posts(posts: impl IntoIterator<Item = ContentItem>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for post in posts {
                inner.posts.insert(post.post_id, post);
            }
        }
        store
    }

    pub fn get(&self, post_id: Uuid) -> Option<ContentItem> {
        self.inner.read().posts.get(&post_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_liked_by(&self, post_id: Uuid, user_id: Uuid) -> bool {
        self.inner
            .read()
            .likers
            .get(&post_id)
            .map(|users| users.contains(&user_id))
            .unwrap_or(false)
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn fetch_candidates(&self, query: CandidateQuery) -> Result<Vec<ContentItem>> {
        let inner = self.inner.read();
        let mut posts: Vec<ContentItem> = inner
            .posts
            .values()
            .filter(|p| query.admits(p))
            .cloned()
            .collect();

        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.post_id.cmp(&b.post_id))
        });
        posts.truncate(query.limit);

        debug!(
            filter = ?query.filter,
            excluded = query.exclude_posts.len(),
            returned = posts.len(),
            "Candidates fetched"
        );
        Ok(posts)
    }

    async fn set_like(&self, user_id: Uuid, post_id: Uuid, liked: bool) -> Result<()> {
        let mut inner = self.inner.write();
        let Inner { posts, likers } = &mut *inner;

        let post = posts
            .get_mut(&post_id)
            .ok_or(StoreError::PostNotFound(post_id))?;
        let users = likers.entry(post_id).or_default();

        if liked {
            users.insert(user_id);
        } else {
            users.remove(&user_id);
        }
        post.likes = u32::try_from(users.len()).unwrap_or(u32::MAX);

        debug!(
            post_id = %post_id,
            user_id = %user_id,
            liked = liked,
            likes = post.likes,
            "Like updated"
        );
        Ok(())
    }

    async fn publish(&self, item: ContentItem) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.posts.contains_key(&item.post_id) {
            return Err(StoreError::DuplicatePost(item.post_id));
        }
        debug!(post_id = %item.post_id, category = item.category.as_str(), "Post published");
        inner.posts.insert(item.post_id, item);
        Ok(())
    }
}
