use super::{Result, SessionError};
use crate::config::FeedConfig;
use crate::models::{CategoryFilter, ContentItem, Engagement, UserSession};
use crate::services::feed::{NextItem, SwipeFeed};
use crate::services::preference::PreferenceState;
use crate::store::ContentStore;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

type SharedFeed = Arc<Mutex<SwipeFeed>>;

/// What a single [`SessionRegistry::swipe`] call did.
#[derive(Debug, Clone, PartialEq)]
pub enum SwipeOutcome {
    Swiped {
        item: ContentItem,
        engagement: Engagement,
    },
    /// Nothing was drawn this time; unseen posts remain.
    NoSelection,
    /// No unseen posts match the session's filter.
    Exhausted,
}

/// Live swipe sessions keyed by session id.
pub struct SessionRegistry {
    store: Arc<dyn ContentStore>,
    config: FeedConfig,
    sessions: DashMap<Uuid, SharedFeed>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn ContentStore>, config: FeedConfig) -> Self {
        Self {
            store,
            config,
            sessions: DashMap::new(),
        }
    }

    /// Open a session with zeroed preferences.
    pub fn start(&self, user_id: Uuid) -> UserSession {
        let session = UserSession::new(user_id);
        let feed = SwipeFeed::new(self.store.clone(), session.clone(), self.config.clone());
        self.sessions
            .insert(session.session_id, Arc::new(Mutex::new(feed)));

        info!(
            session_id = %session.session_id,
            user_id = %user_id,
            "Swipe session started"
        );
        session
    }

    /// Handle to a session's feed. Lock it to read or drive the feed.
    pub fn get(&self, session_id: Uuid) -> Result<SharedFeed> {
        self.sessions
            .get(&session_id)
            .map(|entry| entry.value().clone())
            .ok_or(SessionError::NotFound(session_id))
    }

    pub async fn next_item(&self, session_id: Uuid) -> Result<NextItem> {
        let feed = self.get(session_id)?;
        let mut feed = feed.lock().await;
        Ok(feed.next_item().await?)
    }

    pub async fn record_engagement(
        &self,
        session_id: Uuid,
        post_id: Uuid,
        engagement: Engagement,
    ) -> Result<()> {
        let feed = self.get(session_id)?;
        let mut feed = feed.lock().await;
        feed.record_engagement(post_id, engagement).await?;
        Ok(())
    }

    /// Show the next post and apply `decide` to it under one lock.
    pub async fn swipe<F>(
        &self,
        session_id: Uuid,
        decide: F,
    ) -> Result<SwipeOutcome>
    where
        F: FnOnce(&ContentItem) -> Engagement,
    {
        let feed = self.get(session_id)?;
        let mut feed = feed.lock().await;

        let item = match feed.next_item().await? {
            NextItem::Item(item) => item,
            NextItem::NoSelection => return Ok(SwipeOutcome::NoSelection),
            NextItem::Exhausted => return Ok(SwipeOutcome::Exhausted),
        };
        let engagement = decide(&item);
        feed.record_engagement(item.post_id, engagement).await?;

        Ok(SwipeOutcome::Swiped { item, engagement })
    }

    pub async fn set_filter(&self, session_id: Uuid, filter: CategoryFilter) -> Result<()> {
        let feed = self.get(session_id)?;
        feed.lock().await.set_filter(filter);
        Ok(())
    }

    /// Copy of the session's current preferences.
    pub async fn preferences(&self, session_id: Uuid) -> Result<PreferenceState> {
        let feed = self.get(session_id)?;
        let snapshot = feed.lock().await.preferences().clone();
        Ok(snapshot)
    }

    /// Close a session and discard its state.
    pub fn end(&self, session_id: Uuid) -> Result<()> {
        self.sessions
            .remove(&session_id)
            .ok_or(SessionError::NotFound(session_id))?;

        info!(session_id = %session_id, "Swipe session ended");
        Ok(())
    }

    /// Drop sessions idle for longer than the configured TTL.
    ///
    /// Sessions whose lock is held are in use and always kept.
    pub fn expire_idle(&self, now: DateTime<Utc>) -> usize {
        let ttl_secs = self.config.session_ttl_secs;
        let before = self.sessions.len();

        self.sessions.retain(|session_id, feed| match feed.try_lock() {
            Ok(feed) => {
                let idle_secs = (now - feed.last_activity()).num_seconds();
                let keep = idle_secs <= 0 || idle_secs.unsigned_abs() <= ttl_secs;
                if !keep {
                    debug!(session_id = %session_id, "Expiring idle session");
                }
                keep
            }
            Err(_) => true,
        });

        let expired = before.saturating_sub(self.sessions.len());
        if expired > 0 {
            info!(expired = expired, remaining = self.sessions.len(), "Idle sessions expired");
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
