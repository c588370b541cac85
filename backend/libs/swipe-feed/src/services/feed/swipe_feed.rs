use super::{FeedError, Result};
use crate::config::{FallbackPolicy, FeedConfig};
use crate::models::{CategoryFilter, ContentItem, Engagement, UserSession};
use crate::services::preference::PreferenceState;
use crate::services::selector::{pick_next_category, Pick};
use crate::store::{CandidateQuery, ContentStore};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of asking the feed for its next post.
#[derive(Debug, Clone, PartialEq)]
pub enum NextItem {
    Item(ContentItem),
    /// Unseen posts remain but the draw and its fallback picked none.
    /// Asking again may succeed.
    NoSelection,
    /// Nothing left to show under the current filter.
    Exhausted,
}

impl NextItem {
    pub fn item(&self) -> Option<&ContentItem> {
        match self {
            NextItem::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn into_item(self) -> Option<ContentItem> {
        match self {
            NextItem::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, NextItem::Exhausted)
    }
}

/// Feed state for one viewer session.
pub struct SwipeFeed {
    store: Arc<dyn ContentStore>,
    session: UserSession,
    config: FeedConfig,
    preferences: PreferenceState,
    filter: CategoryFilter,
    /// Posts already surfaced this session
    seen: HashSet<Uuid>,
    /// Post awaiting a like/dislike
    current: Option<ContentItem>,
    /// Most recently surfaced post, kept after its decision
    last_shown: Option<ContentItem>,
    rng: StdRng,
    last_activity: DateTime<Utc>,
}

impl SwipeFeed {
    pub fn new(store: Arc<dyn ContentStore>, session: UserSession, config: FeedConfig) -> Self {
        Self::with_rng(store, session, config, StdRng::from_entropy())
    }

    /// Build with a caller-provided generator, e.g. a seeded one for replay.
    pub fn with_rng(
        store: Arc<dyn ContentStore>,
        session: UserSession,
        config: FeedConfig,
        rng: StdRng,
    ) -> Self {
        let last_activity = session.started_at;
        Self {
            store,
            session,
            config,
            preferences: PreferenceState::new(),
            filter: CategoryFilter::All,
            seen: HashSet::new(),
            current: None,
            last_shown: None,
            rng,
            last_activity,
        }
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    pub fn preferences(&self) -> &PreferenceState {
        &self.preferences
    }

    pub fn current(&self) -> Option<&ContentItem> {
        self.current.as_ref()
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Restrict candidates to one category, or lift the restriction.
    ///
    /// Preferences and the seen set carry over; the pending post is dropped.
    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.touch();
        if self.filter != filter {
            info!(
                session_id = %self.session.session_id,
                filter = ?filter,
                "Category filter changed"
            );
        }
        self.filter = filter;
        self.current = None;
    }

    /// Surface the next post.
    ///
    /// [`NextItem::Exhausted`] means no unseen post matches the filter;
    /// [`NextItem::NoSelection`] means some do but none was picked.
    pub async fn next_item(&mut self) -> Result<NextItem> {
        self.touch();

        let mut query = CandidateQuery::new(self.filter, self.config.candidate_limit)
            .excluding_posts(self.seen.iter().copied());
        if self.config.exclude_own_posts {
            query = query.excluding_author(self.session.user_id);
        }

        let fetched = self.store.fetch_candidates(query).await?;
        let candidates = self.eligible(fetched);

        if candidates.is_empty() {
            info!(
                session_id = %self.session.session_id,
                seen = self.seen.len(),
                "No more posts for now"
            );
            self.current = None;
            return Ok(NextItem::Exhausted);
        }

        match self.choose(&candidates) {
            Some(item) => {
                self.seen.insert(item.post_id);
                self.current = Some(item.clone());
                self.last_shown = Some(item.clone());
                Ok(NextItem::Item(item))
            }
            None => {
                self.current = None;
                Ok(NextItem::NoSelection)
            }
        }
    }

    /// Apply a like/dislike to the post currently shown.
    ///
    /// The store write happens first, so a failed write leaves both the
    /// preferences and the pending post untouched for a retry.
    pub async fn record_engagement(&mut self, post_id: Uuid, engagement: Engagement) -> Result<()> {
        self.touch();

        let category = match &self.current {
            Some(item) if item.post_id == post_id => item.category,
            _ => return Err(FeedError::NotShown(post_id)),
        };

        self.store
            .set_like(self.session.user_id, post_id, engagement.is_like())
            .await?;

        self.preferences.record(category, engagement);
        self.current = None;

        debug!(
            session_id = %self.session.session_id,
            post_id = %post_id,
            engagement = ?engagement,
            total_decisions = self.preferences.total_decisions(),
            "Engagement recorded"
        );

        Ok(())
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    fn eligible(&self, fetched: Vec<ContentItem>) -> Vec<ContentItem> {
        let viewer = self.session.user_id;
        let mut candidates: Vec<ContentItem> = fetched
            .into_iter()
            .filter(|p| !self.seen.contains(&p.post_id))
            .filter(|p| !(self.config.exclude_own_posts && p.author_id == viewer))
            .collect();

        if self.config.author_diversity {
            if let Some(previous) = self.last_shown.as_ref().map(|p| p.author_id) {
                if candidates.iter().any(|p| p.author_id != previous) {
                    candidates.retain(|p| p.author_id != previous);
                }
            }
        }

        candidates
    }

    fn choose(&mut self, candidates: &[ContentItem]) -> Option<ContentItem> {
        let first = pick_next_category(&self.preferences, candidates, &mut self.rng);
        if let Some(item) = first.item() {
            return Some(item.clone());
        }

        debug!(
            session_id = %self.session.session_id,
            outcome = ?first,
            policy = ?self.config.fallback_policy,
            "Draw selected nothing, applying fallback"
        );

        match self.config.fallback_policy {
            FallbackPolicy::Redraw => {
                for _ in 0..self.config.max_redraws {
                    if let Pick::Item(item) =
                        pick_next_category(&self.preferences, candidates, &mut self.rng)
                    {
                        return Some(item.clone());
                    }
                }
                warn!(
                    session_id = %self.session.session_id,
                    redraws = self.config.max_redraws,
                    "Redraws exhausted without a selection"
                );
                None
            }
            FallbackPolicy::UniformRandom => candidates.choose(&mut self.rng).cloned(),
            FallbackPolicy::RepeatPrevious => self
                .last_shown
                .as_ref()
                .filter(|previous| self.filter.matches(previous.category))
                .cloned(),
            FallbackPolicy::Skip => None,
        }
    }
}
