// ============================================
// Feed Configuration
// ============================================
//
// Settings for the swipe feed, read from `SWIPE_FEED_*` environment
// variables (a `.env` file is honored). Missing variables fall back to
// defaults; out-of-range values are rejected at load time.
//
// Under `Redraw` or `Skip`, a session whose decisions are all dislikes
// gets no further posts. The default `UniformRandom` always picks while
// unseen candidates remain.

use serde::Deserialize;
use thiserror::Error;

const ENV_PREFIX: &str = "SWIPE_FEED_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// What the feed does when a draw selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Draw again, up to `max_redraws` times.
    Redraw,
    /// Pick uniformly among the remaining candidates.
    #[default]
    UniformRandom,
    /// Show the previous post again.
    RepeatPrevious,
    /// Return nothing for this request.
    Skip,
}

/// Swipe feed settings.
///
/// Loaded from `SWIPE_FEED_*` variables, e.g. `SWIPE_FEED_CANDIDATE_LIMIT=50`
/// or `SWIPE_FEED_FALLBACK_POLICY=uniform_random`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Posts fetched from the store per request
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
    #[serde(default)]
    pub fallback_policy: FallbackPolicy,
    /// Extra draws allowed under `FallbackPolicy::Redraw`
    #[serde(default = "default_max_redraws")]
    pub max_redraws: u32,
    /// Avoid showing the same author twice in a row when possible
    #[serde(default = "default_author_diversity")]
    pub author_diversity: bool,
    /// Hide the viewer's own posts
    #[serde(default = "default_exclude_own_posts")]
    pub exclude_own_posts: bool,
    /// Idle sessions older than this are dropped by the registry
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

fn default_candidate_limit() -> usize {
    100
}

fn default_max_redraws() -> u32 {
    3
}

fn default_author_diversity() -> bool {
    true
}

fn default_exclude_own_posts() -> bool {
    true
}

fn default_session_ttl_secs() -> u64 {
    7200 // 2 hours
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            candidate_limit: default_candidate_limit(),
            fallback_policy: FallbackPolicy::default(),
            max_redraws: default_max_redraws(),
            author_diversity: default_author_diversity(),
            exclude_own_posts: default_exclude_own_posts(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config: FeedConfig = envy::prefixed(ENV_PREFIX).from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.candidate_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "candidate_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.session_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "session_ttl_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_fallback_policy(mut self, policy: FallbackPolicy) -> Self {
        self.fallback_policy = policy;
        self
    }
}
