// ============================================
// Preference Tracking
// ============================================
//
// Per-session like counts by category, fed by every swipe decision.
// Likes bump the category count and the decision total, dislikes only
// bump the total, so the total always bounds the sum of the counts.

pub mod state;

pub use state::{PreferenceSnapshot, PreferenceState};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Invariant violated: {liked} liked decisions exceed {total} total decisions")]
    InvariantViolated { liked: u64, total: u64 },
}

pub type Result<T> = std::result::Result<T, PreferenceError>;
