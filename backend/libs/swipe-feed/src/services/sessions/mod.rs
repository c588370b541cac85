// ============================================
// Session Registry
// ============================================
//
// Owns every live swipe session. Each session sits behind its own
// mutex so engagement updates for one viewer are serialized while
// different viewers never contend.

pub mod registry;

pub use registry::{SessionRegistry, SwipeOutcome};

use crate::services::feed::FeedError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
