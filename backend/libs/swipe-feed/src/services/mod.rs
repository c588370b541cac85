pub mod feed;
pub mod preference;
pub mod selector;
pub mod sessions;

pub use feed::{FeedError, NextItem, SwipeFeed};
pub use preference::{PreferenceError, PreferenceState};
pub use selector::{pick_next_category, pick_with_roll, select_category, Pick};
pub use sessions::{SessionError, SessionRegistry, SwipeOutcome};
