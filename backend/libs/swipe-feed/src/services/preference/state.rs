use super::{PreferenceError, Result};
use crate::models::{Category, Engagement};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Accumulated engagement for one browsing session.
///
/// Only `record_engagement` mutates the counters, which keeps
/// `total_decisions >= liked_total()` at all times. Snapshots that break
/// that rule are rejected on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PreferenceSnapshot", into = "PreferenceSnapshot")]
pub struct PreferenceState {
    category_counts: BTreeMap<Category, u64>,
    total_decisions: u64,
}

/// Wire form of [`PreferenceState`], validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceSnapshot {
    #[serde(default)]
    pub category_counts: BTreeMap<Category, u64>,
    pub total_decisions: u64,
}

impl PreferenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one swipe decision on a post of `category`.
    pub fn record_engagement(&mut self, category: Category, liked: bool) {
        self.total_decisions = self.total_decisions.saturating_add(1);
        if liked {
            let count = self.category_counts.entry(category).or_insert(0);
            *count = count.saturating_add(1);
        }

        debug!(
            category = category.as_str(),
            liked = liked,
            total_decisions = self.total_decisions,
            "Preference updated"
        );
    }

    pub fn record(&mut self, category: Category, engagement: Engagement) {
        self.record_engagement(category, engagement.is_like());
    }

    pub fn count(&self, category: Category) -> u64 {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total_decisions(&self) -> u64 {
        self.total_decisions
    }

    /// Sum of liked decisions across every category.
    pub fn liked_total(&self) -> u64 {
        self.category_counts
            .values()
            .fold(0u64, |acc, c| acc.saturating_add(*c))
    }

    pub fn is_empty(&self) -> bool {
        self.total_decisions == 0
    }

    /// Selection weight per category, in partition order.
    ///
    /// With no decisions recorded every category gets an equal share.
    /// Otherwise the weights are `count / total_decisions` and sum to at
    /// most 1.0; the remainder is the chance that nothing is selected.
    pub fn weights(&self) -> Vec<(Category, f64)> {
        if self.is_empty() {
            let share = 1.0 / Category::ALL.len() as f64;
            return Category::ALL.iter().map(|c| (*c, share)).collect();
        }

        let total = self.total_decisions as f64;
        Category::ALL
            .iter()
            .map(|c| (*c, self.count(*c) as f64 / total))
            .collect()
    }
}

impl TryFrom<PreferenceSnapshot> for PreferenceState {
    type Error = PreferenceError;

    fn try_from(snapshot: PreferenceSnapshot) -> Result<Self> {
        let state = PreferenceState {
            category_counts: snapshot.category_counts,
            total_decisions: snapshot.total_decisions,
        };
        let liked = state.liked_total();
        if liked > state.total_decisions {
            return Err(PreferenceError::InvariantViolated {
                liked,
                total: state.total_decisions,
            });
        }
        Ok(state)
    }
}

impl From<PreferenceState> for PreferenceSnapshot {
    fn from(state: PreferenceState) -> Self {
        PreferenceSnapshot {
            category_counts: state.category_counts,
            total_decisions: state.total_decisions,
        }
    }
}
