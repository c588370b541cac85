// ============================================
// Preference-Weighted Selector
// ============================================
//
// Picks the category of the next post from the session's like counts.
//
// The unit interval is split into consecutive slices in `Category::ALL`
// order, each sized count / total_decisions. A uniform roll lands in one
// slice or in the unallocated tail left over by dislikes, in which case
// nothing is selected.
//
// Before the first decision every category gets an equal slice.
//
// The roll is compared in count space (roll * total < cumulative count)
// so a fully liked history covers [0, 1) without a float gap. The compare
// runs on u128 with the roll in 64-bit fixed point, which is exact for
// every roll `rand` produces (multiples of 2^-53) and any count.

use crate::models::{Category, ContentItem};
use crate::services::preference::PreferenceState;
use rand::Rng;
use tracing::debug;

/// 2^64, one unit of the roll's fixed-point form.
const FIXED_ONE: f64 = 18_446_744_073_709_551_616.0;

/// Outcome of one selection draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pick<'a> {
    /// First candidate of the drawn category.
    Item(&'a ContentItem),
    /// Roll landed in the tail that belongs to no category.
    Unallocated,
    /// A category was drawn but no candidate carries it.
    NoMatch(Category),
}

impl<'a> Pick<'a> {
    pub fn item(&self) -> Option<&'a ContentItem> {
        match *self {
            Pick::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Pick::Item(_))
    }
}

/// Draw the next post from `available` weighted by `state`.
///
/// Never mutates `state`. Callers decide what to do when nothing is
/// selected.
pub fn pick_next_category<'a, R>(
    state: &PreferenceState,
    available: &'a [ContentItem],
    rng: &mut R,
) -> Pick<'a>
where
    R: Rng,
{
    let roll: f64 = rng.gen();
    pick_with_roll(state, available, roll)
}

/// Same as [`pick_next_category`] with the roll supplied by the caller.
pub fn pick_with_roll<'a>(
    state: &PreferenceState,
    available: &'a [ContentItem],
    roll: f64,
) -> Pick<'a> {
    let pick = match select_category(state, roll) {
        None => Pick::Unallocated,
        Some(category) => match available.iter().find(|item| item.category == category) {
            Some(item) => Pick::Item(item),
            None => Pick::NoMatch(category),
        },
    };

    debug!(
        roll = roll,
        total_decisions = state.total_decisions(),
        candidates = available.len(),
        outcome = ?pick.item().map(|i| i.post_id),
        "Category draw completed"
    );

    pick
}

/// Map a roll in `[0, 1)` onto the category partition.
///
/// Rolls outside `[0, 1)` (including NaN) select nothing.
pub fn select_category(state: &PreferenceState, roll: f64) -> Option<Category> {
    if !(0.0..1.0).contains(&roll) {
        return None;
    }

    let (shares, denominator): (Vec<(Category, u64)>, u64) = if state.is_empty() {
        (
            Category::ALL.iter().map(|c| (*c, 1)).collect(),
            Category::ALL.len() as u64,
        )
    } else {
        (
            Category::ALL.iter().map(|c| (*c, state.count(*c))).collect(),
            state.total_decisions(),
        )
    };

    // roll < 1, so the fixed-point roll is below 2^64 and the product fits.
    let scaled = ((roll * FIXED_ONE) as u128) * u128::from(denominator);
    let mut cumulative = 0u128;
    for (category, share) in shares {
        if share == 0 {
            continue;
        }
        cumulative += u128::from(share);
        if scaled < cumulative << 64 {
            return Some(category);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::preference::PreferenceSnapshot;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{BTreeMap, HashMap};
    use uuid::Uuid;

    fn item(category: Category) -> ContentItem {
        ContentItem::new(Uuid::new_v4(), category, "https://img.example/post.jpg")
    }

    fn pool() -> Vec<ContentItem> {
        vec![
            item(Category::Formal),
            item(Category::Street),
            item(Category::Casual),
            item(Category::Street),
        ]
    }

    fn state_with(street: u64, casual: u64, formal: u64, dislikes: u64) -> PreferenceState {
        let mut state = PreferenceState::new();
        for _ in 0..street {
            state.record_engagement(Category::Street, true);
        }
        for _ in 0..casual {
            state.record_engagement(Category::Casual, true);
        }
        for _ in 0..formal {
            state.record_engagement(Category::Formal, true);
        }
        for _ in 0..dislikes {
            state.record_engagement(Category::Formal, false);
        }
        state
    }

    #[test]
    fn test_empty_history_uses_equal_thirds() {
        let state = PreferenceState::new();

        assert_eq!(select_category(&state, 0.0), Some(Category::Street));
        assert_eq!(select_category(&state, 0.33), Some(Category::Street));
        assert_eq!(select_category(&state, 0.34), Some(Category::Casual));
        assert_eq!(select_category(&state, 0.66), Some(Category::Casual));
        assert_eq!(select_category(&state, 0.67), Some(Category::Formal));
        assert_eq!(select_category(&state, 0.999_999), Some(Category::Formal));
    }

    #[test]
    fn test_empty_history_never_fails_to_pick() {
        let state = PreferenceState::new();
        let items = pool();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            assert!(pick_next_category(&state, &items, &mut rng).is_selected());
        }
    }

    #[test]
    fn test_partition_boundaries() {
        // street 0.75, casual 0.25, formal 0.0
        let state = state_with(3, 1, 0, 0);

        assert_eq!(select_category(&state, 0.5), Some(Category::Street));
        assert_eq!(select_category(&state, 0.749_999), Some(Category::Street));
        assert_eq!(select_category(&state, 0.75), Some(Category::Casual));
        assert_eq!(select_category(&state, 0.8), Some(Category::Casual));
        assert_eq!(select_category(&state, 0.999_999), Some(Category::Casual));
        assert_eq!(select_category(&state, 1.0), None);
    }

    #[test]
    fn test_dislikes_leave_unallocated_tail() {
        // street 0.25, casual 0.25, remainder 0.5 selects nothing
        let state = state_with(1, 1, 0, 2);
        let items = pool();

        assert_eq!(select_category(&state, 0.1), Some(Category::Street));
        assert_eq!(select_category(&state, 0.3), Some(Category::Casual));
        assert_eq!(select_category(&state, 0.5), None);
        assert_eq!(pick_with_roll(&state, &items, 0.9), Pick::Unallocated);
    }

    #[test]
    fn test_all_dislikes_selects_nothing() {
        let state = state_with(0, 0, 0, 5);
        let items = pool();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..100 {
            assert_eq!(pick_next_category(&state, &items, &mut rng), Pick::Unallocated);
        }
    }

    fn restored(counts: &[(Category, u64)], total_decisions: u64) -> PreferenceState {
        PreferenceState::try_from(PreferenceSnapshot {
            category_counts: counts.iter().copied().collect::<BTreeMap<_, _>>(),
            total_decisions,
        })
        .unwrap()
    }

    #[test]
    fn test_boundaries_exact_beyond_f64_precision() {
        // 2^53 + 1 is not representable as f64; a float compare would put
        // the midpoint in casual.
        let state = restored(
            &[
                (Category::Street, (1u64 << 53) + 1),
                (Category::Casual, (1u64 << 53) - 1),
            ],
            1u64 << 54,
        );

        assert_eq!(select_category(&state, 0.5), Some(Category::Street));
        assert_eq!(select_category(&state, 0.500_000_000_000_001), Some(Category::Casual));
    }

    #[test]
    fn test_saturated_history_covers_the_unit_interval() {
        let state = restored(
            &[(Category::Street, 1), (Category::Casual, u64::MAX - 1)],
            u64::MAX,
        );
        let below_one = 1.0 - f64::EPSILON / 2.0;

        assert_eq!(select_category(&state, 0.0), Some(Category::Street));
        assert_eq!(select_category(&state, 0.5), Some(Category::Casual));
        assert_eq!(select_category(&state, below_one), Some(Category::Casual));
    }

    #[test]
    fn test_out_of_range_rolls_select_nothing() {
        let state = state_with(2, 0, 0, 0);
        assert_eq!(select_category(&state, -0.1), None);
        assert_eq!(select_category(&state, 1.5), None);
        assert_eq!(select_category(&state, f64::NAN), None);
    }

    #[test]
    fn test_pick_returns_first_matching_item() {
        let state = state_with(1, 0, 0, 0);
        let items = pool();

        match pick_with_roll(&state, &items, 0.4) {
            Pick::Item(chosen) => assert_eq!(chosen.post_id, items[1].post_id),
            other => panic!("expected an item, got {other:?}"),
        }
    }

    #[test]
    fn test_no_matching_item_is_not_an_error() {
        let state = state_with(0, 0, 2, 0);
        let items = vec![item(Category::Street), item(Category::Casual)];

        assert_eq!(
            pick_with_roll(&state, &items, 0.2),
            Pick::NoMatch(Category::Formal)
        );
        assert_eq!(pick_with_roll(&state, &[], 0.2), Pick::NoMatch(Category::Formal));
    }

    #[test]
    fn test_picked_item_always_matches_drawn_category() {
        let state = state_with(4, 3, 2, 3);
        let items = pool();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1_000 {
            let roll: f64 = rng.gen();
            let drawn = select_category(&state, roll);
            match pick_with_roll(&state, &items, roll) {
                Pick::Item(chosen) => assert_eq!(Some(chosen.category), drawn),
                Pick::NoMatch(category) => assert_eq!(Some(category), drawn),
                Pick::Unallocated => assert_eq!(drawn, None),
            }
        }
    }

    #[test]
    fn test_picking_does_not_mutate_state() {
        let state = state_with(2, 1, 1, 1);
        let before = state.clone();
        let items = pool();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..50 {
            let _ = pick_next_category(&state, &items, &mut rng);
        }

        assert_eq!(state, before);
    }

    #[test]
    fn test_draw_frequencies_track_weights() {
        let state = state_with(3, 1, 0, 0);
        let items = pool();
        let mut rng = StdRng::seed_from_u64(2024);
        let mut hits: HashMap<Category, u32> = HashMap::new();

        let draws = 20_000;
        for _ in 0..draws {
            if let Some(chosen) = pick_next_category(&state, &items, &mut rng).item() {
                *hits.entry(chosen.category).or_insert(0) += 1;
            }
        }

        let street = *hits.get(&Category::Street).unwrap_or(&0) as f64 / draws as f64;
        let casual = *hits.get(&Category::Casual).unwrap_or(&0) as f64 / draws as f64;
        assert!((street - 0.75).abs() < 0.02, "street share {street}");
        assert!((casual - 0.25).abs() < 0.02, "casual share {casual}");
        assert!(!hits.contains_key(&Category::Formal));
    }
}
