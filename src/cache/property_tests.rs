//! Property-Based Tests for the Cache Key Builder
//!
//! Uses proptest to verify the key invariants the read/write paths rely
//! on: determinism, collision-freedom across views, and namespace
//! containment.

use proptest::prelude::*;
use std::collections::HashSet;
use uuid::Uuid;

use crate::cache::key::{CacheKey, NoteView};
use crate::models::NoteFilters;

// == Strategies ==

fn uuid_strategy() -> impl Strategy<Value = Uuid> {
    any::<[u8; 16]>().prop_map(Uuid::from_bytes)
}

fn filters_strategy() -> impl Strategy<Value = NoteFilters> {
    (any::<Option<bool>>(), any::<Option<bool>>())
        .prop_map(|(archived, pinned)| NoteFilters { archived, pinned })
}

fn view_strategy() -> impl Strategy<Value = NoteView> {
    prop_oneof![
        filters_strategy().prop_map(NoteView::List),
        Just(NoteView::Archived),
        Just(NoteView::Pinned),
        Just(NoteView::Trashed),
        Just(NoteView::Shared),
        uuid_strategy().prop_map(NoteView::ByLabel),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // The same (user, view, filters) tuple always renders the same key,
    // so logically identical queries share one cache entry.
    #[test]
    fn prop_key_is_deterministic(user in uuid_strategy(), view in view_strategy()) {
        let a = CacheKey::new(user, view).to_string();
        let b = CacheKey::new(user, view).to_string();
        prop_assert_eq!(a, b);
    }

    // Distinct views for the same user never collide.
    #[test]
    fn prop_distinct_views_distinct_keys(
        user in uuid_strategy(),
        views in prop::collection::vec(view_strategy(), 2..12),
    ) {
        let mut unique_views = Vec::new();
        for view in views {
            if !unique_views.contains(&view) {
                unique_views.push(view);
            }
        }

        let keys: HashSet<String> = unique_views
            .iter()
            .map(|view| CacheKey::new(user, *view).to_string())
            .collect();
        prop_assert_eq!(keys.len(), unique_views.len(), "view collision");
    }

    // Every key a user can produce falls inside that user's namespace
    // pattern, and inside no other user's.
    #[test]
    fn prop_keys_contained_in_user_namespace(
        user_a in uuid_strategy(),
        user_b in uuid_strategy(),
        view in view_strategy(),
    ) {
        prop_assume!(user_a != user_b);

        let key = CacheKey::new(user_a, view).to_string();
        let own_prefix = CacheKey::user_pattern(user_a);
        let own_prefix = own_prefix.strip_suffix('*').unwrap().to_string();
        let other_prefix = CacheKey::user_pattern(user_b);
        let other_prefix = other_prefix.strip_suffix('*').unwrap().to_string();

        prop_assert!(key.starts_with(&own_prefix));
        prop_assert!(!key.starts_with(&other_prefix));
    }

    // Filter canonicalization: the rendered filter segment depends only on
    // the field values, never on how the struct was produced.
    #[test]
    fn prop_filter_order_is_canonical(
        user in uuid_strategy(),
        archived in any::<Option<bool>>(),
        pinned in any::<Option<bool>>(),
    ) {
        let direct = NoteFilters { archived, pinned };
        let rebuilt = NoteFilters { pinned, archived };

        let a = CacheKey::new(user, NoteView::List(direct)).to_string();
        let b = CacheKey::new(user, NoteView::List(rebuilt)).to_string();
        prop_assert_eq!(a, b);
    }

    // Different users never share a key, whatever the view.
    #[test]
    fn prop_users_never_share_keys(
        user_a in uuid_strategy(),
        user_b in uuid_strategy(),
        view_a in view_strategy(),
        view_b in view_strategy(),
    ) {
        prop_assume!(user_a != user_b);

        let a = CacheKey::new(user_a, view_a).to_string();
        let b = CacheKey::new(user_b, view_b).to_string();
        prop_assert_ne!(a, b);
    }
}
