//! Property-based tests for series naming
//!
//! Names must be deterministic, contain only alphanumerics and single
//! underscores, and never merge two distinct clean column keys.

use permit_transform::series_name;
use proptest::prelude::*;

/// Labels as they appear in portal exports: Hangul, ASCII, spaces, punctuation.
fn raw_label_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[가-힣]{1,8}",
        "[가-힣a-zA-Z0-9 ()·/_-]{1,12}",
        "[a-z0-9]{1,6}",
    ]
}

/// Labels without separator characters.
fn clean_label_strategy() -> impl Strategy<Value = String> {
    "[가-힣a-z0-9]{1,6}"
}

fn domain_strategy() -> impl Strategy<Value = String> {
    "(use6|use28|activity|structure|sido)"
}

proptest! {
    #[test]
    fn test_name_is_deterministic(
        domain in domain_strategy(),
        key in prop::collection::vec(raw_label_strategy(), 1..4),
    ) {
        prop_assert_eq!(series_name(&domain, &key), series_name(&domain, &key));
    }

    #[test]
    fn test_name_is_sanitized(
        domain in domain_strategy(),
        key in prop::collection::vec(raw_label_strategy(), 1..4),
    ) {
        let name = series_name(&domain, &key);
        prop_assert!(name.chars().all(|ch| ch.is_alphanumeric() || ch == '_'), "{}", name);
        prop_assert!(!name.contains("__"), "{}", name);
        prop_assert!(name.starts_with(&domain));
    }

    #[test]
    fn test_clean_keys_never_collide(
        domain in domain_strategy(),
        left in prop::collection::vec(clean_label_strategy(), 2),
        right in prop::collection::vec(clean_label_strategy(), 2),
    ) {
        prop_assume!(left != right);
        prop_assert_ne!(series_name(&domain, &left), series_name(&domain, &right));
    }
}
