//! Property test for the Pattern Engine's apply/extract invariant (spec §8):
//! for every pattern containing `[id]` and every issue with a valid id,
//! `extract_id(apply_pattern(p, x), p) == x.id`.

use std::collections::HashSet;

use beads_core::IssueBuilder;
use beads_markdown::{apply_pattern, extract_id};
use proptest::prelude::*;

fn arb_id() -> impl Strategy<Value = String> {
    "[a-z]{2,4}-[a-z0-9]{3,4}".prop_map(|s| s)
}

fn arb_title() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ]{1,40}".prop_filter("non-empty after trim", |s| !s.trim().is_empty())
}

proptest! {
    #[test]
    fn apply_then_extract_recovers_id(id in arb_id(), title in arb_title()) {
        let issue = IssueBuilder::new(title).id(id.clone()).build();
        let pattern = "[id]-[title].md";
        let filename = apply_pattern(pattern, &issue, &HashSet::new()).unwrap();
        let extracted = extract_id(&filename, pattern);
        prop_assert_eq!(extracted, Some(id));
    }

    #[test]
    fn apply_then_extract_recovers_id_only_pattern(id in arb_id()) {
        let issue = IssueBuilder::new("x").id(id.clone()).build();
        let pattern = "[id].md";
        let filename = apply_pattern(pattern, &issue, &HashSet::new()).unwrap();
        let extracted = extract_id(&filename, pattern);
        prop_assert_eq!(extracted, Some(id));
    }
}
