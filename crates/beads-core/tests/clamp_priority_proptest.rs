//! Property test for the priority-clamping boundary (spec §8): every raw
//! value floors first, then either stays in range or snaps to the default.

use beads_core::validation::clamp_priority;
use proptest::prelude::*;

proptest! {
    #[test]
    fn clamp_priority_is_always_in_valid_range(raw in -1000.0f64..1000.0) {
        let clamped = clamp_priority(raw);
        prop_assert!((0..=4).contains(&clamped));
    }

    #[test]
    fn clamp_priority_is_identity_on_valid_integers(n in 0i32..=4) {
        prop_assert_eq!(clamp_priority(n as f64), n);
    }

    #[test]
    fn clamp_priority_floors_before_checking_range(n in 0i32..=3) {
        // n.9 floors to n, which is still in range.
        prop_assert_eq!(clamp_priority(n as f64 + 0.9), n);
    }
}
