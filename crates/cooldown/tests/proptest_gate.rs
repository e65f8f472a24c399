use std::collections::HashMap;

use cooldown::CooldownGate;
use proptest::prelude::*;

proptest! {
    /// Eligibility is exactly "elapsed >= window", boundary inclusive.
    #[test]
    fn eligibility_matches_elapsed_window(
        last in 0i64..2_000_000_000,
        elapsed in 0i64..2_000_000,
        cooldown_hours in 1i64..200,
    ) {
        let mut seed = HashMap::new();
        seed.insert("solana:abc".to_string(), last);
        let gate = CooldownGate::new(cooldown_hours, seed);
        prop_assert_eq!(
            gate.eligible("solana:abc", last + elapsed),
            elapsed >= cooldown_hours * 3600
        );
    }

    /// Keys that never alerted are always eligible, whatever the clock says.
    #[test]
    fn unknown_keys_are_always_eligible(now in any::<i64>()) {
        let gate = CooldownGate::new(72, HashMap::new());
        prop_assert!(gate.eligible("solana:never-alerted", now));
    }

    /// Marking one key never affects another.
    #[test]
    fn marking_is_per_key(
        now in 0i64..2_000_000_000,
        key_a in "[a-z]{3,10}",
        key_b in "[a-z]{3,10}",
    ) {
        prop_assume!(key_a != key_b);
        let mut gate = CooldownGate::new(72, HashMap::new());
        gate.mark_alerted(&key_a, now);
        prop_assert!(gate.eligible(&key_b, now));
        prop_assert!(!gate.eligible(&key_a, now + 1));
    }
}
