use std::collections::HashMap;

/// Per-instrument alert gate.
///
/// Two observable states per key: Eligible (may alert) and Cooling (may
/// not). A key becomes Cooling exactly when `mark_alerted` records a
/// dispatch, and returns to Eligible once the full window has elapsed —
/// the boundary itself counts as elapsed. Entries are never deleted;
/// stale keys for instruments that left the watchlist are harmless.
#[derive(Debug)]
pub struct CooldownGate {
    cooldown_hours: i64,
    last_alert: HashMap<String, i64>,
}

impl CooldownGate {
    pub fn new(cooldown_hours: i64, seed: HashMap<String, i64>) -> Self {
        assert!(cooldown_hours > 0, "cooldown window must be positive");
        Self {
            cooldown_hours,
            last_alert: seed,
        }
    }

    /// May this key alert at `now`? Keys that never alerted are Eligible.
    pub fn eligible(&self, key: &str, now: i64) -> bool {
        match self.last_alert.get(key) {
            Some(&last) => now - last >= self.cooldown_hours * 3600,
            None => true,
        }
    }

    /// Record a dispatched alert. Call only after the sink confirmed
    /// delivery — marking first would silently lose the alert on a
    /// delivery failure.
    pub fn mark_alerted(&mut self, key: &str, now: i64) {
        self.last_alert.insert(key.to_string(), now);
    }

    /// Current state map, for persistence between scan cycles.
    pub fn snapshot(&self) -> &HashMap<String, i64> {
        &self.last_alert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3600;

    fn gate_with(key: &str, last: i64) -> CooldownGate {
        let mut seed = HashMap::new();
        seed.insert(key.to_string(), last);
        CooldownGate::new(72, seed)
    }

    #[test]
    fn unknown_key_is_eligible() {
        let gate = CooldownGate::new(72, HashMap::new());
        assert!(gate.eligible("solana:abc", 1_700_000_000));
    }

    #[test]
    fn exactly_at_window_boundary_is_eligible() {
        let now = 1_700_000_000;
        let gate = gate_with("solana:abc", now - 72 * HOUR);
        assert!(gate.eligible("solana:abc", now));
    }

    #[test]
    fn one_second_inside_window_is_not_eligible() {
        let now = 1_700_000_000;
        let gate = gate_with("solana:abc", now - 72 * HOUR + 1);
        assert!(!gate.eligible("solana:abc", now));
    }

    #[test]
    fn marking_makes_key_cooling_immediately() {
        let now = 1_700_000_000;
        let mut gate = CooldownGate::new(72, HashMap::new());
        assert!(gate.eligible("solana:abc", now));
        gate.mark_alerted("solana:abc", now);
        assert!(!gate.eligible("solana:abc", now + 1));
        assert!(gate.eligible("solana:abc", now + 72 * HOUR));
    }

    #[test]
    fn keys_are_independent() {
        let now = 1_700_000_000;
        let mut gate = CooldownGate::new(72, HashMap::new());
        gate.mark_alerted("solana:abc", now);
        assert!(gate.eligible("base:def", now + 1));
    }
}
