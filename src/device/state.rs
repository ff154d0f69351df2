//! Semantic device state.
//!
//! Two layers are kept: values confirmed by the device through reports, and
//! optimistic echoes of writes that have not been confirmed yet. A confirmed
//! value for a key always retires the pending echo for that key.

use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Partial state keyed by capability name.
pub type StateUpdate = Map<String, Value>;

#[derive(Default)]
struct Layers {
    confirmed: StateUpdate,
    pending: StateUpdate,
    /// Confirmation sequence at which each key was last confirmed
    confirmed_at: HashMap<String, u64>,
    sequence: u64,
}

/// Thread-safe capability state for one device.
///
/// The version is bumped whenever the merged view changes so callers can
/// detect updates without diffing.
#[derive(Default)]
pub struct SemanticState {
    layers: RwLock<Layers>,
    version: AtomicU32,
}

impl SemanticState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge values reported by the device. Returns true if anything changed.
    pub fn apply_confirmed(&self, update: &StateUpdate) -> bool {
        if update.is_empty() {
            return false;
        }

        let mut layers = self.layers.write();
        layers.sequence += 1;
        let sequence = layers.sequence;
        let mut changed = false;
        for (key, value) in update {
            let before = Self::merged_value(&layers, key).cloned();
            layers.pending.remove(key);
            layers.confirmed.insert(key.clone(), value.clone());
            layers.confirmed_at.insert(key.clone(), sequence);
            changed |= before.as_ref() != Some(value);
        }
        drop(layers);

        if changed {
            self.version.fetch_add(1, Ordering::SeqCst);
        }
        changed
    }

    /// Current confirmation sequence.
    ///
    /// Take a mark before sending a write and hand it to
    /// [`apply_optimistic_since`](Self::apply_optimistic_since) once the write
    /// completed.
    pub fn mark(&self) -> u64 {
        self.layers.read().sequence
    }

    /// Record an optimistic echo of a successful write.
    pub fn apply_optimistic(&self, update: &StateUpdate) -> bool {
        let mark = self.mark();
        self.apply_optimistic_since(update, mark)
    }

    /// Record an optimistic echo of a write started at `mark`.
    ///
    /// Keys confirmed by the device after `mark` keep their confirmed value;
    /// their echo is dropped.
    pub fn apply_optimistic_since(&self, update: &StateUpdate, mark: u64) -> bool {
        if update.is_empty() {
            return false;
        }

        let mut layers = self.layers.write();
        let mut changed = false;
        for (key, value) in update {
            if layers.confirmed_at.get(key).is_some_and(|&at| at > mark) {
                continue;
            }
            changed |= Self::merged_value(&layers, key) != Some(value);
            layers.pending.insert(key.clone(), value.clone());
        }
        drop(layers);

        if changed {
            self.version.fetch_add(1, Ordering::SeqCst);
        }
        changed
    }

    /// Merged view: confirmed values overlaid with still-pending echoes.
    pub fn snapshot(&self) -> StateUpdate {
        let layers = self.layers.read();
        let mut merged = layers.confirmed.clone();
        merged.extend(layers.pending.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Current merged value for one key.
    pub fn get(&self, key: &str) -> Option<Value> {
        Self::merged_value(&self.layers.read(), key).cloned()
    }

    /// Whether `key` holds an echo the device has not confirmed yet.
    pub fn is_pending(&self, key: &str) -> bool {
        self.layers.read().pending.contains_key(key)
    }

    pub fn confirmed(&self) -> StateUpdate {
        self.layers.read().confirmed.clone()
    }

    pub fn pending(&self) -> StateUpdate {
        self.layers.read().pending.clone()
    }

    pub fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }

    fn merged_value<'a>(layers: &'a Layers, key: &str) -> Option<&'a Value> {
        layers.pending.get(key).or_else(|| layers.confirmed.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(value: Value) -> StateUpdate {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = SemanticState::new();
        assert!(state.snapshot().is_empty());
        assert_eq!(state.version(), 0);
    }

    #[test]
    fn test_updates_are_incremental() {
        let state = SemanticState::new();
        state.apply_confirmed(&update(json!({"sensor": "ON"})));
        state.apply_confirmed(&update(json!({"illuminance_raw": 100})));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.get("sensor"), Some(&json!("ON")));
        assert_eq!(snapshot.get("illuminance_raw"), Some(&json!(100)));
    }

    #[test]
    fn test_pending_visible_until_confirmed() {
        let state = SemanticState::new();
        state.apply_confirmed(&update(json!({"min_time": "07:00"})));
        state.apply_optimistic(&update(json!({"min_time": "08:00"})));

        assert_eq!(state.get("min_time"), Some(json!("08:00")));
        assert!(state.is_pending("min_time"));
        assert_eq!(state.confirmed().get("min_time"), Some(&json!("07:00")));

        state.apply_confirmed(&update(json!({"min_time": "07:30"})));
        assert_eq!(state.get("min_time"), Some(json!("07:30")));
        assert!(!state.is_pending("min_time"));
        assert!(state.pending().is_empty());
    }

    #[test]
    fn test_version_tracks_merged_changes() {
        let state = SemanticState::new();
        assert!(state.apply_confirmed(&update(json!({"led_mode": "Night"}))));
        assert_eq!(state.version(), 1);

        // Same value again doesn't increment
        assert!(!state.apply_confirmed(&update(json!({"led_mode": "Night"}))));
        assert_eq!(state.version(), 1);

        // Echo equal to confirmed doesn't increment either
        assert!(!state.apply_optimistic(&update(json!({"led_mode": "Night"}))));
        assert_eq!(state.version(), 1);

        assert!(state.apply_optimistic(&update(json!({"led_mode": "Always"}))));
        assert_eq!(state.version(), 2);

        // Confirmation that corrects the echo
        assert!(state.apply_confirmed(&update(json!({"led_mode": "Never"}))));
        assert_eq!(state.version(), 3);
    }

    #[test]
    fn test_late_echo_does_not_hide_newer_confirmation() {
        let state = SemanticState::new();
        state.apply_confirmed(&update(json!({"max_time": "22:00"})));
        let mark = state.mark();

        // Device answers while the write is still in flight
        state.apply_confirmed(&update(json!({"led_mode": "Never"})));
        assert!(!state.apply_optimistic_since(&update(json!({"led_mode": "Night"})), mark));
        assert_eq!(state.get("led_mode"), Some(json!("Never")));
        assert!(!state.is_pending("led_mode"));

        // Keys not confirmed since the mark still take the echo
        assert!(state.apply_optimistic_since(&update(json!({"max_time": "23:00"})), mark));
        assert_eq!(state.get("max_time"), Some(json!("23:00")));
    }

    #[test]
    fn test_empty_update_is_ignored() {
        let state = SemanticState::new();
        assert!(!state.apply_confirmed(&StateUpdate::new()));
        assert!(!state.apply_optimistic(&StateUpdate::new()));
        assert_eq!(state.version(), 0);
    }
}
