//! Edge detection over polled key states

use crate::key::VirtualKey;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Down,
    Up,
}

/// A key changing state between two polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEdge {
    pub key: VirtualKey,
    pub state: KeyState,
}

impl KeyEdge {
    pub fn down(key: VirtualKey) -> Self {
        Self {
            key,
            state: KeyState::Down,
        }
    }

    pub fn up(key: VirtualKey) -> Self {
        Self {
            key,
            state: KeyState::Up,
        }
    }

    pub fn is_down(&self) -> bool {
        self.state == KeyState::Down
    }
}

/// Keys held at one poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    pressed: BTreeSet<VirtualKey>,
}

impl KeySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: VirtualKey) {
        self.pressed.insert(key);
    }

    pub fn is_down(&self, key: VirtualKey) -> bool {
        self.pressed.contains(&key)
    }
}

impl FromIterator<VirtualKey> for KeySnapshot {
    fn from_iter<I: IntoIterator<Item = VirtualKey>>(iter: I) -> Self {
        Self {
            pressed: iter.into_iter().collect(),
        }
    }
}

/// Turns level-triggered snapshots into edge-triggered events
#[derive(Debug, Clone)]
pub struct KeyTracker {
    watched: Vec<VirtualKey>,
    previous: KeySnapshot,
}

impl KeyTracker {
    pub fn new(watched: Vec<VirtualKey>) -> Self {
        Self {
            watched,
            previous: KeySnapshot::new(),
        }
    }

    pub fn watched(&self) -> &[VirtualKey] {
        &self.watched
    }

    /// Edges for every watched key whose state differs from the last update
    pub fn update(&mut self, current: &KeySnapshot) -> Vec<KeyEdge> {
        let mut edges = Vec::new();
        let mut next = KeySnapshot::new();

        for &key in &self.watched {
            let now = current.is_down(key);
            if now {
                next.press(key);
            }

            match (self.previous.is_down(key), now) {
                (false, true) => edges.push(KeyEdge::down(key)),
                (true, false) => edges.push(KeyEdge::up(key)),
                _ => {}
            }
        }

        self.previous = next;
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_key_emits_one_down_and_one_up() {
        let mut tracker = KeyTracker::new(vec![VirtualKey::CONTROL]);
        let held: KeySnapshot = [VirtualKey::CONTROL].into_iter().collect();
        let released = KeySnapshot::new();

        let mut edges = Vec::new();
        for snapshot in [&released, &held, &held, &held, &released, &released] {
            edges.extend(tracker.update(snapshot));
        }

        assert_eq!(
            edges,
            vec![
                KeyEdge::down(VirtualKey::CONTROL),
                KeyEdge::up(VirtualKey::CONTROL)
            ]
        );
    }

    #[test]
    fn unwatched_keys_are_ignored() {
        let mut tracker = KeyTracker::new(vec![VirtualKey::SHIFT]);
        let snapshot: KeySnapshot = [VirtualKey::ESCAPE].into_iter().collect();
        assert!(tracker.update(&snapshot).is_empty());
    }

    #[test]
    fn simultaneous_changes_follow_watch_order() {
        let mut tracker = KeyTracker::new(vec![VirtualKey::CONTROL, VirtualKey::SNAPSHOT]);
        let both: KeySnapshot = [VirtualKey::SNAPSHOT, VirtualKey::CONTROL]
            .into_iter()
            .collect();

        assert_eq!(
            tracker.update(&both),
            vec![
                KeyEdge::down(VirtualKey::CONTROL),
                KeyEdge::down(VirtualKey::SNAPSHOT)
            ]
        );
    }
}
