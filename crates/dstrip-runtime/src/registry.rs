//! The strip registry: every live strip, keyed and hit-testable.
//!
//! The registry replaces what would otherwise be ambient global state (the
//! list of all strips, the single "currently dragging" flag) with an
//! explicit object the host threads through its event handlers. Strips are
//! registered with their display bounds so cursor reports can be resolved
//! to a strip without consulting the toolkit.

use std::fmt;

use dstrip_core::{Point, Rect, StripEvent};
use dstrip_layout::Strip;

use crate::drag::DragSession;

/// Registry-allocated strip identity.
///
/// Stable for the strip's lifetime and never reused within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StripId(u64);

impl StripId {
    /// Raw identity value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) struct RegisteredStrip {
    pub(crate) id: StripId,
    pub(crate) strip: Strip,
    pub(crate) bounds: Rect,
}

/// All live strips plus the at-most-one active drag session.
#[derive(Default)]
pub struct StripRegistry {
    pub(crate) entries: Vec<RegisteredStrip>,
    next_id: u64,
    pub(crate) session: Option<DragSession>,
}

impl StripRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            session: None,
        }
    }

    /// Register a strip with its display bounds. Returns its identity.
    pub fn insert(&mut self, strip: Strip, bounds: Rect) -> StripId {
        self.next_id += 1;
        let id = StripId(self.next_id);
        tracing::debug!(strip = %id, ?bounds, "strip registered");
        self.entries.push(RegisteredStrip { id, strip, bounds });
        id
    }

    /// Tear a strip down, destroying its remaining slots.
    ///
    /// An active drag session pointing at the strip ends with it.
    pub fn remove(&mut self, id: StripId) -> Option<Strip> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        if self.session.as_ref().is_some_and(|s| s.strip() == id) {
            tracing::debug!(strip = %id, "drag session ended by strip teardown");
            self.session = None;
        }
        let entry = self.entries.remove(index);
        Some(entry.strip)
    }

    /// Number of registered strips.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no strips are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered strip identities, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = StripId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Look up a strip.
    #[must_use]
    pub fn strip(&self, id: StripId) -> Option<&Strip> {
        self.entry(id).map(|e| &e.strip)
    }

    /// Look up a strip for mutation.
    #[must_use]
    pub fn strip_mut(&mut self, id: StripId) -> Option<&mut Strip> {
        self.entry_mut(id).map(|e| &mut e.strip)
    }

    /// A strip's display bounds.
    #[must_use]
    pub fn bounds(&self, id: StripId) -> Option<Rect> {
        self.entry(id).map(|e| e.bounds)
    }

    /// Update a strip's display bounds (panel moved or resized on screen).
    pub fn set_bounds(&mut self, id: StripId, bounds: Rect) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.bounds = bounds;
                true
            }
            None => false,
        }
    }

    /// The strip whose bounds contain `point`, if any.
    ///
    /// Earlier registrations win when bounds overlap.
    #[must_use]
    pub fn strip_at(&self, point: Point) -> Option<StripId> {
        self.entries
            .iter()
            .find(|e| e.bounds.contains(point))
            .map(|e| e.id)
    }

    /// The active drag session, if any.
    #[must_use]
    pub fn drag(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Drain queued notifications from every strip, in registration order.
    pub fn take_events(&mut self) -> Vec<(StripId, StripEvent)> {
        let mut events = Vec::new();
        for entry in &mut self.entries {
            for event in entry.strip.take_events() {
                events.push((entry.id, event));
            }
        }
        events
    }

    pub(crate) fn entry(&self, id: StripId) -> Option<&RegisteredStrip> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub(crate) fn entry_mut(&mut self, id: StripId) -> Option<&mut RegisteredStrip> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dstrip_core::Orientation;

    fn strip() -> Strip {
        Strip::new(100, 4, Orientation::Horizontal)
    }

    // ---- Registration ----

    #[test]
    fn insert_assigns_distinct_ids() {
        let mut registry = StripRegistry::new();
        let a = registry.insert(strip(), Rect::new(0, 0, 100, 4));
        let b = registry.insert(strip(), Rect::new(0, 20, 100, 4));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn remove_returns_the_strip() {
        let mut registry = StripRegistry::new();
        let id = registry.insert(strip(), Rect::new(0, 0, 100, 4));
        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut registry = StripRegistry::new();
        let a = registry.insert(strip(), Rect::new(0, 0, 100, 4));
        registry.remove(a);
        let b = registry.insert(strip(), Rect::new(0, 0, 100, 4));
        assert_ne!(a, b);
    }

    // ---- Hit testing ----

    #[test]
    fn strip_at_resolves_by_bounds() {
        let mut registry = StripRegistry::new();
        let top = registry.insert(strip(), Rect::new(0, 0, 100, 4));
        let bottom = registry.insert(strip(), Rect::new(0, 60, 100, 4));
        assert_eq!(registry.strip_at(Point::new(50, 2)), Some(top));
        assert_eq!(registry.strip_at(Point::new(50, 62)), Some(bottom));
        assert_eq!(registry.strip_at(Point::new(50, 30)), None);
    }

    // ---- Event aggregation ----

    #[test]
    fn take_events_tags_each_strip() {
        use dstrip_layout::{SlotKey, SlotSpec};

        let mut registry = StripRegistry::new();
        let a = registry.insert(strip(), Rect::new(0, 0, 100, 4));
        let b = registry.insert(strip(), Rect::new(0, 60, 100, 4));
        let key = SlotKey::new(1).unwrap();
        registry
            .strip_mut(b)
            .unwrap()
            .add(key, 0, SlotSpec::fixed(10))
            .unwrap();

        let events = registry.take_events();
        assert!(events.iter().all(|(id, _)| *id == b));
        assert!(
            events
                .iter()
                .any(|(_, e)| *e == StripEvent::ItemAdded { key })
        );
        assert!(registry.take_events().is_empty());
        let _ = a;
    }
}
