//! Drag session lifecycle and cross-strip reparenting, exercised through
//! the registry's public API.

use dstrip_core::{AllowAll, MovePolicy, Orientation, Point, Rect, SlotKey, StripEvent};
use dstrip_layout::{SlotSpec, Strip};
use dstrip_runtime::{DragRejected, MoveStrategy, OffsetMode, StripRegistry};
use web_time::Instant;

fn key(raw: u64) -> SlotKey {
    SlotKey::new(raw).unwrap()
}

struct DenyAll;

impl MovePolicy for DenyAll {
    fn can_move(&self, _key: SlotKey) -> bool {
        false
    }

    fn position_writable(&self, _key: SlotKey) -> bool {
        false
    }
}

/// Two horizontal strips stacked on one display, far enough apart that the
/// reparent tolerance cannot bridge them.
fn two_strips(registry: &mut StripRegistry) -> (dstrip_runtime::StripId, dstrip_runtime::StripId) {
    let top = registry.insert(
        Strip::new(100, 4, Orientation::Horizontal),
        Rect::new(0, 0, 100, 4),
    );
    let bottom = registry.insert(
        Strip::new(100, 4, Orientation::Horizontal),
        Rect::new(0, 60, 100, 4),
    );
    (top, bottom)
}

// ---- Begin ----

#[test]
fn begin_drag_rejects_locked_slots_and_policy_denials() {
    let mut registry = StripRegistry::new();
    let (top, _) = two_strips(&mut registry);
    let strip = registry.strip_mut(top).unwrap();
    strip.add(key(1), 0, SlotSpec::fixed(10).locked()).unwrap();
    strip.add(key(2), 20, SlotSpec::fixed(10)).unwrap();

    let cursor = Point::new(2, 2);
    assert_eq!(
        registry.begin_drag(
            top,
            key(1),
            cursor,
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        ),
        Err(DragRejected::Locked { key: key(1) })
    );
    assert_eq!(
        registry.begin_drag(
            top,
            key(2),
            cursor,
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &DenyAll,
        ),
        Err(DragRejected::PolicyDenied { key: key(2) })
    );
    assert!(registry.drag().is_none());
}

#[test]
fn only_one_drag_session_at_a_time() {
    let mut registry = StripRegistry::new();
    let (top, _) = two_strips(&mut registry);
    let strip = registry.strip_mut(top).unwrap();
    strip.add(key(1), 0, SlotSpec::fixed(10)).unwrap();
    strip.add(key(2), 20, SlotSpec::fixed(10)).unwrap();

    registry
        .begin_drag(
            top,
            key(1),
            Point::new(2, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        )
        .unwrap();
    assert_eq!(
        registry.begin_drag(
            top,
            key(2),
            Point::new(22, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        ),
        Err(DragRejected::DragInProgress)
    );

    registry.end_drag();
    assert!(registry.drag().is_none());
    // And again, now that the first session is gone.
    registry
        .begin_drag(
            top,
            key(2),
            Point::new(22, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        )
        .unwrap();
}

#[test]
fn begin_drag_rejects_unknown_strip_and_slot() {
    let mut registry = StripRegistry::new();
    let (top, _) = two_strips(&mut registry);
    let stale = registry.insert(
        Strip::new(10, 4, Orientation::Horizontal),
        Rect::new(0, 90, 10, 4),
    );
    registry.remove(stale);

    let cursor = Point::new(0, 0);
    assert_eq!(
        registry.begin_drag(
            stale,
            key(1),
            cursor,
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        ),
        Err(DragRejected::UnknownStrip { id: stale })
    );
    assert_eq!(
        registry.begin_drag(
            top,
            key(9),
            cursor,
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        ),
        Err(DragRejected::UnknownSlot { key: key(9) })
    );
}

// ---- Continue within one strip ----

#[test]
fn free_drag_tracks_the_cursor_minus_the_grab_offset() {
    let mut registry = StripRegistry::new();
    let (top, _) = two_strips(&mut registry);
    registry
        .strip_mut(top)
        .unwrap()
        .add(key(1), 0, SlotSpec::fixed(10))
        .unwrap();

    // Grabbed 3 cells into the slot.
    registry
        .begin_drag(
            top,
            key(1),
            Point::new(3, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        )
        .unwrap();
    registry.take_events();

    registry.continue_drag(Point::new(48, 2), MoveStrategy::Free);
    assert_eq!(
        registry
            .strip(top)
            .unwrap()
            .slot(key(1))
            .unwrap()
            .constrained_position(),
        45
    );
    let events = registry.take_events();
    assert!(
        events
            .iter()
            .any(|(id, e)| *id == top && *e == StripEvent::ItemMoved { key: key(1) })
    );
}

#[test]
fn packed_strips_force_the_switch_strategy() {
    let mut registry = StripRegistry::new();
    let packed = registry.insert(
        Strip::new_packed(100, 4, Orientation::Horizontal),
        Rect::new(0, 0, 100, 4),
    );
    let strip = registry.strip_mut(packed).unwrap();
    strip.add(key(1), 0, SlotSpec::fixed(10)).unwrap();
    strip.add(key(2), 10, SlotSpec::fixed(10)).unwrap();

    registry
        .begin_drag(
            packed,
            key(1),
            Point::new(1, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        )
        .unwrap();
    // Cursor far enough right that the dragged slot crosses its neighbor's
    // midpoint; a free move would have landed it at the cursor instead.
    registry.continue_drag(Point::new(17, 2), MoveStrategy::Free);

    let order: Vec<u64> = registry
        .strip(packed)
        .unwrap()
        .slots()
        .map(|s| s.key().get())
        .collect();
    assert_eq!(order, vec![2, 1]);
    registry.strip(packed).unwrap().validate().unwrap();
}

#[test]
fn strategy_can_change_between_cursor_reports() {
    let mut registry = StripRegistry::new();
    let (top, _) = two_strips(&mut registry);
    let strip = registry.strip_mut(top).unwrap();
    strip.add(key(1), 0, SlotSpec::fixed(10)).unwrap();
    strip.add(key(2), 30, SlotSpec::fixed(10)).unwrap();

    registry
        .begin_drag(
            top,
            key(1),
            Point::new(2, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        )
        .unwrap();

    // Free report first: the slot lands at the cursor minus the offset,
    // leaving its neighbor alone.
    registry.continue_drag(Point::new(10, 2), MoveStrategy::Free);
    let strip = registry.strip(top).unwrap();
    assert_eq!(strip.slot(key(1)).unwrap().constrained_position(), 8);
    assert_eq!(strip.slot(key(2)).unwrap().constrained_position(), 30);

    // Same session, re-tagged as Push: now the neighbor is displaced.
    registry.continue_drag(Point::new(32, 2), MoveStrategy::Push);
    let strip = registry.strip(top).unwrap();
    assert_eq!(strip.slot(key(1)).unwrap().constrained_position(), 30);
    assert_eq!(strip.slot(key(2)).unwrap().constrained_position(), 40);
    assert_eq!(registry.drag().unwrap().strategy(), MoveStrategy::Push);
    strip.validate().unwrap();
}

#[test]
fn continue_and_end_are_noops_while_idle() {
    let mut registry = StripRegistry::new();
    let (top, _) = two_strips(&mut registry);
    registry
        .strip_mut(top)
        .unwrap()
        .add(key(1), 0, SlotSpec::fixed(10))
        .unwrap();
    registry.take_events();

    registry.continue_drag(Point::new(50, 2), MoveStrategy::Free);
    registry.end_drag();
    assert!(registry.take_events().is_empty());
    assert_eq!(
        registry
            .strip(top)
            .unwrap()
            .slot(key(1))
            .unwrap()
            .constrained_position(),
        0
    );
}

// ---- Reparent ----

#[test]
fn crossing_into_another_strip_reparents_the_slot() {
    let mut registry = StripRegistry::new();
    let (top, bottom) = two_strips(&mut registry);
    registry
        .strip_mut(top)
        .unwrap()
        .add(key(1), 0, SlotSpec::fixed(10))
        .unwrap();

    registry
        .begin_drag(
            top,
            key(1),
            Point::new(2, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        )
        .unwrap();
    registry.take_events();

    registry.continue_drag(Point::new(50, 62), MoveStrategy::Free);

    assert!(registry.strip(top).unwrap().slot(key(1)).is_none());
    let landed = registry.strip(bottom).unwrap().slot(key(1)).unwrap();
    assert_eq!(landed.constrained_position(), 48);
    assert_eq!(registry.drag().unwrap().strip(), bottom);
    assert_eq!(registry.strip(bottom).unwrap().dragged(), Some(key(1)));

    let events = registry.take_events();
    let removed: Vec<_> = events
        .iter()
        .filter(|(_, e)| matches!(e, StripEvent::ItemRemoved { .. }))
        .collect();
    let added: Vec<_> = events
        .iter()
        .filter(|(_, e)| matches!(e, StripEvent::ItemAdded { .. }))
        .collect();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].0, top);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].0, bottom);
    // No move event on the source: the transfer is remove + add only.
    assert!(
        !events
            .iter()
            .any(|(id, e)| *id == top && matches!(e, StripEvent::ItemMoved { .. }))
    );
}

#[test]
fn reparent_is_abandoned_when_the_destination_is_full() {
    let mut registry = StripRegistry::new();
    let (top, bottom) = two_strips(&mut registry);
    registry
        .strip_mut(top)
        .unwrap()
        .add(key(1), 0, SlotSpec::fixed(10))
        .unwrap();
    registry
        .strip_mut(bottom)
        .unwrap()
        .add(key(2), 0, SlotSpec::fixed(100))
        .unwrap();

    registry
        .begin_drag(
            top,
            key(1),
            Point::new(2, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        )
        .unwrap();
    registry.take_events();

    registry.continue_drag(Point::new(50, 62), MoveStrategy::Free);

    // Slot stays home, session still points at the source strip.
    assert!(registry.strip(top).unwrap().slot(key(1)).is_some());
    assert_eq!(registry.drag().unwrap().strip(), top);
    assert!(
        !registry
            .take_events()
            .iter()
            .any(|(_, e)| matches!(e, StripEvent::ItemRemoved { .. }))
    );
}

#[test]
fn cursor_within_the_overlap_tolerance_stays_home() {
    let mut registry = StripRegistry::new();
    let (top, second) = (
        registry.insert(
            Strip::new(100, 4, Orientation::Horizontal),
            Rect::new(0, 0, 100, 4),
        ),
        registry.insert(
            Strip::new(100, 4, Orientation::Horizontal),
            Rect::new(0, 5, 100, 4),
        ),
    );
    registry
        .strip_mut(top)
        .unwrap()
        .add(key(1), 0, SlotSpec::fixed(10))
        .unwrap();

    registry
        .begin_drag(
            top,
            key(1),
            Point::new(2, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        )
        .unwrap();

    // y=5 is inside the second strip, but only 2 past the first's bounds.
    registry.continue_drag(Point::new(40, 5), MoveStrategy::Free);
    assert!(registry.strip(top).unwrap().slot(key(1)).is_some());
    assert!(registry.strip(second).unwrap().slot(key(1)).is_none());
    assert_eq!(registry.drag().unwrap().strip(), top);
}

// ---- Ticker ----

#[test]
fn tick_respects_the_interval_and_settled_state() {
    let mut registry = StripRegistry::new();
    let (top, _) = two_strips(&mut registry);
    registry
        .strip_mut(top)
        .unwrap()
        .add(key(1), 0, SlotSpec::fixed(10))
        .unwrap();

    registry
        .begin_drag(
            top,
            key(1),
            Point::new(2, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        )
        .unwrap();

    // Nothing has moved yet: ticking is free.
    let t0 = Instant::now();
    assert!(!registry.tick(t0));

    registry.continue_drag(Point::new(48, 2), MoveStrategy::Free);
    let hash = registry.strip(top).unwrap().state_hash();

    // Re-evaluating a stationary cursor must not change the layout,
    // whether the cadence gate passes or not.
    assert!(!registry.tick(t0 + dstrip_runtime::DRAG_TICK_INTERVAL));
    assert!(!registry.tick(t0 + dstrip_runtime::DRAG_TICK_INTERVAL / 4));
    assert_eq!(registry.strip(top).unwrap().state_hash(), hash);
}

#[test]
fn tick_while_idle_is_a_noop() {
    let mut registry = StripRegistry::new();
    two_strips(&mut registry);
    assert!(!registry.tick(Instant::now()));
}

// ---- Teardown ----

#[test]
fn ending_the_drag_clears_the_dragged_mark() {
    let mut registry = StripRegistry::new();
    let (top, _) = two_strips(&mut registry);
    registry
        .strip_mut(top)
        .unwrap()
        .add(key(1), 0, SlotSpec::fixed(10))
        .unwrap();

    registry
        .begin_drag(
            top,
            key(1),
            Point::new(2, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        )
        .unwrap();
    assert_eq!(registry.strip(top).unwrap().dragged(), Some(key(1)));

    registry.end_drag();
    assert!(registry.drag().is_none());
    assert_eq!(registry.strip(top).unwrap().dragged(), None);
}

#[test]
fn removing_the_dragged_slot_ends_the_session_on_next_report() {
    let mut registry = StripRegistry::new();
    let (top, _) = two_strips(&mut registry);
    registry
        .strip_mut(top)
        .unwrap()
        .add(key(1), 0, SlotSpec::fixed(10))
        .unwrap();

    registry
        .begin_drag(
            top,
            key(1),
            Point::new(2, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        )
        .unwrap();
    registry.strip_mut(top).unwrap().remove(key(1));

    registry.continue_drag(Point::new(50, 2), MoveStrategy::Free);
    assert!(registry.drag().is_none());
}

#[test]
fn tearing_down_the_strip_ends_the_session() {
    let mut registry = StripRegistry::new();
    let (top, _) = two_strips(&mut registry);
    registry
        .strip_mut(top)
        .unwrap()
        .add(key(1), 0, SlotSpec::fixed(10))
        .unwrap();

    registry
        .begin_drag(
            top,
            key(1),
            Point::new(2, 2),
            OffsetMode::CursorRelative,
            MoveStrategy::Free,
            &AllowAll,
        )
        .unwrap();
    let torn = registry.remove(top).unwrap();
    assert!(torn.slot(key(1)).is_some());
    assert!(registry.drag().is_none());
}
