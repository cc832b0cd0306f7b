//! The drag session state machine and cross-strip reparenting.
//!
//! State machine: `Idle -> Active` on [`StripRegistry::begin_drag`],
//! `Active -> Active` (possibly changing owning strip) on
//! [`StripRegistry::continue_drag`], `Active -> Idle` on
//! [`StripRegistry::end_drag`] or when the dragged slot or its strip is
//! destroyed. `continue_drag` and `end_drag` while idle are no-ops. At most
//! one session exists per registry; beginning a second drag is rejected.

use std::fmt;

use dstrip_core::{MovePolicy, Point, Rect, SlotKey};
use dstrip_layout::{Slot, Strip};
use web_time::{Duration, Instant};

use crate::registry::{StripId, StripRegistry};

/// Cadence of the cooperative re-evaluation ticker.
pub const DRAG_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// How far past a strip's bounds the cursor may stray while still counting
/// as inside it, before a reparent is considered.
const OVERLAP_TOLERANCE: i32 = 2;

/// How the drag offset is derived at drag start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetMode {
    /// Keep the grab point: offset is cursor minus the slot's leading edge.
    #[default]
    CursorRelative,
    /// Grab by the middle: offset is half the slot's occupied length.
    Centered,
    /// Host-supplied offset.
    Explicit(i32),
}

/// Which move strategy resolves cursor reports during the drag.
///
/// Selected by the host from input modifier state and re-tagged on every
/// [`StripRegistry::continue_drag`], since modifiers can change mid-drag.
/// Packed strips always use [`MoveStrategy::Switch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveStrategy {
    /// Step toward the cursor, swapping order with adjacent items.
    Switch,
    /// Displace items in the way by exactly enough to clear room.
    Push,
    /// Relocate to the nearest free run, ignoring collisions.
    #[default]
    Free,
}

/// Why a drag could not begin. No state changes on rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRejected {
    /// The slot is flagged immovable.
    Locked { key: SlotKey },
    /// The host policy denied the move.
    PolicyDenied { key: SlotKey },
    /// Another drag session is already active.
    DragInProgress,
    /// The strip is not registered.
    UnknownStrip { id: StripId },
    /// The slot is not on the named strip.
    UnknownSlot { key: SlotKey },
}

impl fmt::Display for DragRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked { key } => write!(f, "slot {key} is locked"),
            Self::PolicyDenied { key } => write!(f, "policy denies moving slot {key}"),
            Self::DragInProgress => write!(f, "a drag session is already active"),
            Self::UnknownStrip { id } => write!(f, "strip {id} is not registered"),
            Self::UnknownSlot { key } => write!(f, "slot {key} is not on that strip"),
        }
    }
}

impl std::error::Error for DragRejected {}

/// One in-progress interactive move.
///
/// Holds the dragged slot's identity, never its state: the owning strip
/// keeps exclusive ownership of the slot throughout.
#[derive(Debug, Clone)]
pub struct DragSession {
    strip: StripId,
    key: SlotKey,
    strategy: MoveStrategy,
    last_cursor: Point,
    last_tick: Option<Instant>,
    /// Whether the last evaluation changed the layout; gates the ticker so
    /// a settled, stationary cursor costs nothing.
    moved_last: bool,
}

impl DragSession {
    /// The strip currently owning the dragged slot.
    #[inline]
    #[must_use]
    pub const fn strip(&self) -> StripId {
        self.strip
    }

    /// The dragged slot's identity.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> SlotKey {
        self.key
    }

    /// Strategy applied on the most recent evaluation.
    #[inline]
    #[must_use]
    pub const fn strategy(&self) -> MoveStrategy {
        self.strategy
    }

    /// Most recent cursor report.
    #[inline]
    #[must_use]
    pub const fn last_cursor(&self) -> Point {
        self.last_cursor
    }
}

/// Cursor projected into a strip's own major-axis coordinates.
fn local_major(bounds: Rect, strip: &Strip, cursor: Point) -> i32 {
    let origin = strip.orientation().major(Point::new(bounds.x, bounds.y));
    strip.orientation().major(cursor) - origin
}

impl StripRegistry {
    /// Begin dragging a slot.
    ///
    /// Computes the drag offset from `offset_mode`, marks the slot dragged
    /// on its strip, and arms the re-evaluation ticker. Rejected without
    /// state change if the slot is locked, the policy denies it, or another
    /// session is active.
    pub fn begin_drag(
        &mut self,
        strip: StripId,
        key: SlotKey,
        cursor: Point,
        offset_mode: OffsetMode,
        strategy: MoveStrategy,
        policy: &dyn MovePolicy,
    ) -> Result<(), DragRejected> {
        if self.session.is_some() {
            return Err(DragRejected::DragInProgress);
        }
        let entry = self
            .entry_mut(strip)
            .ok_or(DragRejected::UnknownStrip { id: strip })?;
        let bounds = entry.bounds;
        let slot = entry
            .strip
            .slot(key)
            .ok_or(DragRejected::UnknownSlot { key })?;
        if slot.is_locked() {
            return Err(DragRejected::Locked { key });
        }
        if !policy.can_move(key) || !policy.position_writable(key) {
            return Err(DragRejected::PolicyDenied { key });
        }

        let offset = match offset_mode {
            OffsetMode::CursorRelative => {
                local_major(bounds, &entry.strip, cursor) - slot.constrained_position()
            }
            OffsetMode::Centered => slot.cells() / 2,
            OffsetMode::Explicit(value) => value,
        };
        entry.strip.set_drag_offset(key, offset);
        entry.strip.set_dragged(Some(key));
        tracing::debug!(strip = %strip, key = %key, offset, ?strategy, "drag began");

        self.session = Some(DragSession {
            strip,
            key,
            strategy,
            last_cursor: cursor,
            last_tick: None,
            moved_last: false,
        });
        Ok(())
    }

    /// Resolve a cursor report against the active session.
    ///
    /// When the cursor has left the owning strip's (tolerance-inflated)
    /// bounds and sits inside another registered strip, the slot reparents
    /// there and the session repoints; otherwise the tagged strategy runs
    /// in place. A no-op while idle.
    pub fn continue_drag(&mut self, cursor: Point, strategy: MoveStrategy) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let (source, key) = (session.strip, session.key);

        let Some(entry) = self.entry(source) else {
            self.session = None;
            return;
        };
        if entry.strip.slot(key).is_none() {
            // Slot destroyed out from under the drag.
            tracing::debug!(strip = %source, key = %key, "drag session ended by slot removal");
            self.session = None;
            return;
        }

        let source_bounds = entry.bounds;
        let escaped = !source_bounds.inflate(OVERLAP_TOLERANCE).contains(cursor);
        let destination = self
            .strip_at(cursor)
            .filter(|id| escaped && *id != source);

        let moved = match destination {
            Some(dest) => self.reparent(source, dest, key, cursor),
            None => self.apply_strategy(source, key, cursor, strategy),
        };

        if let Some(session) = self.session.as_mut() {
            session.last_cursor = cursor;
            session.strategy = strategy;
            session.moved_last = moved;
        }
    }

    /// Cooperative re-evaluation, driven by the host on its event loop.
    ///
    /// Fires at most once per [`DRAG_TICK_INTERVAL`] and only while the
    /// previous evaluation actually moved something, so a stationary cursor
    /// over a settled layout is a no-op. Returns whether the layout changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if let Some(last) = session.last_tick
            && now.duration_since(last) < DRAG_TICK_INTERVAL
        {
            return false;
        }
        session.last_tick = Some(now);
        if !session.moved_last {
            return false;
        }
        let (cursor, strategy) = (session.last_cursor, session.strategy);
        self.continue_drag(cursor, strategy);
        self.session.as_ref().is_some_and(|s| s.moved_last)
    }

    /// End the active session.
    ///
    /// Applies one final evaluation at the last cursor if the ticker still
    /// had movement pending, then clears the dragged mark. Always succeeds;
    /// a no-op while idle.
    pub fn end_drag(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let (cursor, strategy, pending) =
            (session.last_cursor, session.strategy, session.moved_last);
        if pending {
            self.continue_drag(cursor, strategy);
        }
        if let Some(session) = self.session.take() {
            tracing::debug!(strip = %session.strip, key = %session.key, "drag ended");
            if let Some(entry) = self.entry_mut(session.strip) {
                entry.strip.set_dragged(None);
            }
        }
    }

    /// Move the dragged slot from `source` to `dest`, atomically from the
    /// host's point of view: one removal, one addition, session repointed.
    /// Abandoned (slot stays put) when the destination cannot fit it.
    fn reparent(&mut self, source: StripId, dest: StripId, key: SlotKey, cursor: Point) -> bool {
        let Some(slot) = self.entry(source).and_then(|e| e.strip.slot(key)) else {
            return false;
        };
        let min_cells = slot.min_cells();
        let offset = slot.drag_offset();
        let origin = (source, slot.constrained_position());

        let has_room = self
            .entry(dest)
            .is_some_and(|e| e.strip.has_room_for(min_cells) && e.strip.slot(key).is_none());
        if !has_room {
            tracing::debug!(
                from = %source, to = %dest, key = %key,
                "reparent abandoned: destination has no free run"
            );
            return false;
        }

        let Some(slot) = self.entry_mut(source).and_then(|e| e.strip.take_slot(key)) else {
            return false;
        };

        let Some(dest_entry) = self.entry_mut(dest) else {
            self.restore(origin, key, slot);
            return false;
        };
        let target = local_major(dest_entry.bounds, &dest_entry.strip, cursor) - offset;
        match dest_entry.strip.adopt(slot, target) {
            Ok(resolved) => {
                dest_entry.strip.set_dragged(Some(key));
                if let Some(session) = self.session.as_mut() {
                    session.strip = dest;
                }
                tracing::debug!(
                    from = %source, to = %dest, key = %key, resolved,
                    "slot reparented"
                );
                true
            }
            Err((slot, err)) => {
                // Unreachable after the room pre-check; restore the slot to
                // the spot it just vacated.
                tracing::warn!(
                    from = %source, to = %dest, key = %key, %err,
                    "reparent failed, restoring slot to its source strip"
                );
                self.restore(origin, key, slot);
                false
            }
        }
    }

    /// Put a slot taken for a reparent back where it came from. The spot it
    /// vacated is still free, so adoption there cannot fail; any error is
    /// surfaced rather than swallowed.
    fn restore(&mut self, origin: (StripId, i32), key: SlotKey, slot: Slot) {
        let (source_id, position) = origin;
        let Some(entry) = self.entry_mut(source_id) else {
            tracing::error!(strip = %source_id, key = %key, "source strip gone, slot dropped");
            return;
        };
        if let Err((_, err)) = entry.strip.adopt(slot, position) {
            tracing::error!(strip = %source_id, key = %key, %err, "could not restore slot");
            return;
        }
        entry.strip.set_dragged(Some(key));
    }

    /// Run the tagged strategy against the cursor within the owning strip.
    fn apply_strategy(
        &mut self,
        strip_id: StripId,
        key: SlotKey,
        cursor: Point,
        strategy: MoveStrategy,
    ) -> bool {
        let Some(entry) = self.entry_mut(strip_id) else {
            return false;
        };
        let bounds = entry.bounds;
        let strip = &mut entry.strip;
        let Some(slot) = strip.slot(key) else {
            return false;
        };
        let offset = slot.drag_offset();
        let current = slot.constrained_position();
        let target = local_major(bounds, strip, cursor) - offset;

        let strategy = if strip.is_packed() {
            MoveStrategy::Switch
        } else {
            strategy
        };
        match strategy {
            MoveStrategy::Switch => strip.switch_move(key, target - current) != 0,
            MoveStrategy::Push => strip.push_move(key, target - current).moved != 0,
            MoveStrategy::Free => strip
                .free_move(key, target)
                .map(|pos| pos != current)
                .unwrap_or(false),
        }
    }
}
