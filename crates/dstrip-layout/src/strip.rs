//! The strip container: ordered slot collection and placement.
//!
//! A strip keeps its slots sorted by resolved coordinate at all times; every
//! mutating entry point restores the ordering/overlap invariant before it
//! returns. Resize reconciliation and packed reflow live in `reflow`, the
//! interactive move strategies in `moves`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use dstrip_core::{Orientation, SlotKey, StripEvent};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{InvariantViolation, PlacementError, SnapshotError};
use crate::slot::{Slot, SlotConstraints, SlotRecord, SlotSpec};

/// Current diagnostic snapshot schema version.
pub const STRIP_SNAPSHOT_VERSION: u16 = 1;

/// A 1D container arranging slots along one panel edge.
#[derive(Debug, Clone)]
pub struct Strip {
    length: i32,
    thickness: i32,
    packed: bool,
    orientation: Orientation,
    pub(crate) slots: Vec<Slot>,
    keys: FxHashSet<SlotKey>,
    dragged: Option<SlotKey>,
    events: Vec<StripEvent>,
}

impl Strip {
    /// Create a strip with independently positioned slots.
    #[must_use]
    pub fn new(length: i32, thickness: i32, orientation: Orientation) -> Self {
        Self {
            length: length.max(0),
            thickness: thickness.max(0),
            packed: false,
            orientation,
            slots: Vec::new(),
            keys: FxHashSet::default(),
            dragged: None,
            events: Vec::new(),
        }
    }

    /// Create a packed strip: slots sit contiguously with no user gaps.
    #[must_use]
    pub fn new_packed(length: i32, thickness: i32, orientation: Orientation) -> Self {
        let mut strip = Self::new(length, thickness, orientation);
        strip.packed = true;
        strip
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Usable length along the major axis.
    #[inline]
    #[must_use]
    pub const fn length(&self) -> i32 {
        self.length
    }

    /// Configured size across the minor axis.
    #[inline]
    #[must_use]
    pub const fn thickness(&self) -> i32 {
        self.thickness
    }

    /// Layout mode.
    #[inline]
    #[must_use]
    pub const fn is_packed(&self) -> bool {
        self.packed
    }

    /// Major-axis orientation.
    #[inline]
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of placed slots.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether the strip holds no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots in ascending resolved-coordinate order.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// Look up a slot by key.
    #[must_use]
    pub fn slot(&self, key: SlotKey) -> Option<&Slot> {
        self.index_of(key).map(|i| &self.slots[i])
    }

    /// The slot currently under interactive manipulation, if any.
    #[inline]
    #[must_use]
    pub const fn dragged(&self) -> Option<SlotKey> {
        self.dragged
    }

    /// Mark (or clear) the slot under interactive manipulation.
    pub fn set_dragged(&mut self, key: Option<SlotKey>) {
        self.dragged = key;
    }

    /// Record the cursor-to-origin offset captured at drag start.
    pub fn set_drag_offset(&mut self, key: SlotKey, offset: i32) -> bool {
        match self.index_of(key) {
            Some(i) => {
                self.slots[i].drag_offset = offset;
                true
            }
            None => false,
        }
    }

    /// Drain queued notifications, in emission order.
    pub fn take_events(&mut self) -> Vec<StripEvent> {
        std::mem::take(&mut self.events)
    }

    /// Across-axis demand: the maximum thickness of slots that have not
    /// opted out via `SIZE_CONSTRAINED`.
    #[must_use]
    pub fn required_thickness(&self) -> i32 {
        self.slots
            .iter()
            .filter(|s| !s.flags.contains(dstrip_core::SlotFlags::SIZE_CONSTRAINED))
            .map(|s| s.thickness)
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn index_of(&self, key: SlotKey) -> Option<usize> {
        self.slots.iter().position(|s| s.key() == key)
    }

    pub(crate) fn set_length(&mut self, length: i32) {
        self.length = length.max(0);
    }

    pub(crate) fn push_event(&mut self, event: StripEvent) {
        self.events.push(event);
    }

    // -----------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------

    /// Place a new item at (or near) `position`.
    ///
    /// Non-packed strips search outward from `position` for the nearest run
    /// of at least `min_cells` free units; the item is compressed toward its
    /// minimum if the chosen run cannot hold its natural size. Packed strips
    /// insert after any slot already at `position` and re-derive every
    /// coordinate. Returns the resolved coordinate.
    pub fn add(&mut self, key: SlotKey, position: i32, spec: SlotSpec) -> Result<i32, PlacementError> {
        spec.validate()?;
        if self.keys.contains(&key) {
            return Err(PlacementError::DuplicateKey { key });
        }
        let slot = Slot::from_spec(key, position, spec);
        self.place(slot, position).map_err(|(_, err)| err)
    }

    /// Place an already built slot, preserving its size and flags.
    ///
    /// This is the reparent path: a slot removed from another strip keeps
    /// its identity and constraints when it lands here. On failure the slot
    /// is handed back so the caller can restore it to its source strip.
    pub fn adopt(&mut self, mut slot: Slot, position: i32) -> Result<i32, (Slot, PlacementError)> {
        if self.keys.contains(&slot.key()) {
            let key = slot.key();
            return Err((slot, PlacementError::DuplicateKey { key }));
        }
        slot.position = position;
        slot.constrained = position;
        self.place(slot, position)
    }

    fn place(&mut self, mut slot: Slot, position: i32) -> Result<i32, (Slot, PlacementError)> {
        let key = slot.key();
        if self.packed {
            let index = self
                .slots
                .partition_point(|s| s.constrained <= position);
            slot.position = position;
            slot.constrained = position;
            self.keys.insert(key);
            self.slots.insert(index, slot);
            let before = self.capture();
            self.reflow_packed();
            self.push_event(StripEvent::ItemAdded { key });
            self.emit_moves_since(&before);
            self.push_event(StripEvent::RedrawRequested);
            return Ok(self.slots[self.index_of(key).unwrap_or(index)].constrained);
        }

        let needed = slot.min_cells;
        let Some((resolved, free_after)) = self.nearest_free_run(position, needed, None) else {
            let length = self.length;
            return Err((slot, PlacementError::NoFreeRun { needed, length }));
        };
        slot.position = resolved;
        slot.constrained = resolved;
        slot.cells = slot.cells.min(free_after).max(slot.min_cells);
        let index = self.slots.partition_point(|s| s.constrained <= resolved);
        self.keys.insert(key);
        self.slots.insert(index, slot);
        self.push_event(StripEvent::ItemAdded { key });
        self.push_event(StripEvent::RedrawRequested);
        Ok(resolved)
    }

    /// Remove an item. Returns whether it was present.
    pub fn remove(&mut self, key: SlotKey) -> bool {
        self.take_slot(key).is_some()
    }

    /// Remove an item and hand back its slot state (the reparent path).
    pub fn take_slot(&mut self, key: SlotKey) -> Option<Slot> {
        let index = self.index_of(key)?;
        let slot = self.slots.remove(index);
        self.keys.remove(&key);
        if self.dragged == Some(key) {
            self.dragged = None;
        }
        self.push_event(StripEvent::ItemRemoved { key });
        if self.packed {
            let before = self.capture();
            self.reflow_packed();
            self.emit_moves_since(&before);
        }
        self.push_event(StripEvent::RedrawRequested);
        Some(slot)
    }

    /// Update a placed item's constraints and reconcile the layout.
    pub fn set_constraints(
        &mut self,
        key: SlotKey,
        constraints: SlotConstraints,
    ) -> Result<(), PlacementError> {
        let index = self
            .index_of(key)
            .ok_or(PlacementError::UnknownSlot { key })?;
        if constraints.min_cells < 1 {
            return Err(PlacementError::Model(crate::LayoutError::InvalidCells {
                cells: constraints.min_cells,
                min_cells: constraints.min_cells,
            }));
        }
        for hint in &constraints.hints {
            if hint.min_cells < 1 || hint.max_cells < hint.min_cells {
                return Err(PlacementError::Model(crate::LayoutError::InvalidHint {
                    max_cells: hint.max_cells,
                    min_cells: hint.min_cells,
                }));
            }
        }

        let before = self.capture();
        {
            let slot = &mut self.slots[index];
            slot.min_cells = constraints.min_cells;
            slot.cells = slot.cells.max(constraints.min_cells);
            slot.hints = constraints.hints;
            slot.flags = constraints.flags;
        }
        if self.packed {
            self.reflow_packed();
        } else {
            self.derive_constrained();
        }
        self.emit_moves_since(&before);
        self.push_event(StripEvent::RedrawRequested);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Free-run search
    // -----------------------------------------------------------------

    /// Whether any free run can hold `needed` cells.
    ///
    /// Packed strips always have room: insertion re-derives every
    /// coordinate. Used to pre-check a reparent destination before the slot
    /// leaves its source strip.
    #[must_use]
    pub fn has_room_for(&self, needed: i32) -> bool {
        self.packed || self.nearest_free_run(0, needed.max(1), None).is_some()
    }

    /// Find the free run closest to `target` that can hold `needed` cells.
    ///
    /// Returns the chosen start coordinate and the contiguous free space
    /// from it to the end of its run. Candidates are scanned left to right;
    /// a later (right-side) candidate replaces the incumbent only when its
    /// distance to `target` is strictly smaller, so an equally close left
    /// candidate wins.
    pub(crate) fn nearest_free_run(
        &self,
        target: i32,
        needed: i32,
        exclude: Option<usize>,
    ) -> Option<(i32, i32)> {
        debug_assert!(needed >= 1);
        let mut best: Option<(i32, i32, i32)> = None; // (dist, pos, free_after)
        let mut cursor = 0;

        let mut consider = |gap_start: i32, gap_end: i32, best: &mut Option<(i32, i32, i32)>| {
            if gap_end - gap_start < needed {
                return;
            }
            let candidate = target.clamp(gap_start, gap_end - needed);
            let dist = (candidate - target).abs();
            if best.is_none_or(|(d, _, _)| dist < d) {
                *best = Some((dist, candidate, gap_end - candidate));
            }
        };

        for (i, slot) in self.slots.iter().enumerate() {
            if Some(i) == exclude {
                continue;
            }
            let span = slot.span();
            if span.start > cursor {
                consider(cursor, span.start, &mut best);
            }
            cursor = cursor.max(span.end());
        }
        if self.length > cursor {
            consider(cursor, self.length, &mut best);
        }

        best.map(|(_, pos, free_after)| (pos, free_after))
    }

    // -----------------------------------------------------------------
    // Invariant and change tracking
    // -----------------------------------------------------------------

    /// Check the ordering/overlap invariant.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        for (index, pair) in self.slots.windows(2).enumerate() {
            if pair[1].constrained < pair[0].constrained {
                return Err(InvariantViolation::Unsorted { index });
            }
            if pair[0].span().overlaps(&pair[1].span()) {
                return Err(InvariantViolation::Overlap { index });
            }
        }
        Ok(())
    }

    pub(crate) fn capture(&self) -> Vec<(SlotKey, i32)> {
        self.slots.iter().map(|s| (s.key(), s.constrained)).collect()
    }

    pub(crate) fn emit_moves_since(&mut self, before: &[(SlotKey, i32)]) {
        let mut moved = Vec::new();
        for slot in &self.slots {
            let prior = before.iter().find(|(k, _)| *k == slot.key());
            if let Some((_, c)) = prior
                && *c != slot.constrained
            {
                moved.push(slot.key());
            }
        }
        for key in moved {
            self.push_event(StripEvent::ItemMoved { key });
        }
    }

    /// Overwrite requested positions with resolved ones for slots whose
    /// resolved coordinate changed since `before`. Called at the end of a
    /// successful user move so the new spot becomes the remembered intent.
    pub(crate) fn commit_positions_since(&mut self, before: &[(SlotKey, i32)]) {
        for slot in &mut self.slots {
            let prior = before.iter().find(|(k, _)| *k == slot.key());
            if let Some((_, c)) = prior
                && *c != slot.constrained
            {
                slot.position = slot.constrained;
            }
        }
    }

    // -----------------------------------------------------------------
    // Diagnostic snapshot
    // -----------------------------------------------------------------

    /// Serialize the strip's layout state for diagnostics or replay.
    #[must_use]
    pub fn snapshot(&self) -> StripSnapshot {
        StripSnapshot {
            schema_version: STRIP_SNAPSHOT_VERSION,
            length: self.length,
            thickness: self.thickness,
            packed: self.packed,
            orientation: self.orientation,
            slots: self.slots.iter().map(Slot::record).collect(),
        }
    }

    /// Rebuild a strip from a snapshot, rejecting malformed state.
    pub fn from_snapshot(snapshot: StripSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.schema_version != STRIP_SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.schema_version,
                expected: STRIP_SNAPSHOT_VERSION,
            });
        }
        if snapshot.length < 0 {
            return Err(SnapshotError::InvalidLength {
                length: snapshot.length,
            });
        }
        let mut strip = Self {
            length: snapshot.length,
            thickness: snapshot.thickness.max(0),
            packed: snapshot.packed,
            orientation: snapshot.orientation,
            slots: Vec::with_capacity(snapshot.slots.len()),
            keys: FxHashSet::default(),
            dragged: None,
            events: Vec::new(),
        };
        for record in snapshot.slots {
            let slot = record.into_slot()?;
            if !strip.keys.insert(slot.key()) {
                return Err(SnapshotError::DuplicateKey { key: slot.key() });
            }
            strip.slots.push(slot);
        }
        strip.validate()?;
        Ok(strip)
    }

    /// Deterministic hash over layout state, for diagnostics and replay
    /// comparison.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.length.hash(&mut hasher);
        self.thickness.hash(&mut hasher);
        self.packed.hash(&mut hasher);
        matches!(self.orientation, Orientation::Vertical).hash(&mut hasher);
        for slot in &self.slots {
            slot.key().get().hash(&mut hasher);
            slot.position.hash(&mut hasher);
            slot.constrained.hash(&mut hasher);
            slot.cells.hash(&mut hasher);
            slot.min_cells.hash(&mut hasher);
            slot.flags.bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Serializable strip layout state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripSnapshot {
    #[serde(default = "default_snapshot_version")]
    pub schema_version: u16,
    pub length: i32,
    #[serde(default)]
    pub thickness: i32,
    #[serde(default)]
    pub packed: bool,
    #[serde(default)]
    pub orientation: Orientation,
    pub slots: Vec<SlotRecord>,
}

fn default_snapshot_version() -> u16 {
    STRIP_SNAPSHOT_VERSION
}
