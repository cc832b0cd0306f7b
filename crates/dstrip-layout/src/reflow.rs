//! Resize reconciliation and packed reflow.
//!
//! Non-packed strips re-derive every resolved coordinate from the requested
//! positions in three passes: a left-to-right floor at each predecessor's
//! trailing edge, a right-to-left clamp against the strip end, and a final
//! left-to-right overlap push. The last pass may push past the visible edge
//! rather than shrink an item below its minimum (graceful overflow).
//!
//! Packed strips ignore requested coordinates entirely: a left-to-right pass
//! establishes minimum start offsets from minimum sizes, then a right-to-left
//! pass grows each expandable slot into the slack before its successor,
//! drawing the size from the widest hint band that still fits.

use dstrip_core::StripEvent;

use crate::slot::SizeHint;
use crate::strip::Strip;

impl Strip {
    /// Change the strip's usable length and reconcile all placements.
    pub fn resize(&mut self, new_length: i32) {
        let new_length = new_length.max(0);
        let old_length = self.length();
        if new_length == old_length {
            return;
        }
        let before = self.capture();

        if !self.is_packed() && new_length > old_length {
            self.stick_to_right_edge(old_length, new_length - old_length);
        }
        self.set_length(new_length);
        if self.is_packed() {
            self.reflow_packed();
        } else {
            self.derive_constrained();
        }

        self.emit_moves_since(&before);
        self.push_event(StripEvent::RedrawRequested);
    }

    /// Shift the maximal adjacent suffix run ending exactly at the old right
    /// edge right by `delta`, so edge-stuck items stay stuck when the strip
    /// grows. Requested positions move with the run; the following
    /// derivation settles the resolved coordinates.
    fn stick_to_right_edge(&mut self, old_length: i32, delta: i32) {
        let mut edge = old_length;
        for slot in self.slots.iter_mut().rev() {
            if slot.span().end() != edge {
                break;
            }
            edge = slot.constrained;
            slot.position += delta;
        }
    }

    /// Re-derive resolved coordinates from requested positions (non-packed).
    pub(crate) fn derive_constrained(&mut self) {
        let length = self.length();

        // Pass 1: floor each slot at its predecessor's trailing edge.
        let mut cursor = 0;
        for slot in &mut self.slots {
            slot.constrained = slot.position.max(cursor).max(0);
            cursor = slot.span().end();
        }

        // Pass 2: clamp against the strip end, right to left.
        let mut limit = length;
        for slot in self.slots.iter_mut().rev() {
            slot.constrained = slot.constrained.min(limit - slot.cells);
            limit = slot.constrained;
        }

        // Pass 3: resolve any overlap the clamp introduced, pushing right.
        // May run past the visible edge; items keep their minimum size.
        let mut cursor = 0;
        for slot in &mut self.slots {
            slot.constrained = slot.constrained.max(cursor);
            cursor = slot.span().end();
        }
    }

    /// Lay slots contiguously and grow expandable ones from their hint
    /// bands (packed strips).
    pub(crate) fn reflow_packed(&mut self) {
        let length = self.length();
        if self.slots.is_empty() {
            return;
        }

        // Pass 1: minimum start offsets, left to right. The slack left over
        // once every slot sits at its minimum is what expansion may consume.
        let total_min: i32 = self.slots.iter().map(|s| s.min_cells).sum();
        let mut slack = length - total_min;

        // Pass 2: size each slot, right to left, so an expandable slot sees
        // the slack between its minimum offset and the settled start of the
        // following slot. Negative slack means overflow: everything stays
        // at its minimum.
        for slot in self.slots.iter_mut().rev() {
            if slot.is_expandable() && slack > 0 {
                let avail = slot.min_cells + slack;
                let size = pick_hint_size(&slot.hints, avail).max(slot.min_cells);
                slack -= size - slot.min_cells;
                slot.cells = size;
            } else {
                slot.cells = slot.min_cells;
            }
        }

        // Final placement: contiguous from the left, no slack between items.
        let mut cursor = 0;
        for slot in &mut self.slots {
            slot.constrained = cursor;
            slot.position = cursor;
            cursor += slot.cells;
        }
    }
}

/// Choose a size from ordered hint bands for `avail` free cells: the first
/// band whose minimum fits, clipped to the gap.
fn pick_hint_size(hints: &[SizeHint], avail: i32) -> i32 {
    for hint in hints {
        if hint.min_cells <= avail {
            return hint.max_cells.min(avail);
        }
    }
    avail.max(0)
}
