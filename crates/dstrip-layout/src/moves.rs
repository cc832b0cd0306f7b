//! Interactive move strategies: switch, push, and free.
//!
//! All three operate on the sorted slot vector through two separated
//! helpers: `room_toward`, which measures how far a slot can travel in one
//! direction by absorbing gaps and displacing unlocked neighbors, and
//! `cascade`, which applies a displacement and pushes following slots by
//! exactly enough to clear room. The room computation stops at the first
//! locked slot or the strip edge, so a cascade bounded by it can never move
//! a locked slot or leave the strip.

use dstrip_core::{SlotKey, StripEvent};

use crate::error::PlacementError;
use crate::strip::Strip;

/// Result of a push move.
///
/// A cut-short push is not an error: partial progress is kept and the
/// shortfall is reported as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushOutcome {
    /// Signed displacement actually applied.
    pub moved: i32,
    /// Whether a locked slot or the strip boundary cut the move short.
    pub blocked: bool,
}

impl PushOutcome {
    const fn unmoved(blocked: bool) -> Self {
        Self { moved: 0, blocked }
    }
}

impl Strip {
    // -----------------------------------------------------------------
    // Switch move
    // -----------------------------------------------------------------

    /// Nudge a slot toward `constrained + delta` one minimal increment at a
    /// time: slide into gaps, swap order with exactly adjacent unlocked
    /// neighbors, and jump locked runs after pushing the first movable slot
    /// beyond them out of the way. Returns the displacement achieved.
    pub fn switch_move(&mut self, key: SlotKey, delta: i32) -> i32 {
        let Some(index) = self.index_of(key) else {
            return 0;
        };
        if delta == 0 || self.slots[index].is_locked() {
            return 0;
        }
        if self.is_packed() {
            return self.switch_move_packed(key, delta);
        }

        let origin = self.slots[index].constrained;
        let entry = self.capture();
        let mut remaining = delta;
        loop {
            let before = self.capture();
            let progressed = self.switch_step(key, &mut remaining);
            self.emit_moves_since(&before);
            if !progressed || remaining == 0 {
                break;
            }
        }
        self.commit_positions_since(&entry);

        let now = self.slot(key).map_or(origin, |s| s.constrained_position());
        let moved = now - origin;
        if moved != 0 {
            self.push_event(StripEvent::RedrawRequested);
        }
        moved
    }

    /// One keyboard-granular switch step (one minimum-size increment).
    pub fn nudge(&mut self, key: SlotKey, direction: i32) -> bool {
        let Some(slot) = self.slot(key) else {
            return false;
        };
        let step = slot.min_cells().max(1) * direction.signum();
        if step == 0 {
            return false;
        }
        self.switch_move(key, step) != 0
    }

    fn switch_step(&mut self, key: SlotKey, remaining: &mut i32) -> bool {
        let Some(index) = self.index_of(key) else {
            return false;
        };
        if *remaining > 0 {
            let my_end = self.slots[index].span().end();
            match self.slots.get(index + 1) {
                None => {
                    let amount = (*remaining).min(self.length() - my_end);
                    if amount <= 0 {
                        return false;
                    }
                    self.slots[index].constrained += amount;
                    *remaining -= amount;
                    true
                }
                Some(next) => {
                    let gap = next.constrained - my_end;
                    if gap > 0 {
                        let amount = (*remaining).min(gap);
                        self.slots[index].constrained += amount;
                        *remaining -= amount;
                        true
                    } else if !next.is_locked() {
                        // Exactly adjacent: exchange both order and coordinates.
                        let next_cells = next.cells;
                        let my_start = self.slots[index].constrained;
                        self.slots[index + 1].constrained = my_start;
                        self.slots[index].constrained = my_start + next_cells;
                        self.slots.swap(index, index + 1);
                        *remaining = (*remaining - next_cells).max(0);
                        true
                    } else {
                        self.jump_locked_run(index, 1, remaining)
                    }
                }
            }
        } else {
            let my_start = self.slots[index].constrained;
            if index == 0 {
                let amount = (-*remaining).min(my_start);
                if amount <= 0 {
                    return false;
                }
                self.slots[index].constrained -= amount;
                *remaining += amount;
                true
            } else {
                let prev_end = self.slots[index - 1].span().end();
                let gap = my_start - prev_end;
                if gap > 0 {
                    let amount = (-*remaining).min(gap);
                    self.slots[index].constrained -= amount;
                    *remaining += amount;
                    true
                } else if !self.slots[index - 1].is_locked() {
                    let prev_cells = self.slots[index - 1].cells;
                    let prev_start = self.slots[index - 1].constrained;
                    let my_cells = self.slots[index].cells;
                    self.slots[index].constrained = prev_start;
                    self.slots[index - 1].constrained = prev_start + my_cells;
                    self.slots.swap(index - 1, index);
                    *remaining = (*remaining + prev_cells).min(0);
                    true
                } else {
                    self.jump_locked_run(index, -1, remaining)
                }
            }
        }
    }

    /// Jump over the locked run adjacent to `index`, pushing the first
    /// movable slot beyond it out of the way first. The jump happens only
    /// when that push can fully succeed.
    fn jump_locked_run(&mut self, index: usize, dir: i32, remaining: &mut i32) -> bool {
        let cells = self.slots[index].cells;
        let old = self.slots[index].constrained;
        if dir > 0 {
            let mut last = index + 1;
            while last + 1 < self.slots.len() && self.slots[last + 1].is_locked() {
                last += 1;
            }
            let landing = self.slots[last].span().end();
            let movable = last + 1;
            let gap = match self.slots.get(movable) {
                Some(slot) => slot.constrained - landing,
                None => self.length() - landing,
            };
            let need = cells - gap;
            if need > 0 {
                if movable >= self.slots.len() || self.room_toward(movable, dir) < need {
                    return false;
                }
                self.cascade(movable, dir, need);
            }
            let mut slot = self.slots.remove(index);
            slot.constrained = landing;
            self.slots.insert(last, slot);
            *remaining = (*remaining - (landing - old)).max(0);
            true
        } else {
            let mut first = index - 1;
            while first > 0 && self.slots[first - 1].is_locked() {
                first -= 1;
            }
            let landing = self.slots[first].constrained - cells;
            let gap = if first > 0 {
                self.slots[first].constrained - self.slots[first - 1].span().end()
            } else {
                self.slots[first].constrained
            };
            let need = cells - gap;
            if need > 0 {
                if first == 0 || self.room_toward(first - 1, dir) < need {
                    return false;
                }
                self.cascade(first - 1, dir, need);
            }
            let mut slot = self.slots.remove(index);
            slot.constrained = landing;
            self.slots.insert(first, slot);
            *remaining = (*remaining - (landing - old)).min(0);
            true
        }
    }

    /// Packed strips reorder on midpoint crossings and re-derive every
    /// coordinate from the packed reflow.
    fn switch_move_packed(&mut self, key: SlotKey, delta: i32) -> i32 {
        let Some(mut index) = self.index_of(key) else {
            return 0;
        };
        let origin = self.slots[index].constrained;
        let target = origin + delta;
        let before = self.capture();
        let mut changed = false;
        if delta > 0 {
            while index + 1 < self.slots.len() && !self.slots[index + 1].is_locked() {
                let next = &self.slots[index + 1];
                let midpoint = next.constrained + next.cells / 2;
                if target + self.slots[index].cells > midpoint {
                    self.slots.swap(index, index + 1);
                    index += 1;
                    changed = true;
                } else {
                    break;
                }
            }
        } else {
            while index > 0 && !self.slots[index - 1].is_locked() {
                let prev = &self.slots[index - 1];
                let midpoint = prev.constrained + prev.cells / 2;
                if target < midpoint {
                    self.slots.swap(index - 1, index);
                    index -= 1;
                    changed = true;
                } else {
                    break;
                }
            }
        }
        if changed {
            self.reflow_packed();
            self.emit_moves_since(&before);
            self.push_event(StripEvent::RedrawRequested);
        }
        self.slots[index].constrained - origin
    }

    // -----------------------------------------------------------------
    // Push move
    // -----------------------------------------------------------------

    /// Move a slot toward `constrained + delta` in one step, displacing
    /// neighbors in the same direction by exactly enough to clear room.
    /// Stops short at a locked slot or the strip boundary.
    pub fn push_move(&mut self, key: SlotKey, delta: i32) -> PushOutcome {
        let Some(index) = self.index_of(key) else {
            return PushOutcome::unmoved(false);
        };
        if delta == 0 {
            return PushOutcome::unmoved(false);
        }
        if self.slots[index].is_locked() || self.is_packed() {
            return PushOutcome::unmoved(true);
        }
        let dir = delta.signum();
        let want = delta.abs();
        let room = self.room_toward(index, dir);
        let amount = want.min(room);
        if amount <= 0 {
            return PushOutcome::unmoved(true);
        }
        let before = self.capture();
        self.cascade(index, dir, amount);
        self.emit_moves_since(&before);
        self.commit_positions_since(&before);
        self.push_event(StripEvent::RedrawRequested);
        PushOutcome {
            moved: dir * amount,
            blocked: amount < want,
        }
    }

    // -----------------------------------------------------------------
    // Free move
    // -----------------------------------------------------------------

    /// Relocate a slot to the free run nearest `target`, ignoring collision
    /// with its own current placement. Used for keyboard fine positioning
    /// and unmodified drag continuation.
    pub fn free_move(&mut self, key: SlotKey, target: i32) -> Result<i32, PlacementError> {
        let index = self
            .index_of(key)
            .ok_or(PlacementError::UnknownSlot { key })?;
        if self.slots[index].is_locked() || self.is_packed() {
            return Ok(self.slots[index].constrained);
        }
        let cells = self.slots[index].cells;
        let Some((pos, _)) = self.nearest_free_run(target, cells, Some(index)) else {
            return Err(PlacementError::NoFreeRun {
                needed: cells,
                length: self.length(),
            });
        };
        if pos == self.slots[index].constrained {
            return Ok(pos);
        }
        let mut slot = self.slots.remove(index);
        slot.position = pos;
        slot.constrained = pos;
        let insert_at = self.slots.partition_point(|s| s.constrained <= pos);
        self.slots.insert(insert_at, slot);
        self.push_event(StripEvent::ItemMoved { key });
        self.push_event(StripEvent::RedrawRequested);
        Ok(pos)
    }

    // -----------------------------------------------------------------
    // Shared helpers
    // -----------------------------------------------------------------

    /// How far the slot at `index` can travel in `dir`, absorbing gaps and
    /// displacing unlocked neighbors. Stops accumulating at the first
    /// locked slot or the strip edge.
    fn room_toward(&self, index: usize, dir: i32) -> i32 {
        let mut room = 0;
        if dir > 0 {
            let mut edge = self.slots[index].span().end();
            for slot in &self.slots[index + 1..] {
                room += slot.constrained - edge;
                if slot.is_locked() {
                    return room.max(0);
                }
                edge = slot.span().end();
            }
            room += self.length() - edge;
        } else {
            let mut edge = self.slots[index].constrained;
            for slot in self.slots[..index].iter().rev() {
                room += edge - slot.span().end();
                if slot.is_locked() {
                    return room.max(0);
                }
                edge = slot.constrained;
            }
            room += edge;
        }
        room.max(0)
    }

    /// Displace the slot at `index` by `amount` in `dir`, pushing following
    /// slots by exactly enough to clear room. The caller bounds `amount` by
    /// `room_toward`, so the push never reaches a locked slot or leaves the
    /// strip.
    fn cascade(&mut self, index: usize, dir: i32, amount: i32) {
        debug_assert!(amount > 0);
        if dir > 0 {
            self.slots[index].constrained += amount;
            let mut cursor = self.slots[index].span().end();
            for j in index + 1..self.slots.len() {
                if self.slots[j].constrained >= cursor {
                    break;
                }
                self.slots[j].constrained = cursor;
                cursor = self.slots[j].span().end();
            }
        } else {
            self.slots[index].constrained -= amount;
            let mut cursor = self.slots[index].constrained;
            for j in (0..index).rev() {
                if self.slots[j].span().end() <= cursor {
                    break;
                }
                self.slots[j].constrained = cursor - self.slots[j].cells;
                cursor = self.slots[j].constrained;
            }
        }
    }
}
