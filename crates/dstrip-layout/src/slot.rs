//! Slot model: one placed item's layout state.

use dstrip_core::{SlotFlags, SlotKey, Span};
use serde::{Deserialize, Serialize};

use crate::LayoutError;

/// One discrete acceptable size band for an expandable slot.
///
/// Bands are ordered by the host from most to least preferred; the reflow
/// pass takes the first band whose `min_cells` still fits the available gap
/// and clips `max_cells` to that gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeHint {
    /// Largest size the band accepts.
    pub max_cells: i32,
    /// Smallest size the band accepts.
    pub min_cells: i32,
}

impl SizeHint {
    /// Create a band, rejecting inverted or non-positive bounds.
    pub fn new(max_cells: i32, min_cells: i32) -> Result<Self, LayoutError> {
        if min_cells < 1 || max_cells < min_cells {
            return Err(LayoutError::InvalidHint {
                max_cells,
                min_cells,
            });
        }
        Ok(Self {
            max_cells,
            min_cells,
        })
    }
}

/// Host-supplied parameters for placing a new slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    /// Natural occupied length along the strip.
    pub cells: i32,
    /// Smallest length the item can be compressed to.
    pub min_cells: i32,
    /// Across-axis demand, consumed by thickness negotiation.
    pub thickness: i32,
    /// Acceptable size bands; empty means fixed/minimum size only.
    pub hints: Vec<SizeHint>,
    /// Behavior flags.
    pub flags: SlotFlags,
}

impl SlotSpec {
    /// A fixed-size spec occupying `cells`.
    #[must_use]
    pub fn fixed(cells: i32) -> Self {
        Self {
            cells,
            min_cells: cells,
            thickness: 0,
            hints: Vec::new(),
            flags: SlotFlags::empty(),
        }
    }

    /// Set the minimum length.
    #[must_use]
    pub fn with_min_cells(mut self, min_cells: i32) -> Self {
        self.min_cells = min_cells;
        self
    }

    /// Set the across-axis demand.
    #[must_use]
    pub fn with_thickness(mut self, thickness: i32) -> Self {
        self.thickness = thickness;
        self
    }

    /// Set the size bands.
    #[must_use]
    pub fn with_hints(mut self, hints: impl IntoIterator<Item = SizeHint>) -> Self {
        self.hints = hints.into_iter().collect();
        self
    }

    /// Set the behavior flags.
    #[must_use]
    pub fn with_flags(mut self, flags: SlotFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Mark the slot immovable.
    #[must_use]
    pub fn locked(mut self) -> Self {
        self.flags |= SlotFlags::LOCKED;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), LayoutError> {
        if self.min_cells < 1 || self.cells < self.min_cells {
            return Err(LayoutError::InvalidCells {
                cells: self.cells,
                min_cells: self.min_cells,
            });
        }
        Ok(())
    }
}

/// Constraint update applied to an already placed slot.
///
/// Mirrors the mutable subset of [`SlotSpec`]; the occupied length is
/// re-derived by the strip after the update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConstraints {
    pub min_cells: i32,
    pub hints: Vec<SizeHint>,
    pub flags: SlotFlags,
}

/// One placed item's layout state.
///
/// Owned exclusively by its strip; the drag session only holds the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    key: SlotKey,
    /// Requested/logical coordinate: the last spot the user chose.
    pub(crate) position: i32,
    /// Resolved coordinate after collision resolution.
    pub(crate) constrained: i32,
    pub(crate) cells: i32,
    pub(crate) min_cells: i32,
    pub(crate) thickness: i32,
    pub(crate) hints: Vec<SizeHint>,
    pub(crate) drag_offset: i32,
    pub(crate) flags: SlotFlags,
}

impl Slot {
    pub(crate) fn from_spec(key: SlotKey, position: i32, spec: SlotSpec) -> Self {
        Self {
            key,
            position,
            constrained: position,
            cells: spec.cells.max(spec.min_cells),
            min_cells: spec.min_cells,
            thickness: spec.thickness,
            hints: spec.hints,
            drag_offset: 0,
            flags: spec.flags,
        }
    }

    /// Stable identity.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> SlotKey {
        self.key
    }

    /// Requested/logical coordinate.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> i32 {
        self.position
    }

    /// Resolved coordinate after collision resolution.
    #[inline]
    #[must_use]
    pub const fn constrained_position(&self) -> i32 {
        self.constrained
    }

    /// Current occupied length.
    #[inline]
    #[must_use]
    pub const fn cells(&self) -> i32 {
        self.cells
    }

    /// Minimum length.
    #[inline]
    #[must_use]
    pub const fn min_cells(&self) -> i32 {
        self.min_cells
    }

    /// Cursor-to-origin offset captured at drag start.
    #[inline]
    #[must_use]
    pub const fn drag_offset(&self) -> i32 {
        self.drag_offset
    }

    /// Behavior flags.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> SlotFlags {
        self.flags
    }

    /// Whether the slot is immovable.
    #[inline]
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.flags.is_locked()
    }

    /// Occupied interval at the resolved coordinate.
    #[inline]
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.constrained, self.cells)
    }

    /// Whether the reflow pass may grow this slot along the strip.
    #[inline]
    #[must_use]
    pub fn is_expandable(&self) -> bool {
        self.flags.contains(SlotFlags::EXPAND_MAJOR) && !self.hints.is_empty()
    }

    pub(crate) fn record(&self) -> SlotRecord {
        SlotRecord {
            key: self.key,
            position: self.position,
            constrained_position: self.constrained,
            cells: self.cells,
            min_cells: self.min_cells,
            thickness: self.thickness,
            hints: self.hints.clone(),
            flags: self.flags.bits(),
        }
    }
}

/// Serializable record of one slot, used by the diagnostic snapshot schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub key: SlotKey,
    pub position: i32,
    pub constrained_position: i32,
    pub cells: i32,
    pub min_cells: i32,
    #[serde(default)]
    pub thickness: i32,
    #[serde(default)]
    pub hints: Vec<SizeHint>,
    #[serde(default)]
    pub flags: u8,
}

impl SlotRecord {
    pub(crate) fn into_slot(self) -> Result<Slot, LayoutError> {
        if self.key.get() == 0 {
            return Err(LayoutError::ZeroKey);
        }
        if self.min_cells < 1 || self.cells < self.min_cells {
            return Err(LayoutError::InvalidCells {
                cells: self.cells,
                min_cells: self.min_cells,
            });
        }
        for hint in &self.hints {
            if hint.min_cells < 1 || hint.max_cells < hint.min_cells {
                return Err(LayoutError::InvalidHint {
                    max_cells: hint.max_cells,
                    min_cells: hint.min_cells,
                });
            }
        }
        let flags = SlotFlags::from_bits(self.flags).ok_or(LayoutError::UnknownFlags {
            key: self.key,
            bits: self.flags,
        })?;
        Ok(Slot {
            key: self.key,
            position: self.position,
            constrained: self.constrained_position,
            cells: self.cells,
            min_cells: self.min_cells,
            thickness: self.thickness,
            hints: self.hints,
            drag_offset: 0,
            flags,
        })
    }
}
