//! Error types for the strip layout engine.
//!
//! Nothing here is fatal: every failure leaves the strip in its prior fully
//! resolved state, and callers decide whether to retry elsewhere or surface
//! the condition to the user.

use std::fmt;

use dstrip_core::SlotKey;

/// Model-level validation errors for slot parameters and records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// A size hint band has inverted or non-positive bounds.
    InvalidHint { max_cells: i32, min_cells: i32 },
    /// Occupied length is below the minimum, or the minimum is non-positive.
    InvalidCells { cells: i32, min_cells: i32 },
    /// A record carried the reserved zero key.
    ZeroKey,
    /// A record carried flag bits the engine does not know.
    UnknownFlags { key: SlotKey, bits: u8 },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHint {
                max_cells,
                min_cells,
            } => write!(f, "invalid size hint band ({max_cells}, {min_cells})"),
            Self::InvalidCells { cells, min_cells } => {
                write!(f, "invalid slot size: cells {cells}, min {min_cells}")
            }
            Self::ZeroKey => write!(f, "slot key 0 is reserved"),
            Self::UnknownFlags { key, bits } => {
                write!(f, "slot {key} carries unknown flag bits {bits:#04x}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Placement failures from `add` and `free_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// No free run of at least `needed` cells exists anywhere on the strip.
    NoFreeRun { needed: i32, length: i32 },
    /// The key is already placed on this strip.
    DuplicateKey { key: SlotKey },
    /// The key is not placed on this strip.
    UnknownSlot { key: SlotKey },
    /// The supplied slot parameters are invalid.
    Model(LayoutError),
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFreeRun { needed, length } => {
                write!(f, "no free run of {needed} cells on a strip of {length}")
            }
            Self::DuplicateKey { key } => write!(f, "slot {key} is already placed"),
            Self::UnknownSlot { key } => write!(f, "slot {key} is not on this strip"),
            Self::Model(e) => write!(f, "invalid slot parameters: {e}"),
        }
    }
}

impl std::error::Error for PlacementError {}

impl From<LayoutError> for PlacementError {
    fn from(err: LayoutError) -> Self {
        Self::Model(err)
    }
}

/// A violation of the strip's ordering/overlap invariant.
///
/// Produced only by explicit validation; public entry points never return
/// while the invariant is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Slots at `index` and `index + 1` are out of order.
    Unsorted { index: usize },
    /// Slots at `index` and `index + 1` occupy overlapping intervals.
    Overlap { index: usize },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsorted { index } => {
                write!(f, "slots {index} and {} out of order", index + 1)
            }
            Self::Overlap { index } => {
                write!(f, "slots {index} and {} overlap", index + 1)
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Errors from loading a diagnostic strip snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    /// Schema version is not supported.
    UnsupportedVersion { found: u16, expected: u16 },
    /// The snapshot carries a non-positive strip length.
    InvalidLength { length: i32 },
    /// Two records carry the same key.
    DuplicateKey { key: SlotKey },
    /// A record failed model validation.
    Model(LayoutError),
    /// The recorded placements violate the ordering/overlap invariant.
    Invariant(InvariantViolation),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, expected } => {
                write!(f, "unsupported snapshot version {found} (expected {expected})")
            }
            Self::InvalidLength { length } => write!(f, "invalid strip length {length}"),
            Self::DuplicateKey { key } => write!(f, "duplicate slot key {key}"),
            Self::Model(e) => write!(f, "invalid slot record: {e}"),
            Self::Invariant(v) => write!(f, "snapshot violates layout invariant: {v}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<LayoutError> for SnapshotError {
    fn from(err: LayoutError) -> Self {
        Self::Model(err)
    }
}

impl From<InvariantViolation> for SnapshotError {
    fn from(err: InvariantViolation) -> Self {
        Self::Invariant(err)
    }
}
