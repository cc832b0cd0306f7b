#![forbid(unsafe_code)]

//! Applet strip layout engine.
//!
//! A [`Strip`] arranges a dynamic set of rectangular items ([`Slot`]s) along
//! one panel edge: it places new items in the nearest free run, reconciles
//! placements when the strip is resized, and implements the three
//! interactive move strategies (switch, push, free) used while an item is
//! dragged.
//!
//! # Invariants
//!
//! 1. Between public calls, slots are sorted by resolved coordinate and no
//!    two occupied intervals overlap ([`Strip::validate`]).
//! 2. Every failure is recoverable and leaves the strip in its prior fully
//!    resolved state.
//! 3. Notifications are queued synchronously with the mutation that caused
//!    them and drained by the host via [`Strip::take_events`].
//!
//! The interactive layer (drag sessions, cross-strip reparenting) lives in
//! `dstrip-runtime`; this crate is purely the solver.

mod error;
mod moves;
mod reflow;
mod slot;
mod strip;

pub use dstrip_core::{Orientation, SlotFlags, SlotKey, Span, StripEvent};
pub use error::{InvariantViolation, LayoutError, PlacementError, SnapshotError};
pub use moves::PushOutcome;
pub use slot::{SizeHint, Slot, SlotConstraints, SlotRecord, SlotSpec};
pub use strip::{STRIP_SNAPSHOT_VERSION, Strip, StripSnapshot};
