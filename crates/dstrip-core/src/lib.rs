#![forbid(unsafe_code)]

//! Shared primitives for the dockstrip layout engine.
//!
//! This crate carries everything both the solver (`dstrip-layout`) and the
//! interactive runtime (`dstrip-runtime`) need to agree on: 1D spans and
//! display geometry for hit testing, strip orientation, the notification
//! vocabulary emitted to the host, per-slot behavior flags, and the host
//! capability seam consulted before interactive moves.

pub mod event;
pub mod geometry;
pub mod key;
pub mod policy;

pub use event::StripEvent;
pub use geometry::{Orientation, Point, Rect, Span};
pub use key::{SlotKey, ZeroSlotKey};
pub use policy::{AllowAll, MovePolicy};

use bitflags::bitflags;

bitflags! {
    /// Per-slot behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SlotFlags: u8 {
        /// The slot cannot be moved by the user and blocks displacement.
        const LOCKED = 1 << 0;
        /// The slot may grow along the strip's major axis (hint bands apply).
        const EXPAND_MAJOR = 1 << 1;
        /// The slot may grow across the strip's minor axis.
        const EXPAND_MINOR = 1 << 2;
        /// The slot opts out of contributing to the strip's thickness demand.
        const SIZE_CONSTRAINED = 1 << 3;
    }
}

impl SlotFlags {
    /// Whether the slot is immovable.
    #[inline]
    #[must_use]
    pub const fn is_locked(self) -> bool {
        self.contains(Self::LOCKED)
    }
}
