#![forbid(unsafe_code)]

//! Interactive layer over the strip layout engine.
//!
//! A [`StripRegistry`] owns every live [`Strip`] together with its display
//! bounds and enforces the process-wide "one drag at a time" rule. While a
//! drag is active the registry resolves each cursor report against the
//! active strip's move strategy, and repoints the session when the cursor
//! crosses into another registered strip (cross-strip reparenting).
//!
//! Everything here is single threaded and cooperative: mutation entry
//! points run to completion on the host's event loop, and the only
//! time-based element is [`StripRegistry::tick`], a host-driven callback
//! that re-evaluates a held-but-stationary cursor on a fixed cadence.
//!
//! [`Strip`]: dstrip_layout::Strip

mod drag;
mod registry;

pub use drag::{DRAG_TICK_INTERVAL, DragRejected, DragSession, MoveStrategy, OffsetMode};
pub use dstrip_core::{AllowAll, MovePolicy, Orientation, Point, Rect, SlotKey, StripEvent};
pub use dstrip_layout::{PushOutcome, Slot, SlotSpec, Strip};
pub use registry::{StripId, StripRegistry};
