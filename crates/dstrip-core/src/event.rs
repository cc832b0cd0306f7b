//! Notification vocabulary emitted to the host.
//!
//! The engine never calls back into the host mid-mutation. Each mutating
//! entry point pushes the events it produced onto a per-strip queue, in the
//! order the state changes happened; the host drains the queue after the
//! call returns and reacts (repaint, persist, forward to applets).

use serde::{Deserialize, Serialize};

use crate::SlotKey;

/// A notification produced by a strip mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StripEvent {
    /// A slot was placed on the strip.
    ItemAdded { key: SlotKey },
    /// A slot was removed from the strip (including reparent departures).
    ItemRemoved { key: SlotKey },
    /// A slot's resolved coordinate changed.
    ItemMoved { key: SlotKey },
    /// Strip contents changed in a way that needs a repaint.
    RedrawRequested,
}

impl StripEvent {
    /// The slot the event concerns, if any.
    #[must_use]
    pub const fn key(&self) -> Option<SlotKey> {
        match self {
            Self::ItemAdded { key } | Self::ItemRemoved { key } | Self::ItemMoved { key } => {
                Some(*key)
            }
            Self::RedrawRequested => None,
        }
    }
}
