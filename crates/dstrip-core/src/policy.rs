//! Host capability seam consulted before interactive moves.
//!
//! The engine treats these as pure predicates: it never caches the answers
//! across calls, and a denial produces no state change.

use crate::SlotKey;

/// Capability queries the host answers about a placed item.
///
/// Both queries gate `begin_drag`: an item whose hosting applet forbids
/// free movement, or whose position the host cannot write back, is not
/// draggable even when its slot is unlocked.
pub trait MovePolicy {
    /// Whether the item may be freely moved by the user.
    fn can_move(&self, key: SlotKey) -> bool;

    /// Whether the item's position can be written back by the host.
    fn position_writable(&self, key: SlotKey) -> bool;
}

/// Permissive default policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl MovePolicy for AllowAll {
    fn can_move(&self, _key: SlotKey) -> bool {
        true
    }

    fn position_writable(&self, _key: SlotKey) -> bool {
        true
    }
}
