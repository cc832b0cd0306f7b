//! Stable slot identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host-supplied identity for one placed item.
///
/// `0` is reserved/invalid so keys are always non-zero, and the engine can
/// use the raw value directly in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotKey(u64);

impl SlotKey {
    /// Create a new slot key, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, ZeroSlotKey> {
        if raw == 0 {
            return Err(ZeroSlotKey);
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error for the reserved zero key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroSlotKey;

impl fmt::Display for ZeroSlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot key 0 is reserved")
    }
}

impl std::error::Error for ZeroSlotKey {}
