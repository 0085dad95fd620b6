//! Opaque stable identifiers for users and items.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An opaque, unique, stable identifier.
///
/// Backed by a UUIDv7 so that identifiers generated close together sort close
/// together, which keeps `redb` table locality reasonable for an append-heavy
/// rating workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id(Uuid);

impl Id {
    /// Generate a new, unique `Id`.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Borrow the identifier as the raw bytes used as a store table key.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Reconstruct an `Id` from the raw bytes stored as a table key.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Uuid::from_slice(bytes).ok().map(Self)
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(Id::new(), Id::new());
    }

    #[test]
    fn test_round_trips_through_bytes() {
        let id = Id::new();
        let bytes = id.as_bytes().to_vec();
        assert_eq!(Id::from_bytes(&bytes), Some(id));
    }
}
