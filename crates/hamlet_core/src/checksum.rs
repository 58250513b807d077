//! World-state checksums for desync detection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::world::GameWorld;

/// Checksum of the whole observable world state at one game frame.
///
/// Every participant computes this locally from its own world and attaches
/// it to outgoing command bundles. Equal worlds always hash equal; a
/// mismatch between participants at the same frame means the simulations
/// have diverged and the run is unrecoverable.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AsyncChecksum(u64);

impl AsyncChecksum {
    /// Compute the checksum of the given world.
    #[must_use]
    pub fn create(world: &GameWorld) -> Self {
        Self(world.state_hash())
    }

    /// Wrap an already-computed hash value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Raw hash value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AsyncChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_fixed_width_hex() {
        assert_eq!(AsyncChecksum::from_raw(0xab).to_string(), "00000000000000ab");
    }
}
