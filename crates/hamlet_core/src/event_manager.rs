//! The simulation's logical clock.
//!
//! One game frame (GF) is one simulation tick. The [`EventManager`] owns the
//! authoritative frame counter; it is advanced exactly once per tick by the
//! world's own advance operation, never directly by callers.

use serde::{Deserialize, Serialize};

/// Monotonically increasing logical clock value. One tick = one unit.
pub type GameFrame = u32;

/// Number of game frames between command exchanges.
///
/// In live multiplayer the interval adapts to measured round-trip latency,
/// clamped between the worst-case ping and this upper bound. The headless
/// and offline variants use the upper bound directly.
pub const NETWORK_FRAME_INTERVAL: GameFrame = 20;

/// Whether `gf` is a network-frame boundary.
///
/// Commands are only exchanged and applied at these boundaries.
#[must_use]
pub const fn is_network_frame(gf: GameFrame) -> bool {
    gf % NETWORK_FRAME_INTERVAL == 0
}

/// Owner of the authoritative game-frame counter.
///
/// Purely synchronous and single-threaded. The counter only moves through
/// [`advance`](Self::advance), which the owning world calls once per tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventManager {
    current_gf: GameFrame,
}

impl EventManager {
    /// Create an event manager starting at the given frame.
    #[must_use]
    pub const fn new(start_gf: GameFrame) -> Self {
        Self {
            current_gf: start_gf,
        }
    }

    /// Get the current logical clock value.
    #[must_use]
    pub const fn current_gf(&self) -> GameFrame {
        self.current_gf
    }

    /// Advance the clock by one frame.
    ///
    /// Only the world's tick operation may call this.
    pub(crate) fn advance(&mut self) {
        self.current_gf += 1;
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new(0)
    }
}
