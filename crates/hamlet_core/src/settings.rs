//! Global game settings shared by all participants.
//!
//! Settings are fixed at game start and recorded into replay and savegame
//! headers so a run can be reproduced exactly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::event_manager::GameFrame;

/// Simulation speed. Determines the real-time length of one game frame,
/// which the status report uses to derive the game clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameSpeed {
    /// 80 ms per frame.
    VerySlow,
    /// 60 ms per frame.
    Slow,
    /// 50 ms per frame.
    Normal,
    /// 40 ms per frame.
    Fast,
    /// 30 ms per frame.
    VeryFast,
}

impl GameSpeed {
    /// Real-time length of one game frame at this speed.
    #[must_use]
    pub const fn gf_length(self) -> Duration {
        let ms = match self {
            Self::VerySlow => 80,
            Self::Slow => 60,
            Self::Normal => 50,
            Self::Fast => 40,
            Self::VeryFast => 30,
        };
        Duration::from_millis(ms)
    }

    /// Game-clock time elapsed after `gf` frames at this speed.
    #[must_use]
    pub fn game_clock(self, gf: GameFrame) -> Duration {
        self.gf_length() * gf
    }
}

/// Exploration / fog-of-war mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exploration {
    /// Whole map visible; no exploration state is tracked.
    Disabled,
    /// Terrain must be explored once, then stays visible.
    Classic,
    /// Explored terrain falls back under fog when out of sight.
    FogOfWar,
}

/// Global settings for a single game, identical across participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalGameSettings {
    /// Simulation speed.
    pub speed: GameSpeed,
    /// Exploration mode. Savegames force this to [`Exploration::Disabled`].
    pub exploration: Exploration,
}

impl Default for GlobalGameSettings {
    fn default() -> Self {
        Self {
            speed: GameSpeed::Normal,
            exploration: Exploration::Classic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_clock_scales_with_speed() {
        assert_eq!(
            GameSpeed::Normal.game_clock(20),
            Duration::from_millis(1000)
        );
        assert_eq!(
            GameSpeed::VeryFast.game_clock(100),
            Duration::from_millis(3000)
        );
    }

    #[test]
    fn test_default_settings() {
        let ggs = GlobalGameSettings::default();
        assert_eq!(ggs.speed, GameSpeed::Normal);
        assert_eq!(ggs.exploration, Exploration::Classic);
    }
}
