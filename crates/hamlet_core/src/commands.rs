//! Game commands: the only way player intent enters the simulation.
//!
//! Commands are pure data. They are generated locally (by an AI adapter or,
//! in a full client, by UI input), queued, and executed in canonical order
//! at network-frame boundaries. The same command stream applied to the same
//! starting world always produces the same end state.

use serde::{Deserialize, Serialize};

use crate::checksum::AsyncChecksum;
use crate::player::{BuildingKind, PlayerId};

/// Gold cost per unit of territory claimed by an expansion command.
pub const EXPANSION_COST_PER_AREA: u32 = 5;

/// Gold cost per soldier recruited.
pub const RECRUIT_COST_PER_SOLDIER: u32 = 3;

/// A single player order.
///
/// Execution validates against the issuing player's current state; orders
/// that cannot be afforded or are otherwise invalid are dropped without
/// side effects. Dropping must be deterministic, so validation reads only
/// world state, never anything host-local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameCommand {
    /// Claim `area` units of territory, paying gold per unit.
    ExpandTerritory {
        /// Territory units to claim.
        area: u32,
    },
    /// Construct one building of the given kind.
    Construct(BuildingKind),
    /// Recruit soldiers. Requires at least one barracks.
    RecruitSoldiers {
        /// Number of soldiers to recruit.
        count: u32,
    },
    /// Attack another player with part of the standing military.
    Attack {
        /// Player being attacked.
        target: PlayerId,
        /// Soldiers committed to the attack.
        strength: u32,
    },
    /// Give up. The issuing player is defeated immediately.
    Surrender,
}

impl GameCommand {
    /// Gold cost of this command, where one applies up front.
    ///
    /// Attacks and surrender spend no gold.
    #[must_use]
    pub const fn gold_cost(&self) -> u32 {
        match self {
            Self::ExpandTerritory { area } => *area * EXPANSION_COST_PER_AREA,
            Self::Construct(kind) => kind.cost(),
            Self::RecruitSoldiers { count } => *count * RECRUIT_COST_PER_SOLDIER,
            Self::Attack { .. } | Self::Surrender => 0,
        }
    }
}

/// One player's command bundle for a network frame.
///
/// The checksum is the sender's world hash at the frame the bundle was
/// produced; in multiplayer every participant compares it against their own
/// to detect divergence. An empty bundle still carries a checksum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGameCommands {
    /// Sender's world checksum when the bundle was created.
    pub checksum: AsyncChecksum,
    /// Commands in the order the player issued them.
    pub commands: Vec<GameCommand>,
}

impl PlayerGameCommands {
    /// Bundle the given commands with the sender's checksum.
    #[must_use]
    pub const fn new(checksum: AsyncChecksum, commands: Vec<GameCommand>) -> Self {
        Self { checksum, commands }
    }

    /// An empty bundle. Sent when a player has no orders this frame so the
    /// checksum exchange still happens.
    #[must_use]
    pub const fn empty(checksum: AsyncChecksum) -> Self {
        Self {
            checksum,
            commands: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_gold_costs() {
        assert_eq!(GameCommand::ExpandTerritory { area: 4 }.gold_cost(), 20);
        assert_eq!(
            GameCommand::Construct(BuildingKind::GoldMine).gold_cost(),
            20
        );
        assert_eq!(GameCommand::RecruitSoldiers { count: 5 }.gold_cost(), 15);
        assert_eq!(
            GameCommand::Attack {
                target: 1,
                strength: 10
            }
            .gold_cost(),
            0
        );
        assert_eq!(GameCommand::Surrender.gold_cost(), 0);
    }

    #[test]
    fn test_empty_bundle_keeps_checksum() {
        let checksum = AsyncChecksum::from_raw(0xdead_beef);
        let bundle = PlayerGameCommands::empty(checksum);
        assert!(bundle.commands.is_empty());
        assert_eq!(bundle.checksum, checksum);
    }
}
