//! Player state: roster descriptors, statistics and the mutable
//! per-player simulation state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event_manager::GameFrame;

/// Dense player index in `[0, num_players)`.
pub type PlayerId = usize;

/// How often (in game frames) player statistics are sampled into the
/// time series.
pub const STATISTIC_SAMPLE_INTERVAL: GameFrame = 50;

/// Playable nations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nation {
    /// Default nation for generated AI rosters.
    Romans,
    /// Vikings.
    Vikings,
    /// Nubians.
    Nubians,
    /// Japanese.
    Japanese,
}

/// Team assignment. Players on the same team never attack each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// No team (free-for-all).
    None,
    /// Team one.
    One,
    /// Team two.
    Two,
    /// Team three.
    Three,
    /// Team four.
    Four,
}

/// Occupancy state of a player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// Slot is empty.
    Free,
    /// Slot is occupied by a participant.
    Occupied,
    /// Slot is locked and cannot be joined.
    Locked,
}

/// Concrete AI variant controlling a player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiType {
    /// Full decision-making AI.
    Default,
    /// No-op AI that never issues commands.
    Dummy,
}

/// AI difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiLevel {
    /// Passive economy, rare attacks.
    Easy,
    /// Balanced play.
    Medium,
    /// Aggressive expansion and attacks.
    Hard,
}

/// Immutable AI descriptor, one-to-one with a player slot.
///
/// Used by the AI factory to construct a concrete adapter at world-load
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AiInfo {
    /// Which adapter variant to construct.
    pub ai_type: AiType,
    /// Difficulty level.
    pub level: AiLevel,
}

impl AiInfo {
    /// Descriptor for the full decision-making AI at the given level.
    #[must_use]
    pub const fn default_ai(level: AiLevel) -> Self {
        Self {
            ai_type: AiType::Default,
            level,
        }
    }

    /// Descriptor for the no-op AI.
    #[must_use]
    pub const fn dummy() -> Self {
        Self {
            ai_type: AiType::Dummy,
            level: AiLevel::Easy,
        }
    }
}

/// Per-player statistic categories sampled over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatisticType {
    /// Territory size.
    Country,
    /// Total building count.
    Buildings,
    /// Military strength (soldier count).
    Military,
    /// Gold reserve.
    Gold,
}

impl StatisticType {
    /// All statistic categories in display order.
    pub const ALL: [Self; 4] = [Self::Country, Self::Buildings, Self::Military, Self::Gold];

    const fn index(self) -> usize {
        match self {
            Self::Country => 0,
            Self::Buildings => 1,
            Self::Military => 2,
            Self::Gold => 3,
        }
    }
}

/// Building kinds a player can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Food production; small gold income.
    Farm,
    /// Gold production.
    GoldMine,
    /// Enables recruiting soldiers.
    Barracks,
    /// Coin production; largest gold income.
    Mint,
}

impl BuildingKind {
    /// Construction cost in gold.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Farm => 12,
            Self::GoldMine => 20,
            Self::Barracks => 15,
            Self::Mint => 25,
        }
    }

    /// Gold income contributed per economy interval.
    #[must_use]
    pub const fn income(self) -> u32 {
        match self {
            Self::Farm => 1,
            Self::GoldMine => 2,
            Self::Barracks => 0,
            Self::Mint => 3,
        }
    }
}

/// A single point in the statistic time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticSample {
    /// Frame at which the sample was taken.
    pub gf: GameFrame,
    /// Values indexed by [`StatisticType::ALL`] order.
    pub values: [u32; 4],
}

/// Current statistic values plus the sampled history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    current: [u32; 4],
    series: Vec<StatisticSample>,
}

impl Statistics {
    /// Current value of a statistic.
    #[must_use]
    pub const fn current(&self, ty: StatisticType) -> u32 {
        self.current[ty.index()]
    }

    /// Sampled history, oldest first.
    #[must_use]
    pub fn series(&self) -> &[StatisticSample] {
        &self.series
    }

    pub(crate) fn set(&mut self, ty: StatisticType, value: u32) {
        self.current[ty.index()] = value;
    }

    pub(crate) fn add(&mut self, ty: StatisticType, amount: u32) {
        self.current[ty.index()] = self.current[ty.index()].saturating_add(amount);
    }

    pub(crate) fn sub(&mut self, ty: StatisticType, amount: u32) {
        self.current[ty.index()] = self.current[ty.index()].saturating_sub(amount);
    }

    pub(crate) fn sample(&mut self, gf: GameFrame) {
        self.series.push(StatisticSample {
            gf,
            values: self.current,
        });
    }
}

/// Immutable roster descriptor for one player slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Display name.
    pub name: String,
    /// Nation.
    pub nation: Nation,
    /// Team assignment.
    pub team: Team,
    /// Occupancy state.
    pub state: PlayerState,
    /// AI descriptor for this slot.
    pub ai_info: AiInfo,
}

/// Generate an occupied roster for an AI-only game, one slot per
/// descriptor. Names follow the adapter variant.
#[must_use]
pub fn generate_player_infos(ais: &[AiInfo]) -> Vec<PlayerInfo> {
    ais.iter()
        .enumerate()
        .map(|(id, ai)| PlayerInfo {
            name: match ai.ai_type {
                AiType::Default => format!("Reeve {id}"),
                AiType::Dummy => format!("Dummy {id}"),
            },
            nation: Nation::Romans,
            team: Team::None,
            state: PlayerState::Occupied,
            ai_info: *ai,
        })
        .collect()
}

/// Mutable simulation state for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePlayer {
    /// Display name.
    pub name: String,
    /// Nation.
    pub nation: Nation,
    /// Team assignment.
    pub team: Team,
    /// Occupancy state.
    pub state: PlayerState,
    /// AI descriptor for this slot.
    pub ai_info: AiInfo,
    buildings: BTreeMap<BuildingKind, u32>,
    stats: Statistics,
    defeated: bool,
}

impl GamePlayer {
    /// Create a player from its roster descriptor with zeroed statistics.
    #[must_use]
    pub fn new(info: PlayerInfo) -> Self {
        Self {
            name: info.name,
            nation: info.nation,
            team: info.team,
            state: info.state,
            ai_info: info.ai_info,
            buildings: BTreeMap::new(),
            stats: Statistics::default(),
            defeated: false,
        }
    }

    /// Roster descriptor for this player (for replay and savegame headers).
    #[must_use]
    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            name: self.name.clone(),
            nation: self.nation,
            team: self.team,
            state: self.state,
            ai_info: self.ai_info,
        }
    }

    /// Whether this player has been defeated.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.defeated
    }

    /// Current value of a statistic.
    #[must_use]
    pub const fn statistic_current(&self, ty: StatisticType) -> u32 {
        self.stats.current(ty)
    }

    /// Statistics including the sampled history.
    #[must_use]
    pub const fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Number of buildings of the given kind.
    #[must_use]
    pub fn building_count(&self, kind: BuildingKind) -> u32 {
        self.buildings.get(&kind).copied().unwrap_or(0)
    }

    /// Buildings owned by this player, keyed by kind.
    #[must_use]
    pub const fn buildings(&self) -> &BTreeMap<BuildingKind, u32> {
        &self.buildings
    }

    pub(crate) fn mark_defeated(&mut self) {
        self.defeated = true;
    }

    pub(crate) fn stats_mut(&mut self) -> &mut Statistics {
        &mut self.stats
    }

    pub(crate) fn add_building(&mut self, kind: BuildingKind) {
        *self.buildings.entry(kind).or_insert(0) += 1;
        self.stats.add(StatisticType::Buildings, 1);
    }

    /// Remove one building, smallest kind first. Returns the removed kind.
    pub(crate) fn destroy_building(&mut self) -> Option<BuildingKind> {
        let kind = *self.buildings.keys().next()?;
        match self.buildings.get_mut(&kind) {
            Some(count) if *count > 1 => *count -= 1,
            _ => {
                self.buildings.remove(&kind);
            }
        }
        self.stats.sub(StatisticType::Buildings, 1);
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_roster_names_follow_ai_type() {
        let infos = generate_player_infos(&[
            AiInfo::default_ai(AiLevel::Hard),
            AiInfo::dummy(),
            AiInfo::default_ai(AiLevel::Easy),
        ]);
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].name, "Reeve 0");
        assert_eq!(infos[1].name, "Dummy 1");
        assert_eq!(infos[2].name, "Reeve 2");
        assert!(infos.iter().all(|i| i.state == PlayerState::Occupied));
    }

    #[test]
    fn test_building_count_tracks_statistic() {
        let mut player = GamePlayer::new(generate_player_infos(&[AiInfo::dummy()]).remove(0));
        player.add_building(BuildingKind::Farm);
        player.add_building(BuildingKind::Farm);
        player.add_building(BuildingKind::Mint);

        assert_eq!(player.building_count(BuildingKind::Farm), 2);
        assert_eq!(player.statistic_current(StatisticType::Buildings), 3);

        // Smallest kind goes first.
        assert_eq!(player.destroy_building(), Some(BuildingKind::Farm));
        assert_eq!(player.building_count(BuildingKind::Farm), 1);
        assert_eq!(player.statistic_current(StatisticType::Buildings), 2);
    }

    #[test]
    fn test_statistics_sampling() {
        let mut stats = Statistics::default();
        stats.add(StatisticType::Gold, 10);
        stats.sample(0);
        stats.add(StatisticType::Gold, 5);
        stats.sample(50);

        assert_eq!(stats.series().len(), 2);
        assert_eq!(stats.series()[0].values[3], 10);
        assert_eq!(stats.series()[1].values[3], 15);
    }

    #[test]
    fn test_saturating_statistics() {
        let mut stats = Statistics::default();
        stats.sub(StatisticType::Military, 5);
        assert_eq!(stats.current(StatisticType::Military), 0);
    }
}
