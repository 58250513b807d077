//! The authoritative game world.
//!
//! `GameWorld` owns everything the simulation can observe: the logical
//! clock, all player state and the seeded RNG. It only changes through
//! [`GameWorld::add_game_command`] and [`GameWorld::run_gf`], so identical
//! command streams applied to identical starting worlds stay bit-identical,
//! which is what lockstep multiplayer and replay playback rely on.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::commands::{EXPANSION_COST_PER_AREA, GameCommand, RECRUIT_COST_PER_SOLDIER};
use crate::error::{GameError, Result};
use crate::event_manager::{EventManager, GameFrame, is_network_frame};
use crate::map::{MapFile, MapInfo};
use crate::player::{
    AiInfo, BuildingKind, GamePlayer, PlayerId, PlayerInfo, STATISTIC_SAMPLE_INTERVAL,
    StatisticType, Team, generate_player_infos,
};
use crate::settings::GlobalGameSettings;

/// How often (in game frames) income and upkeep are applied.
pub const ECONOMY_INTERVAL: GameFrame = 10;

/// One upkeep gold per this many soldiers, per economy interval.
pub const MILITARY_UPKEEP_DIVISOR: u32 = 10;

/// The complete simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameWorld {
    em: EventManager,
    settings: GlobalGameSettings,
    players: Vec<GamePlayer>,
    rng: ChaCha8Rng,
    seed: u64,
    map_info: MapInfo,
    queued: Vec<Vec<GameCommand>>,
}

impl GameWorld {
    /// Build the starting world from a parsed map.
    ///
    /// One player per AI descriptor, seated on the map's starting positions
    /// in slot order. Callers validate that the map provides enough slots.
    #[must_use]
    pub fn new(
        map: &MapFile,
        map_info: MapInfo,
        ais: &[AiInfo],
        settings: GlobalGameSettings,
        seed: u64,
    ) -> Self {
        debug_assert!(map.starting_positions.len() >= ais.len());
        let players: Vec<GamePlayer> = generate_player_infos(ais)
            .into_iter()
            .zip(&map.starting_positions)
            .map(|(info, start)| {
                let mut player = GamePlayer::new(info);
                player.stats_mut().set(StatisticType::Country, start.country);
                player.stats_mut().set(StatisticType::Military, start.military);
                player.stats_mut().set(StatisticType::Gold, start.gold);
                for (&kind, &count) in &start.buildings {
                    for _ in 0..count {
                        player.add_building(kind);
                    }
                }
                player
            })
            .collect();
        let queued = vec![Vec::new(); players.len()];
        Self {
            em: EventManager::new(0),
            settings,
            players,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            map_info,
            queued,
        }
    }

    /// Number of player slots in this game.
    #[must_use]
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    /// Access a player by id.
    pub fn player(&self, id: PlayerId) -> Result<&GamePlayer> {
        self.players.get(id).ok_or(GameError::InvalidPlayer(id))
    }

    /// Mutable access to a player by id.
    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut GamePlayer> {
        self.players
            .get_mut(id)
            .ok_or(GameError::InvalidPlayer(id))
    }

    /// All players in slot order.
    #[must_use]
    pub fn players(&self) -> &[GamePlayer] {
        &self.players
    }

    /// Roster descriptors in slot order, for replay and savegame headers.
    #[must_use]
    pub fn player_infos(&self) -> Vec<PlayerInfo> {
        self.players.iter().map(GamePlayer::info).collect()
    }

    /// Current value of the logical clock.
    #[must_use]
    pub const fn current_gf(&self) -> GameFrame {
        self.em.current_gf()
    }

    /// Global settings this game was started with.
    #[must_use]
    pub const fn settings(&self) -> &GlobalGameSettings {
        &self.settings
    }

    pub(crate) fn settings_mut(&mut self) -> &mut GlobalGameSettings {
        &mut self.settings
    }

    /// RNG seed this game was started with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Map identity for replay and savegame headers.
    #[must_use]
    pub const fn map_info(&self) -> &MapInfo {
        &self.map_info
    }

    /// Whether the game is over: at least two players were seated and at
    /// most one of them is still undefeated.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        let active = self.players.iter().filter(|p| !p.is_defeated()).count();
        self.players.len() >= 2 && active <= 1
    }

    /// Queue a player's commands for execution at the next network-frame
    /// boundary. Within a player, execution preserves queue order.
    pub fn add_game_command(&mut self, player: PlayerId, commands: Vec<GameCommand>) -> Result<()> {
        let queue = self
            .queued
            .get_mut(player)
            .ok_or(GameError::InvalidPlayer(player))?;
        queue.extend(commands);
        Ok(())
    }

    /// Advance the simulation by exactly one game frame.
    ///
    /// At a network-frame boundary, queued commands execute first, in
    /// canonical order: player id ascending, queue order within a player.
    /// Then the per-frame economy runs, defeats are detected, statistics
    /// are sampled on their own interval, and the clock advances.
    pub fn run_gf(&mut self) {
        let gf = self.em.current_gf();
        if is_network_frame(gf) {
            self.execute_queued(gf);
        }
        self.run_economy(gf);
        self.detect_defeats(gf);
        if gf % STATISTIC_SAMPLE_INTERVAL == 0 {
            for player in &mut self.players {
                player.stats_mut().sample(gf);
            }
        }
        self.em.advance();
    }

    /// Hash of the complete observable world state.
    ///
    /// Pure function of the snapshot: equal worlds hash equal. Used by
    /// [`AsyncChecksum`](crate::checksum::AsyncChecksum) for desync and
    /// replay verification.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.em.current_gf().hash(&mut hasher);
        for player in &self.players {
            player.name.hash(&mut hasher);
            player.is_defeated().hash(&mut hasher);
            for ty in StatisticType::ALL {
                player.statistic_current(ty).hash(&mut hasher);
            }
            for (kind, count) in player.buildings() {
                kind.hash(&mut hasher);
                count.hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    fn execute_queued(&mut self, gf: GameFrame) {
        for player in 0..self.players.len() {
            let commands = std::mem::take(&mut self.queued[player]);
            for command in commands {
                trace!(gf, player, ?command, "executing command");
                self.execute_command(player, command);
            }
        }
    }

    fn execute_command(&mut self, player: PlayerId, command: GameCommand) {
        if self.players[player].is_defeated() {
            return;
        }
        match command {
            GameCommand::ExpandTerritory { area } => {
                let cost = area.saturating_mul(EXPANSION_COST_PER_AREA);
                let p = &mut self.players[player];
                if area > 0 && p.statistic_current(StatisticType::Gold) >= cost {
                    p.stats_mut().sub(StatisticType::Gold, cost);
                    p.stats_mut().add(StatisticType::Country, area);
                }
            }
            GameCommand::Construct(kind) => {
                let p = &mut self.players[player];
                if p.statistic_current(StatisticType::Gold) >= kind.cost() {
                    p.stats_mut().sub(StatisticType::Gold, kind.cost());
                    p.add_building(kind);
                }
            }
            GameCommand::RecruitSoldiers { count } => {
                let cost = count.saturating_mul(RECRUIT_COST_PER_SOLDIER);
                let p = &mut self.players[player];
                if count > 0
                    && p.building_count(BuildingKind::Barracks) > 0
                    && p.statistic_current(StatisticType::Gold) >= cost
                {
                    p.stats_mut().sub(StatisticType::Gold, cost);
                    p.stats_mut().add(StatisticType::Military, count);
                }
            }
            GameCommand::Attack { target, strength } => {
                self.execute_attack(player, target, strength);
            }
            GameCommand::Surrender => {
                info!(player, name = %self.players[player].name, "player surrendered");
                self.players[player].mark_defeated();
            }
        }
    }

    fn execute_attack(&mut self, attacker: PlayerId, target: PlayerId, strength: u32) {
        if target == attacker || target >= self.players.len() {
            return;
        }
        if self.players[target].is_defeated() {
            return;
        }
        let attacker_team = self.players[attacker].team;
        if attacker_team != Team::None && attacker_team == self.players[target].team {
            return;
        }
        let committed = strength.min(self.players[attacker].statistic_current(StatisticType::Military));
        if committed == 0 {
            return;
        }
        // Attacker always loses half the committed force; the defender
        // absorbs the rest.
        self.players[attacker]
            .stats_mut()
            .sub(StatisticType::Military, committed / 2);
        let defender_military = self.players[target].statistic_current(StatisticType::Military);
        self.players[target]
            .stats_mut()
            .sub(StatisticType::Military, committed);
        if committed >= defender_military {
            // Overrun: a quarter of the territory changes hands and one
            // building burns down.
            let captured = self.players[target].statistic_current(StatisticType::Country) / 4;
            self.players[target]
                .stats_mut()
                .sub(StatisticType::Country, captured);
            self.players[attacker]
                .stats_mut()
                .add(StatisticType::Country, captured);
            self.players[target].destroy_building();
            debug!(attacker, target, committed, captured, "defender overrun");
        }
    }

    fn run_economy(&mut self, gf: GameFrame) {
        if gf % ECONOMY_INTERVAL == 0 {
            for player in &mut self.players {
                if player.is_defeated() {
                    continue;
                }
                let income: u32 = player
                    .buildings()
                    .iter()
                    .map(|(kind, count)| kind.income() * count)
                    .sum();
                if income > 0 {
                    // Harvest luck. Drawn only for players with productive
                    // buildings, so the draw sequence is a function of
                    // world state alone.
                    let jitter = self.rng.gen_range(0..=1);
                    player
                        .stats_mut()
                        .add(StatisticType::Gold, income + jitter);
                }
                let upkeep =
                    player.statistic_current(StatisticType::Military) / MILITARY_UPKEEP_DIVISOR;
                player.stats_mut().sub(StatisticType::Gold, upkeep);
            }
        }
        // Unpaid soldiers desert one per frame.
        for player in &mut self.players {
            if !player.is_defeated() && player.statistic_current(StatisticType::Gold) == 0 {
                player.stats_mut().sub(StatisticType::Military, 1);
            }
        }
    }

    fn detect_defeats(&mut self, gf: GameFrame) {
        for (id, player) in self.players.iter_mut().enumerate() {
            if !player.is_defeated()
                && player.statistic_current(StatisticType::Country) == 0
                && player.statistic_current(StatisticType::Buildings) == 0
                && player.statistic_current(StatisticType::Military) == 0
            {
                info!(gf, player = id, name = %player.name, "player defeated");
                player.mark_defeated();
            }
        }
    }
}
