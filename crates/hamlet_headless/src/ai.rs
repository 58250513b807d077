//! AI player adapters.
//!
//! An adapter observes the world every frame and queues commands locally;
//! the driver drains the queue at network-frame boundaries and feeds it
//! into the lockstep pipeline like any other participant's input. Adapters
//! never mutate the world directly.

use hamlet_core::commands::GameCommand;
use hamlet_core::event_manager::GameFrame;
use hamlet_core::player::{AiInfo, AiLevel, AiType, BuildingKind, PlayerId, StatisticType};
use hamlet_core::world::GameWorld;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// A computer-controlled participant.
///
/// Failures inside an adapter are defects: the trait is infallible and
/// implementations must not panic on any reachable world state.
pub trait AiPlayer {
    /// The slot this adapter plays.
    fn player_id(&self) -> PlayerId;

    /// Observe the world for one frame and queue any new orders locally.
    ///
    /// Called once per game frame with a read-only world, after command
    /// exchange when `is_nfw` is true.
    fn run_gf(&mut self, world: &GameWorld, gf: GameFrame, is_nfw: bool);

    /// Drain the locally queued orders, oldest first.
    fn fetch_game_commands(&mut self) -> Vec<GameCommand>;
}

/// Construct the adapter described by `info` for the given slot.
#[must_use]
pub fn create_ai(info: &AiInfo, player_id: PlayerId, world: &GameWorld) -> Box<dyn AiPlayer> {
    match info.ai_type {
        AiType::Default => Box::new(DefaultAi::new(player_id, info.level, world)),
        AiType::Dummy => Box::new(DummyAi::new(player_id)),
    }
}

/// Tuning knobs per difficulty level.
struct LevelProfile {
    /// Frames between attack waves.
    attack_interval: GameFrame,
    /// Minimum standing army before attacking.
    min_army: u32,
    /// Fraction of the army committed per attack, as a percentage.
    commit_percent: u32,
    /// Gold kept in reserve before spending on buildings.
    gold_reserve: u32,
}

const fn profile(level: AiLevel) -> LevelProfile {
    match level {
        AiLevel::Easy => LevelProfile {
            attack_interval: 400,
            min_army: 30,
            commit_percent: 30,
            gold_reserve: 40,
        },
        AiLevel::Medium => LevelProfile {
            attack_interval: 200,
            min_army: 20,
            commit_percent: 50,
            gold_reserve: 20,
        },
        AiLevel::Hard => LevelProfile {
            attack_interval: 100,
            min_army: 12,
            commit_percent: 70,
            gold_reserve: 0,
        },
    }
}

/// Heuristic planner: grows the economy, keeps an army paid, and attacks
/// the weakest enemy on a per-level cadence.
///
/// All randomness comes from a PRNG seeded from the world seed and the
/// slot id, so the adapter's decisions are a pure function of the game
/// setup and the observed world.
pub struct DefaultAi {
    player_id: PlayerId,
    level: AiLevel,
    rng: ChaCha8Rng,
    queue: Vec<GameCommand>,
    next_attack_gf: GameFrame,
}

impl DefaultAi {
    /// Create a planner for the given slot.
    #[must_use]
    pub fn new(player_id: PlayerId, level: AiLevel, world: &GameWorld) -> Self {
        let seed = world.seed() ^ (player_id as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            player_id,
            level,
            rng: ChaCha8Rng::seed_from_u64(seed),
            queue: Vec::new(),
            next_attack_gf: profile(level).attack_interval,
        }
    }

    fn plan(&mut self, world: &GameWorld, gf: GameFrame) {
        let Ok(me) = world.player(self.player_id) else {
            return;
        };
        if me.is_defeated() {
            return;
        }
        let prof = profile(self.level);
        let mut gold = me.statistic_current(StatisticType::Gold);

        // Build order: food first, then a barracks, then gold production.
        let next_building = if me.building_count(BuildingKind::Farm) < 2 {
            Some(BuildingKind::Farm)
        } else if me.building_count(BuildingKind::Barracks) < 1 {
            Some(BuildingKind::Barracks)
        } else if me.building_count(BuildingKind::GoldMine) < 2 {
            Some(BuildingKind::GoldMine)
        } else {
            Some(BuildingKind::Mint)
        };
        if let Some(kind) = next_building {
            if gold >= kind.cost() + prof.gold_reserve {
                gold -= kind.cost();
                self.queue.push(GameCommand::Construct(kind));
            }
        }

        // Keep the army growing once a barracks exists.
        if me.building_count(BuildingKind::Barracks) > 0 {
            let affordable = gold / hamlet_core::commands::RECRUIT_COST_PER_SOLDIER;
            if affordable > 0 {
                let count = self.rng.gen_range(1..=affordable.min(5));
                gold -= count * hamlet_core::commands::RECRUIT_COST_PER_SOLDIER;
                self.queue.push(GameCommand::RecruitSoldiers { count });
            }
        }

        // Spend leftovers on territory.
        if gold >= hamlet_core::commands::EXPANSION_COST_PER_AREA * 2 {
            self.queue.push(GameCommand::ExpandTerritory { area: 1 });
        }

        // Attack the weakest active enemy on the level's cadence.
        let military = me.statistic_current(StatisticType::Military);
        if gf >= self.next_attack_gf && military >= prof.min_army {
            if let Some(target) = self.weakest_enemy(world) {
                let strength = military * prof.commit_percent / 100;
                if strength > 0 {
                    trace!(
                        player = self.player_id,
                        gf,
                        target,
                        strength,
                        "attack wave queued"
                    );
                    self.queue.push(GameCommand::Attack { target, strength });
                }
            }
            self.next_attack_gf = gf + prof.attack_interval;
        }
    }

    /// Lowest-military active enemy; ties break toward the lowest slot id
    /// so target choice is deterministic.
    fn weakest_enemy(&self, world: &GameWorld) -> Option<PlayerId> {
        world
            .players()
            .iter()
            .enumerate()
            .filter(|(id, p)| *id != self.player_id && !p.is_defeated())
            .min_by_key(|(id, p)| (p.statistic_current(StatisticType::Military), *id))
            .map(|(id, _)| id)
    }
}

impl AiPlayer for DefaultAi {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn run_gf(&mut self, world: &GameWorld, gf: GameFrame, is_nfw: bool) {
        // Planning once per exchange window is plenty at this horizon.
        if is_nfw {
            self.plan(world, gf);
        }
    }

    fn fetch_game_commands(&mut self) -> Vec<GameCommand> {
        std::mem::take(&mut self.queue)
    }
}

/// An adapter that observes and does nothing. Stands in for absent or
/// spectating players; by contract it never emits a command.
pub struct DummyAi {
    player_id: PlayerId,
}

impl DummyAi {
    /// Create a no-op adapter for the given slot.
    #[must_use]
    pub const fn new(player_id: PlayerId) -> Self {
        Self { player_id }
    }
}

impl AiPlayer for DummyAi {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn run_gf(&mut self, _world: &GameWorld, _gf: GameFrame, _is_nfw: bool) {}

    fn fetch_game_commands(&mut self) -> Vec<GameCommand> {
        Vec::new()
    }
}
