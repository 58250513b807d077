//! Test fixtures and helpers.
//!
//! Pre-built maps and worlds for consistent testing across crates.

use std::collections::BTreeMap;
use std::path::PathBuf;

use hamlet_core::map::{MapFile, MapInfo, StartingPosition};
use hamlet_core::player::{AiInfo, AiLevel, BuildingKind};
use hamlet_core::settings::GlobalGameSettings;
use hamlet_core::world::GameWorld;

/// A symmetric two-player map with a working economy on both sides.
#[must_use]
pub fn duel_map() -> MapFile {
    let mut buildings = BTreeMap::new();
    buildings.insert(BuildingKind::Farm, 2);
    buildings.insert(BuildingKind::GoldMine, 1);
    MapFile {
        name: "Duel".into(),
        width: 64,
        height: 64,
        starting_positions: vec![
            StartingPosition {
                country: 40,
                military: 10,
                gold: 100,
                buildings: buildings.clone(),
            },
            StartingPosition {
                country: 40,
                military: 10,
                gold: 100,
                buildings,
            },
        ],
    }
}

/// A two-player map where slot 0 starts broke with only soldiers.
///
/// With no gold and no income the soldiers desert one per frame, so slot 0
/// is defeated after exactly `military` frames while slot 1 keeps playing.
/// Useful for testing early-finish handling at a known frame.
#[must_use]
pub fn decay_map(military: u32) -> MapFile {
    MapFile {
        name: "Decay".into(),
        width: 32,
        height: 32,
        starting_positions: vec![
            StartingPosition {
                country: 0,
                military,
                gold: 0,
                buildings: BTreeMap::new(),
            },
            StartingPosition {
                country: 40,
                military: 10,
                gold: 1_000,
                buildings: BTreeMap::new(),
            },
        ],
    }
}

/// Serialize a map and build a world on it directly, without touching disk.
///
/// # Panics
///
/// Panics if the map cannot be serialized; fixtures fail loudly.
#[must_use]
pub fn world_on(map: &MapFile, ais: &[AiInfo], seed: u64) -> GameWorld {
    let data = ron::to_string(map)
        .expect("fixture map serializes")
        .into_bytes();
    let info = MapInfo::new(map.name.clone(), data);
    GameWorld::new(map, info, ais, GlobalGameSettings::default(), seed)
}

/// A two-player world on [`duel_map`] with medium default AIs.
#[must_use]
pub fn duel_world(seed: u64) -> GameWorld {
    world_on(
        &duel_map(),
        &[
            AiInfo::default_ai(AiLevel::Medium),
            AiInfo::default_ai(AiLevel::Medium),
        ],
        seed,
    )
}

/// Write a map as a RON file into the given directory and return its path.
///
/// # Panics
///
/// Panics if the map cannot be serialized or written; fixtures fail loudly.
#[must_use]
pub fn write_map(dir: &std::path::Path, map: &MapFile) -> PathBuf {
    let path = dir.join(format!("{}.ron", map.name.to_lowercase()));
    let text = ron::ser::to_string_pretty(map, ron::ser::PrettyConfig::default())
        .expect("fixture map serializes");
    std::fs::write(&path, text).expect("fixture map written");
    path
}
