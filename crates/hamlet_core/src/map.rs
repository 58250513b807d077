//! Map files and world construction.
//!
//! Maps are RON files describing the terrain dimensions and per-slot
//! starting economies. The raw file bytes are embedded into replay headers
//! so a replay is self-contained.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::{AiInfo, BuildingKind};
use crate::settings::GlobalGameSettings;
use crate::world::GameWorld;

/// Starting economy for one player slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingPosition {
    /// Initial territory size.
    pub country: u32,
    /// Initial military strength.
    pub military: u32,
    /// Initial gold reserve.
    pub gold: u32,
    /// Initial buildings, by kind.
    #[serde(default)]
    pub buildings: BTreeMap<BuildingKind, u32>,
}

/// Parsed map file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFile {
    /// Map display name.
    pub name: String,
    /// Terrain width.
    pub width: u32,
    /// Terrain height.
    pub height: u32,
    /// One starting position per player slot. A game may use fewer slots
    /// than the map provides, never more.
    pub starting_positions: Vec<StartingPosition>,
}

impl MapFile {
    /// Parse a map from RON text.
    pub fn parse(text: &str) -> std::result::Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}

/// Map identity embedded into replay and savegame headers.
///
/// Carries the raw file bytes so playback never depends on the original
/// file still existing on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
    /// Map display name.
    pub name: String,
    /// Raw RON bytes of the map file.
    pub data: Vec<u8>,
    /// Hash of `data`, checked on playback.
    pub checksum: u64,
}

impl MapInfo {
    /// Build the header record for raw map bytes.
    #[must_use]
    pub fn new(name: String, data: Vec<u8>) -> Self {
        let checksum = Self::hash_data(&data);
        Self {
            name,
            data,
            checksum,
        }
    }

    /// Hash raw map bytes the way the header records them.
    #[must_use]
    pub fn hash_data(data: &[u8]) -> u64 {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        hasher.finish()
    }

    /// Whether the embedded checksum still matches the embedded data.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        Self::hash_data(&self.data) == self.checksum
    }
}

/// Loads map files and constructs worlds from them.
pub struct MapLoader;

impl MapLoader {
    /// Load a map file and construct the starting world.
    ///
    /// One AI descriptor per participating slot; the map must provide at
    /// least that many starting positions. Any failure here is fatal to
    /// game construction.
    pub fn load(
        path: &Path,
        ais: &[AiInfo],
        settings: GlobalGameSettings,
        seed: u64,
    ) -> Result<GameWorld> {
        let data = std::fs::read(path).map_err(|source| GameError::MapLoad {
            path: path.display().to_string(),
            source,
        })?;
        let text = std::str::from_utf8(&data).map_err(|err| GameError::MapParse {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let map = MapFile::parse(text).map_err(|err| GameError::MapParse {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        if map.starting_positions.len() < ais.len() {
            return Err(GameError::MapParse {
                path: path.display().to_string(),
                message: format!(
                    "map provides {} starting positions but {} players requested",
                    map.starting_positions.len(),
                    ais.len()
                ),
            });
        }
        let info = MapInfo::new(map.name.clone(), data);
        Ok(GameWorld::new(&map, info, ais, settings, seed))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::player::AiLevel;

    const MAP_RON: &str = r#"MapFile(
    name: "Two Hamlets",
    width: 64,
    height: 64,
    starting_positions: [
        StartingPosition(country: 40, military: 10, gold: 60, buildings: {Farm: 1}),
        StartingPosition(country: 40, military: 10, gold: 60, buildings: {Farm: 1}),
    ],
)"#;

    #[test]
    fn test_parse_map_file() {
        let map = MapFile::parse(MAP_RON).unwrap();
        assert_eq!(map.name, "Two Hamlets");
        assert_eq!(map.starting_positions.len(), 2);
        assert_eq!(
            map.starting_positions[0]
                .buildings
                .get(&BuildingKind::Farm),
            Some(&1)
        );
    }

    #[test]
    fn test_load_missing_map_is_fatal() {
        let err = MapLoader::load(
            Path::new("/nonexistent/map.ron"),
            &[AiInfo::dummy()],
            GlobalGameSettings::default(),
            7,
        )
        .unwrap_err();
        assert!(matches!(err, GameError::MapLoad { .. }));
    }

    #[test]
    fn test_load_rejects_too_few_slots() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MAP_RON.as_bytes()).unwrap();
        let ais = [
            AiInfo::default_ai(AiLevel::Medium),
            AiInfo::default_ai(AiLevel::Medium),
            AiInfo::dummy(),
        ];
        let err = MapLoader::load(file.path(), &ais, GlobalGameSettings::default(), 7).unwrap_err();
        assert!(matches!(err, GameError::MapParse { .. }));
    }

    #[test]
    fn test_load_builds_world_from_starting_positions() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MAP_RON.as_bytes()).unwrap();
        let ais = [AiInfo::default_ai(AiLevel::Medium), AiInfo::dummy()];
        let world = MapLoader::load(file.path(), &ais, GlobalGameSettings::default(), 7).unwrap();
        assert_eq!(world.num_players(), 2);
        assert!(world.map_info().is_consistent());
        let p0 = world.player(0).unwrap();
        assert_eq!(
            p0.statistic_current(crate::player::StatisticType::Gold),
            60
        );
        assert_eq!(p0.building_count(BuildingKind::Farm), 1);
    }

    #[test]
    fn test_map_info_checksum_detects_tampering() {
        let mut info = MapInfo::new("m".into(), MAP_RON.as_bytes().to_vec());
        assert!(info.is_consistent());
        info.data[0] ^= 0xff;
        assert!(!info.is_consistent());
    }
}
