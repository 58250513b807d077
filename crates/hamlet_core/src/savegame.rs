//! Savegames: single-frame snapshots of a running game.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{GameError, Result};
use crate::event_manager::GameFrame;
use crate::settings::Exploration;
use crate::world::GameWorld;

/// A complete snapshot of the world at one game frame, written with
/// bincode.
///
/// The saved copy always carries [`Exploration::Disabled`]: a game resumed
/// from a snapshot starts with the whole map visible regardless of the mode
/// the original game ran with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Savegame {
    /// Frame the snapshot was taken at.
    pub gf: GameFrame,
    /// The snapshotted world.
    pub world: GameWorld,
}

impl Savegame {
    /// Snapshot the given world.
    #[must_use]
    pub fn from_world(world: &GameWorld) -> Self {
        let mut world = world.clone();
        world.settings_mut().exploration = Exploration::Disabled;
        Self {
            gf: world.current_gf(),
            world,
        }
    }

    /// Write the snapshot to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, self)
            .map_err(|err| GameError::Serialization(err.to_string()))?;
        info!(path = %path.display(), gf = self.gf, "savegame written");
        Ok(())
    }

    /// Read a snapshot from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        bincode::deserialize_from(reader).map_err(|err| GameError::Serialization(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{MapFile, MapInfo, StartingPosition};
    use crate::player::{AiInfo, AiLevel};
    use crate::settings::GlobalGameSettings;

    fn test_world() -> GameWorld {
        let map = MapFile {
            name: "save-test".into(),
            width: 16,
            height: 16,
            starting_positions: vec![
                StartingPosition {
                    country: 40,
                    military: 10,
                    gold: 100,
                    buildings: std::collections::BTreeMap::new(),
                },
                StartingPosition {
                    country: 40,
                    military: 10,
                    gold: 100,
                    buildings: std::collections::BTreeMap::new(),
                },
            ],
        };
        let info = MapInfo::new(map.name.clone(), Vec::new());
        let ais = [AiInfo::default_ai(AiLevel::Easy), AiInfo::dummy()];
        GameWorld::new(&map, info, &ais, GlobalGameSettings::default(), 21)
    }

    #[test]
    fn test_round_trip_preserves_state_hash() {
        let mut world = test_world();
        for _ in 0..30 {
            world.run_gf();
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.sav");
        Savegame::from_world(&world).save(&path).unwrap();

        let loaded = Savegame::load(&path).unwrap();
        assert_eq!(loaded.gf, 30);
        assert_eq!(loaded.world.state_hash(), world.state_hash());
    }

    #[test]
    fn test_snapshot_disables_exploration() {
        let world = test_world();
        assert_eq!(world.settings().exploration, Exploration::Classic);
        let save = Savegame::from_world(&world);
        assert_eq!(save.world.settings().exploration, Exploration::Disabled);
    }
}
