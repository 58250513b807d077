//! Replay recording, reading and verification.
//!
//! A replay file is, in order: a bincode header (map identity with embedded
//! map bytes, RNG seed, global settings, player roster), a fixed four-byte
//! little-endian slot holding the last recorded game frame, and an
//! append-only stream of command entries. The trailer slot sits at a fixed
//! offset so it can be rewritten in place whenever the game advances,
//! leaving the true end frame behind even when a run finishes early or is
//! torn down abnormally.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::checksum::AsyncChecksum;
use crate::commands::PlayerGameCommands;
use crate::error::{GameError, Result};
use crate::event_manager::GameFrame;
use crate::map::{MapFile, MapInfo};
use crate::player::{PlayerId, PlayerInfo};
use crate::settings::GlobalGameSettings;
use crate::world::GameWorld;

/// Everything needed to reconstruct the starting world of a recorded game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayHeader {
    /// Map identity, with the raw map bytes embedded.
    pub map_info: MapInfo,
    /// RNG seed the game was started with.
    pub seed: u64,
    /// Global settings the game was started with.
    pub settings: GlobalGameSettings,
    /// Player roster in slot order.
    pub players: Vec<PlayerInfo>,
}

impl ReplayHeader {
    /// Capture the header from a freshly constructed world.
    #[must_use]
    pub fn from_world(world: &GameWorld) -> Self {
        Self {
            map_info: world.map_info().clone(),
            seed: world.seed(),
            settings: *world.settings(),
            players: world.player_infos(),
        }
    }
}

/// One recorded command bundle: which player queued what at which frame,
/// with the sender's world checksum at that frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayEntry {
    /// Network frame the bundle was queued at.
    pub gf: GameFrame,
    /// Issuing player.
    pub player: PlayerId,
    /// Checksum plus commands.
    pub bundle: PlayerGameCommands,
}

enum RecorderState {
    Idle,
    Recording {
        writer: BufWriter<File>,
        last_gf_offset: u64,
    },
    Closed,
}

/// Writes a replay file while a game runs.
///
/// State machine: `Idle -> Recording -> Closed`. Recording is optional; all
/// write operations are guarded no-ops outside the `Recording` state, so a
/// driver that never started recording can share the same code path.
pub struct ReplayRecorder {
    state: RecorderState,
}

impl ReplayRecorder {
    /// A recorder that is not yet recording.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: RecorderState::Idle,
        }
    }

    /// Whether the recorder currently accepts entries.
    #[must_use]
    pub const fn is_recording(&self) -> bool {
        matches!(self.state, RecorderState::Recording { .. })
    }

    /// Create the replay file and write its header and trailer slot.
    ///
    /// Fails if the file cannot be created or the recorder already left the
    /// `Idle` state. On failure the recorder stays usable for an unrecorded
    /// run.
    pub fn start_recording(&mut self, path: &Path, header: &ReplayHeader) -> Result<()> {
        if !matches!(self.state, RecorderState::Idle) {
            return Err(GameError::InvalidState(
                "replay recorder already started".into(),
            ));
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, header)
            .map_err(|err| GameError::Serialization(err.to_string()))?;
        let last_gf_offset = writer.stream_position()?;
        writer.write_all(&0u32.to_le_bytes())?;
        writer.flush()?;
        debug!(path = %path.display(), "replay recording started");
        self.state = RecorderState::Recording {
            writer,
            last_gf_offset,
        };
        Ok(())
    }

    /// Append one player's command bundle for the given frame.
    ///
    /// Calling this while not recording is a logic error in the driver; it
    /// is asserted in debug builds and silently dropped in release builds.
    pub fn add_game_command(
        &mut self,
        gf: GameFrame,
        player: PlayerId,
        bundle: &PlayerGameCommands,
    ) -> Result<()> {
        let RecorderState::Recording { writer, .. } = &mut self.state else {
            debug_assert!(false, "add_game_command while not recording");
            return Ok(());
        };
        let entry = ReplayEntry {
            gf,
            player,
            bundle: bundle.clone(),
        };
        bincode::serialize_into(writer, &entry)
            .map_err(|err| GameError::Serialization(err.to_string()))
    }

    /// Rewrite the trailer slot with the latest game frame.
    ///
    /// Seeks back to the fixed slot, overwrites it and returns to the end
    /// of the stream so appends continue unaffected. No-op when not
    /// recording.
    pub fn update_last_gf(&mut self, gf: GameFrame) -> Result<()> {
        let RecorderState::Recording {
            writer,
            last_gf_offset,
        } = &mut self.state
        else {
            return Ok(());
        };
        let offset = *last_gf_offset;
        writer.seek(SeekFrom::Start(offset))?;
        writer.write_all(&gf.to_le_bytes())?;
        writer.seek(SeekFrom::End(0))?;
        Ok(())
    }

    /// Write the final trailer value, then flush and close the file.
    pub fn stop_recording(&mut self, final_gf: GameFrame) -> Result<()> {
        self.update_last_gf(final_gf)?;
        self.close();
        Ok(())
    }

    /// Stop recording and flush the file. Idempotent: closing an idle or
    /// already-closed recorder does nothing, so it is safe to call again
    /// during teardown.
    pub fn close(&mut self) {
        if let RecorderState::Recording { writer, .. } = &mut self.state {
            if let Err(err) = writer.flush() {
                warn!(%err, "failed to flush replay file on close");
            }
        }
        self.state = RecorderState::Closed;
    }
}

impl Default for ReplayRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReplayRecorder {
    fn drop(&mut self) {
        self.close();
    }
}

/// A fully read replay file.
#[derive(Debug, Clone, PartialEq)]
pub struct Replay {
    /// Starting-world header.
    pub header: ReplayHeader,
    /// Last game frame the recorded run reached.
    pub last_gf: GameFrame,
    /// Command log in recorded order.
    pub entries: Vec<ReplayEntry>,
}

impl Replay {
    /// Read a complete replay file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let header: ReplayHeader = bincode::deserialize_from(&mut reader)
            .map_err(|err| GameError::Serialization(err.to_string()))?;
        let mut slot = [0u8; 4];
        reader.read_exact(&mut slot)?;
        let last_gf = GameFrame::from_le_bytes(slot);
        let mut entries = Vec::new();
        loop {
            match bincode::deserialize_from::<_, ReplayEntry>(&mut reader) {
                Ok(entry) => entries.push(entry),
                Err(err) => match *err {
                    bincode::ErrorKind::Io(ref io)
                        if io.kind() == std::io::ErrorKind::UnexpectedEof =>
                    {
                        break;
                    }
                    _ => return Err(GameError::Serialization(err.to_string())),
                },
            }
        }
        Ok(Self {
            header,
            last_gf,
            entries,
        })
    }
}

/// Result of re-simulating a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Every recorded checksum matched the re-simulated world.
    Consistent {
        /// Frame the re-simulation finished at.
        last_gf: GameFrame,
        /// Number of recorded bundles checked.
        entries_checked: usize,
    },
    /// A recorded checksum diverged from the re-simulated world.
    Mismatch {
        /// Frame of the first divergence.
        gf: GameFrame,
        /// Player whose bundle carried the diverging checksum.
        player: PlayerId,
        /// Checksum stored in the replay.
        recorded: AsyncChecksum,
        /// Checksum of the re-simulated world.
        computed: AsyncChecksum,
    },
}

/// Re-simulates a replay from its header and checks every recorded
/// checksum against the rebuilt world.
pub struct ReplayVerifier;

impl ReplayVerifier {
    /// Verify a replay file end to end.
    pub fn verify(path: &Path) -> Result<VerifyOutcome> {
        let replay = Replay::open(path)?;
        Self::verify_replay(&replay)
    }

    /// Verify an already-read replay.
    pub fn verify_replay(replay: &Replay) -> Result<VerifyOutcome> {
        if !replay.header.map_info.is_consistent() {
            return Err(GameError::InvalidState(
                "replay map data does not match its checksum".into(),
            ));
        }
        let text = std::str::from_utf8(&replay.header.map_info.data)
            .map_err(|err| GameError::Serialization(err.to_string()))?;
        let map = MapFile::parse(text).map_err(|err| GameError::MapParse {
            path: replay.header.map_info.name.clone(),
            message: err.to_string(),
        })?;
        let ais: Vec<_> = replay.header.players.iter().map(|p| p.ai_info).collect();
        let mut world = GameWorld::new(
            &map,
            replay.header.map_info.clone(),
            &ais,
            replay.header.settings,
            replay.header.seed,
        );

        let mut entries = replay.entries.iter().peekable();
        let mut entries_checked = 0usize;
        while world.current_gf() < replay.last_gf {
            let gf = world.current_gf();
            let computed = AsyncChecksum::create(&world);
            while entries.peek().is_some_and(|e| e.gf == gf) {
                let Some(entry) = entries.next() else { break };
                if entry.bundle.checksum != computed {
                    return Ok(VerifyOutcome::Mismatch {
                        gf,
                        player: entry.player,
                        recorded: entry.bundle.checksum,
                        computed,
                    });
                }
                world.add_game_command(entry.player, entry.bundle.commands.clone())?;
                entries_checked += 1;
            }
            if entries.peek().is_some_and(|e| e.gf < gf) {
                return Err(GameError::InvalidState(format!(
                    "replay entry out of order at GF {gf}"
                )));
            }
            world.run_gf();
        }
        Ok(VerifyOutcome::Consistent {
            last_gf: world.current_gf(),
            entries_checked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::GameCommand;
    use crate::map::StartingPosition;
    use crate::player::{AiInfo, AiLevel};

    fn test_map() -> MapFile {
        MapFile {
            name: "replay-test".into(),
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
        }
    }

    fn test_world(seed: u64) -> GameWorld {
        let map = test_map();
        let data = ron::to_string(&map).unwrap().into_bytes();
        let info = MapInfo::new(map.name.clone(), data);
        let ais = [
            AiInfo::default_ai(AiLevel::Medium),
            AiInfo::default_ai(AiLevel::Medium),
        ];
        GameWorld::new(&map, info, &ais, GlobalGameSettings::default(), seed)
    }

    #[test]
    fn test_recorder_state_machine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.rpl");
        let world = test_world(3);
        let header = ReplayHeader::from_world(&world);

        let mut recorder = ReplayRecorder::new();
        assert!(!recorder.is_recording());
        recorder.start_recording(&path, &header).unwrap();
        assert!(recorder.is_recording());

        // A second start is rejected.
        assert!(recorder.start_recording(&path, &header).is_err());

        recorder.close();
        assert!(!recorder.is_recording());
        // Idempotent.
        recorder.close();
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_close_without_start_is_safe() {
        let mut recorder = ReplayRecorder::new();
        recorder.close();
        recorder.close();
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_trailer_holds_latest_gf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.rpl");
        let world = test_world(3);
        let header = ReplayHeader::from_world(&world);

        let mut recorder = ReplayRecorder::new();
        recorder.start_recording(&path, &header).unwrap();
        recorder.update_last_gf(20).unwrap();
        recorder.stop_recording(137).unwrap();

        let replay = Replay::open(&path).unwrap();
        assert_eq!(replay.last_gf, 137);
        assert_eq!(replay.header, header);
        assert!(replay.entries.is_empty());
    }

    #[test]
    fn test_entries_survive_trailer_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.rpl");
        let mut world = test_world(9);
        let header = ReplayHeader::from_world(&world);

        let mut recorder = ReplayRecorder::new();
        recorder.start_recording(&path, &header).unwrap();

        let checksum = AsyncChecksum::create(&world);
        let bundle =
            PlayerGameCommands::new(checksum, vec![GameCommand::ExpandTerritory { area: 2 }]);
        recorder.add_game_command(0, 0, &bundle).unwrap();
        recorder.update_last_gf(1).unwrap();
        world.add_game_command(0, bundle.commands.clone()).unwrap();
        world.run_gf();

        let checksum = AsyncChecksum::create(&world);
        let bundle = PlayerGameCommands::empty(checksum);
        recorder.add_game_command(20, 1, &bundle).unwrap();
        recorder.update_last_gf(21).unwrap();
        recorder.close();

        let replay = Replay::open(&path).unwrap();
        assert_eq!(replay.last_gf, 21);
        assert_eq!(replay.entries.len(), 2);
        assert_eq!(replay.entries[0].gf, 0);
        assert_eq!(replay.entries[0].player, 0);
        assert_eq!(replay.entries[1].gf, 20);
        assert_eq!(replay.entries[1].player, 1);
    }

    #[test]
    fn test_verify_detects_tampered_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.rpl");
        let mut world = test_world(5);
        let header = ReplayHeader::from_world(&world);

        let mut recorder = ReplayRecorder::new();
        recorder.start_recording(&path, &header).unwrap();
        let bad = PlayerGameCommands::new(
            AsyncChecksum::from_raw(0xbad),
            vec![GameCommand::ExpandTerritory { area: 1 }],
        );
        recorder.add_game_command(0, 0, &bad).unwrap();
        world.add_game_command(0, bad.commands.clone()).unwrap();
        world.run_gf();
        recorder.update_last_gf(world.current_gf()).unwrap();
        recorder.close();

        match ReplayVerifier::verify(&path).unwrap() {
            VerifyOutcome::Mismatch {
                gf,
                player,
                recorded,
                ..
            } => {
                assert_eq!(gf, 0);
                assert_eq!(player, 0);
                assert_eq!(recorded, AsyncChecksum::from_raw(0xbad));
            }
            VerifyOutcome::Consistent { .. } => panic!("tampered replay verified clean"),
        }
    }

    #[test]
    fn test_verify_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.rpl");
        let mut world = test_world(11);
        let header = ReplayHeader::from_world(&world);

        let mut recorder = ReplayRecorder::new();
        recorder.start_recording(&path, &header).unwrap();
        for _ in 0..45u32 {
            let gf = world.current_gf();
            if crate::event_manager::is_network_frame(gf) {
                let checksum = AsyncChecksum::create(&world);
                let bundle = PlayerGameCommands::new(
                    checksum,
                    vec![GameCommand::ExpandTerritory { area: 1 }],
                );
                recorder.add_game_command(gf, 0, &bundle).unwrap();
                world.add_game_command(0, bundle.commands.clone()).unwrap();
                let bundle = PlayerGameCommands::empty(checksum);
                recorder.add_game_command(gf, 1, &bundle).unwrap();
                world.add_game_command(1, bundle.commands.clone()).unwrap();
            }
            world.run_gf();
            recorder.update_last_gf(world.current_gf()).unwrap();
        }
        recorder.close();

        match ReplayVerifier::verify(&path).unwrap() {
            VerifyOutcome::Consistent {
                last_gf,
                entries_checked,
            } => {
                assert_eq!(last_gf, 45);
                assert_eq!(entries_checked, 6);
            }
            VerifyOutcome::Mismatch { gf, .. } => panic!("round trip diverged at GF {gf}"),
        }
    }
}
