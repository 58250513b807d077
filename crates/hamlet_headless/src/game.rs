//! The headless game loop driver.
//!
//! Owns the world, the AI adapters and an optional replay recorder, and
//! runs the same lockstep pipeline a networked client would: fetch command
//! bundles at every network-frame boundary, log them, queue them in
//! canonical order, let every adapter observe the frame, then tick the
//! world once.

use std::path::Path;
use std::time::{Duration, Instant};

use hamlet_core::checksum::AsyncChecksum;
use hamlet_core::commands::PlayerGameCommands;
use hamlet_core::error::Result;
use hamlet_core::event_manager::{GameFrame, is_network_frame};
use hamlet_core::map::MapLoader;
use hamlet_core::player::AiInfo;
use hamlet_core::replay::{ReplayHeader, ReplayRecorder};
use hamlet_core::savegame::Savegame;
use hamlet_core::settings::GlobalGameSettings;
use hamlet_core::world::GameWorld;
use tracing::{debug, info, warn};

use crate::ai::{AiPlayer, create_ai};
use crate::report::StatusReport;

/// How often the live status table is refreshed.
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// A complete AI-vs-AI game without rendering or sockets.
pub struct HeadlessGame {
    world: GameWorld,
    ais: Vec<Box<dyn AiPlayer>>,
    recorder: ReplayRecorder,
}

impl std::fmt::Debug for HeadlessGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessGame")
            .field("ais", &self.ais.len())
            .finish_non_exhaustive()
    }
}

impl HeadlessGame {
    /// Load the map and seat one AI adapter per descriptor.
    ///
    /// Map load or parse failure is fatal: no game object exists on error.
    pub fn new(
        settings: GlobalGameSettings,
        map_path: &Path,
        ais: &[AiInfo],
        seed: u64,
    ) -> Result<Self> {
        let world = MapLoader::load(map_path, ais, settings, seed)?;
        let ais = ais
            .iter()
            .enumerate()
            .map(|(id, info)| create_ai(info, id, &world))
            .collect();
        info!(
            map = %map_path.display(),
            players = world.num_players(),
            seed,
            "headless game ready"
        );
        Ok(Self {
            world,
            ais,
            recorder: ReplayRecorder::new(),
        })
    }

    /// The world being simulated.
    #[must_use]
    pub const fn world(&self) -> &GameWorld {
        &self.world
    }

    /// Start recording a replay of this run.
    ///
    /// An existing file at `path` is deleted first. On failure the game
    /// stays runnable, just unrecorded.
    pub fn start_replay(&mut self, path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        let header = ReplayHeader::from_world(&self.world);
        self.recorder.start_recording(path, &header)
    }

    /// Run the lockstep loop until `max_gf` frames have passed or the game
    /// is decided, whichever comes first. Returns the frame the loop
    /// stopped at.
    ///
    /// Prints a live status table to stdout roughly once a second; logs go
    /// to stderr.
    pub fn run(&mut self, max_gf: GameFrame) -> Result<GameFrame> {
        let start = Instant::now();
        let mut report = StatusReport::new();
        let mut stdout = std::io::stdout();
        let mut next_report = Instant::now();

        while self.world.current_gf() < max_gf && !self.world.is_finished() {
            let gf = self.world.current_gf();
            if is_network_frame(gf) {
                self.exchange_commands(gf)?;
            }
            for ai in &mut self.ais {
                ai.run_gf(&self.world, gf, is_network_frame(gf));
            }
            self.world.run_gf();
            self.recorder.update_last_gf(self.world.current_gf())?;

            if next_report <= Instant::now() {
                report.print(&self.world, start.elapsed(), &mut stdout)?;
                next_report = Instant::now() + REPORT_INTERVAL;
            }
        }

        report.print(&self.world, start.elapsed(), &mut stdout)?;
        let final_gf = self.world.current_gf();
        info!(
            gf = final_gf,
            finished = self.world.is_finished(),
            wall = ?start.elapsed(),
            "run stopped"
        );
        Ok(final_gf)
    }

    /// Collect every adapter's queued bundle, log it when recording, and
    /// queue it on the world. Canonical order: slot id ascending, each
    /// adapter's own queue order within a slot.
    fn exchange_commands(&mut self, gf: GameFrame) -> Result<()> {
        let checksum = self
            .recorder
            .is_recording()
            .then(|| AsyncChecksum::create(&self.world));
        for ai in &mut self.ais {
            let commands = ai.fetch_game_commands();
            if let Some(checksum) = checksum {
                let bundle = PlayerGameCommands::new(checksum, commands.clone());
                self.recorder.add_game_command(gf, ai.player_id(), &bundle)?;
            }
            if !commands.is_empty() {
                debug!(gf, player = ai.player_id(), count = commands.len(), "commands queued");
            }
            self.world.add_game_command(ai.player_id(), commands)?;
        }
        Ok(())
    }

    /// Snapshot the current world to a savegame file.
    pub fn save_game(&self, path: &Path) -> Result<()> {
        Savegame::from_world(&self.world).save(path)
    }

    /// Finalize the replay file, if any. Idempotent and called again from
    /// `Drop`, so abnormal teardown still leaves a closed file behind.
    pub fn close(&mut self) {
        if self.recorder.is_recording() {
            if let Err(err) = self.recorder.stop_recording(self.world.current_gf()) {
                warn!(%err, "failed to finalize replay");
            }
        } else {
            self.recorder.close();
        }
    }
}

impl Drop for HeadlessGame {
    fn drop(&mut self) {
        self.close();
    }
}
