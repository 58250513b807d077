//! Headless AI battle runner.
//!
//! Runs AI-vs-AI games of the deterministic simulation without graphics,
//! records replays, and verifies recorded replays by re-simulation.
//!
//! # Usage
//!
//! ```bash
//! # Two medium AIs on a map, one hour of game time max
//! cargo run -p hamlet_headless -- run --map maps/duel.ron --ai default --ai default
//!
//! # Record a replay and save the final state
//! cargo run -p hamlet_headless -- run --map maps/duel.ron \
//!     --ai default:hard --ai dummy --replay battle.rpl --save battle.sav
//!
//! # Whole battle described in a RON file
//! cargo run -p hamlet_headless -- run --config battles/regression.ron
//!
//! # Re-simulate a replay and check every recorded checksum
//! cargo run -p hamlet_headless -- verify --replay battle.rpl
//! ```
//!
//! The live status table is printed to stdout; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hamlet_core::event_manager::GameFrame;
use hamlet_core::player::AiInfo;
use hamlet_core::replay::{ReplayVerifier, VerifyOutcome};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hamlet_headless::{BattleConfig, HeadlessGame, config};

#[derive(Parser)]
#[command(name = "hamlet_headless")]
#[command(about = "Headless AI battle runner and replay verifier")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless AI battle
    Run {
        /// Battle config file (RON); other flags override its fields
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Map file to load
        #[arg(short, long)]
        map: Option<PathBuf>,

        /// AI for each player slot: default[:easy|medium|hard] or dummy
        #[arg(long = "ai", value_parser = config::parse_ai_spec)]
        ais: Vec<AiInfo>,

        /// Stop after this many game frames even if undecided
        #[arg(long)]
        max_gf: Option<GameFrame>,

        /// Record a replay to this path (existing file is replaced)
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Write a savegame of the final state to this path
        #[arg(long)]
        save: Option<PathBuf>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Re-simulate a replay and check every recorded checksum
    Verify {
        /// Replay file to verify
        #[arg(short, long)]
        replay: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs to stderr; stdout belongs to the status table.
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            config,
            map,
            ais,
            max_gf,
            replay,
            save,
            seed,
        } => cmd_run(config, map, ais, max_gf, replay, save, seed),
        Commands::Verify { replay } => cmd_verify(&replay),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    config: Option<PathBuf>,
    map: Option<PathBuf>,
    ais: Vec<AiInfo>,
    max_gf: Option<GameFrame>,
    replay: Option<PathBuf>,
    save: Option<PathBuf>,
    seed: Option<u64>,
) -> ExitCode {
    let mut battle = match config {
        Some(path) => match BattleConfig::load(&path) {
            Ok(battle) => battle,
            Err(err) => {
                error!(%err, config = %path.display(), "cannot load battle config");
                return ExitCode::FAILURE;
            }
        },
        None => {
            let Some(map) = map.clone() else {
                error!("either --config or --map is required");
                return ExitCode::FAILURE;
            };
            BattleConfig {
                map,
                ais: Vec::new(),
                seed: 0,
                max_gf: config::default_max_gf(),
                settings: hamlet_core::settings::GlobalGameSettings::default(),
                replay: None,
                save: None,
            }
        }
    };

    // CLI flags override config file fields.
    if let Some(map) = map {
        battle.map = map;
    }
    if !ais.is_empty() {
        battle.ais = ais;
    }
    if let Some(max_gf) = max_gf {
        battle.max_gf = max_gf;
    }
    if let Some(seed) = seed {
        battle.seed = seed;
    }
    if replay.is_some() {
        battle.replay = replay;
    }
    if save.is_some() {
        battle.save = save;
    }

    if battle.ais.len() < 2 {
        error!("at least two --ai players are required");
        return ExitCode::FAILURE;
    }

    let mut game = match HeadlessGame::new(battle.settings, &battle.map, &battle.ais, battle.seed)
    {
        Ok(game) => game,
        Err(err) => {
            error!(%err, "cannot start game");
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &battle.replay {
        if let Err(err) = game.start_replay(path) {
            // Recording is optional; the battle itself can still run.
            warn!(%err, path = %path.display(), "replay recording unavailable");
        }
    }

    let final_gf = match game.run(battle.max_gf) {
        Ok(gf) => gf,
        Err(err) => {
            error!(%err, "game loop failed");
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &battle.save {
        if let Err(err) = game.save_game(path) {
            error!(%err, path = %path.display(), "cannot write savegame");
            return ExitCode::FAILURE;
        }
    }
    game.close();

    let survivors: Vec<&str> = game
        .world()
        .players()
        .iter()
        .filter(|p| !p.is_defeated())
        .map(|p| p.name.as_str())
        .collect();
    if game.world().is_finished() {
        info!(gf = final_gf, winner = survivors.first().copied().unwrap_or("nobody"), "battle decided");
    } else {
        info!(gf = final_gf, survivors = survivors.len(), "frame budget reached, battle undecided");
    }
    ExitCode::SUCCESS
}

fn cmd_verify(replay: &std::path::Path) -> ExitCode {
    match ReplayVerifier::verify(replay) {
        Ok(VerifyOutcome::Consistent {
            last_gf,
            entries_checked,
        }) => {
            info!(last_gf, entries_checked, "replay is consistent");
            ExitCode::SUCCESS
        }
        Ok(VerifyOutcome::Mismatch {
            gf,
            player,
            recorded,
            computed,
        }) => {
            error!(gf, player, %recorded, %computed, "replay diverged");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(%err, path = %replay.display(), "cannot verify replay");
            ExitCode::FAILURE
        }
    }
}
