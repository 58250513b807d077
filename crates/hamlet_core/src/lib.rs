//! # Hamlet Core
//!
//! Deterministic lockstep simulation core for Hamlet.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No sockets
//! - No system randomness (all RNG is seeded)
//!
//! The simulation advances in fixed ticks (game frames). Player intent
//! enters exclusively as [`commands::GameCommand`] values, exchanged and
//! executed at network-frame boundaries in canonical order, so every
//! participant that applies the same command stream to the same starting
//! world stays bit-identical. That property is what lockstep multiplayer,
//! replay playback and desync detection are built on.
//!
//! ## Crate Structure
//!
//! - [`event_manager`] - The logical clock (game-frame counter)
//! - [`world`] - Authoritative world state and the tick operation
//! - [`player`] - Player roster, statistics and per-player state
//! - [`commands`] - Game commands and per-frame command bundles
//! - [`checksum`] - World-state checksums for desync detection
//! - [`replay`] - Replay recording, reading and verification
//! - [`savegame`] - Single-frame world snapshots
//! - [`map`] - Map files and world construction
//! - [`settings`] - Global game settings

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod checksum;
pub mod commands;
pub mod error;
pub mod event_manager;
pub mod map;
pub mod player;
pub mod replay;
pub mod savegame;
pub mod settings;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::checksum::AsyncChecksum;
    pub use crate::commands::{GameCommand, PlayerGameCommands};
    pub use crate::error::{GameError, Result};
    pub use crate::event_manager::{GameFrame, NETWORK_FRAME_INTERVAL, is_network_frame};
    pub use crate::map::{MapFile, MapInfo, MapLoader};
    pub use crate::player::{
        AiInfo, AiLevel, AiType, BuildingKind, GamePlayer, PlayerId, PlayerInfo, StatisticType,
    };
    pub use crate::replay::{Replay, ReplayHeader, ReplayRecorder, ReplayVerifier, VerifyOutcome};
    pub use crate::savegame::Savegame;
    pub use crate::settings::{Exploration, GameSpeed, GlobalGameSettings};
    pub use crate::world::GameWorld;
}
