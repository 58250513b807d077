//! Headless game runner for AI battles and CI verification.
//!
//! This crate drives [`hamlet_core`]'s deterministic simulation without
//! graphics or sockets:
//!
//! - **AI battles**: seat AI adapters against each other and run the full
//!   lockstep pipeline
//! - **Replay recording**: log every command bundle with its checksum
//! - **Replay verification**: re-simulate a recorded game and flag the
//!   first checksum divergence
//!
//! The status table goes to stdout; logs go to stderr.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ai;
pub mod config;
pub mod game;
pub mod report;

pub use ai::{AiPlayer, DefaultAi, DummyAi, create_ai};
pub use config::{BattleConfig, ConfigError, parse_ai_spec};
pub use game::HeadlessGame;
pub use report::StatusReport;
