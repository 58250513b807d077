//! Battle configuration files and CLI value parsing.
//!
//! A whole AI battle can be described in a single RON file instead of CLI
//! flags, which keeps regression setups in version control.

use std::path::{Path, PathBuf};

use hamlet_core::event_manager::GameFrame;
use hamlet_core::player::{AiInfo, AiLevel};
use hamlet_core::settings::GlobalGameSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration loading and parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// Unknown AI spec string on the command line.
    #[error("Unknown AI spec '{0}' (expected default[:easy|medium|hard] or dummy)")]
    InvalidAi(String),
}

/// Default frame budget for a battle: one hour of game time at normal
/// speed.
#[must_use]
pub const fn default_max_gf() -> GameFrame {
    72_000
}

/// Everything needed to run one headless battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Map file to load.
    pub map: PathBuf,
    /// One AI descriptor per player slot.
    pub ais: Vec<AiInfo>,
    /// RNG seed.
    #[serde(default)]
    pub seed: u64,
    /// Frame budget; the run stops here even if undecided.
    #[serde(default = "default_max_gf")]
    pub max_gf: GameFrame,
    /// Global game settings.
    #[serde(default)]
    pub settings: GlobalGameSettings,
    /// Record a replay to this path.
    #[serde(default)]
    pub replay: Option<PathBuf>,
    /// Write a savegame of the final state to this path.
    #[serde(default)]
    pub save: Option<PathBuf>,
}

impl BattleConfig {
    /// Load a battle description from a RON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&text)?)
    }
}

/// Parse a CLI AI spec: `default`, `default:easy`, `default:medium`,
/// `default:hard` or `dummy`.
pub fn parse_ai_spec(spec: &str) -> Result<AiInfo, ConfigError> {
    match spec {
        "dummy" => Ok(AiInfo::dummy()),
        "default" | "default:medium" => Ok(AiInfo::default_ai(AiLevel::Medium)),
        "default:easy" => Ok(AiInfo::default_ai(AiLevel::Easy)),
        "default:hard" => Ok(AiInfo::default_ai(AiLevel::Hard)),
        other => Err(ConfigError::InvalidAi(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use hamlet_core::player::AiType;

    use super::*;

    #[test]
    fn test_parse_ai_specs() {
        assert_eq!(parse_ai_spec("dummy").unwrap(), AiInfo::dummy());
        assert_eq!(
            parse_ai_spec("default").unwrap(),
            AiInfo::default_ai(AiLevel::Medium)
        );
        assert_eq!(
            parse_ai_spec("default:hard").unwrap().level,
            AiLevel::Hard
        );
        assert!(parse_ai_spec("clever").is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config: BattleConfig = ron::from_str(
            r#"BattleConfig(
                map: "maps/duel.ron",
                ais: [AiInfo(ai_type: Default, level: Medium), AiInfo(ai_type: Dummy, level: Easy)],
            )"#,
        )
        .unwrap();
        assert_eq!(config.seed, 0);
        assert_eq!(config.max_gf, default_max_gf());
        assert!(config.replay.is_none());
        assert_eq!(config.ais[0].ai_type, AiType::Default);
    }
}
