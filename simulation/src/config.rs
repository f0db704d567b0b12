//! Simulation configuration loaded from TOML.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use village_defence_core::{Cell, LedgerSnapshot, MapBounds};
use village_defence_system_builder::PlacementRules;

const DEFAULT_SEED: u64 = 0x0005_eed0_da11_0001;
const DEFAULT_MAP_SIDE: u32 = 30;
const DEFAULT_REVEAL_RADIUS: u32 = 4;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}", path.display())]
    Read {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The contents are not valid configuration TOML.
    #[error("malformed config")]
    Parse(#[from] toml::de::Error),
}

/// Dimensions of the generated map, in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_MAP_SIDE,
            height: DEFAULT_MAP_SIDE,
        }
    }
}

impl MapConfig {
    /// Bounds of a map with these dimensions centred on the origin.
    #[must_use]
    pub fn bounds(&self) -> MapBounds {
        MapBounds::centered(self.width, self.height)
    }
}

/// Everything needed to start a game.
///
/// Every field is optional in TOML and falls back to its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed of the random generator driving spawns and combat.
    pub seed: u64,
    /// Map dimensions.
    pub map: MapConfig,
    /// Starting economy.
    pub ledger: LedgerSnapshot,
    /// Radius of fog cleared around the origin at start.
    pub initial_reveal_radius: u32,
    /// Cell of the free townhall placed at start, if any.
    pub townhall: Option<Cell>,
    /// Buy-menu site restrictions.
    pub placement: PlacementRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            map: MapConfig::default(),
            ledger: LedgerSnapshot::default(),
            initial_reveal_radius: DEFAULT_REVEAL_RADIUS,
            townhall: Some(Cell::ORIGIN),
            placement: PlacementRules::default(),
        }
    }
}

impl Config {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_documents_use_defaults() {
        let config = Config::from_toml_str("").expect("empty config parses");
        assert_eq!(config, Config::default());
        assert_eq!(config.map.bounds().min(), Cell::new(-15, -15));
        assert_eq!(config.ledger.food, 30);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = Config::from_toml_str(
            r#"
            seed = 7
            initial_reveal_radius = 6

            [map]
            width = 11

            [ledger]
            food = 2

            [placement]
            require_revealed = true

            [townhall]
            x = 3
            y = -1
            "#,
        )
        .expect("config parses");

        assert_eq!(config.seed, 7);
        assert_eq!(config.map.width, 11);
        assert_eq!(config.map.height, 30);
        assert_eq!(config.ledger.food, 2);
        assert_eq!(config.ledger.people, 10);
        assert_eq!(config.initial_reveal_radius, 6);
        assert_eq!(config.townhall, Some(Cell::new(3, -1)));
        assert!(config.placement.require_revealed);
        assert!(!config.placement.require_matching_terrain);
    }

    #[test]
    fn malformed_documents_are_reported() {
        let error = Config::from_toml_str("seed = \"soon\"").unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_files_name_the_path() {
        let error = Config::load(Path::new("/nonexistent/village.toml")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/village.toml"));
    }
}
