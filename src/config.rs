//! Game configuration loaded from `campus-trials.toml`.
//!
//! Every field has a default, so a missing file or a partial file still
//! yields the baseline campus.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::game::{Direction, Npc, TeleportZone};

pub const CONFIG_FILE: &str = "campus-trials.toml";
pub const CONFIG_ENV: &str = "CAMPUS_TRIALS_CONFIG";

/// A background character defined directly in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlavorNpcConfig {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub dialog: String,
}

impl FlavorNpcConfig {
    pub fn to_npc(&self) -> Npc {
        Npc::flavor(&self.name, self.x, self.y, &self.dialog)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Root of tests.toml, npcs.toml and questions/
    pub data_dir: PathBuf,
    pub map_file: PathBuf,
    /// Size of the fallback field when `map_file` is absent
    pub map_width: u32,
    pub map_height: u32,
    /// Seconds to walk one tile
    pub move_duration: f32,
    pub max_lives: u8,
    pub start_x: i32,
    pub start_y: i32,
    pub start_direction: Direction,
    /// Dialogue characters revealed per second
    pub text_reveal_rate: f32,
    pub teleports: Vec<TeleportZone>,
    pub flavor_npcs: Vec<FlavorNpcConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("assets/data"),
            map_file: PathBuf::from("assets/map/campus.toml"),
            map_width: 140,
            map_height: 100,
            move_duration: 1.0 / 6.0,
            max_lives: 3,
            start_x: 13,
            start_y: 70,
            start_direction: Direction::Down,
            text_reveal_rate: 60.0,
            teleports: default_teleports(),
            flavor_npcs: default_flavor_npcs(),
        }
    }
}

/// The four zone pairs stitching the campus regions together
pub fn default_teleports() -> Vec<TeleportZone> {
    vec![
        TeleportZone::new(16, 41, 4, 1, 96, 6),
        TeleportZone::new(95, 1, 3, 1, 18, 46),
        TeleportZone::new(43, 56, 4, 1, 112, 83),
        TeleportZone::new(110, 84, 5, 1, 45, 62),
    ]
}

pub fn default_flavor_npcs() -> Vec<FlavorNpcConfig> {
    let npc = |name: &str, x: i32, y: i32, dialog: &str| FlavorNpcConfig {
        name: name.to_string(),
        x,
        y,
        dialog: dialog.to_string(),
    };
    vec![
        npc("Zipi", 91, 19, "What can I get you?"),
        npc("Zape", 91, 15, "A coffee? Sure, no problem."),
        npc("Pau", 89, 7, "I'm from the law school, better ask someone else."),
        npc("Jose Daniel", 126, 82, "Go and study."),
    ]
}

impl GameConfig {
    /// Config path: `$CAMPUS_TRIALS_CONFIG` or `campus-trials.toml` in the working directory
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Load config, falling back to defaults when the file is missing or malformed
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => {
                log::info!("No config at {:?}, using defaults", path);
                return Self::default();
            }
        };

        match toml::from_str::<Self>(&contents) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config.validated()
            }
            Err(e) => {
                log::warn!("Failed to parse config {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    /// Replace values the game cannot run with by their defaults
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.max_lives < 1 {
            log::warn!("max_lives must be at least 1, using {}", defaults.max_lives);
            self.max_lives = defaults.max_lives;
        }
        if self.map_width == 0 || self.map_height == 0 {
            log::warn!(
                "Map size {}x{} is empty, using {}x{}",
                self.map_width,
                self.map_height,
                defaults.map_width,
                defaults.map_height
            );
            self.map_width = defaults.map_width;
            self.map_height = defaults.map_height;
        }
        self
    }

    pub fn tests_path(&self) -> PathBuf {
        self.data_dir.join("tests.toml")
    }

    pub fn npcs_path(&self) -> PathBuf {
        self.data_dir.join("npcs.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_baseline_campus() {
        let config = GameConfig::default();
        assert_eq!(config.max_lives, 3);
        assert_eq!((config.start_x, config.start_y), (13, 70));
        assert_eq!(config.teleports.len(), 4);
        assert_eq!(config.flavor_npcs.len(), 4);
        assert!(config.teleports[0].contains(16, 41));
        assert_eq!(config.teleports[0].destination(), (96, 6));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "max_lives = 5\nstart_direction = \"up\"\n").unwrap();

        let config = GameConfig::load(&path);
        assert_eq!(config.max_lives, 5);
        assert_eq!(config.start_direction, Direction::Up);
        assert_eq!(config.teleports.len(), 4);
        assert_eq!(config.data_dir, PathBuf::from("assets/data"));
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "max_lives = \"many\"").unwrap();
        assert_eq!(GameConfig::load(&path).max_lives, 3);
    }

    #[test]
    fn test_unusable_values_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "max_lives = 0\nmap_width = 0\nmap_height = 80\nmove_duration = 0.25\n").unwrap();

        let config = GameConfig::load(&path);
        assert_eq!(config.max_lives, 3);
        assert_eq!((config.map_width, config.map_height), (140, 100));
        assert_eq!(config.move_duration, 0.25);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load(&dir.path().join("nope.toml"));
        assert_eq!(config.text_reveal_rate, 60.0);
    }
}
