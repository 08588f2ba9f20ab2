//! Static collision layer of the campus map.

use std::path::Path;

use serde::Deserialize;

use crate::error::{GameError, GameResult};

/// Collision map file: one string per row, top row first. `#` blocks a tile.
#[derive(Debug, Deserialize)]
struct RawMapFile {
    rows: Vec<String>,
}

/// Collision grid addressed in y-up world coordinates (y = 0 is the bottom row)
#[derive(Debug, Clone)]
pub struct Tilemap {
    pub width: u32,
    pub height: u32,
    collision: Vec<bool>,
}

impl Tilemap {
    /// Open field with an impassable one-tile border
    pub fn bordered(width: u32, height: u32) -> Self {
        let mut collision = vec![false; (width * height) as usize];

        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    collision[(y * width + x) as usize] = true;
                }
            }
        }

        Self { width, height, collision }
    }

    /// Parse rows of `#`/`.`; the first row is the top of the map
    pub fn from_rows(rows: &[String]) -> GameResult<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0) as u32;
        if width == 0 || height == 0 {
            return Err(GameError::malformed("collision map", "map has no tiles"));
        }

        let mut collision = vec![false; (width * height) as usize];
        for (row_index, row) in rows.iter().enumerate() {
            if row.chars().count() as u32 != width {
                return Err(GameError::malformed(
                    "collision map",
                    format!("row {} is {} tiles wide, expected {}", row_index, row.chars().count(), width),
                ));
            }
            let y = height - 1 - row_index as u32;
            for (x, c) in row.chars().enumerate() {
                collision[(y * width + x as u32) as usize] = c == '#';
            }
        }

        Ok(Self { width, height, collision })
    }

    /// Parse a map file's contents; `source` names it in errors
    pub fn from_toml_str(content: &str, source: &Path) -> GameResult<Self> {
        let raw: RawMapFile = toml::from_str(content).map_err(|e| GameError::parse(source, e))?;
        let map = Self::from_rows(&raw.rows)?;
        log::info!("Loaded collision map {:?}: {}x{}", source, map.width, map.height);
        Ok(map)
    }

    pub fn load(path: &Path) -> GameResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GameError::io(path, e))?;
        Self::from_toml_str(&content, path)
    }

    /// Load the map file, or fall back to a bordered field when there is none
    pub fn load_or_bordered(path: &Path, width: u32, height: u32) -> GameResult<Self> {
        if !path.exists() {
            log::info!("No collision map at {:?}, using open {}x{} field", path, width, height);
            return Ok(Self::bordered(width, height));
        }
        Self::load(path)
    }

    /// Whether the collision layer marks a tile impassable. Off-map tiles are blocked.
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return true;
        }

        let idx = (y as u32 * self.width + x as u32) as usize;
        self.collision.get(idx).copied().unwrap_or(true)
    }

    pub fn set_blocked(&mut self, x: i32, y: i32, blocked: bool) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        self.collision[idx] = blocked;
    }
}
