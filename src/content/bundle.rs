//! Content for platforms without a readable filesystem (APK assets, browser).
//!
//! Everything is fetched up front through macroquad's file loader and held
//! in memory for the session.

use std::path::Path;

use macroquad::file::load_string;

use super::loader::{parse_npcs, parse_questions, parse_tests, question_file, MemoryContent};
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::game::Tilemap;
use crate::util::asset_path;

async fn fetch(path: &Path) -> Option<String> {
    let resolved = asset_path(&path.to_string_lossy());
    match load_string(&resolved).await {
        Ok(content) => Some(content),
        Err(e) => {
            log::warn!("Failed to load {}: {:?}", resolved, e);
            None
        }
    }
}

async fn fetch_required(path: &Path) -> GameResult<String> {
    fetch(path).await.ok_or_else(|| {
        GameError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "asset not bundled"),
        )
    })
}

/// Fetch tests, NPCs and every referenced question set
pub async fn load_bundled_content(config: &GameConfig) -> GameResult<MemoryContent> {
    let tests_path = config.tests_path();
    let tests = parse_tests(&fetch_required(&tests_path).await?, &tests_path)?;

    let npcs_path = config.npcs_path();
    let npcs_file = fetch(&npcs_path).await;
    let npcs = parse_npcs(npcs_file.as_deref(), &npcs_path, &config.flavor_npcs)?;

    let mut content = MemoryContent::new().with_npcs(npcs);
    for test in tests.into_values() {
        let path = config.data_dir.join(question_file(&test.content));
        let questions = parse_questions(test.kind, &test.content, &fetch_required(&path).await?, &path)?;
        content = content.with_test(test, questions);
    }
    Ok(content)
}

/// Bundled collision map, or a bordered field when none is shipped
pub async fn load_bundled_map(config: &GameConfig) -> GameResult<Tilemap> {
    match fetch(&config.map_file).await {
        Some(content) => Tilemap::from_toml_str(&content, &config.map_file),
        None => {
            log::info!("No bundled collision map, using open {}x{} field", config.map_width, config.map_height);
            Ok(Tilemap::bordered(config.map_width, config.map_height))
        }
    }
}
