// Shared application loop for desktop, Android and web builds

use macroquad::prelude::*;

use crate::audio::{AudioManager, THEME_MUSIC};
use crate::config::GameConfig;
use crate::content::ContentLoader;
use crate::error::GameResult;
use crate::game::GameFlow;
use crate::input::InputHandler;
use crate::render::Renderer;
use crate::save::{self, SaveStore};
use crate::ui::{ScreenUi, UiAction};

pub fn window_conf() -> Conf {
    Conf {
        window_title: "Campus Trials".to_string(),
        window_width: 1280,
        window_height: 720,
        fullscreen: false,
        ..Default::default()
    }
}

#[cfg(all(not(target_arch = "wasm32"), not(target_os = "android")))]
async fn start_flow(config: GameConfig) -> GameResult<GameFlow<crate::content::DirectoryContent, save::PlatformSaveStore>> {
    use crate::content::DirectoryContent;
    use crate::game::Tilemap;

    let tilemap = Tilemap::load_or_bordered(&config.map_file, config.map_width, config.map_height)?;
    let content = DirectoryContent::from_config(&config);
    GameFlow::start(config, tilemap, content, save::platform_store())
}

#[cfg(any(target_arch = "wasm32", target_os = "android"))]
async fn start_flow(config: GameConfig) -> GameResult<GameFlow<crate::content::MemoryContent, save::PlatformSaveStore>> {
    use crate::content::bundle;

    let tilemap = bundle::load_bundled_map(&config).await?;
    let content = bundle::load_bundled_content(&config).await?;
    GameFlow::start(config, tilemap, content, save::platform_store())
}

/// Run the game until the player quits
pub async fn run() {
    let config = GameConfig::load(&GameConfig::default_path());

    match start_flow(config).await {
        Ok(flow) => play(flow).await,
        Err(e) => {
            log::error!("Failed to start game: {}", e);
            show_startup_error(&e.to_string()).await;
        }
    }
}

async fn play<C: ContentLoader, S: SaveStore>(mut flow: GameFlow<C, S>) {
    let renderer = Renderer::new(flow.world()).await;
    let mut audio = AudioManager::new().await;
    audio.play_music(THEME_MUSIC).await;

    let mut input = InputHandler::new();
    let mut ui = ScreenUi::new();

    // Closing the window goes through shutdown so progress is saved
    prevent_quit();

    loop {
        let delta = get_frame_time();

        input.set_text_mode(ui.wants_text(&flow));
        let frame = input.poll();
        let action = ui.update(&mut flow, &frame, delta, &mut audio);

        renderer.draw(&flow, &ui, &audio);

        if action == UiAction::Quit || is_quit_requested() {
            flow.shutdown();
            audio.stop_music();
            break;
        }

        next_frame().await;
    }

    log::info!("Goodbye");
}

async fn show_startup_error(message: &str) {
    loop {
        clear_background(Color::new(0.08, 0.09, 0.12, 1.0));
        draw_text("Campus Trials could not start", 40.0, 80.0, 36.0, RED);
        for (i, line) in crate::util::wrap_text(message, 90).iter().enumerate() {
            draw_text(line, 40.0, 130.0 + i as f32 * 26.0, 22.0, WHITE);
        }
        draw_text("Press Escape to quit", 40.0, screen_height() - 40.0, 22.0, GRAY);

        if is_key_pressed(KeyCode::Escape) || is_quit_requested() {
            break;
        }
        next_frame().await;
    }
}
