use std::collections::HashMap;

use macroquad::prelude::*;

use crate::audio::VolumeControl;
use crate::content::ContentLoader;
use crate::game::{Direction, GameFlow, Gender, Npc, NpcKind, Player, Screen, World};
use crate::quiz::{ActiveQuiz, OPTION_LETTERS};
use crate::save::SaveStore;
use crate::ui::{ScreenUi, SettingsItem, TitleChoice, TitleMenu};
use crate::util::{asset_path, wrap_text};

/// Pixels per tile on screen
pub const TILE_SIZE: f32 = 32.0;

const FONT_SIZE: f32 = 24.0;
const LINE_HEIGHT: f32 = 28.0;

const BACKGROUND: Color = Color::new(0.08, 0.09, 0.12, 1.0);
const GRASS: Color = Color::new(0.36, 0.58, 0.33, 1.0);
const WALL: Color = Color::new(0.30, 0.26, 0.24, 1.0);
const PANEL: Color = Color::new(0.05, 0.05, 0.08, 0.88);
const HIGHLIGHT: Color = Color::new(1.0, 0.85, 0.3, 1.0);

/// Screen position of the top-left corner of a world tile. The camera tile
/// sits at the screen centre; world y grows upward, screen y downward.
pub fn world_to_screen(world_x: f32, world_y: f32, camera_x: f32, camera_y: f32, screen_w: f32, screen_h: f32) -> (f32, f32) {
    let sx = screen_w / 2.0 + (world_x - camera_x) * TILE_SIZE - TILE_SIZE / 2.0;
    let sy = screen_h / 2.0 - (world_y - camera_y) * TILE_SIZE - TILE_SIZE / 2.0;
    (sx, sy)
}

/// Every player sprite key the walk cycle can ask for
fn player_sprite_keys() -> Vec<String> {
    let mut keys = Vec::new();
    for gender in Gender::ALL {
        for dir in Direction::ALL {
            keys.push(format!("{}/{}", gender.as_str(), dir.as_str()));
            keys.push(format!("{}/walk_{}_1", gender.as_str(), dir.as_str()));
            keys.push(format!("{}/walk_{}_2", gender.as_str(), dir.as_str()));
        }
    }
    keys
}

pub struct Renderer {
    /// Sprites by key, e.g. "girl/walk_left_1" or "npc/test_3"
    sprites: HashMap<String, Texture2D>,
    player_color: Color,
    npc_color: Color,
    test_npc_color: Color,
}

impl Renderer {
    /// Preload every sprite the session can show. Missing files fall back to rectangles.
    pub async fn new(world: &World) -> Self {
        let mut keys = player_sprite_keys();
        keys.extend(world.npcs.iter().map(Npc::sprite_key));

        let mut sprites = HashMap::new();
        let mut missing = 0;
        for key in keys {
            let path = asset_path(&format!("assets/sprites/{}.png", key));
            match load_texture(&path).await {
                Ok(tex) => {
                    tex.set_filter(FilterMode::Nearest);
                    log::debug!("Loaded sprite: {}", key);
                    sprites.insert(key, tex);
                }
                Err(_) => missing += 1,
            }
        }
        if missing > 0 {
            log::warn!("{} sprites missing, drawing placeholders", missing);
        }
        log::info!("Loaded {} sprites", sprites.len());

        Self {
            sprites,
            player_color: Color::from_rgba(100, 150, 255, 255),
            npc_color: Color::from_rgba(230, 180, 120, 255),
            test_npc_color: Color::from_rgba(220, 90, 90, 255),
        }
    }

    fn draw_sprite_or(&self, key: &str, x: f32, y: f32, fallback: Color) {
        match self.sprites.get(key) {
            Some(tex) => draw_texture_ex(
                tex,
                x,
                y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(TILE_SIZE, TILE_SIZE)),
                    ..Default::default()
                },
            ),
            None => draw_rectangle(x + 4.0, y + 4.0, TILE_SIZE - 8.0, TILE_SIZE - 8.0, fallback),
        }
    }

    fn draw_lines(&self, lines: &[String], x: f32, y: f32, color: Color) -> f32 {
        let mut y = y;
        for line in lines {
            draw_text(line, x, y, FONT_SIZE, color);
            y += LINE_HEIGHT;
        }
        y
    }

    fn draw_panel(&self, x: f32, y: f32, w: f32, h: f32) {
        draw_rectangle(x, y, w, h, PANEL);
        draw_rectangle_lines(x, y, w, h, 2.0, GRAY);
    }

    /// Characters per line for a panel of the given width
    fn wrap_width(width: f32) -> usize {
        ((width - 32.0) / (FONT_SIZE * 0.5)).max(8.0) as usize
    }

    // ------------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------------

    pub fn draw<C: ContentLoader, S: SaveStore>(&self, flow: &GameFlow<C, S>, ui: &ScreenUi, audio: &dyn VolumeControl) {
        clear_background(BACKGROUND);

        match flow.screen() {
            Screen::Title => self.draw_title(flow.progress().has_save, ui.title.selected),
            Screen::CharacterSelect => self.draw_character_select(ui),
            Screen::Overworld => {
                self.draw_overworld(flow);
                if let Some(dialogue) = flow.dialogue() {
                    self.draw_dialogue(dialogue.visible_text(), dialogue.is_complete());
                }
                if ui.settings.open {
                    self.draw_settings(ui, audio);
                }
                if let Some(error) = flow.last_error() {
                    self.draw_error(error);
                }
            }
            Screen::TestInProgress { test_id, quiz } => self.draw_quiz(*test_id, quiz, ui.quiz.focus),
            Screen::TestResult { test_id, verdict, unlock_key } => {
                let mut lines = vec![
                    format!("Test {} {}", test_id, if verdict.passed { "passed!" } else { "failed" }),
                    format!("Score: {}/{}", verdict.score, verdict.total()),
                ];
                for (i, mark) in verdict.results.iter().enumerate() {
                    lines.push(format!("  Question {}: {}", i + 1, if *mark == 1 { "correct" } else { "wrong" }));
                }
                if let Some(key) = unlock_key {
                    lines.push(format!("Your key: {}", key));
                }
                lines.push(format!("Lives: {}", flow.progress().lives));
                lines.push("Press Enter to continue".to_string());
                self.draw_message_screen(&lines);
            }
            Screen::GameOver => self.draw_message_screen(&[
                "Game over".to_string(),
                "You ran out of lives. Your progress has been reset.".to_string(),
                "Enter: try again   Esc: quit".to_string(),
            ]),
            Screen::Victory => self.draw_message_screen(&[
                "Congratulations!".to_string(),
                "You passed every test on campus.".to_string(),
                "Enter: play again   Esc: quit".to_string(),
            ]),
        }
    }

    fn draw_message_screen(&self, lines: &[String]) {
        let w = screen_width() * 0.7;
        let h = lines.len() as f32 * LINE_HEIGHT + 40.0;
        let x = (screen_width() - w) / 2.0;
        let y = (screen_height() - h) / 2.0;
        self.draw_panel(x, y, w, h);
        self.draw_lines(lines, x + 16.0, y + 34.0, WHITE);
    }

    fn draw_title(&self, has_save: bool, selected: usize) {
        let title = "Campus Trials";
        let dims = measure_text(title, None, 64, 1.0);
        draw_text(title, (screen_width() - dims.width) / 2.0, screen_height() * 0.3, 64.0, WHITE);

        for (i, choice) in TitleMenu::choices(has_save).iter().enumerate() {
            let label = match (choice, has_save) {
                (TitleChoice::Continue, true) => "Continue",
                (TitleChoice::Continue, false) => "New game",
                (TitleChoice::StartOver, _) => "Start over",
            };
            let color = if i == selected { HIGHLIGHT } else { LIGHTGRAY };
            let y = screen_height() * 0.5 + i as f32 * 40.0;
            draw_text(label, screen_width() / 2.0 - 60.0, y, 32.0, color);
        }
    }

    fn draw_character_select(&self, ui: &ScreenUi) {
        let form = &ui.character;
        let x = screen_width() / 2.0 - 200.0;
        let mut y = screen_height() * 0.3;
        draw_text("Who are you?", x, y, 40.0, WHITE);
        y += 60.0;
        draw_text(&format!("Name: {}_", form.name), x, y, 32.0, WHITE);
        y += 50.0;
        draw_text(&format!("< {} >  (Tab to change)", form.gender.as_str()), x, y, 28.0, LIGHTGRAY);
        self.draw_sprite_or(&format!("{}/down", form.gender.as_str()), x + 340.0, y - 28.0, self.player_color);
        y += 50.0;
        if let Some(error) = &form.error {
            draw_text(error, x, y, 24.0, RED);
        }
        draw_text("Press Enter to start", x, y + 40.0, 24.0, GRAY);
    }

    // ------------------------------------------------------------------------
    // Overworld
    // ------------------------------------------------------------------------

    fn draw_overworld<C: ContentLoader, S: SaveStore>(&self, flow: &GameFlow<C, S>) {
        let Some(player) = flow.player() else {
            return;
        };
        let world = flow.world();
        let (sw, sh) = (screen_width(), screen_height());
        let (cam_x, cam_y) = (player.x, player.y);

        let half_w = (sw / TILE_SIZE / 2.0).ceil() as i32 + 1;
        let half_h = (sh / TILE_SIZE / 2.0).ceil() as i32 + 1;
        let (cx, cy) = (cam_x.round() as i32, cam_y.round() as i32);

        for ty in (cy - half_h)..=(cy + half_h) {
            for tx in (cx - half_w)..=(cx + half_w) {
                let (sx, sy) = world_to_screen(tx as f32, ty as f32, cam_x, cam_y, sw, sh);
                let color = if world.tilemap.is_blocked(tx, ty) { WALL } else { GRASS };
                draw_rectangle(sx, sy, TILE_SIZE, TILE_SIZE, color);
            }
        }

        for zone in &world.teleports {
            for ty in zone.y..zone.y + zone.height {
                for tx in zone.x..zone.x + zone.width {
                    let (sx, sy) = world_to_screen(tx as f32, ty as f32, cam_x, cam_y, sw, sh);
                    draw_rectangle_lines(sx + 2.0, sy + 2.0, TILE_SIZE - 4.0, TILE_SIZE - 4.0, 2.0, SKYBLUE);
                }
            }
        }

        for npc in &world.npcs {
            let (sx, sy) = world_to_screen(npc.x as f32, npc.y as f32, cam_x, cam_y, sw, sh);
            if sx < -TILE_SIZE || sy < -TILE_SIZE || sx > sw || sy > sh {
                continue;
            }
            let color = match npc.kind {
                NpcKind::Test { .. } => self.test_npc_color,
                NpcKind::Flavor { .. } => self.npc_color,
            };
            self.draw_sprite_or(&npc.sprite_key(), sx, sy, color);
        }

        self.draw_player(player, cam_x, cam_y);
        self.draw_hud(flow.progress().lives, flow.config().max_lives, flow.progress().next_test);
    }

    fn draw_player(&self, player: &Player, cam_x: f32, cam_y: f32) {
        let (sx, sy) = world_to_screen(player.x, player.y, cam_x, cam_y, screen_width(), screen_height());
        self.draw_sprite_or(&player.sprite_key(), sx, sy, self.player_color);
        let dims = measure_text(&player.name, None, 18, 1.0);
        draw_text(&player.name, sx + (TILE_SIZE - dims.width) / 2.0, sy - 4.0, 18.0, WHITE);
    }

    fn draw_hud(&self, lives: u8, max_lives: u8, next_test: u32) {
        self.draw_panel(8.0, 8.0, 230.0, 64.0);
        draw_text(&format!("Lives: {}/{}", lives, max_lives), 20.0, 34.0, FONT_SIZE, RED);
        draw_text(&format!("Next test: {}", next_test), 20.0, 60.0, FONT_SIZE, WHITE);
        draw_text("O: settings", screen_width() - 140.0, 28.0, 20.0, GRAY);
    }

    fn draw_dialogue(&self, text: &str, complete: bool) {
        let w = screen_width() - 40.0;
        let h = 150.0;
        let (x, y) = (20.0, screen_height() - h - 20.0);
        self.draw_panel(x, y, w, h);
        let lines = wrap_text(text, Self::wrap_width(w));
        self.draw_lines(&lines, x + 16.0, y + 34.0, WHITE);
        if complete {
            draw_text("Enter: continue   Esc: close", x + w - 300.0, y + h - 12.0, 20.0, GRAY);
        }
    }

    fn draw_settings(&self, ui: &ScreenUi, audio: &dyn VolumeControl) {
        let (w, h) = (360.0, 260.0);
        let x = (screen_width() - w) / 2.0;
        let y = (screen_height() - h) / 2.0;
        self.draw_panel(x, y, w, h);
        draw_text("Settings", x + 16.0, y + 34.0, 30.0, WHITE);

        for (i, item) in SettingsItem::ALL.iter().enumerate() {
            let color = if i == ui.settings.selected { HIGHLIGHT } else { LIGHTGRAY };
            let label = match item {
                SettingsItem::MusicVolume => format!("{}  < {:.0}% >", item.label(), audio.music_volume() * 100.0),
                SettingsItem::Mute if audio.is_muted() => format!("{} (on)", item.label()),
                _ => item.label().to_string(),
            };
            draw_text(&label, x + 24.0, y + 74.0 + i as f32 * 32.0, FONT_SIZE, color);
        }
        if let Some(message) = &ui.settings.message {
            draw_text(message, x + 16.0, y + h - 14.0, 20.0, GREEN);
        }
    }

    fn draw_error(&self, error: &str) {
        let w = screen_width() * 0.8;
        let x = (screen_width() - w) / 2.0;
        let lines = wrap_text(error, Self::wrap_width(w));
        let h = lines.len() as f32 * LINE_HEIGHT + 50.0;
        draw_rectangle(x, 90.0, w, h, Color::new(0.4, 0.05, 0.05, 0.92));
        let y = self.draw_lines(&lines, x + 16.0, 120.0, WHITE);
        draw_text("Press Enter to dismiss", x + 16.0, y, 20.0, LIGHTGRAY);
    }

    // ------------------------------------------------------------------------
    // Quiz
    // ------------------------------------------------------------------------

    fn draw_quiz(&self, test_id: u32, quiz: &ActiveQuiz, focus: usize) {
        let w = screen_width() - 80.0;
        let x = 40.0;
        let mut y = 60.0;

        draw_text(
            &format!(
                "Test {} - {} - question {}/{}",
                test_id,
                quiz.kind().label(),
                quiz.current_index() + 1,
                quiz.total()
            ),
            x,
            y,
            FONT_SIZE,
            GRAY,
        );
        y += 40.0;
        y = self.draw_lines(&wrap_text(quiz.prompt(), Self::wrap_width(w)), x, y, WHITE) + 20.0;

        match quiz {
            ActiveQuiz::MultipleChoice(engine) => {
                let selected = engine.selected_index();
                for (i, option) in engine.current().options.iter().enumerate() {
                    let color = if i == selected { HIGHLIGHT } else { LIGHTGRAY };
                    let marker = if i == selected { ">" } else { " " };
                    draw_text(&format!("{} {}) {}", marker, OPTION_LETTERS[i], option), x, y, FONT_SIZE, color);
                    y += LINE_HEIGHT + 6.0;
                }
            }
            ActiveQuiz::FillInGap(engine) => {
                for (i, text) in engine.current_answer().iter().enumerate() {
                    let color = if i == focus { HIGHLIGHT } else { LIGHTGRAY };
                    let cursor = if i == focus { "_" } else { "" };
                    draw_text(&format!("Blank {}: {}{}", i + 1, text, cursor), x, y, FONT_SIZE, color);
                    y += LINE_HEIGHT + 6.0;
                }
            }
            ActiveQuiz::DropDown(engine) => {
                for i in 0..engine.blank_count() {
                    let color = if i == focus { HIGHLIGHT } else { LIGHTGRAY };
                    let choice = engine.selected_text(i).unwrap_or("");
                    draw_text(&format!("Blank {}: < {} >", i + 1, choice), x, y, FONT_SIZE, color);
                    y += LINE_HEIGHT + 6.0;
                }
            }
        }

        let hint = match quiz {
            ActiveQuiz::MultipleChoice(_) => "Up/Down or 1-4 to choose, Enter to confirm",
            ActiveQuiz::FillInGap(_) => "Type your answer, Tab for next blank, Enter to confirm",
            ActiveQuiz::DropDown(_) => "Left/Right to choose, Tab for next blank, Enter to confirm",
        };
        draw_text(hint, x, screen_height() - 30.0, 20.0, GRAY);
    }
}
