use macroquad::audio::{load_sound, play_sound, set_sound_volume, stop_sound, PlaySoundParams, Sound};
use serde::{Deserialize, Serialize};

use crate::util::asset_path;

pub const THEME_MUSIC: &str = "assets/audio/theme.ogg";

/// Amount one key press moves the music volume
pub const VOLUME_STEP: f32 = 0.1;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AudioSettings {
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            music_volume: 0.7,
            muted: false,
        }
    }
}

impl AudioSettings {
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.music_volume
        }
    }

    /// Nudge the volume, snapping to the step grid and staying within [0, 1]
    pub fn step_volume(&mut self, up: bool) {
        let delta = if up { VOLUME_STEP } else { -VOLUME_STEP };
        let stepped = ((self.music_volume + delta) / VOLUME_STEP).round() * VOLUME_STEP;
        self.music_volume = stepped.clamp(0.0, 1.0);
    }
}

/// What the settings panel needs from the audio layer
pub trait VolumeControl {
    fn music_volume(&self) -> f32;
    fn step_music_volume(&mut self, up: bool);
    fn toggle_mute(&mut self);
    fn is_muted(&self) -> bool;
}

pub struct AudioManager {
    current_music: Option<Sound>,
    settings: AudioSettings,
}

impl AudioManager {
    pub async fn new() -> Self {
        Self {
            current_music: None,
            settings: load_settings(),
        }
    }

    /// Start looping a track; a missing file is logged and the game stays silent
    pub async fn play_music(&mut self, path: &str) {
        self.stop_music();

        let actual_path = asset_path(path);
        match load_sound(&actual_path).await {
            Ok(sound) => {
                let volume = self.settings.effective_music_volume();
                log::info!("Playing music {} at volume {} (muted: {})", actual_path, volume, self.settings.muted);
                play_sound(
                    &sound,
                    PlaySoundParams {
                        looped: true,
                        volume,
                    },
                );
                self.current_music = Some(sound);
            }
            Err(e) => {
                log::warn!("Failed to load music '{}': {:?}", path, e);
            }
        }
    }

    pub fn stop_music(&mut self) {
        if let Some(sound) = self.current_music.take() {
            stop_sound(&sound);
        }
    }

    fn apply_music_volume(&self) {
        if let Some(ref sound) = self.current_music {
            set_sound_volume(sound, self.settings.effective_music_volume());
        }
    }
}

impl VolumeControl for AudioManager {
    fn music_volume(&self) -> f32 {
        self.settings.music_volume
    }

    fn step_music_volume(&mut self, up: bool) {
        self.settings.step_volume(up);
        self.apply_music_volume();
        save_settings(&self.settings);
    }

    fn toggle_mute(&mut self) {
        self.settings.muted = !self.settings.muted;
        self.apply_music_volume();
        save_settings(&self.settings);
    }

    fn is_muted(&self) -> bool {
        self.settings.muted
    }
}

// Platform-specific settings persistence

#[cfg(all(not(target_arch = "wasm32"), not(target_os = "android")))]
fn settings_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|p| p.join("campus-trials").join("audio.toml"))
}

#[cfg(target_os = "android")]
fn settings_path() -> Option<std::path::PathBuf> {
    Some(std::path::PathBuf::from("audio_settings.toml"))
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings() -> AudioSettings {
    let Some(path) = settings_path() else {
        return AudioSettings::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable audio settings {:?}: {}", path, e);
            AudioSettings::default()
        }),
        Err(_) => AudioSettings::default(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn save_settings(settings: &AudioSettings) {
    let Some(path) = settings_path() else {
        return;
    };

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match toml::to_string_pretty(settings) {
        Ok(contents) => {
            if let Err(e) = std::fs::write(&path, contents) {
                log::warn!("Failed to save audio settings {:?}: {}", path, e);
            }
        }
        Err(e) => log::warn!("Failed to encode audio settings: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn load_settings() -> AudioSettings {
    quad_storage::STORAGE
        .lock()
        .ok()
        .and_then(|storage| storage.get("audio_settings"))
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn save_settings(settings: &AudioSettings) {
    if let (Ok(json), Ok(mut storage)) = (serde_json::to_string(settings), quad_storage::STORAGE.lock()) {
        storage.set("audio_settings", &json);
    }
}
