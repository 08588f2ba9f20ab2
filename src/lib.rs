// Library crate shared by the desktop binary, Android and the web build

pub mod util;
pub use util::asset_path;

pub mod error;
pub use error::{GameError, GameResult};

pub mod audio;
pub mod config;
pub mod content;
pub mod game;
pub mod input;
pub mod quiz;
pub mod render;
pub mod save;
pub mod ui;
mod app;

pub use app::{run, window_conf};

// miniquad's JNI code (in MainActivity.java) spawns a thread that calls quad_main
#[cfg(target_os = "android")]
#[no_mangle]
pub extern "C" fn quad_main() {
    macroquad::Window::from_config(window_conf(), run());
}
