mod renderer;

pub use renderer::{world_to_screen, Renderer, TILE_SIZE};
