pub mod entities;
pub mod movement;
pub mod npc;
pub mod progression;
pub mod state;
pub mod tilemap;

pub use entities::{Direction, Gender, Motion, Player, SpriteFrame};
pub use movement::{MoveEvent, MovementEngine, TeleportZone, World};
pub use npc::{Npc, NpcKind};
pub use progression::{GameFlow, Progress, Screen};
pub use state::{dialogue_line, ActiveDialogue, Overworld, OverworldEvent, OverworldInput};
pub use tilemap::Tilemap;
