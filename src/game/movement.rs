//! Grid movement, collision and teleport resolution for the overworld.

use serde::{Deserialize, Serialize};

use super::entities::{Direction, Player};
use super::npc::Npc;
use super::tilemap::Tilemap;

/// Rectangular trigger area that snaps the player to a destination tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeleportZone {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub target_x: i32,
    pub target_y: i32,
}

impl TeleportZone {
    pub fn new(x: i32, y: i32, width: i32, height: i32, target_x: i32, target_y: i32) -> Self {
        Self { x, y, width, height, target_x, target_y }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn destination(&self) -> (i32, i32) {
        (self.target_x, self.target_y)
    }
}

/// Everything on the map that does not move
#[derive(Debug, Clone)]
pub struct World {
    pub tilemap: Tilemap,
    pub npcs: Vec<Npc>,
    pub teleports: Vec<TeleportZone>,
}

impl World {
    pub fn new(tilemap: Tilemap, npcs: Vec<Npc>, teleports: Vec<TeleportZone>) -> Self {
        Self { tilemap, npcs, teleports }
    }

    /// Collision layer first; NPC occupancy is only scanned when the layer is clear
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        if self.tilemap.is_blocked(x, y) {
            return true;
        }
        self.npc_at(x, y).is_some()
    }

    pub fn npc_at(&self, x: i32, y: i32) -> Option<&Npc> {
        self.npcs.iter().find(|npc| npc.occupies(x, y))
    }

    pub fn teleport_at(&self, x: i32, y: i32) -> Option<&TeleportZone> {
        self.teleports.iter().find(|zone| zone.contains(x, y))
    }
}

/// What a single engine step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEvent {
    /// Nothing changed (idle with no input, or input dropped while moving)
    None,
    /// Target was blocked, only the facing changed
    Turned,
    Started,
    /// Still interpolating
    InFlight,
    Arrived,
    Teleported { x: i32, y: i32 },
}

/// Drives one player over a borrowed world. Built per frame.
pub struct MovementEngine<'p, 'w> {
    player: &'p mut Player,
    world: &'w World,
    move_duration: f32,
}

impl<'p, 'w> MovementEngine<'p, 'w> {
    pub fn new(player: &'p mut Player, world: &'w World, move_duration: f32) -> Self {
        Self { player, world, move_duration }
    }

    /// Try to step one tile. Input while moving is discarded.
    pub fn attempt_move(&mut self, direction: Direction) -> MoveEvent {
        if self.player.is_moving() {
            return MoveEvent::None;
        }

        let (dx, dy) = direction.offset();
        let (target_x, target_y) = (self.player.tile_x + dx, self.player.tile_y + dy);

        if self.world.is_blocked(target_x, target_y) {
            self.player.turn(direction);
            return MoveEvent::Turned;
        }

        self.player.begin_move(direction, target_x, target_y);
        MoveEvent::Started
    }

    /// Advance interpolation, then apply any teleport under the resting tile
    pub fn tick(&mut self, delta: f32) -> MoveEvent {
        let mut event = MoveEvent::None;

        if self.player.is_moving() {
            if self.player.advance(delta, self.move_duration) {
                event = MoveEvent::Arrived;
            } else {
                return MoveEvent::InFlight;
            }
        }

        let (x, y) = self.player.tile();
        if let Some(zone) = self.world.teleport_at(x, y) {
            let (tx, ty) = zone.destination();
            log::debug!("Teleport ({}, {}) -> ({}, {})", x, y, tx, ty);
            self.player.teleport(tx, ty);
            return MoveEvent::Teleported { x: tx, y: ty };
        }

        event
    }

    /// One frame: at most one directional input, then the tick
    pub fn update(&mut self, delta: f32, input: Option<Direction>) -> MoveEvent {
        let started = match input {
            Some(direction) => self.attempt_move(direction),
            None => MoveEvent::None,
        };
        let ticked = self.tick(delta);
        match (started, ticked) {
            (MoveEvent::Turned, MoveEvent::None) => MoveEvent::Turned,
            (MoveEvent::Started, MoveEvent::InFlight) => MoveEvent::Started,
            (_, ticked) => ticked,
        }
    }

    /// NPC on the tile directly ahead, only while idle
    pub fn check_interaction(&self) -> Option<&'w Npc> {
        if self.player.is_moving() {
            return None;
        }
        let (x, y) = self.player.facing_tile();
        self.world.npc_at(x, y)
    }
}
