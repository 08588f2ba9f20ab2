//! Overworld session: the player, the open dialogue, and the per-frame
//! routing between walking and talking.

use super::entities::{Direction, Player};
use super::movement::{MoveEvent, MovementEngine, World};
use super::npc::{Npc, NpcKind};

/// Overworld controls sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverworldInput {
    pub direction: Option<Direction>,
    /// Talk to the NPC ahead, or advance an open dialogue
    pub interact: bool,
    pub cancel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverworldEvent {
    Moved(MoveEvent),
    DialogueOpened,
    DialogueClosed,
    /// Dialogue with a test NPC was confirmed
    RequestTest(u32),
}

/// Line an NPC says, given which test is required next
pub fn dialogue_line(npc: &Npc, npcs: &[Npc], next_test: u32) -> String {
    let line = match &npc.kind {
        NpcKind::Test { test_id, dialog, .. } if *test_id == next_test => dialog.as_str(),
        NpcKind::Test { rest_dialog, .. } => npcs
            .iter()
            .find_map(|other| match &other.kind {
                NpcKind::Test { test_id, rest_dialog, .. } if *test_id == next_test => Some(rest_dialog.as_str()),
                _ => None,
            })
            .unwrap_or(rest_dialog.as_str()),
        NpcKind::Flavor { dialog } => dialog.as_str(),
    };
    format!("{}: {}", npc.name, line)
}

/// Text box that types itself out
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDialogue {
    pub text: String,
    /// Test to request when the dialogue is confirmed
    pub test_id: Option<u32>,
    revealed: f32,
    total_chars: usize,
}

impl ActiveDialogue {
    pub fn new(text: String, test_id: Option<u32>) -> Self {
        let total_chars = text.chars().count();
        Self {
            text,
            test_id,
            revealed: 0.0,
            total_chars,
        }
    }

    pub fn tick(&mut self, delta: f32, chars_per_second: f32) {
        if chars_per_second <= 0.0 {
            self.reveal_all();
            return;
        }
        self.revealed = (self.revealed + delta.max(0.0) * chars_per_second).min(self.total_chars as f32);
    }

    pub fn reveal_all(&mut self) {
        self.revealed = self.total_chars as f32;
    }

    pub fn is_complete(&self) -> bool {
        self.revealed as usize >= self.total_chars
    }

    /// Prefix of the line shown so far
    pub fn visible_text(&self) -> &str {
        let shown = self.revealed as usize;
        match self.text.char_indices().nth(shown) {
            Some((byte_index, _)) => &self.text[..byte_index],
            None => &self.text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Overworld {
    pub player: Player,
    pub dialogue: Option<ActiveDialogue>,
}

impl Overworld {
    pub fn new(player: Player) -> Self {
        Self { player, dialogue: None }
    }

    /// One frame. Movement is frozen while a dialogue is open.
    pub fn update(
        &mut self,
        world: &World,
        input: &OverworldInput,
        next_test: u32,
        move_duration: f32,
        reveal_rate: f32,
        delta: f32,
    ) -> Option<OverworldEvent> {
        if let Some(dialogue) = self.dialogue.as_mut() {
            dialogue.tick(delta, reveal_rate);

            if input.cancel {
                self.dialogue = None;
                return Some(OverworldEvent::DialogueClosed);
            }
            if !input.interact {
                return None;
            }
            if !dialogue.is_complete() {
                dialogue.reveal_all();
                return None;
            }

            let test_id = dialogue.test_id;
            self.dialogue = None;
            return Some(match test_id {
                Some(id) => OverworldEvent::RequestTest(id),
                None => OverworldEvent::DialogueClosed,
            });
        }

        let mut engine = MovementEngine::new(&mut self.player, world, move_duration);

        if input.interact {
            if let Some(npc) = engine.check_interaction() {
                log::debug!("Talking to {}", npc.name);
                self.dialogue = Some(ActiveDialogue::new(
                    dialogue_line(npc, &world.npcs, next_test),
                    npc.test_id(),
                ));
                return Some(OverworldEvent::DialogueOpened);
            }
        }

        match engine.update(delta, input.direction) {
            MoveEvent::None => None,
            event => Some(OverworldEvent::Moved(event)),
        }
    }
}
