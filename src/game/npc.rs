// ============================================================================
// NPC Kind
// ============================================================================

/// What an NPC does when talked to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NpcKind {
    /// Gatekeeper of one test
    Test {
        test_id: u32,
        /// Said when this NPC's test is the next one
        dialog: String,
        /// Hint other test NPCs give while this NPC's test is the next one
        rest_dialog: String,
    },
    /// Background character with a single line
    Flavor { dialog: String },
}

// ============================================================================
// NPC Entity
// ============================================================================

/// A stationary character occupying exactly one tile. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Npc {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub kind: NpcKind,
}

impl Npc {
    pub fn test(name: &str, x: i32, y: i32, test_id: u32, dialog: &str, rest_dialog: &str) -> Self {
        Self {
            name: name.to_string(),
            x,
            y,
            kind: NpcKind::Test {
                test_id,
                dialog: dialog.to_string(),
                rest_dialog: rest_dialog.to_string(),
            },
        }
    }

    pub fn flavor(name: &str, x: i32, y: i32, dialog: &str) -> Self {
        Self {
            name: name.to_string(),
            x,
            y,
            kind: NpcKind::Flavor {
                dialog: dialog.to_string(),
            },
        }
    }

    pub fn occupies(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }

    pub fn test_id(&self) -> Option<u32> {
        match self.kind {
            NpcKind::Test { test_id, .. } => Some(test_id),
            NpcKind::Flavor { .. } => None,
        }
    }

    /// Sprite lookup key used by the renderer
    pub fn sprite_key(&self) -> String {
        match &self.kind {
            NpcKind::Test { test_id, .. } => format!("npc/test_{}", test_id),
            NpcKind::Flavor { .. } => format!("npc/{}", self.name.to_lowercase().replace(' ', "_")),
        }
    }
}
