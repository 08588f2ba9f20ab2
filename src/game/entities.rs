use serde::{Deserialize, Serialize};

/// Facing / travel direction. World space is y-up: `Up` increases y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Down
    }
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Tile offset of one step in this direction
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Resolve simultaneously held keys to a single cardinal direction.
    /// Priority is fixed: Up, Down, Right, Left. Diagonals never happen.
    pub fn from_held(up: bool, down: bool, right: bool, left: bool) -> Option<Self> {
        if up {
            Some(Direction::Up)
        } else if down {
            Some(Direction::Down)
        } else if right {
            Some(Direction::Right)
        } else if left {
            Some(Direction::Left)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// The two selectable player skins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Boy,
    Girl,
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Boy
    }
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Boy, Gender::Girl];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Boy => "boy",
            Gender::Girl => "girl",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "boy" => Some(Gender::Boy),
            "girl" => Some(Gender::Girl),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Gender::Boy => Gender::Girl,
            Gender::Girl => Gender::Boy,
        }
    }
}

/// Which walk-cycle image is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteFrame {
    /// Standing, facing `direction`
    Idle,
    StepOne,
    StepTwo,
}

impl SpriteFrame {
    /// Frame for a given interpolation progress in `[0, 1)`
    pub fn for_progress(alpha: f32) -> Self {
        if alpha < 1.0 / 3.0 {
            SpriteFrame::StepOne
        } else if alpha < 2.0 / 3.0 {
            SpriteFrame::Idle
        } else {
            SpriteFrame::StepTwo
        }
    }
}

/// Idle ⇄ Moving. At most one move is ever in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Idle,
    Moving {
        target_x: i32,
        target_y: i32,
        elapsed: f32,
    },
}

// Accumulated frame deltas rarely sum to exactly the move duration
const ARRIVAL_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub gender: Gender,

    // Tile the player rests on (the origin tile while a move is in flight)
    pub tile_x: i32,
    pub tile_y: i32,

    // Rendered position, fractional mid-move
    pub x: f32,
    pub y: f32,

    pub direction: Direction,
    pub motion: Motion,
    pub frame: SpriteFrame,
}

impl Player {
    pub fn new(name: String, gender: Gender, tile_x: i32, tile_y: i32, direction: Direction) -> Self {
        Self {
            name,
            gender,
            tile_x,
            tile_y,
            x: tile_x as f32,
            y: tile_y as f32,
            direction,
            motion: Motion::Idle,
            frame: SpriteFrame::Idle,
        }
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.motion, Motion::Moving { .. })
    }

    pub fn tile(&self) -> (i32, i32) {
        (self.tile_x, self.tile_y)
    }

    /// Tile directly in front of the player
    pub fn facing_tile(&self) -> (i32, i32) {
        let (dx, dy) = self.direction.offset();
        (self.tile_x + dx, self.tile_y + dy)
    }

    /// Face a direction without moving (blocked move)
    pub fn turn(&mut self, direction: Direction) {
        self.direction = direction;
        self.frame = SpriteFrame::Idle;
    }

    /// Enter the Moving state toward an adjacent tile. Ignored while moving.
    pub fn begin_move(&mut self, direction: Direction, target_x: i32, target_y: i32) -> bool {
        if self.is_moving() {
            return false;
        }
        self.direction = direction;
        self.motion = Motion::Moving {
            target_x,
            target_y,
            elapsed: 0.0,
        };
        true
    }

    /// Advance the in-flight move. Returns true on the tick the target is reached.
    pub fn advance(&mut self, delta: f32, move_duration: f32) -> bool {
        let Motion::Moving { target_x, target_y, elapsed } = self.motion else {
            return false;
        };

        let elapsed = elapsed + delta.max(0.0);
        let alpha = if move_duration <= 0.0 {
            1.0
        } else {
            (elapsed / move_duration).min(1.0)
        };

        if alpha >= 1.0 - ARRIVAL_EPSILON {
            self.tile_x = target_x;
            self.tile_y = target_y;
            self.x = target_x as f32;
            self.y = target_y as f32;
            self.motion = Motion::Idle;
            self.frame = SpriteFrame::Idle;
            return true;
        }

        let (from_x, from_y) = (self.tile_x as f32, self.tile_y as f32);
        self.x = from_x + (target_x as f32 - from_x) * alpha;
        self.y = from_y + (target_y as f32 - from_y) * alpha;
        self.frame = SpriteFrame::for_progress(alpha);
        self.motion = Motion::Moving { target_x, target_y, elapsed };
        false
    }

    /// Unconditional snap to a tile; callers only do this while idle
    pub fn teleport(&mut self, tile_x: i32, tile_y: i32) {
        self.tile_x = tile_x;
        self.tile_y = tile_y;
        self.x = tile_x as f32;
        self.y = tile_y as f32;
    }

    /// Sprite lookup key, e.g. `girl/walk_left_2`
    pub fn sprite_key(&self) -> String {
        let dir = self.direction.as_str();
        let gender = self.gender.as_str();
        match self.frame {
            SpriteFrame::Idle => format!("{}/{}", gender, dir),
            SpriteFrame::StepOne => format!("{}/walk_{}_1", gender, dir),
            SpriteFrame::StepTwo => format!("{}/walk_{}_2", gender, dir),
        }
    }
}
