//! Shared types - plain data passed between the engine and whatever drives it
//!
//! Everything here is pure data: shape kinds and their colour ids, the player
//! command set, session status, notifications and timer requests. The engine
//! (`falling-blocks-core`) and the runtime (`falling-blocks-runtime`) both
//! depend on this crate; a view layer only ever needs these types plus a
//! snapshot of the engine.
//!
//! # Well dimensions
//!
//! The classic well is 10 columns by 20 rows, row 0 at the top. The engine
//! accepts any size up to [`MAX_WELL_DIMENSION`] in either direction.
//!
//! # Timing constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `STARTING_MOVEMENT_INTERVAL_MS` | 500 | Gravity tick period (constant for the whole session) |
//! | `DROP_STEP_INTERVAL_MS` | 10 | Pause between rows during a manual drop |
//!
//! # Examples
//!
//! ```
//! use falling_blocks_types::{PlayerInput, ShapeKind};
//!
//! assert_eq!(ShapeKind::from_str("z"), Some(ShapeKind::Z));
//! assert_eq!(ShapeKind::Z.color_id(), 5);
//! assert_eq!(ShapeKind::from_color_id(5), Some(ShapeKind::Z));
//!
//! let input = PlayerInput::from_str("dropShape").unwrap();
//! assert_eq!(input, PlayerInput::DropShape);
//! ```

use serde::{Deserialize, Serialize};

/// Default well width in cells
pub const DEFAULT_WELL_WIDTH: usize = 10;

/// Default well height in cells
pub const DEFAULT_WELL_HEIGHT: usize = 20;

/// Upper bound for either well dimension
pub const MAX_WELL_DIMENSION: usize = 1024;

/// Gravity tick period in milliseconds
pub const STARTING_MOVEMENT_INTERVAL_MS: u64 = 500;

/// Pause between rows while a manual drop is in progress
pub const DROP_STEP_INTERVAL_MS: u64 = 10;

/// Points for clearing 0..=4 rows with one lock, multiplied by the level
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Cleared rows needed to advance one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Contents of one well or shape cell: `0` is empty, otherwise a colour id
pub type Cell = u8;

/// Empty cell value
pub const EMPTY_CELL: Cell = 0;

/// The seven tetromino kinds
///
/// Each kind owns a fixed colour id used for every cell of the piece:
/// I=1, O=2, T=3, S=4, Z=5, J=6, L=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl ShapeKind {
    /// All kinds, ordered by colour id
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::J,
        ShapeKind::L,
    ];

    /// Colour id written into the well for this kind
    pub const fn color_id(self) -> Cell {
        match self {
            ShapeKind::I => 1,
            ShapeKind::O => 2,
            ShapeKind::T => 3,
            ShapeKind::S => 4,
            ShapeKind::Z => 5,
            ShapeKind::J => 6,
            ShapeKind::L => 7,
        }
    }

    /// Reverse of [`ShapeKind::color_id`]
    pub fn from_color_id(id: Cell) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.color_id() == id)
    }

    /// Parse kind from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(ShapeKind::I),
            "o" => Some(ShapeKind::O),
            "t" => Some(ShapeKind::T),
            "s" => Some(ShapeKind::S),
            "z" => Some(ShapeKind::Z),
            "j" => Some(ShapeKind::J),
            "l" => Some(ShapeKind::L),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::I => "i",
            ShapeKind::O => "o",
            ShapeKind::T => "t",
            ShapeKind::S => "s",
            ShapeKind::Z => "z",
            ShapeKind::J => "j",
            ShapeKind::L => "l",
        }
    }
}

/// Player commands accepted by the engine
///
/// None of them take parameters; each is dispatched synchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerInput {
    MoveShapeLeft,
    MoveShapeRight,
    DropShape,
    RotateShapeClockwise,
    RotateShapeAntiClockwise,
    EndGame,
}

impl PlayerInput {
    pub const ALL: [PlayerInput; 6] = [
        PlayerInput::MoveShapeLeft,
        PlayerInput::MoveShapeRight,
        PlayerInput::DropShape,
        PlayerInput::RotateShapeClockwise,
        PlayerInput::RotateShapeAntiClockwise,
        PlayerInput::EndGame,
    ];

    /// Parse command from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveshapeleft" | "left" => Some(PlayerInput::MoveShapeLeft),
            "moveshaperight" | "right" => Some(PlayerInput::MoveShapeRight),
            "dropshape" | "drop" => Some(PlayerInput::DropShape),
            "rotateshapeclockwise" | "cw" => Some(PlayerInput::RotateShapeClockwise),
            "rotateshapeanticlockwise" | "ccw" => Some(PlayerInput::RotateShapeAntiClockwise),
            "endgame" | "quit" => Some(PlayerInput::EndGame),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerInput::MoveShapeLeft => "moveShapeLeft",
            PlayerInput::MoveShapeRight => "moveShapeRight",
            PlayerInput::DropShape => "dropShape",
            PlayerInput::RotateShapeClockwise => "rotateShapeClockwise",
            PlayerInput::RotateShapeAntiClockwise => "rotateShapeAntiClockwise",
            PlayerInput::EndGame => "endGame",
        }
    }
}

/// Session lifecycle: `NotStarted -> Running -> GameOver`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    Running,
    GameOver,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::NotStarted => "not_started",
            GameStatus::Running => "running",
            GameStatus::GameOver => "game_over",
        }
    }
}

/// Notifications raised by the engine after a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// The active piece moved, rotated or was replaced; redraw the
    /// previous/current diff.
    ShapeUpdated { level: u32, score: u32 },
    /// Well contents changed independently of the active piece (line clears).
    WellUpdated { level: u32, score: u32 },
    /// The session ended. No further commands are meaningful.
    GameOver,
}

/// Which one-shot timer the engine wants armed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Regular gravity tick at the movement interval
    Gravity,
    /// Next row of a manual drop
    DropStep,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_ids_are_distinct_and_nonzero() {
        let mut seen = Vec::new();
        for kind in ShapeKind::ALL {
            let id = kind.color_id();
            assert_ne!(id, EMPTY_CELL);
            assert!(!seen.contains(&id), "duplicate colour id {}", id);
            seen.push(id);
        }
    }

    #[test]
    fn color_id_roundtrip() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_color_id(kind.color_id()), Some(kind));
        }
        assert_eq!(ShapeKind::from_color_id(0), None);
        assert_eq!(ShapeKind::from_color_id(8), None);
    }

    #[test]
    fn player_input_parse_names() {
        for input in PlayerInput::ALL {
            assert_eq!(PlayerInput::from_str(input.as_str()), Some(input));
        }
        assert_eq!(PlayerInput::from_str("CW"), Some(PlayerInput::RotateShapeClockwise));
        assert_eq!(PlayerInput::from_str("hold"), None);
    }

    #[test]
    fn notification_serializes_tagged() {
        let json = serde_json::to_string(&Notification::WellUpdated { level: 2, score: 80 })
            .unwrap();
        assert_eq!(json, r#"{"type":"well_updated","level":2,"score":80}"#);
        let back: Notification = serde_json::from_str(r#"{"type":"game_over"}"#).unwrap();
        assert_eq!(back, Notification::GameOver);
    }

    #[test]
    fn default_timing() {
        assert_eq!(STARTING_MOVEMENT_INTERVAL_MS, 500);
        assert_eq!(DROP_STEP_INTERVAL_MS, 10);
        assert!(DROP_STEP_INTERVAL_MS < STARTING_MOVEMENT_INTERVAL_MS);
    }
}
