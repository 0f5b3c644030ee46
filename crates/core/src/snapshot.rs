use serde::{Deserialize, Serialize};

use crate::shape::Shape;
use crate::types::{Cell, GameStatus, ShapeKind};
use crate::well::Well;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeSnapshot {
    pub kind: Option<ShapeKind>,
    pub cells: Vec<Vec<Cell>>,
}

impl From<&Shape> for ShapeSnapshot {
    fn from(value: &Shape) -> Self {
        Self {
            kind: value.kind(),
            cells: value.to_rows(),
        }
    }
}

/// Read-only view of an engine, suitable for a view layer or the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub status: GameStatus,
    pub well_width: usize,
    pub well_height: usize,
    pub well: Vec<Vec<Cell>>,
    pub current: Option<ShapeSnapshot>,
    pub current_x: i32,
    pub current_y: i32,
    pub previous: ShapeSnapshot,
    pub previous_x: i32,
    pub previous_y: i32,
    pub next: Option<ShapeSnapshot>,
    pub dropping: bool,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub pieces_locked: u32,
}

impl EngineSnapshot {
    pub fn playable(&self) -> bool {
        self.status == GameStatus::Running && !self.dropping
    }

    /// Rebuild the well grid (e.g. to seed another engine)
    pub fn well_grid(&self) -> Option<Well> {
        Well::from_rows(self.well.as_slice()).ok()
    }
}
