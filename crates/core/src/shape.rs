//! Shape module - one tetromino in one orientation
//!
//! A shape is a small rectangular occupancy grid (at most 4x4) where `0` is
//! empty and any other value is the colour id of the piece. Width and height
//! are always read off the grid itself, so they can never disagree with it.
//!
//! Rotation is a matrix transform: transpose, then reverse the column order
//! (clockwise) or the row order (counter-clockwise). Four rotations in the
//! same direction give back the original grid.

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::types::{Cell, ShapeKind, EMPTY_CELL};

/// Largest extent of a shape grid in either direction
pub const MAX_SHAPE_EXTENT: usize = 4;

/// One row of a shape grid
pub type ShapeRow = ArrayVec<Cell, MAX_SHAPE_EXTENT>;

/// Row-major shape grid, row 0 at the top
pub type ShapeGrid = ArrayVec<ShapeRow, MAX_SHAPE_EXTENT>;

/// Rejected input for [`Shape::from_rows`]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ShapeError {
    #[error("shape grid is {width}x{height}, at most {max}x{max} is supported", max = MAX_SHAPE_EXTENT)]
    TooLarge { width: usize, height: usize },
    #[error("shape row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("shape rows must not be empty")]
    EmptyRow,
    #[error("cell value {0} is not a known colour id")]
    UnknownColor(Cell),
    #[error("shape mixes colour ids {first} and {found}")]
    MixedColors { first: Cell, found: Cell },
}

/// A tetromino in one rotation state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    kind: Option<ShapeKind>,
    cells: ShapeGrid,
}

impl Shape {
    /// Canonical spawn grid for `kind`
    pub fn new(kind: ShapeKind) -> Self {
        let mask: &[&[Cell]] = match kind {
            ShapeKind::I => &[&[1], &[1], &[1], &[1]],
            ShapeKind::J => &[&[0, 1], &[0, 1], &[1, 1]],
            ShapeKind::L => &[&[1, 0], &[1, 0], &[1, 1]],
            ShapeKind::O => &[&[1, 1], &[1, 1]],
            ShapeKind::T => &[&[1, 1, 1], &[0, 1, 0]],
            ShapeKind::S => &[&[0, 1, 1], &[1, 1, 0]],
            ShapeKind::Z => &[&[1, 1, 0], &[0, 1, 1]],
        };
        let color = kind.color_id();

        Self {
            kind: Some(kind),
            cells: mask
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|&bit| if bit == 0 { EMPTY_CELL } else { color })
                        .collect()
                })
                .collect(),
        }
    }

    /// Placeholder 0x0 shape, only used as the "previous orientation" holder
    /// before the first real shape is spawned.
    pub fn empty() -> Self {
        Self {
            kind: None,
            cells: ShapeGrid::new(),
        }
    }

    /// Build a shape from an arbitrary rectangular grid.
    ///
    /// The kind is taken from the occupied cells' colour id, which must be
    /// the same for every cell.
    pub fn from_rows<R: AsRef<[Cell]>>(rows: &[R]) -> Result<Self, ShapeError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if height > MAX_SHAPE_EXTENT || width > MAX_SHAPE_EXTENT {
            return Err(ShapeError::TooLarge { width, height });
        }
        if height > 0 && width == 0 {
            return Err(ShapeError::EmptyRow);
        }

        let mut cells = ShapeGrid::new();
        let mut kind = None;
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(ShapeError::Ragged {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for &value in row {
                if value == EMPTY_CELL {
                    continue;
                }
                let found = ShapeKind::from_color_id(value).ok_or(ShapeError::UnknownColor(value))?;
                let first = *kind.get_or_insert(found);
                if first != found {
                    return Err(ShapeError::MixedColors {
                        first: first.color_id(),
                        found: value,
                    });
                }
            }
            cells.push(row.iter().copied().collect());
        }

        Ok(Self { kind, cells })
    }

    /// Kind this shape was built from (None for the placeholder)
    pub fn kind(&self) -> Option<ShapeKind> {
        self.kind
    }

    /// Number of columns in the grid
    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, |row| row.len())
    }

    /// Number of rows in the grid
    pub fn height(&self) -> usize {
        self.cells.len()
    }

    /// True when no cell is occupied (the placeholder)
    pub fn is_empty(&self) -> bool {
        self.occupied_count() == 0
    }

    /// Grid access; out-of-range reads are empty
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(EMPTY_CELL)
    }

    /// Rows of the grid, top first
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.iter().map(|row| row.as_slice())
    }

    /// Occupied cells as `(row, col, colour)`
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(x, &value)| (value != EMPTY_CELL).then_some((y, x, value)))
        })
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }

    /// Copy of the grid as nested vectors
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.rows().map(|row| row.to_vec()).collect()
    }

    /// Rotate 90 degrees clockwise in place
    pub fn rotate_clockwise(&mut self) {
        self.transpose();
        if self.width() > 1 {
            self.reverse_columns();
        }
    }

    /// Rotate 90 degrees counter-clockwise in place
    pub fn rotate_anticlockwise(&mut self) {
        self.transpose();
        if self.height() > 1 {
            self.reverse_rows();
        }
    }

    fn transpose(&mut self) {
        let (width, height) = (self.width(), self.height());
        let mut transposed = ShapeGrid::new();
        for x in 0..width {
            transposed.push((0..height).map(|y| self.cells[y][x]).collect());
        }
        self.cells = transposed;
    }

    fn reverse_columns(&mut self) {
        for row in &mut self.cells {
            row.reverse();
        }
    }

    fn reverse_rows(&mut self) {
        self.cells.reverse();
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(shape: &Shape) -> Vec<Vec<Cell>> {
        shape.to_rows()
    }

    #[test]
    fn test_i_shape_dimensions() {
        let shape = Shape::new(ShapeKind::I);
        assert_eq!(shape.width(), 1);
        assert_eq!(shape.height(), 4);
        assert_eq!(shape.kind(), Some(ShapeKind::I));
    }

    #[test]
    fn test_canonical_grids_use_kind_color() {
        for kind in ShapeKind::ALL {
            let shape = Shape::new(kind);
            assert_eq!(shape.occupied_count(), 4, "{:?}", kind);
            assert!(shape.occupied().all(|(_, _, v)| v == kind.color_id()));
        }
    }

    #[test]
    fn test_empty_placeholder() {
        let mut shape = Shape::empty();
        assert_eq!(shape.width(), 0);
        assert_eq!(shape.height(), 0);
        assert!(shape.is_empty());
        assert_eq!(shape.kind(), None);

        // Rotating a placeholder is harmless
        shape.rotate_clockwise();
        shape.rotate_anticlockwise();
        assert_eq!(shape, Shape::empty());
    }

    #[test]
    fn test_rotate_j_clockwise() {
        let mut shape = Shape::new(ShapeKind::J);
        shape.rotate_clockwise();
        assert_eq!(grid(&shape), vec![vec![6, 0, 0], vec![6, 6, 6]]);
        assert_eq!(shape.width(), 3);
        assert_eq!(shape.height(), 2);
    }

    #[test]
    fn test_rotate_l_anticlockwise() {
        let mut shape = Shape::new(ShapeKind::L);
        shape.rotate_anticlockwise();
        assert_eq!(grid(&shape), vec![vec![0, 0, 7], vec![7, 7, 7]]);
    }

    #[test]
    fn test_rotate_i_becomes_row() {
        let mut cw = Shape::new(ShapeKind::I);
        cw.rotate_clockwise();
        assert_eq!(grid(&cw), vec![vec![1, 1, 1, 1]]);

        let mut ccw = Shape::new(ShapeKind::I);
        ccw.rotate_anticlockwise();
        assert_eq!(grid(&ccw), vec![vec![1, 1, 1, 1]]);
    }

    #[test]
    fn test_rotate_t_anticlockwise() {
        let mut shape = Shape::new(ShapeKind::T);
        shape.rotate_anticlockwise();
        assert_eq!(grid(&shape), vec![vec![3, 0], vec![3, 3], vec![3, 0]]);
    }

    #[test]
    fn test_from_rows_infers_kind() {
        let shape = Shape::from_rows(&[[0u8, 5], [5, 5], [5, 0]]).unwrap();
        assert_eq!(shape.kind(), Some(ShapeKind::Z));
        assert_eq!(shape.width(), 2);
        assert_eq!(shape.height(), 3);
    }

    #[test]
    fn test_from_rows_rejects_bad_grids() {
        let ragged: [&[Cell]; 2] = [&[1, 1], &[1]];
        assert_eq!(
            Shape::from_rows(&ragged),
            Err(ShapeError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            Shape::from_rows(&[[1u8; 5]]),
            Err(ShapeError::TooLarge {
                width: 5,
                height: 1
            })
        );
        assert_eq!(Shape::from_rows(&[[9u8]]), Err(ShapeError::UnknownColor(9)));
        assert_eq!(
            Shape::from_rows(&[[1u8, 2]]),
            Err(ShapeError::MixedColors { first: 1, found: 2 })
        );
        let no_cols: [&[Cell]; 1] = [&[]];
        assert_eq!(Shape::from_rows(&no_cols), Err(ShapeError::EmptyRow));
    }

    #[test]
    fn test_cell_out_of_range_is_empty() {
        let shape = Shape::new(ShapeKind::O);
        assert_eq!(shape.cell(0, 0), 2);
        assert_eq!(shape.cell(5, 0), EMPTY_CELL);
        assert_eq!(shape.cell(0, 5), EMPTY_CELL);
    }
}
