//! Well module - the playing field grid
//!
//! The well is `height` rows by `width` columns of colour ids, row 0 at the
//! top. Storage is a flat row-major vector; the size is fixed at construction.
//!
//! Shapes are positioned by an *anchor*: `(x, y)` is where the shape's bottom
//! row sits. A shape cell at local `(row, col)` lands on well column `x + col`
//! and well row `y - (shape.height - 1 - row)`. Rows above the top edge
//! (negative) are legal while a piece is entering the well; they are never
//! collided against or written.

use thiserror::Error;

use crate::shape::Shape;
use crate::types::{Cell, ShapeKind, EMPTY_CELL, MAX_WELL_DIMENSION};

/// Rejected input when building a well from caller-supplied rows
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WellError {
    #[error("well must be at least 1x1 and at most {max}x{max}, got {width}x{height}", max = MAX_WELL_DIMENSION)]
    BadDimensions { width: usize, height: usize },
    #[error("well row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("well cell ({x}, {y}) holds {value}, which is not a known colour id")]
    UnknownColor { x: usize, y: usize, value: Cell },
}

fn dimensions_ok(width: usize, height: usize) -> bool {
    (1..=MAX_WELL_DIMENSION).contains(&width) && (1..=MAX_WELL_DIMENSION).contains(&height)
}

/// Empty, or the colour id of one of the seven kinds
fn is_cell_value(value: Cell) -> bool {
    value == EMPTY_CELL || ShapeKind::from_color_id(value).is_some()
}

/// Well coordinates `(x, y, colour)` of every occupied cell of `shape`
/// anchored at `(x, y)`. Coordinates may lie outside the well.
pub fn anchored_cells(shape: &Shape, x: i32, y: i32) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
    let bottom = shape.height() as i32 - 1;
    shape
        .occupied()
        .map(move |(row, col, value)| (x + col as i32, y - (bottom - row as i32), value))
}

/// The playing field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Well {
    width: usize,
    height: usize,
    /// Row-major (y * width + x)
    cells: Vec<Cell>,
}

impl Well {
    /// An all-empty well of the given size
    pub fn new(width: usize, height: usize) -> Result<Self, WellError> {
        if !dimensions_ok(width, height) {
            return Err(WellError::BadDimensions { width, height });
        }

        Ok(Self {
            width,
            height,
            cells: vec![EMPTY_CELL; width * height],
        })
    }

    /// Copy rows into a new well, checking shape and colour ids
    pub fn from_rows<R: AsRef<[Cell]>>(rows: &[R]) -> Result<Self, WellError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if !dimensions_ok(width, height) {
            return Err(WellError::BadDimensions { width, height });
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(WellError::Ragged {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, &value) in row.iter().enumerate() {
                if !is_cell_value(value) {
                    return Err(WellError::UnknownColor { x, y, value });
                }
            }
            cells.extend_from_slice(row);
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Cell at `(x, y)`, or None when out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at `(x, y)`. Returns false, writing nothing, when out of
    /// bounds or when `value` is not a colour id.
    pub fn set(&mut self, x: i32, y: i32, value: Cell) -> bool {
        if !is_cell_value(value) {
            return false;
        }
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    /// Row `y` as a slice
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        Some(&self.cells[start..start + self.width])
    }

    /// Rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width)
    }

    /// Copy of the grid as nested vectors
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.rows().map(|row| row.to_vec()).collect()
    }

    /// True when no cell is occupied
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&cell| cell == EMPTY_CELL)
    }

    /// Whether `shape` anchored at `(x, y)` is a legal position.
    ///
    /// Fails when an occupied cell leaves the side walls, sinks below the
    /// floor, or overlaps a filled well cell. Cells above the top edge pass.
    pub fn shape_will_fit(&self, shape: &Shape, x: i32, y: i32) -> bool {
        anchored_cells(shape, x, y).all(|(well_x, well_y, _)| {
            if well_x < 0 || well_x >= self.width as i32 || well_y > self.height as i32 - 1 {
                return false;
            }

            well_y < 0 || self.get(well_x, well_y) == Some(EMPTY_CELL)
        })
    }

    /// Write the shape's colour ids into the well.
    ///
    /// Cells that map outside the well are skipped, never clamped or wrapped.
    pub fn apply_shape(&mut self, shape: &Shape, x: i32, y: i32) {
        for (well_x, well_y, value) in anchored_cells(shape, x, y) {
            self.set(well_x, well_y, value);
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_complete(&self, y: usize) -> bool {
        self.row(y)
            .is_some_and(|row| !row.is_empty() && row.iter().all(|&cell| cell != EMPTY_CELL))
    }

    /// Remove row `y`: every row above shifts down by one and row 0 is cleared
    pub fn collapse_row(&mut self, y: usize) {
        if y >= self.height {
            return;
        }

        let width = self.width;
        for row in (1..=y).rev() {
            let src_start = (row - 1) * width;
            self.cells
                .copy_within(src_start..src_start + width, row * width);
        }

        self.cells[..width].fill(EMPTY_CELL);
    }

    /// Scan from the bottom row upward, collapsing every complete row.
    ///
    /// After a collapse the same index is examined again since a new row has
    /// slid into it. Returns the number of rows removed.
    pub fn clear_complete_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = self.height;

        while y > 0 {
            if self.is_row_complete(y - 1) {
                self.collapse_row(y - 1);
                cleared += 1;
            } else {
                y -= 1;
            }
        }

        cleared
    }
}
