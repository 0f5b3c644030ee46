//! Scoring module - score and level bookkeeping for line clears
//!
//! Only line clears move the counters, and neither counter ever decreases.
//! Gravity speed is not tied to the level.

use crate::types::{LINES_PER_LEVEL, LINE_SCORES};

/// Points for clearing `rows` rows with one lock at `level`.
/// More than four rows (only possible on a seeded well) scores as four.
pub fn calculate_line_score(rows: usize, level: u32) -> u32 {
    LINE_SCORES[rows.min(LINE_SCORES.len() - 1)].saturating_mul(level)
}

/// Level reached after `lines` total cleared rows (levels start at 1)
pub fn level_for_lines(lines: u32) -> u32 {
    1 + lines / LINES_PER_LEVEL
}

/// Running score/level/lines counters for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBoard {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
}

impl ScoreBoard {
    /// Counters at the start of a game
    pub fn starting() -> Self {
        Self {
            score: 0,
            level: level_for_lines(0),
            lines: 0,
        }
    }

    /// Record one lock that removed `rows` rows; returns the points awarded
    pub fn record_clear(&mut self, rows: usize) -> u32 {
        if rows == 0 {
            return 0;
        }

        let points = calculate_line_score(rows, self.level);
        self.score = self.score.saturating_add(points);
        self.lines = self.lines.saturating_add(rows as u32);
        self.level = self.level.max(level_for_lines(self.lines));
        points
    }
}
