//! Engine module - session state machine
//!
//! The engine owns the well, the active and next shapes, score bookkeeping and
//! the command state machine (`NotStarted -> Running -> GameOver`). It owns no
//! thread and no timer: after every state change it publishes the single
//! one-shot timer it wants armed ([`Engine::pending_timer`]) and whoever
//! drives it calls [`Engine::timer_elapsed`] when that timer fires.
//!
//! Two timers exist. The gravity timer moves the active shape down one row
//! and always re-arms itself after firing. A manual drop swaps it for the
//! much shorter drop-step timer until the shape lands, then re-arms gravity
//! with a full interval. Because every drop row is a separate firing, an
//! `EndGame` command is honoured between rows.
//!
//! State changes are announced on [`Notification`] channels obtained from
//! [`Engine::subscribe`].

use std::sync::mpsc;
use std::time::Duration;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, EngineConfig};
use crate::rng::{self, RandomSource};
use crate::scoring::ScoreBoard;
use crate::shape::Shape;
use crate::snapshot::{EngineSnapshot, ShapeSnapshot};
use crate::types::{GameStatus, Notification, PlayerInput, TimerKind};
use crate::well::{Well, WellError};

/// One-shot timer the engine wants armed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerRequest {
    pub kind: TimerKind,
    pub after: Duration,
    /// Bumped on every (re)arm; a driver restarts its countdown whenever it
    /// sees a new value.
    pub generation: u64,
}

/// Rules engine for one game session
#[derive(Debug)]
pub struct Engine<R: RandomSource> {
    config: EngineConfig,
    rng: R,
    well: Well,
    status: GameStatus,
    current: Option<Shape>,
    current_x: i32,
    current_y: i32,
    /// Orientation and position just before the last move, for erase-then-draw
    previous: Shape,
    previous_x: i32,
    previous_y: i32,
    next: Option<Shape>,
    scores: ScoreBoard,
    pieces_locked: u32,
    dropping: bool,
    timer: Option<TimerRequest>,
    timer_generation: u64,
    subscribers: Vec<mpsc::Sender<Notification>>,
}

impl<R: RandomSource> Engine<R> {
    /// Engine with default timing and a `width` x `height` well
    pub fn new(rng: R, width: usize, height: usize) -> Result<Self, ConfigError> {
        Self::with_config(rng, EngineConfig::with_well(width, height))
    }

    pub fn with_config(rng: R, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            well: Self::make_empty_well(config.well_width, config.well_height)?,
            config,
            rng,
            status: GameStatus::NotStarted,
            current: None,
            current_x: 0,
            current_y: 0,
            previous: Shape::empty(),
            previous_x: 0,
            previous_y: 0,
            next: None,
            scores: ScoreBoard::default(),
            pieces_locked: 0,
            dropping: false,
            timer: None,
            timer_generation: 0,
            subscribers: Vec::new(),
        })
    }

    /// An all-zero well of the given size
    pub fn make_empty_well(width: usize, height: usize) -> Result<Well, WellError> {
        Well::new(width, height)
    }

    /// Register a notification receiver. Dropped receivers are pruned on the
    /// next notification.
    pub fn subscribe(&mut self) -> mpsc::Receiver<Notification> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    // ---------------------------------------------------------------------
    // Queried state
    // ---------------------------------------------------------------------

    /// Lifecycle state
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// The settled cells; the active shape is not part of it
    pub fn well(&self) -> &Well {
        &self.well
    }

    /// Active shape, None before the game starts
    pub fn current_shape(&self) -> Option<&Shape> {
        self.current.as_ref()
    }

    /// Anchor `(x, y)` of the active shape
    pub fn current_position(&self) -> (i32, i32) {
        (self.current_x, self.current_y)
    }

    /// Orientation before the last move or rotation
    pub fn previous_shape(&self) -> &Shape {
        &self.previous
    }

    /// Anchor before the last move
    pub fn previous_position(&self) -> (i32, i32) {
        (self.previous_x, self.previous_y)
    }

    /// Shape that spawns after the current one locks
    pub fn next_shape(&self) -> Option<&Shape> {
        self.next.as_ref()
    }

    /// Total points
    pub fn score(&self) -> u32 {
        self.scores.score
    }

    /// Current level (0 until the game starts)
    pub fn level(&self) -> u32 {
        self.scores.level
    }

    /// Rows cleared so far
    pub fn lines(&self) -> u32 {
        self.scores.lines
    }

    /// Shapes committed to the well so far
    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    /// Whether a manual drop is in progress
    pub fn is_dropping(&self) -> bool {
        self.dropping
    }

    /// Gravity tick period; constant for the whole session
    pub fn movement_interval(&self) -> Duration {
        self.config.movement_interval()
    }

    /// Pause between rows of a manual drop
    pub fn drop_step_interval(&self) -> Duration {
        self.config.drop_step_interval()
    }

    /// Timer the driver should have armed, if any
    pub fn pending_timer(&self) -> Option<TimerRequest> {
        self.timer
    }

    /// Copy of the whole visible state
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            status: self.status,
            well_width: self.well.width(),
            well_height: self.well.height(),
            well: self.well.to_rows(),
            current: self.current.as_ref().map(ShapeSnapshot::from),
            current_x: self.current_x,
            current_y: self.current_y,
            previous: ShapeSnapshot::from(&self.previous),
            previous_x: self.previous_x,
            previous_y: self.previous_y,
            next: self.next.as_ref().map(ShapeSnapshot::from),
            dropping: self.dropping,
            score: self.scores.score,
            level: self.scores.level,
            lines: self.scores.lines,
            pieces_locked: self.pieces_locked,
        }
    }

    /// Replace the well contents with a copy of `well` (fixtures, replays).
    pub fn set_well(&mut self, well: &Well) -> Result<(), ConfigError> {
        if well.width() != self.well.width() || well.height() != self.well.height() {
            return Err(ConfigError::WellSizeMismatch {
                width: self.well.width(),
                height: self.well.height(),
                found_width: well.width(),
                found_height: well.height(),
            });
        }
        self.well.clone_from(well);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Geometry
    // ---------------------------------------------------------------------

    /// Single legality check for spawning, gravity, movement, rotation and drops
    pub fn shape_will_fit(&self, shape: &Shape, x: i32, y: i32) -> bool {
        self.well.shape_will_fit(shape, x, y)
    }

    /// Commit `shape` into the well; off-well cells are skipped
    pub fn apply_shape_to_well(&mut self, shape: &Shape, x: i32, y: i32) {
        self.well.apply_shape(shape, x, y);
    }

    /// Uniform kind with 0..=3 clockwise rotations, drawn from the injected source
    pub fn random_shape(&mut self) -> Shape {
        rng::random_shape(&mut self.rng).0
    }

    // ---------------------------------------------------------------------
    // Session
    // ---------------------------------------------------------------------

    /// `NotStarted -> Running`: reset counters, spawn the first shape and arm
    /// gravity. Returns false if the session was already started.
    pub fn start_game(&mut self) -> bool {
        if self.status != GameStatus::NotStarted {
            debug!("start_game ignored in state {}", self.status.as_str());
            return false;
        }

        self.scores = ScoreBoard::starting();
        self.next = Some(self.random_shape());
        self.spawn_next();
        self.status = GameStatus::Running;
        self.arm(TimerKind::Gravity);

        info!(
            "game started on a {}x{} well",
            self.well.width(),
            self.well.height()
        );
        self.shape_updated();
        true
    }

    /// Dispatch one player command. Returns true if anything changed.
    ///
    /// Commands are no-ops outside `Running`. While a drop is in progress
    /// only `EndGame` is accepted.
    pub fn handle_input(&mut self, input: PlayerInput) -> bool {
        if self.status != GameStatus::Running {
            debug!(
                "{} ignored in state {}",
                input.as_str(),
                self.status.as_str()
            );
            return false;
        }
        if self.dropping && input != PlayerInput::EndGame {
            debug!("{} ignored during drop", input.as_str());
            return false;
        }

        match input {
            PlayerInput::MoveShapeLeft => self.try_shift(-1),
            PlayerInput::MoveShapeRight => self.try_shift(1),
            PlayerInput::RotateShapeClockwise => self.try_rotate(true),
            PlayerInput::RotateShapeAntiClockwise => self.try_rotate(false),
            PlayerInput::DropShape => self.begin_drop(),
            PlayerInput::EndGame => self.end_game(),
        }
    }

    /// Fire the pending timer. Firing with nothing armed is a no-op.
    pub fn timer_elapsed(&mut self) -> bool {
        if self.status != GameStatus::Running {
            self.timer = None;
            return false;
        }
        let Some(timer) = self.timer.take() else {
            return false;
        };

        match timer.kind {
            TimerKind::Gravity => self.gravity_tick(),
            TimerKind::DropStep => self.drop_step(),
        }
    }

    /// Move down one row, or lock if blocked; then re-arm gravity
    fn gravity_tick(&mut self) -> bool {
        if self.current.is_none() {
            return false;
        }

        if self.fits_at(0, 1) {
            self.record_previous();
            self.current_y += 1;
            trace!("gravity: y={}", self.current_y);
            self.shape_updated();
        } else {
            self.lock_current();
        }

        self.arm(TimerKind::Gravity);
        true
    }

    fn try_shift(&mut self, dx: i32) -> bool {
        if !self.fits_at(dx, 0) {
            return false;
        }

        self.record_previous();
        self.current_x += dx;
        self.shape_updated();
        true
    }

    /// Rotate in place at the current anchor; no kicks
    fn try_rotate(&mut self, clockwise: bool) -> bool {
        let Some(current) = self.current.as_ref() else {
            return false;
        };

        let mut candidate = current.clone();
        if clockwise {
            candidate.rotate_clockwise();
        } else {
            candidate.rotate_anticlockwise();
        }

        if !self.shape_will_fit(&candidate, self.current_x, self.current_y) {
            return false;
        }

        self.record_previous();
        self.current = Some(candidate);
        self.shape_updated();
        true
    }

    fn begin_drop(&mut self) -> bool {
        if self.current.is_none() {
            return false;
        }

        debug!("drop from y={}", self.current_y);
        self.dropping = true;
        self.drop_step()
    }

    /// One row of a manual drop, or the lock that ends it
    fn drop_step(&mut self) -> bool {
        if self.fits_at(0, 1) {
            self.record_previous();
            self.current_y += 1;
            self.shape_updated();
            self.arm(TimerKind::DropStep);
        } else {
            self.dropping = false;
            self.lock_current();
            // A full interval, so the next piece doesn't get an early tick
            self.arm(TimerKind::Gravity);
        }
        true
    }

    fn end_game(&mut self) -> bool {
        self.status = GameStatus::GameOver;
        self.dropping = false;
        self.timer = None;

        info!(
            "game over: score={} level={} lines={}",
            self.scores.score, self.scores.level, self.scores.lines
        );
        self.notify(Notification::GameOver);
        true
    }

    /// Commit the active shape, clear complete rows, spawn the next shape
    fn lock_current(&mut self) {
        let Some(shape) = self.current.take() else {
            return;
        };

        self.well.apply_shape(&shape, self.current_x, self.current_y);
        self.pieces_locked += 1;
        debug!(
            "locked {:?} at ({}, {})",
            shape.kind(),
            self.current_x,
            self.current_y
        );

        let cleared = self.well.clear_complete_rows();
        if cleared > 0 {
            let points = self.scores.record_clear(cleared);
            info!(
                "cleared {} row(s) for {} points, score={} level={}",
                cleared, points, self.scores.score, self.scores.level
            );
            self.well_updated();
        }

        self.spawn_next();
        self.shape_updated();
    }

    /// Promote `next` to current at the top centre and draw a new `next`
    fn spawn_next(&mut self) {
        let shape = match self.next.take() {
            Some(shape) => shape,
            None => self.random_shape(),
        };

        self.current_x = (self.well.width() as i32 - shape.width() as i32) / 2;
        self.current_y = -1;
        self.previous.clone_from(&shape);
        self.previous_x = self.current_x;
        self.previous_y = self.current_y;
        debug!("spawned {:?} at x={}", shape.kind(), self.current_x);

        self.current = Some(shape);
        self.next = Some(self.random_shape());
    }

    fn fits_at(&self, dx: i32, dy: i32) -> bool {
        self.current.as_ref().is_some_and(|shape| {
            self.shape_will_fit(shape, self.current_x + dx, self.current_y + dy)
        })
    }

    fn record_previous(&mut self) {
        if let Some(current) = &self.current {
            self.previous.clone_from(current);
        }
        self.previous_x = self.current_x;
        self.previous_y = self.current_y;
    }

    fn arm(&mut self, kind: TimerKind) {
        self.timer_generation += 1;
        let after = match kind {
            TimerKind::Gravity => self.config.movement_interval(),
            TimerKind::DropStep => self.config.drop_step_interval(),
        };
        self.timer = Some(TimerRequest {
            kind,
            after,
            generation: self.timer_generation,
        });
    }

    fn shape_updated(&mut self) {
        self.notify(Notification::ShapeUpdated {
            level: self.scores.level,
            score: self.scores.score,
        });
    }

    fn well_updated(&mut self) {
        self.notify(Notification::WellUpdated {
            level: self.scores.level,
            score: self.scores.score,
        });
    }

    fn notify(&mut self, notification: Notification) {
        self.subscribers.retain(|tx| tx.send(notification).is_ok());
    }
}
