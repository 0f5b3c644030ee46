//! Core rules engine - pure, deterministic, and testable
//!
//! This crate holds the whole rule set of the falling-block game and nothing
//! else. It has no dependencies on rendering, input devices or clocks:
//!
//! - **Deterministic**: the random source is injected, so a seed replays a game
//! - **Timer-agnostic**: the engine asks for timers, it never sleeps
//! - **Observable**: state changes are pushed to subscribed channels
//!
//! # Module Structure
//!
//! - [`shape`]: tetromino grids and matrix rotation
//! - [`well`]: the playing field, fit test, shape commit and row clearing
//! - [`rng`]: injectable random source and shape selection
//! - [`scoring`]: line-clear score and level bookkeeping
//! - [`engine`]: session state machine, gravity, drops and notifications
//! - [`config`]: well size and timing
//! - [`snapshot`]: serializable read-only view of an engine
//!
//! # Example
//!
//! ```
//! use falling_blocks_core::{Engine, SimpleRng};
//! use falling_blocks_types::{GameStatus, PlayerInput, TimerKind};
//!
//! let mut engine = Engine::new(SimpleRng::new(12345), 10, 20).unwrap();
//! let notifications = engine.subscribe();
//! engine.start_game();
//!
//! engine.handle_input(PlayerInput::MoveShapeLeft);
//! assert_eq!(engine.pending_timer().unwrap().kind, TimerKind::Gravity);
//!
//! // The driver owns the clock
//! engine.timer_elapsed();
//!
//! engine.handle_input(PlayerInput::EndGame);
//! assert_eq!(engine.status(), GameStatus::GameOver);
//! assert!(notifications.try_iter().count() >= 3);
//! ```

pub mod config;
pub mod engine;
pub mod rng;
pub mod scoring;
pub mod shape;
pub mod snapshot;
pub mod well;

pub use falling_blocks_types as types;

// Re-export commonly used types for convenience
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, TimerRequest};
pub use rng::{random_shape, RandomSource, SimpleRng};
pub use scoring::{calculate_line_score, level_for_lines, ScoreBoard};
pub use shape::{Shape, ShapeError};
pub use snapshot::{EngineSnapshot, ShapeSnapshot};
pub use well::{anchored_cells, Well, WellError};
