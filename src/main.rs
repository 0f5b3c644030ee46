//! Headless falling-blocks runner (default binary).
//!
//! Plays a scripted game with no rendering: a few random moves and rotations
//! per piece, then a drop. Frames are logged as they arrive and a summary is
//! printed once the requested number of pieces has locked.
//!
//! Environment:
//! - `FALLING_BLOCKS_SEED` seeds both the engine and the script (default 1)
//! - `FALLING_BLOCKS_PIECES` pieces to play before ending (default 30)
//! - `FALLING_BLOCKS_WELL_WIDTH`, `FALLING_BLOCKS_WELL_HEIGHT`,
//!   `FALLING_BLOCKS_INTERVAL_MS`, `FALLING_BLOCKS_DROP_STEP_MS` as read by
//!   `EngineConfig::from_env`
//! - `RUST_LOG` log filter (default `info`)

use std::env;
use std::time::Duration;

use anyhow::{bail, Result};
use log::{debug, info};

use falling_blocks::core::{EngineConfig, EngineSnapshot, RandomSource, SimpleRng};
use falling_blocks::runtime::Session;
use falling_blocks::types::{Notification, PlayerInput};

const DEFAULT_SEED: u32 = 1;
const DEFAULT_PIECES: u32 = 30;

const SCRIPTED_MOVES: [PlayerInput; 4] = [
    PlayerInput::MoveShapeLeft,
    PlayerInput::MoveShapeRight,
    PlayerInput::RotateShapeClockwise,
    PlayerInput::RotateShapeAntiClockwise,
];

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EngineConfig::from_env();
    config.validate()?;
    let seed = env_or("FALLING_BLOCKS_SEED", DEFAULT_SEED);
    let pieces = env_or("FALLING_BLOCKS_PIECES", DEFAULT_PIECES);

    let summary = run(config, seed, pieces)?;

    println!("{}", render_well(&summary));
    println!(
        "score {}  level {}  lines {}  pieces {}",
        summary.score, summary.level, summary.lines, summary.pieces_locked
    );
    debug!("final snapshot: {}", serde_json::to_string(&summary)?);
    Ok(())
}

fn run(config: EngineConfig, seed: u32, pieces: u32) -> Result<EngineSnapshot> {
    let mut session = Session::start(config, seed)?;
    let mut script = SimpleRng::new(seed.wrapping_add(1));

    // A lock can take a full drop plus a gravity interval
    let patience = config.movement_interval() * 2
        + config.drop_step_interval() * config.well_height as u32
        + Duration::from_secs(1);

    let mut locked = 0;
    while locked < pieces {
        for _ in 0..script.next_range(4) {
            let input = SCRIPTED_MOVES[script.next_range(SCRIPTED_MOVES.len() as u32) as usize];
            session.send(input)?;
        }
        session.send(PlayerInput::DropShape)?;

        loop {
            let Some(frame) = session.recv_timeout(patience) else {
                bail!("no frame within {:?}", patience);
            };
            if let Notification::WellUpdated { level, score } = frame.notification {
                info!("rows cleared: level {} score {}", level, score);
            }
            if frame.snapshot.pieces_locked > locked {
                locked = frame.snapshot.pieces_locked;
                debug!("piece {} locked", locked);
                break;
            }
        }
    }

    session.finish()
}

fn render_well(snapshot: &EngineSnapshot) -> String {
    snapshot
        .well
        .iter()
        .map(|row| {
            row.iter()
                .map(|&cell| if cell == 0 { '.' } else { char::from(b'0' + cell) })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
