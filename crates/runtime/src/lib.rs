//! Runtime driver - puts the engine on a real clock
//!
//! The engine only asks for timers. [`drive`] is the async loop that honours
//! those requests: it waits on either the armed deadline or the next player
//! command, applies exactly one of them, and forwards every resulting
//! notification together with a snapshot of the engine.
//!
//! [`Session`] wraps the loop in its own tokio runtime so a synchronous
//! caller (a terminal front end, a test harness) can feed commands and poll
//! frames without touching async code.

use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use falling_blocks_core::{Engine, EngineConfig, EngineSnapshot, RandomSource, SimpleRng};
use falling_blocks_types::{GameStatus, Notification, PlayerInput};

/// Pending player commands buffered before `send` starts failing
pub const COMMAND_QUEUE_DEPTH: usize = 64;

/// One notification plus the engine state right after it was raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub notification: Notification,
    pub snapshot: EngineSnapshot,
}

/// Run `engine` until the game is over.
///
/// Starts the game if it hasn't been started. Commands and timer firings are
/// applied one at a time; the timer deadline is recomputed whenever the
/// engine re-arms. Closing the command channel ends the game. A closed frame
/// channel is tolerated.
pub async fn drive<R: RandomSource>(
    mut engine: Engine<R>,
    mut commands: mpsc::Receiver<PlayerInput>,
    frames: mpsc::UnboundedSender<Frame>,
) -> Engine<R> {
    let notifications = engine.subscribe();
    if engine.status() == GameStatus::NotStarted {
        engine.start_game();
    }
    forward(&engine, &notifications, &frames);

    let mut armed: Option<(u64, Instant)> = None;

    while engine.status() == GameStatus::Running {
        match engine.pending_timer() {
            Some(timer) if armed.map(|(generation, _)| generation) != Some(timer.generation) => {
                armed = Some((timer.generation, Instant::now() + timer.after));
            }
            Some(_) => {}
            None => armed = None,
        }
        let timer_armed = armed.is_some();
        let deadline = armed.map_or_else(Instant::now, |(_, at)| at);

        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(input) => {
                    engine.handle_input(input);
                }
                None => {
                    debug!("command channel closed");
                    engine.handle_input(PlayerInput::EndGame);
                }
            },
            _ = sleep_until(deadline), if timer_armed => {
                engine.timer_elapsed();
            }
        }

        forward(&engine, &notifications, &frames);
    }

    info!("driver stopped with score {}", engine.score());
    engine
}

fn forward<R: RandomSource>(
    engine: &Engine<R>,
    notifications: &std_mpsc::Receiver<Notification>,
    frames: &mpsc::UnboundedSender<Frame>,
) {
    for notification in notifications.try_iter() {
        let _ = frames.send(Frame {
            notification,
            snapshot: engine.snapshot(),
        });
    }
}

/// A game running on a background tokio runtime
pub struct Session {
    rt: Runtime,
    cmd_tx: Option<mpsc::Sender<PlayerInput>>,
    frame_rx: mpsc::UnboundedReceiver<Frame>,
    handle: Option<JoinHandle<EngineSnapshot>>,
}

impl Session {
    /// Build an engine from `config`, seed its generator and start playing.
    pub fn start(config: EngineConfig, seed: u32) -> Result<Self> {
        let engine = Engine::with_config(SimpleRng::new(seed), config)?;

        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayerInput>(COMMAND_QUEUE_DEPTH);
        let (frame_tx, frame_rx) = mpsc::unbounded_channel::<Frame>();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let handle = rt.spawn(async move { drive(engine, cmd_rx, frame_tx).await.snapshot() });
        info!(
            "session started: {}x{} well, seed {}",
            config.well_width, config.well_height, seed
        );

        Ok(Self {
            rt,
            cmd_tx: Some(cmd_tx),
            frame_rx,
            handle: Some(handle),
        })
    }

    /// Queue a player command
    pub fn send(&self, input: PlayerInput) -> Result<()> {
        let tx = self
            .cmd_tx
            .as_ref()
            .ok_or_else(|| anyhow!("session already finished"))?;
        tx.try_send(input).map_err(|err| {
            warn!("dropping {}: {}", input.as_str(), err);
            anyhow!("command queue rejected {}: {}", input.as_str(), err)
        })
    }

    pub fn try_recv(&mut self) -> Option<Frame> {
        self.frame_rx.try_recv().ok()
    }

    /// Block until the next frame arrives, or `timeout` passes
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<Frame> {
        let frame_rx = &mut self.frame_rx;
        self.rt
            .block_on(async { tokio::time::timeout(timeout, frame_rx.recv()).await })
            .ok()
            .flatten()
    }

    /// End the game (by closing the command channel) and wait for the driver.
    pub fn finish(mut self) -> Result<EngineSnapshot> {
        self.cmd_tx = None;
        let handle = self
            .handle
            .take()
            .ok_or_else(|| anyhow!("session already finished"))?;
        self.rt
            .block_on(handle)
            .context("driver task failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use falling_blocks_types::ShapeKind;

    fn channels() -> (
        mpsc::Sender<PlayerInput>,
        mpsc::Receiver<PlayerInput>,
        mpsc::UnboundedSender<Frame>,
        mpsc::UnboundedReceiver<Frame>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        (cmd_tx, cmd_rx, frame_tx, frame_rx)
    }

    fn engine() -> Engine<SimpleRng> {
        Engine::new(SimpleRng::new(12345), 10, 20).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_starts_game_and_ticks_gravity() {
        let (_cmd_tx, cmd_rx, frame_tx, mut frame_rx) = channels();
        let task = tokio::spawn(drive(engine(), cmd_rx, frame_tx));

        let start = Instant::now();
        let first = frame_rx.recv().await.unwrap();
        assert_eq!(
            first.notification,
            Notification::ShapeUpdated { level: 1, score: 0 }
        );
        assert_eq!(first.snapshot.status, GameStatus::Running);
        assert_eq!(first.snapshot.current_y, -1);

        let tick = frame_rx.recv().await.unwrap();
        assert_eq!(tick.snapshot.current_y, 0);
        assert!(start.elapsed() >= Duration::from_millis(500));

        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_commands_ends_game() {
        let (cmd_tx, cmd_rx, frame_tx, mut frame_rx) = channels();
        let task = tokio::spawn(drive(engine(), cmd_rx, frame_tx));

        frame_rx.recv().await.unwrap();
        drop(cmd_tx);

        let engine = task.await.unwrap();
        assert_eq!(engine.status(), GameStatus::GameOver);

        let mut last = None;
        while let Ok(frame) = frame_rx.try_recv() {
            last = Some(frame);
        }
        assert_eq!(last.unwrap().notification, Notification::GameOver);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_runs_on_drop_step_timer() {
        let (cmd_tx, cmd_rx, frame_tx, mut frame_rx) = channels();
        let task = tokio::spawn(drive(engine(), cmd_rx, frame_tx));
        frame_rx.recv().await.unwrap();

        let start = Instant::now();
        tokio_test::assert_ok!(cmd_tx.send(PlayerInput::DropShape).await);

        // Seed 12345 opens with a vertical I; it lands after 20 rows
        loop {
            let frame = frame_rx.recv().await.unwrap();
            if !frame.snapshot.dropping {
                assert_eq!(frame.snapshot.well[19][4], ShapeKind::I.color_id());
                break;
            }
        }
        // 19 drop steps at 10ms each, well under one gravity interval
        assert!(start.elapsed() < Duration::from_millis(500));

        drop(cmd_tx);
        let engine = task.await.unwrap();
        assert_eq!(engine.well().get(4, 16), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_game_interrupts_drop() {
        let (cmd_tx, cmd_rx, frame_tx, mut frame_rx) = channels();
        tokio_test::assert_ok!(cmd_tx.send(PlayerInput::DropShape).await);
        tokio_test::assert_ok!(cmd_tx.send(PlayerInput::EndGame).await);

        let engine = drive(engine(), cmd_rx, frame_tx).await;

        assert_eq!(engine.status(), GameStatus::GameOver);
        assert!(engine.well().is_empty());
        assert!(engine.pending_timer().is_none());

        let notifications: Vec<_> = std::iter::from_fn(|| frame_rx.try_recv().ok())
            .map(|frame| frame.notification)
            .collect();
        assert_eq!(notifications.last(), Some(&Notification::GameOver));
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_engine_is_driven_as_is() {
        let (cmd_tx, cmd_rx, frame_tx, _frame_rx) = channels();
        let mut engine = engine();
        engine.start_game();
        let current = engine.current_shape().cloned();
        drop(cmd_tx);

        let engine = drive(engine, cmd_rx, frame_tx).await;

        assert!(current.is_some());
        assert_eq!(engine.current_shape().cloned(), current);
        assert_eq!(engine.status(), GameStatus::GameOver);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gravity_waits_full_interval_after_drop() {
        let (cmd_tx, cmd_rx, frame_tx, mut frame_rx) = channels();
        let task = tokio::spawn(drive(engine(), cmd_rx, frame_tx));
        frame_rx.recv().await.unwrap();

        cmd_tx.send(PlayerInput::DropShape).await.unwrap();
        while frame_rx.recv().await.unwrap().snapshot.dropping {}
        let landed = Instant::now();

        let tick = frame_rx.recv().await.unwrap();
        assert_eq!(tick.snapshot.current_y, 0);
        assert!(landed.elapsed() >= Duration::from_millis(500));

        drop(cmd_tx);
        let engine = task.await.unwrap();
        assert!(engine.pending_timer().is_none());
    }
}
