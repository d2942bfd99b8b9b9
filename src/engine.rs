//! Level engine: owns the game state and the overlap / stacking rule.
//!
//! The engine has no DOM code. It reports what changed through
//! an [`EngineListener`] and drives its tick timer through a [`TickScheduler`],
//! so the same rules run in the browser and under `cargo test`.

use crate::config::{ConfigError, GameConfig};
use crate::rng::Rng;
use crate::scheduler::TickScheduler;

/// Above this interval a placement speeds the game up by the large step.
const FAST_STEP_ABOVE_MS: u32 = 40;
const LARGE_STEP_MS: u32 = 10;
const SMALL_STEP_MS: u32 = 2;
/// Past this score the speed-up steps are halved.
const HALF_STEP_AFTER_SCORE: u32 = 14;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn step(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Idle,
    Running,
    GameOver,
}

/// A placed (static) row. Columns are sorted ascending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub level: u32,
    pub columns: Vec<u32>,
}

/// The row currently sliding back and forth: columns `[pos, pos + width)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveRow {
    pub level: u32,
    pub pos: i32,
    pub width: u32,
    pub direction: Direction,
}

impl ActiveRow {
    pub fn columns(&self) -> std::ops::Range<u32> {
        let start = self.pos.max(0) as u32;
        start..start + self.width
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    /// Index of the active row; the first static row is level 0.
    pub level: u32,
    pub active: Option<ActiveRow>,
    /// Columns of the most recently placed static row.
    pub previous_positions: Vec<u32>,
    pub current_width: u32,
    pub speed_ms: u32,
    pub score: u32,
    pub status: Status,
}

impl GameState {
    pub fn idle(config: &GameConfig) -> Self {
        Self {
            level: 0,
            active: None,
            previous_positions: Vec::new(),
            current_width: config.initial_blocks,
            speed_ms: config.initial_speed_ms,
            score: 0,
            status: Status::Idle,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackOutcome {
    /// The engine was not running; nothing changed.
    Ignored,
    Placed { row: Row, speed_ms: u32 },
    Missed { score: u32 },
}

/// Observer the engine calls into on every visible state change.
pub trait EngineListener {
    /// A new run started; everything previously drawn is stale.
    fn on_reset(&mut self, _state: &GameState) {}
    fn on_row_placed(&mut self, _row: &Row, _state: &GameState) {}
    /// Called when a row spawns and after every move.
    fn on_row_moved(&mut self, _row: &ActiveRow) {}
    fn on_game_over(&mut self, _missed: &ActiveRow, _score: u32) {}
}

impl EngineListener for () {}

/// One movement step with reflecting bounce at both edges.
pub fn advance(pos: i32, width: u32, direction: Direction, grid_width: u32) -> (i32, Direction) {
    let max = grid_width as i32 - width as i32;
    let next = pos + direction.step();
    if next > max {
        (max, Direction::Left)
    } else if next < 0 {
        (0, Direction::Right)
    } else {
        (next, direction)
    }
}

/// Columns of `active` that are also in `previous` (kept in place, not re-centred).
pub fn overlap(active: impl IntoIterator<Item = u32>, previous: &[u32]) -> Vec<u32> {
    active
        .into_iter()
        .filter(|c| previous.contains(c))
        .collect()
}

/// Tick interval after a successful placement. `score` is the score after it.
pub fn next_speed(speed_ms: u32, score: u32, floor_ms: u32) -> u32 {
    if speed_ms <= floor_ms {
        return speed_ms;
    }
    let mut step = if speed_ms > FAST_STEP_ABOVE_MS {
        LARGE_STEP_MS
    } else {
        SMALL_STEP_MS
    };
    if score > HALF_STEP_AFTER_SCORE {
        step /= 2;
    }
    speed_ms.saturating_sub(step).max(floor_ms)
}

pub struct LevelEngine<L, S> {
    config: GameConfig,
    state: GameState,
    listener: L,
    scheduler: S,
    rng: Rng,
}

impl<L: EngineListener, S: TickScheduler> LevelEngine<L, S> {
    pub fn new(config: GameConfig, listener: L, scheduler: S, rng: Rng) -> Result<Self, ConfigError> {
        let state = GameState::idle(&config);
        Self::resume(config, state, listener, scheduler, rng)
    }

    /// Continue from an explicit state. The scheduler is left as it is.
    pub fn resume(
        config: GameConfig,
        state: GameState,
        listener: L,
        scheduler: S,
        rng: Rng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state,
            listener,
            scheduler,
            rng,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.state.status == Status::Running
    }

    /// Start a fresh run, discarding whatever state came before.
    pub fn init(&mut self) {
        self.scheduler.cancel();
        let start = self.config.first_row_start();
        let first = Row {
            level: 0,
            columns: (start..start + self.config.initial_blocks).collect(),
        };
        self.state = GameState {
            level: 0,
            active: None,
            previous_positions: first.columns.clone(),
            current_width: self.config.initial_blocks,
            speed_ms: self.config.initial_speed_ms,
            score: 0,
            status: Status::Running,
        };
        log::info!(
            "run started: {} columns, {} blocks, {}ms",
            self.config.grid_width,
            self.config.initial_blocks,
            self.state.speed_ms
        );
        self.listener.on_reset(&self.state);
        self.listener.on_row_placed(&first, &self.state);
        self.start_level();
    }

    fn start_level(&mut self) {
        self.state.level += 1;
        let width = self.state.current_width;
        let direction = if self.rng.next_bool() {
            Direction::Right
        } else {
            Direction::Left
        };
        let pos = match direction {
            Direction::Right => 0,
            Direction::Left => self.config.grid_width as i32 - width as i32,
        };
        let row = ActiveRow {
            level: self.state.level,
            pos,
            width,
            direction,
        };
        self.state.active = Some(row);
        self.listener.on_row_moved(&row);
        self.scheduler.restart(self.state.speed_ms);
    }

    /// Move the active row one column. Returns false when nothing moved.
    pub fn tick(&mut self) -> bool {
        if self.state.status != Status::Running {
            return false;
        }
        let Some(row) = self.state.active.as_mut() else {
            return false;
        };
        let (pos, direction) = advance(row.pos, row.width, row.direction, self.config.grid_width);
        row.pos = pos;
        row.direction = direction;
        let row = *row;
        self.listener.on_row_moved(&row);
        true
    }

    /// Commit the active row onto the one below.
    pub fn stack(&mut self) -> StackOutcome {
        if self.state.status != Status::Running {
            return StackOutcome::Ignored;
        }
        let Some(active) = self.state.active else {
            return StackOutcome::Ignored;
        };
        self.scheduler.cancel();

        let kept = overlap(active.columns(), &self.state.previous_positions);
        if kept.is_empty() {
            self.state.active = None;
            self.state.status = Status::GameOver;
            log::info!("game over at level {} with score {}", active.level, self.state.score);
            self.listener.on_game_over(&active, self.state.score);
            return StackOutcome::Missed {
                score: self.state.score,
            };
        }

        let row = Row {
            level: active.level,
            columns: kept,
        };
        self.state.active = None;
        self.state.current_width = row.columns.len() as u32;
        self.state.previous_positions = row.columns.clone();
        self.state.score += 1;
        self.state.speed_ms =
            next_speed(self.state.speed_ms, self.state.score, self.config.speed_floor_ms);
        log::debug!(
            "placed level {}: width {}, score {}, {}ms",
            row.level,
            self.state.current_width,
            self.state.score,
            self.state.speed_ms
        );
        self.listener.on_row_placed(&row, &self.state);
        let speed_ms = self.state.speed_ms;
        self.start_level();
        StackOutcome::Placed { row, speed_ms }
    }

    /// The single player action: stack while running, otherwise (re)start.
    pub fn press(&mut self) -> Option<StackOutcome> {
        if self.is_running() {
            Some(self.stack())
        } else {
            self.init();
            None
        }
    }
}
