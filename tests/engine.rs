// Native integration tests for the level engine. These avoid wasm/browser APIs
// and drive the engine through `ManualTicker`, calling `tick()` by hand.

use block_stacker::rng::Rng;
use block_stacker::scheduler::{ManualTicker, TickScheduler};
use block_stacker::{
    ActiveRow, ConfigError, Direction, EngineListener, GameConfig, GameState, LevelEngine, Row, StackOutcome,
    Status,
};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Reset,
    Placed(Row),
    Moved(ActiveRow),
    GameOver(u32),
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl EngineListener for Recorder {
    fn on_reset(&mut self, _state: &GameState) {
        self.events.push(Event::Reset);
    }
    fn on_row_placed(&mut self, row: &Row, _state: &GameState) {
        self.events.push(Event::Placed(row.clone()));
    }
    fn on_row_moved(&mut self, row: &ActiveRow) {
        self.events.push(Event::Moved(*row));
    }
    fn on_game_over(&mut self, _missed: &ActiveRow, score: u32) {
        self.events.push(Event::GameOver(score));
    }
}

fn ten_wide() -> GameConfig {
    GameConfig {
        grid_width: 10,
        ..GameConfig::classic()
    }
}

fn running(active: ActiveRow, previous: Vec<u32>, speed_ms: u32, score: u32) -> GameState {
    GameState {
        level: active.level,
        active: Some(active),
        current_width: active.width,
        previous_positions: previous,
        speed_ms,
        score,
        status: Status::Running,
    }
}

fn engine_at(state: GameState) -> LevelEngine<Recorder, ManualTicker> {
    LevelEngine::resume(
        ten_wide(),
        state,
        Recorder::default(),
        ManualTicker::new(),
        Rng::from_seed(3),
    )
    .unwrap()
}

#[test]
fn first_row_is_centred() {
    let mut engine = LevelEngine::new(ten_wide(), Recorder::default(), ManualTicker::new(), Rng::from_seed(9)).unwrap();
    engine.init();
    assert_eq!(engine.state().previous_positions, vec![3, 4, 5, 6]);
    let events = &engine.listener().events;
    assert_eq!(events[0], Event::Reset);
    assert_eq!(
        events[1],
        Event::Placed(Row {
            level: 0,
            columns: vec![3, 4, 5, 6]
        })
    );
    assert!(matches!(events[2], Event::Moved(ActiveRow { level: 1, width: 4, .. })));
}

#[test]
fn partial_overlap_cuts_the_row() {
    let active = ActiveRow {
        level: 1,
        pos: 3,
        width: 4,
        direction: Direction::Right,
    };
    let mut engine = engine_at(running(active, vec![4, 5, 6, 7], 200, 0));
    let outcome = engine.stack();
    assert_eq!(
        outcome,
        StackOutcome::Placed {
            row: Row {
                level: 1,
                columns: vec![4, 5, 6]
            },
            speed_ms: 190,
        }
    );
    let s = engine.state();
    assert_eq!(s.previous_positions, vec![4, 5, 6]);
    assert_eq!(s.current_width, 3);
    assert_eq!(s.score, 1);
    assert_eq!(s.level, 2);
    assert_eq!(s.active.map(|r| r.width), Some(3));
    // the next level restarts the timer at the new speed
    assert_eq!(engine.scheduler().period_ms(), Some(190));
}

#[test]
fn no_overlap_ends_the_run() {
    let active = ActiveRow {
        level: 4,
        pos: 0,
        width: 2,
        direction: Direction::Left,
    };
    let mut engine = engine_at(running(active, vec![5, 6, 7, 8], 120, 3));
    assert_eq!(engine.stack(), StackOutcome::Missed { score: 3 });
    let s = engine.state();
    assert_eq!(s.status, Status::GameOver);
    assert_eq!(s.active, None);
    assert_eq!(s.previous_positions, vec![5, 6, 7, 8]);
    assert_eq!(engine.scheduler().period_ms(), None);
    assert_eq!(engine.listener().events, vec![Event::GameOver(3)]);
}

#[test]
fn single_block_keeps_going() {
    let active = ActiveRow {
        level: 7,
        pos: 5,
        width: 1,
        direction: Direction::Right,
    };
    let mut engine = engine_at(running(active, vec![5], 60, 6));
    assert!(matches!(engine.stack(), StackOutcome::Placed { .. }));
    assert_eq!(engine.state().status, Status::Running);
    assert_eq!(engine.state().current_width, 1);
}

#[test]
fn speed_follows_schedule_and_floor() {
    let active = ActiveRow {
        level: 1,
        pos: 3,
        width: 4,
        direction: Direction::Right,
    };
    let mut engine = engine_at(running(active, vec![3, 4, 5, 6], 50, 0));
    engine.stack();
    assert_eq!(engine.state().speed_ms, 40);

    let mut engine = engine_at(running(active, vec![3, 4, 5, 6], 40, 20));
    engine.stack();
    assert_eq!(engine.state().speed_ms, 39);

    let mut engine = engine_at(running(active, vec![3, 4, 5, 6], 20, 30));
    engine.stack();
    assert_eq!(engine.state().speed_ms, 20);
}

#[test]
fn ticks_bounce_inside_the_grid() {
    let active = ActiveRow {
        level: 1,
        pos: 5,
        width: 4,
        direction: Direction::Right,
    };
    let mut engine = engine_at(running(active, vec![3, 4, 5, 6], 200, 0));
    let mut seen = Vec::new();
    for _ in 0..8 {
        assert!(engine.tick());
        seen.push(engine.state().active.map(|r| r.pos).unwrap_or(-1));
    }
    assert_eq!(seen, vec![6, 6, 5, 4, 3, 2, 1, 0]);
    let after_left_edge = {
        engine.tick();
        engine.state().active.unwrap()
    };
    assert_eq!(after_left_edge.pos, 0);
    assert_eq!(after_left_edge.direction, Direction::Right);
}

#[test]
fn hand_built_config_is_validated() {
    let config = GameConfig {
        grid_width: 2,
        ..GameConfig::classic()
    };
    let built = LevelEngine::new(config, (), ManualTicker::new(), Rng::from_seed(1));
    assert!(matches!(built, Err(ConfigError::InitialBlocks { .. })));
}

#[test]
fn not_running_never_mutates() {
    let mut idle = LevelEngine::new(ten_wide(), Recorder::default(), ManualTicker::new(), Rng::from_seed(1)).unwrap();
    let before = idle.state().clone();
    assert!(!idle.tick());
    assert_eq!(idle.stack(), StackOutcome::Ignored);
    assert_eq!(idle.state(), &before);
    assert!(idle.listener().events.is_empty());

    let active = ActiveRow {
        level: 2,
        pos: 0,
        width: 2,
        direction: Direction::Right,
    };
    let mut over = engine_at(running(active, vec![8, 9], 100, 1));
    over.stack();
    let frozen = over.state().clone();
    let events = over.listener().events.len();
    assert!(!over.tick());
    assert_eq!(over.stack(), StackOutcome::Ignored);
    assert_eq!(over.state(), &frozen);
    assert_eq!(over.listener().events.len(), events);
}

#[test]
fn press_restarts_after_game_over() {
    let mut engine = LevelEngine::new(ten_wide(), Recorder::default(), ManualTicker::new(), Rng::from_seed(5)).unwrap();
    assert_eq!(engine.press(), None);
    assert!(engine.is_running());
    // stacking straight from the edge leaves a single block, and the next
    // edge spawn cannot reach it
    let mut presses = 0;
    while engine.is_running() && presses < 10 {
        engine.press();
        presses += 1;
    }
    assert_eq!(presses, 2);
    assert_eq!(engine.state().status, Status::GameOver);
    engine.press();
    assert!(engine.is_running());
    assert_eq!(engine.state().score, 0);
    assert_eq!(engine.state().previous_positions, vec![3, 4, 5, 6]);
    assert_eq!(engine.state().speed_ms, 200);
}

#[test]
fn random_play_keeps_invariants() {
    let config = ten_wide();
    let mut engine = LevelEngine::new(config.clone(), (), ManualTicker::new(), Rng::from_seed(11)).unwrap();
    let mut dice = Rng::from_seed(99);
    engine.init();
    for _ in 0..2000 {
        let ticks = dice.next_u64() % 12;
        for _ in 0..ticks {
            engine.tick();
            let row = engine.state().active.unwrap();
            assert!(row.pos >= 0);
            assert!(row.pos as u32 + row.width <= config.grid_width);
        }
        let before = engine.state().clone();
        match engine.stack() {
            StackOutcome::Placed { row, .. } => {
                assert!(row.columns.iter().all(|c| before.previous_positions.contains(c)));
                assert!(engine.state().current_width <= before.current_width);
                assert!(engine.state().speed_ms <= before.speed_ms);
                assert!(engine.state().speed_ms >= config.speed_floor_ms);
            }
            StackOutcome::Missed { .. } => {
                assert_eq!(engine.state().status, Status::GameOver);
                engine.init();
            }
            StackOutcome::Ignored => panic!("engine should be running"),
        }
    }
}

#[test]
fn new_rows_start_flush_with_their_edge() {
    let mut engine = LevelEngine::new(ten_wide(), Recorder::default(), ManualTicker::new(), Rng::from_seed(21)).unwrap();
    for _ in 0..20 {
        engine.init();
        let row = engine.state().active.unwrap();
        match row.direction {
            Direction::Right => assert_eq!(row.pos, 0),
            Direction::Left => assert_eq!(row.pos, 10 - row.width as i32),
        }
    }
    assert_eq!(engine.scheduler().restarts(), 20);
}
