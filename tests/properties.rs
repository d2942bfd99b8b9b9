// Property tests for the movement and stacking rules.
#![cfg(not(target_arch = "wasm32"))]

use block_stacker::engine::{advance, next_speed, overlap};
use block_stacker::rng::Rng;
use block_stacker::scheduler::ManualTicker;
use block_stacker::{ActiveRow, Direction, GameConfig, GameState, LevelEngine, StackOutcome, Status};
use proptest::prelude::*;

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Left), Just(Direction::Right)]
}

proptest! {
    #[test]
    fn advance_stays_on_the_grid(
        grid_width in 1u32..40,
        width_seed in 0u32..40,
        pos_seed in 0i32..40,
        dir in direction(),
        steps in 0usize..120,
    ) {
        let width = 1 + width_seed % grid_width;
        let max = (grid_width - width) as i32;
        let mut pos = pos_seed % (max + 1);
        let mut dir = dir;
        for _ in 0..steps {
            (pos, dir) = advance(pos, width, dir, grid_width);
            prop_assert!(pos >= 0 && pos <= max);
        }
    }

    #[test]
    fn advance_is_deterministic(pos in 0i32..6, dir in direction()) {
        prop_assert_eq!(advance(pos, 4, dir, 10), advance(pos, 4, dir, 10));
    }

    #[test]
    fn speed_never_rises_or_breaks_the_floor(speed in 20u32..400, score in 0u32..100) {
        let next = next_speed(speed, score, 20);
        prop_assert!(next <= speed);
        prop_assert!(next >= 20);
    }

    #[test]
    fn stack_only_shrinks(
        prev_start in 0u32..8,
        prev_width in 1u32..5,
        pos_seed in 0i32..12,
        width in 1u32..5,
        seed in any::<u64>(),
    ) {
        let grid_width = 12;
        let prev_width = prev_width.max(width);
        let prev_start = prev_start.min(grid_width - prev_width);
        let previous: Vec<u32> = (prev_start..prev_start + prev_width).collect();
        let pos = pos_seed % (grid_width - width + 1) as i32;
        let active = ActiveRow { level: 1, pos, width, direction: Direction::Right };
        let state = GameState {
            level: 1,
            active: Some(active),
            previous_positions: previous.clone(),
            current_width: width,
            speed_ms: 200,
            score: 0,
            status: Status::Running,
        };
        let mut engine = LevelEngine::resume(
            GameConfig::classic(),
            state,
            (),
            ManualTicker::new(),
            Rng::from_seed(seed),
        )
        .unwrap();
        let expected = overlap(active.columns(), &previous);
        match engine.stack() {
            StackOutcome::Placed { row, .. } => {
                prop_assert_eq!(&row.columns, &expected);
                prop_assert!(row.columns.iter().all(|c| previous.contains(c)));
                prop_assert!(engine.state().current_width <= width);
            }
            StackOutcome::Missed { .. } => prop_assert!(expected.is_empty()),
            StackOutcome::Ignored => prop_assert!(false, "running engine ignored stack"),
        }
    }
}
