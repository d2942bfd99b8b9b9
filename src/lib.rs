//! Block Stacker core crate.
//!
//! Rows of blocks slide left and right; each press cuts the moving row down to
//! its overlap with the row below. The rules live in [`engine`] and run natively;
//! the browser shell in `app` wires them to the DOM, a `setInterval` ticker,
//! localStorage high scores and sound cues.

use wasm_bindgen::prelude::*;

mod app;
pub mod audio;
pub mod config;
pub mod engine;
mod logging;
pub mod render;
pub mod rng;
pub mod scheduler;
pub mod scoreboard;

pub use config::{ConfigError, GameConfig};
pub use engine::{
    ActiveRow, Direction, EngineListener, GameState, LevelEngine, Row, StackOutcome, Status,
};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Classic variant.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    app::launch(GameConfig::classic())
}

/// One of "classic", "compact" or "arcade".
#[wasm_bindgen]
pub fn start_game_with(variant: &str) -> Result<(), JsValue> {
    let config = GameConfig::variant(variant).map_err(|e| JsValue::from_str(&e.to_string()))?;
    app::launch(config)
}

/// Partial JSON config; unspecified fields take the classic values.
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    app::launch(config)
}
