//! Browser shell: owns the page's single engine and routes timer ticks,
//! keyboard and pointer input into it.

use std::cell::{Cell, RefCell};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, window};

use crate::audio::{Cue, SoundBoard};
use crate::config::GameConfig;
use crate::engine::{ActiveRow, EngineListener, GameState, LevelEngine, Row};
use crate::render::{DomRenderer, NAME_INPUT_ID, NAME_SUBMIT_ID, ScoreboardPanel};
use crate::rng::Rng;
use crate::scheduler::IntervalTicker;

/// Everything the engine reports to in the browser.
pub struct WebListener {
    renderer: DomRenderer,
    sound: SoundBoard,
    scoreboard: Option<ScoreboardPanel>,
}

impl WebListener {
    pub fn is_prompting(&self) -> bool {
        self.scoreboard
            .as_ref()
            .is_some_and(|panel| panel.is_prompting())
    }
}

impl EngineListener for WebListener {
    fn on_reset(&mut self, state: &GameState) {
        self.renderer.on_reset(state);
        if let Some(panel) = self.scoreboard.as_mut() {
            if let Err(err) = panel.hide() {
                log::warn!("could not hide scoreboard: {err:?}");
            }
        }
    }

    fn on_row_placed(&mut self, row: &Row, state: &GameState) {
        self.renderer.on_row_placed(row, state);
        if row.level > 0 {
            self.sound.play(Cue::Place);
        }
    }

    fn on_row_moved(&mut self, row: &ActiveRow) {
        self.renderer.on_row_moved(row);
    }

    fn on_game_over(&mut self, missed: &ActiveRow, score: u32) {
        self.renderer.on_game_over(missed, score);
        self.sound.play(Cue::Miss);
        if let Some(panel) = self.scoreboard.as_mut() {
            if let Err(err) = panel.present(score) {
                log::warn!("scoreboard unavailable: {err:?}");
            }
        }
    }
}

type WebEngine = LevelEngine<WebListener, IntervalTicker>;

thread_local! {
    static GAME: RefCell<Option<WebEngine>> = const { RefCell::new(None) };
    static INPUT_BOUND: Cell<bool> = const { Cell::new(false) };
}

fn document() -> Result<Document, JsValue> {
    window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Build the page for `config` and wait for the first action.
/// Calling it again replaces the running game.
pub fn launch(config: GameConfig) -> Result<(), JsValue> {
    config
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let doc = document()?;
    let mut renderer = DomRenderer::new(&doc, &config)?;
    // a previous launch may have left its tower, message or scores on screen
    renderer.show_start_screen()?;
    let listener = WebListener {
        renderer,
        sound: if config.audio {
            SoundBoard::new()
        } else {
            SoundBoard::silent()
        },
        scoreboard: if config.scoreboard {
            Some(ScoreboardPanel::new(&doc)?)
        } else {
            None
        },
    };
    let ticker = IntervalTicker::new(|| {
        GAME.with(|cell| {
            if let Some(engine) = cell.borrow_mut().as_mut() {
                engine.tick();
            }
        });
    });
    let engine = LevelEngine::new(config, listener, ticker, Rng::from_entropy())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    // the previous engine (and its interval) is dropped here
    GAME.with(|cell| *cell.borrow_mut() = Some(engine));
    if !INPUT_BOUND.with(|b| b.replace(true)) {
        bind_input(&doc)?;
    }
    log::info!("block stacker ready");
    Ok(())
}

/// Space / click: stack while running, otherwise start a new run.
/// Returns false when the action was swallowed by the name prompt.
fn handle_action() -> bool {
    GAME.with(|cell| {
        let mut slot = cell.borrow_mut();
        let Some(engine) = slot.as_mut() else {
            return false;
        };
        if engine.listener().is_prompting() {
            return false;
        }
        engine.press();
        true
    })
}

fn submit_name() {
    GAME.with(|cell| {
        if let Some(engine) = cell.borrow_mut().as_mut() {
            if let Some(panel) = engine.listener_mut().scoreboard.as_mut() {
                if let Err(err) = panel.submit() {
                    log::warn!("score submit failed: {err:?}");
                }
            }
        }
    });
}

fn bind_input(doc: &Document) -> Result<(), JsValue> {
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            if evt.code() != "Space" || evt.repeat() {
                return;
            }
            if handle_action() {
                evt.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            handle_action();
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // Name entry: Enter in the field or the Save button commits.
    if let Some(input) = doc.get_element_by_id(NAME_INPUT_ID) {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            evt.stop_propagation();
            if evt.key() == "Enter" {
                evt.prevent_default();
                submit_name();
            }
        }) as Box<dyn FnMut(_)>);
        input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    if let Some(button) = doc.get_element_by_id(NAME_SUBMIT_ID) {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            // keep the click from reaching the document and restarting the run
            evt.stop_propagation();
            submit_name();
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}
