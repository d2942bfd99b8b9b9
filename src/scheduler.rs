//! Repeating tick timer used by the level engine.
//!
//! The engine only talks to [`TickScheduler`]; in the browser that is an
//! [`IntervalTicker`] wrapping `setInterval`, headless drivers and tests use
//! [`ManualTicker`] and call `tick()` themselves.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

pub trait TickScheduler {
    /// Cancel any pending task and start repeating every `period_ms`.
    fn restart(&mut self, period_ms: u32);
    fn cancel(&mut self);
    /// Current period, `None` while cancelled.
    fn period_ms(&self) -> Option<u32>;
}

/// Scheduler that never fires on its own; it only records what was requested.
#[derive(Debug, Default)]
pub struct ManualTicker {
    period: Option<u32>,
    restarts: u32,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `restart` has been called.
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}

impl TickScheduler for ManualTicker {
    fn restart(&mut self, period_ms: u32) {
        self.period = Some(period_ms);
        self.restarts += 1;
    }

    fn cancel(&mut self) {
        self.period = None;
    }

    fn period_ms(&self) -> Option<u32> {
        self.period
    }
}

/// `window.setInterval` bound to one callback. The interval is cleared on
/// `cancel`, on every `restart`, and when the ticker is dropped.
pub struct IntervalTicker {
    callback: Closure<dyn FnMut()>,
    handle: Option<i32>,
    period: Option<u32>,
}

impl IntervalTicker {
    pub fn new(on_tick: impl FnMut() + 'static) -> Self {
        Self {
            callback: Closure::wrap(Box::new(on_tick) as Box<dyn FnMut()>),
            handle: None,
            period: None,
        }
    }
}

impl TickScheduler for IntervalTicker {
    fn restart(&mut self, period_ms: u32) {
        self.cancel();
        let Some(win) = window() else {
            log::error!("no window, tick timer not started");
            return;
        };
        match win.set_interval_with_callback_and_timeout_and_arguments_0(
            self.callback.as_ref().unchecked_ref(),
            period_ms as i32,
        ) {
            Ok(id) => {
                self.handle = Some(id);
                self.period = Some(period_ms);
            }
            Err(err) => log::error!("setInterval failed: {err:?}"),
        }
    }

    fn cancel(&mut self) {
        if let Some(id) = self.handle.take() {
            if let Some(win) = window() {
                win.clear_interval_with_handle(id);
            }
        }
        self.period = None;
    }

    fn period_ms(&self) -> Option<u32> {
        self.period
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}
