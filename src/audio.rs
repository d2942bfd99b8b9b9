//! Sound cues. Playback is best effort: failures, including rejected play()
//! promises, are logged and otherwise ignored.

use wasm_bindgen::prelude::*;
use web_sys::HtmlAudioElement;

pub const PLACE_SOUND: &str = "sounds/place.wav";
pub const MISS_SOUND: &str = "sounds/miss.wav";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Place,
    Miss,
}

pub struct SoundBoard {
    place: Option<HtmlAudioElement>,
    miss: Option<HtmlAudioElement>,
    // shared by every play() promise; blocked autoplay or a missing file lands here
    on_reject: Option<Closure<dyn FnMut(JsValue)>>,
}

impl SoundBoard {
    pub fn new() -> Self {
        let on_reject = Closure::wrap(Box::new(|err: JsValue| {
            log::warn!("sound playback rejected: {err:?}");
        }) as Box<dyn FnMut(JsValue)>);
        Self {
            place: load(PLACE_SOUND),
            miss: load(MISS_SOUND),
            on_reject: Some(on_reject),
        }
    }

    /// A board with no sounds loaded; `play` does nothing.
    pub fn silent() -> Self {
        Self {
            place: None,
            miss: None,
            on_reject: None,
        }
    }

    pub fn play(&self, cue: Cue) {
        let el = match cue {
            Cue::Place => &self.place,
            Cue::Miss => &self.miss,
        };
        let Some(el) = el else { return };
        el.set_current_time(0.0);
        match el.play() {
            Ok(promise) => {
                if let Some(on_reject) = &self.on_reject {
                    let _ = promise.catch(on_reject);
                }
            }
            Err(err) => log::warn!("could not play {cue:?}: {err:?}"),
        }
    }
}

fn load(src: &str) -> Option<HtmlAudioElement> {
    match HtmlAudioElement::new_with_src(src) {
        Ok(el) => {
            el.set_preload("auto");
            Some(el)
        }
        Err(err) => {
            log::warn!("audio unavailable for {src}: {err:?}");
            None
        }
    }
}
