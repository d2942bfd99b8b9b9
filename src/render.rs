//! DOM renderer: mirrors engine events onto absolutely positioned block divs,
//! plus the game-over scoreboard panel.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use crate::config::GameConfig;
use crate::engine::{ActiveRow, EngineListener, GameState, Row};
use crate::scoreboard::{GameOverPrompt, HighScores, LocalStorageStore, Scoreboard};

pub const CONTAINER_ID: &str = "bs-container";
pub const GRID_ID: &str = "bs-grid";
pub const SCORE_ID: &str = "bs-score";
pub const MESSAGE_ID: &str = "bs-message";
pub const SCORES_ID: &str = "bs-scores";
pub const SCORE_LIST_ID: &str = "bs-score-list";
pub const NAME_FORM_ID: &str = "bs-name-form";
pub const NAME_INPUT_ID: &str = "bs-name";
pub const NAME_SUBMIT_ID: &str = "bs-name-submit";
const STYLE_ID: &str = "bs-style";

const GAME_CSS: &str = "
.bs-block { background:#4ecdc4; border-radius:3px; box-shadow:inset 0 0 0 1px rgba(0,0,0,0.25); }
.bs-row.moving .bs-block { background:#ffd166; }
.bs-row.falling { transition:transform 0.6s ease-in, opacity 0.6s ease-in; transform:translateY(400px); opacity:0; }
";

/// How far the grid has to scroll down so the active `level` stays visible.
/// Nothing moves until the tower passes two thirds of the viewport.
pub fn viewport_offset(level: u32, viewport_height: f64, row_height_px: f64) -> f64 {
    if row_height_px <= 0.0 {
        return 0.0;
    }
    let threshold = (viewport_height * 2.0 / 3.0 / row_height_px).floor() as u32;
    if level > threshold {
        (level - threshold) as f64 * row_height_px
    } else {
        0.0
    }
}

pub fn moving_row_id(level: u32) -> String {
    format!("bs-row-{level}")
}

/// Inner HTML for one row of blocks.
pub fn blocks_html(columns: impl IntoIterator<Item = u32>, block_width_px: f64, row_height_px: f64) -> String {
    let mut html = String::new();
    for col in columns {
        html.push_str(&format!(
            "<div class='bs-block' style='position:absolute; left:{}px; width:{}px; height:{}px;'></div>",
            col as f64 * block_width_px,
            block_width_px - 2.0,
            row_height_px - 2.0,
        ));
    }
    html
}

pub fn scores_html(scores: &HighScores) -> String {
    if scores.entries().is_empty() {
        return "<h3>High Scores</h3><p>No scores yet</p>".to_string();
    }
    let mut html = String::from("<h3>High Scores</h3><ol>");
    for entry in scores.entries() {
        html.push_str(&format!(
            "<li>{} <span class='bs-points'>{}</span></li>",
            escape_html(&entry.name),
            entry.score
        ));
    }
    html.push_str("</ol>");
    html
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn element(doc: &Document, id: &str) -> Result<Element, JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))
}

/// Create (or reuse) every element the game draws into.
pub fn build_dom(doc: &Document) -> Result<(), JsValue> {
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
    if doc.get_element_by_id(STYLE_ID).is_none() {
        let style = doc.create_element("style")?;
        style.set_id(STYLE_ID);
        style.set_text_content(Some(GAME_CSS));
        body.append_child(&style)?;
    }
    if doc.get_element_by_id(CONTAINER_ID).is_none() {
        let container = doc.create_element("div")?;
        container.set_id(CONTAINER_ID);
        container.set_attribute("style", "position:relative; margin:24px auto; width:420px; height:600px; overflow:hidden; background:#111; border:2px solid #333; border-radius:8px;")?;
        let grid = doc.create_element("div")?;
        grid.set_id(GRID_ID);
        grid.set_attribute("style", "position:absolute; left:0; right:0; bottom:0;")?;
        container.append_child(&grid)?;
        body.append_child(&container)?;
    }
    if doc.get_element_by_id(SCORE_ID).is_none() {
        let div = doc.create_element("div")?;
        div.set_id(SCORE_ID);
        div.set_text_content(Some("Score: 0"));
        div.set_attribute("style", "position:fixed; top:10px; left:12px; font-family:'Fira Code', monospace; font-size:15px; padding:4px 8px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#ffd166; z-index:45;")?;
        body.append_child(&div)?;
    }
    if doc.get_element_by_id(MESSAGE_ID).is_none() {
        let div = doc.create_element("div")?;
        div.set_id(MESSAGE_ID);
        div.set_inner_html("Press Space or Click to Start");
        div.set_attribute("style", "position:fixed; top:30%; left:50%; transform:translate(-50%,-50%); padding:16px 24px; background:rgba(0,0,0,0.8); color:#fff; font-family:sans-serif; font-size:22px; text-align:center; border-radius:10px; z-index:50;")?;
        body.append_child(&div)?;
    }
    if doc.get_element_by_id(SCORES_ID).is_none() {
        let panel = doc.create_element("div")?;
        panel.set_id(SCORES_ID);
        panel.set_attribute("style", "display:none; position:fixed; top:55%; left:50%; transform:translate(-50%,-50%); min-width:220px; padding:12px 20px; background:rgba(0,0,0,0.85); color:#ffd166; font-family:'Fira Code', monospace; border:1px solid #333; border-radius:10px; z-index:51;")?;
        let form = doc.create_element("div")?;
        form.set_id(NAME_FORM_ID);
        form.set_inner_html(&format!(
            "<p>New high score! Enter your name:</p><input id='{NAME_INPUT_ID}' maxlength='12' autocomplete='off'><button id='{NAME_SUBMIT_ID}'>Save</button>"
        ));
        panel.append_child(&form)?;
        let list = doc.create_element("div")?;
        list.set_id(SCORE_LIST_ID);
        panel.append_child(&list)?;
        body.append_child(&panel)?;
    }
    Ok(())
}

pub struct DomRenderer {
    doc: Document,
    container: HtmlElement,
    grid: HtmlElement,
    score: Element,
    message: HtmlElement,
    block_width_px: f64,
    row_height_px: f64,
}

impl DomRenderer {
    pub fn new(doc: &Document, config: &GameConfig) -> Result<Self, JsValue> {
        build_dom(doc)?;
        Ok(Self {
            doc: doc.clone(),
            container: element(doc, CONTAINER_ID)?.dyn_into()?,
            grid: element(doc, GRID_ID)?.dyn_into()?,
            score: element(doc, SCORE_ID)?,
            message: element(doc, MESSAGE_ID)?.dyn_into()?,
            block_width_px: config.block_width_px,
            row_height_px: config.row_height_px,
        })
    }

    /// Empty tower and the start prompt, as before the first action.
    pub fn show_start_screen(&mut self) -> Result<(), JsValue> {
        self.grid.set_inner_html("");
        self.grid.style().set_property("bottom", "0px")?;
        self.score.set_text_content(Some("Score: 0"));
        self.message.set_inner_html("Press Space or Click to Start");
        self.message.style().set_property("display", "block")?;
        if let Some(panel) = self.doc.get_element_by_id(SCORES_ID) {
            panel.dyn_into::<HtmlElement>()?.style().set_property("display", "none")?;
        }
        Ok(())
    }

    fn row_element(&self, level: u32) -> Result<Element, JsValue> {
        let row = self.doc.create_element("div")?;
        row.set_class_name("bs-row");
        row.set_attribute(
            "style",
            &format!(
                "position:absolute; left:0; right:0; height:{}px; bottom:{}px;",
                self.row_height_px,
                level as f64 * self.row_height_px
            ),
        )?;
        Ok(row)
    }

    fn reset(&mut self, state: &GameState) -> Result<(), JsValue> {
        self.grid.set_inner_html("");
        self.grid.style().set_property("bottom", "0px")?;
        self.score.set_text_content(Some(&format!("Score: {}", state.score)));
        self.message.style().set_property("display", "none")?;
        Ok(())
    }

    fn place(&mut self, row: &Row, state: &GameState) -> Result<(), JsValue> {
        if let Some(moving) = self.doc.get_element_by_id(&moving_row_id(row.level)) {
            moving.remove();
        }
        let el = self.row_element(row.level)?;
        el.set_inner_html(&blocks_html(
            row.columns.iter().copied(),
            self.block_width_px,
            self.row_height_px,
        ));
        self.grid.append_child(&el)?;
        self.score.set_text_content(Some(&format!("Score: {}", state.score)));
        Ok(())
    }

    fn draw_moving(&mut self, row: &ActiveRow) -> Result<(), JsValue> {
        let id = moving_row_id(row.level);
        let el = match self.doc.get_element_by_id(&id) {
            Some(el) => el,
            None => {
                let el = self.row_element(row.level)?;
                el.set_id(&id);
                el.class_list().add_1("moving")?;
                self.grid.append_child(&el)?;
                self.scroll_to(row.level)?;
                el
            }
        };
        el.set_inner_html(&blocks_html(
            row.columns(),
            self.block_width_px,
            self.row_height_px,
        ));
        Ok(())
    }

    fn scroll_to(&self, level: u32) -> Result<(), JsValue> {
        let offset = viewport_offset(
            level,
            self.container.client_height() as f64,
            self.row_height_px,
        );
        self.grid
            .style()
            .set_property("bottom", &format!("-{offset}px"))
    }

    fn game_over(&mut self, missed: &ActiveRow, score: u32) -> Result<(), JsValue> {
        if let Some(el) = self.doc.get_element_by_id(&moving_row_id(missed.level)) {
            el.class_list().add_1("falling")?;
        }
        self.message
            .set_inner_html(&format!("Game Over!<br>Score: {score}<br>Click to Restart"));
        self.message.style().set_property("display", "block")?;
        Ok(())
    }
}

impl EngineListener for DomRenderer {
    fn on_reset(&mut self, state: &GameState) {
        if let Err(err) = self.reset(state) {
            log::error!("reset render failed: {err:?}");
        }
    }

    fn on_row_placed(&mut self, row: &Row, state: &GameState) {
        if let Err(err) = self.place(row, state) {
            log::error!("row render failed: {err:?}");
        }
    }

    fn on_row_moved(&mut self, row: &ActiveRow) {
        if let Err(err) = self.draw_moving(row) {
            log::error!("moving row render failed: {err:?}");
        }
    }

    fn on_game_over(&mut self, missed: &ActiveRow, score: u32) {
        if let Err(err) = self.game_over(missed, score) {
            log::error!("game over render failed: {err:?}");
        }
    }
}

/// Scoreboard panel shown after a run: name prompt, then the top-5 list.
pub struct ScoreboardPanel {
    board: Scoreboard<LocalStorageStore>,
    panel: HtmlElement,
    form: HtmlElement,
    list: Element,
    input: HtmlInputElement,
}

impl ScoreboardPanel {
    pub fn new(doc: &Document) -> Result<Self, JsValue> {
        build_dom(doc)?;
        Ok(Self {
            board: Scoreboard::new(LocalStorageStore),
            panel: element(doc, SCORES_ID)?.dyn_into()?,
            form: element(doc, NAME_FORM_ID)?.dyn_into()?,
            list: element(doc, SCORE_LIST_ID)?,
            input: element(doc, NAME_INPUT_ID)?.dyn_into()?,
        })
    }

    pub fn is_prompting(&self) -> bool {
        self.board.pending().is_some()
    }

    pub fn present(&mut self, score: u32) -> Result<(), JsValue> {
        self.list.set_inner_html(&scores_html(self.board.scores()));
        match self.board.game_over(score) {
            GameOverPrompt::AskName { .. } => {
                self.input.set_value("");
                self.form.style().set_property("display", "block")?;
                self.panel.style().set_property("display", "block")?;
                self.input.focus()?;
            }
            GameOverPrompt::ShowList => self.show_list()?,
        }
        Ok(())
    }

    /// Commit whatever is in the name field. Does nothing unless the prompt is open.
    pub fn submit(&mut self) -> Result<(), JsValue> {
        if !self.is_prompting() {
            return Ok(());
        }
        if let Some(rank) = self.board.submit(&self.input.value()) {
            log::info!("high score saved at rank {}", rank + 1);
        }
        self.input.blur()?;
        self.show_list()
    }

    fn show_list(&mut self) -> Result<(), JsValue> {
        self.form.style().set_property("display", "none")?;
        self.list.set_inner_html(&scores_html(self.board.scores()));
        self.panel.style().set_property("display", "block")
    }

    pub fn hide(&mut self) -> Result<(), JsValue> {
        self.board.dismiss();
        self.panel.style().set_property("display", "none")
    }
}
