//! Top-5 high score list and its persistence.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_sys::window;

pub const MAX_ENTRIES: usize = 5;
pub const MAX_NAME_CHARS: usize = 12;
pub const DEFAULT_NAME: &str = "Anonymous";
/// localStorage key holding the JSON array.
pub const STORAGE_KEY: &str = "block-stacker.highscores";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("local storage unavailable")]
    Unavailable,
    #[error("could not encode high scores: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage write failed: {0}")]
    Write(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

/// Always sorted by score, highest first, at most [`MAX_ENTRIES`] long.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighScores {
    entries: Vec<ScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the stored blob. Anything unreadable counts as an empty list.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Vec<ScoreEntry>>(json) {
            Ok(entries) => {
                let mut scores = Self { entries };
                scores.normalize();
                scores
            }
            Err(err) => {
                log::warn!("ignoring malformed high scores: {err}");
                Self::new()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().is_some_and(|lowest| score > lowest.score)
    }

    /// Insert and re-sort; returns the 0-based rank, or `None` if it fell off the list.
    pub fn insert(&mut self, name: &str, score: u32) -> Option<usize> {
        let entry = ScoreEntry {
            name: clean_name(name),
            score,
        };
        // after existing entries with the same score
        let rank = self.entries.partition_point(|e| e.score >= score);
        self.entries.insert(rank, entry);
        self.entries.truncate(MAX_ENTRIES);
        (rank < MAX_ENTRIES).then_some(rank)
    }

    fn normalize(&mut self) {
        // stable sort keeps older entries ahead on ties
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }
}

/// Trim, cap the length and fall back to [`DEFAULT_NAME`].
pub fn clean_name(raw: &str) -> String {
    let trimmed: String = raw.trim().chars().take(MAX_NAME_CHARS).collect();
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

pub trait ScoreStore {
    /// Raw stored blob, `None` if nothing was saved yet.
    fn load(&self) -> Option<String>;
    fn save(&mut self, blob: &str) -> Result<(), StoreError>;
}

pub fn load_scores(store: &impl ScoreStore) -> HighScores {
    store
        .load()
        .map(|blob| HighScores::from_json(&blob))
        .unwrap_or_default()
}

pub fn save_scores(store: &mut impl ScoreStore, scores: &HighScores) -> Result<(), StoreError> {
    store.save(&scores.to_json()?)
}

/// What to show once a run has ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverPrompt {
    AskName { score: u32 },
    ShowList,
}

/// Game-over flow: decide whether to ask for a name, then record and persist.
pub struct Scoreboard<S> {
    store: S,
    scores: HighScores,
    pending: Option<u32>,
}

impl<S: ScoreStore> Scoreboard<S> {
    pub fn new(store: S) -> Self {
        let scores = load_scores(&store);
        Self {
            store,
            scores,
            pending: None,
        }
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    /// Score waiting for a name, if the prompt is open.
    pub fn pending(&self) -> Option<u32> {
        self.pending
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn game_over(&mut self, score: u32) -> GameOverPrompt {
        // another tab may have written since we last looked
        self.scores = load_scores(&self.store);
        if self.scores.qualifies(score) {
            self.pending = Some(score);
            GameOverPrompt::AskName { score }
        } else {
            self.pending = None;
            GameOverPrompt::ShowList
        }
    }

    /// Record the pending score under `name`. Returns its rank; `None` when
    /// nothing was pending.
    pub fn submit(&mut self, name: &str) -> Option<usize> {
        let score = self.pending.take()?;
        let rank = self.scores.insert(name, score);
        if let Err(err) = save_scores(&mut self.store, &self.scores) {
            log::warn!("high scores not saved: {err}");
        }
        rank
    }

    pub fn dismiss(&mut self) {
        self.pending = None;
    }
}

/// Browser `localStorage` under [`STORAGE_KEY`].
#[derive(Debug, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Option<web_sys::Storage> {
        window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl ScoreStore for LocalStorageStore {
    fn load(&self) -> Option<String> {
        Self::storage()?.get_item(STORAGE_KEY).ok().flatten()
    }

    fn save(&mut self, blob: &str) -> Result<(), StoreError> {
        let storage = Self::storage().ok_or(StoreError::Unavailable)?;
        storage
            .set_item(STORAGE_KEY, blob)
            .map_err(|e| StoreError::Write(format!("{e:?}")))
    }
}

/// In-memory store, used headless and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Option<String>,
}

impl MemoryStore {
    pub fn with_blob(blob: &str) -> Self {
        Self {
            blob: Some(blob.to_string()),
        }
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.blob.clone()
    }

    fn save(&mut self, blob: &str) -> Result<(), StoreError> {
        self.blob = Some(blob.to_string());
        Ok(())
    }
}
