//! Game configuration and the three shipped variants.
//!
//! All variants share the same rules; they differ only in grid size, pacing,
//! and whether the scoreboard / audio layer is switched on.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown variant '{0}'")]
    UnknownVariant(String),
    #[error("grid_width must be at least 1")]
    EmptyGrid,
    #[error("initial_blocks must be between 1 and grid_width ({grid_width}), got {initial_blocks}")]
    InitialBlocks { initial_blocks: u32, grid_width: u32 },
    #[error("speed_floor_ms must be at least 1")]
    ZeroFloor,
    #[error("initial_speed_ms ({initial}) is below speed_floor_ms ({floor})")]
    SpeedBelowFloor { initial: u32, floor: u32 },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of columns on the grid (`W`).
    pub grid_width: u32,
    /// Width of the first static row and of the first moving row.
    pub initial_blocks: u32,
    /// Tick interval at the start of a run.
    pub initial_speed_ms: u32,
    /// The tick interval never drops below this.
    pub speed_floor_ms: u32,
    pub block_width_px: f64,
    pub row_height_px: f64,
    /// Show the top-5 list and prompt for names on game over.
    pub scoreboard: bool,
    pub audio: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl GameConfig {
    pub fn classic() -> Self {
        Self {
            grid_width: 12,
            initial_blocks: 4,
            initial_speed_ms: 200,
            speed_floor_ms: 20,
            block_width_px: 35.0,
            row_height_px: 40.0,
            scoreboard: false,
            audio: false,
        }
    }

    pub fn compact() -> Self {
        Self {
            grid_width: 10,
            initial_speed_ms: 150,
            block_width_px: 40.0,
            ..Self::classic()
        }
    }

    pub fn arcade() -> Self {
        Self {
            scoreboard: true,
            audio: true,
            ..Self::classic()
        }
    }

    pub fn variant(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "classic" => Ok(Self::classic()),
            "compact" => Ok(Self::compact()),
            "arcade" => Ok(Self::arcade()),
            other => Err(ConfigError::UnknownVariant(other.to_string())),
        }
    }

    /// Parse a (possibly partial) JSON object; missing fields take the classic values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.initial_blocks == 0 || self.initial_blocks > self.grid_width {
            return Err(ConfigError::InitialBlocks {
                initial_blocks: self.initial_blocks,
                grid_width: self.grid_width,
            });
        }
        if self.speed_floor_ms == 0 {
            return Err(ConfigError::ZeroFloor);
        }
        if self.initial_speed_ms < self.speed_floor_ms {
            return Err(ConfigError::SpeedBelowFloor {
                initial: self.initial_speed_ms,
                floor: self.speed_floor_ms,
            });
        }
        Ok(())
    }

    /// Leftmost column of the centred first row.
    pub fn first_row_start(&self) -> u32 {
        (self.grid_width - self.initial_blocks) / 2
    }
}
