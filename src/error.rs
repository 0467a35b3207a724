//! Error types for configuration and engine commands.
//!
//! Only argument preconditions are errors. Commands that are illegal in the
//! current phase, or blocked by the map, are reported as ignored outcomes.

use thiserror::Error;

/// Configuration rejected before a map is generated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid size {0} must be odd")]
    EvenGridSize(i32),

    #[error("grid size {size} is too small: need at least {min} for tower, moat and one ring")]
    GridTooSmall { size: i32, min: i32 },

    #[error("grid size {size} is too large: at most {max}")]
    GridTooLarge { size: i32, max: i32 },

    #[error("moat thickness must not be negative, got {0}")]
    NegativeMoat(i32),

    #[error("ring thickness must be at least 1, got {0}")]
    ZeroRingThickness(i32),

    #[error("configured ring count {configured} does not match derived ring count {derived}")]
    RingCountMismatch { configured: i32, derived: i32 },

    #[error("{name} must be within [0, 1], got {value}")]
    ChanceOutOfRange { name: &'static str, value: f32 },

    #[error("scatter margin {margin} leaves no room on a {size}x{size} grid")]
    ScatterMargin { margin: i32, size: i32 },

    #[error("movement budget must be at least 1")]
    ZeroMovementPoints,

    #[error("noise lifetime must be positive, got {0}")]
    NoiseTtl(f32),

    #[error("prisoner start ({x}, {y}) is not on a playable ring")]
    StartNotPlayable { x: i32, y: i32 },

    #[error("prisoner start ({x}, {y}) is already on the escape ring")]
    StartOnEscapeRing { x: i32, y: i32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Command arguments that violate a precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("movement ({dx}, {dy}) is not a unit cardinal step")]
    InvalidStep { dx: i32, dy: i32 },

    #[error("rotation delta {delta} must be +1 or -1")]
    InvalidRotation { delta: i32 },
}

pub type Result<T> = std::result::Result<T, CommandError>;
