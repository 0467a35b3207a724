//! Opticon - a turn-based stealth pursuit on a concentric-ring grid
//!
//! Core modules:
//! - `sim`: Deterministic simulation (map generation, visibility, turn engine)
//! - `settings`: Game configuration with documented defaults
//! - `error`: Configuration and command errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{CommandError, ConfigError};
pub use settings::{GameConfig, MapConfig, ObstacleSeed};
pub use sim::Engine;

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Default grid side length (odd, so the tower has an exact center)
    pub const DEFAULT_GRID_SIZE: i32 = 31;
    pub const DEFAULT_MOAT_THICKNESS: i32 = 3;
    pub const DEFAULT_RING_THICKNESS: i32 = 4;
    /// Largest accepted grid side length
    pub const MAX_GRID_SIZE: i32 = 1025;

    /// Prisoner movement budget per turn
    pub const MAX_MOVEMENT_POINTS: u32 = 3;
    /// Noise marker lifetime (seconds of simulated time)
    pub const NOISE_TTL: f32 = 4.0;
    /// Manhattan distance at which ending a turn leaves noise behind
    pub const NOISE_MOVE_THRESHOLD: i32 = 2;
    /// Undrained engine events kept before the oldest are dropped
    pub const MAX_PENDING_EVENTS: usize = 1024;

    /// Prisoner sight ray length (tiles per cardinal direction)
    pub const SIGHT_RANGE: i32 = 5;

    /// Half-width of the central tower (3x3)
    pub const TOWER_RADIUS: i32 = 1;

    /// Obstacle scatter defaults
    pub const OBSTACLE_SEED: u64 = 12345;
    pub const SCATTER_SAMPLES: u32 = 220;
    pub const SCATTER_MARGIN: i32 = 3;
    pub const SCATTER_PROTECTED_RADIUS: i32 = 4;
    pub const WALL_CHANCE: f32 = 0.15;
    pub const OBJECT_CHANCE: f32 = 0.05;
}

/// Chebyshev distance between two cells (square ring bands)
#[inline]
pub fn chebyshev(a: IVec2, b: IVec2) -> i32 {
    let d = (a - b).abs();
    d.x.max(d.y)
}

/// Manhattan distance between two cells
#[inline]
pub fn manhattan(a: IVec2, b: IVec2) -> i32 {
    let d = (a - b).abs();
    d.x + d.y
}
