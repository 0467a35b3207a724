//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (map scatter)
//! - Time only advances through `tick`
//! - Row-major iteration order over the grid
//! - No rendering or platform dependencies

pub mod engine;
pub mod map;
pub mod observe;
pub mod state;
pub mod tick;
pub mod visibility;

pub use engine::{CommandOutcome, Engine};
pub use map::{Cell, Grid, TurfCell, generate, ring_index_at};
pub use observe::{Observation, PrisonerView, WatcherView, observe};
pub use state::{
    Direction, FloorObject, GameEvent, GamePhase, GameState, NoiseMarker, NoiseSource, Obstacle,
    Prisoner, Rejection, Role, TileKind, Watcher,
};
pub use tick::tick;
pub use visibility::{in_watcher_wedge, prisoner_visibility, quadrant, wedge_cells};
