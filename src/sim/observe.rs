//! Per-role views for hot-seat play
//!
//! Each role gets only what it could know: the Prisoner never sees the
//! Watcher's true facing, the Watcher never sees the Prisoner.

use std::collections::HashSet;

use glam::IVec2;
use serde::Serialize;

use super::state::{Direction, GamePhase, GameState, NoiseMarker, Role};
use super::visibility::{prisoner_visibility, wedge_cells};

#[derive(Debug, Clone, Serialize)]
pub struct PrisonerView {
    pub phase: GamePhase,
    pub position: IVec2,
    pub movement_points: u32,
    pub ring: i32,
    pub ring_count: i32,
    pub visible: HashSet<IVec2>,
    /// Quadrant flagged by the last paranoia alert, if any
    pub watched: Option<Direction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatcherView {
    pub phase: GamePhase,
    pub facing: Direction,
    pub bluff: Option<Direction>,
    pub has_rotated: bool,
    pub wedge: Vec<IVec2>,
    pub noise_markers: Vec<NoiseMarker>,
}

#[derive(Debug, Clone, Serialize)]
pub enum Observation {
    Prisoner(PrisonerView),
    Watcher(WatcherView),
}

/// Build the view for `role`. `watched` is the engine's last paranoia alert.
pub fn observe(state: &GameState, role: Role, watched: Option<Direction>) -> Observation {
    match role {
        Role::Prisoner => {
            let position = state.prisoner.position;
            Observation::Prisoner(PrisonerView {
                phase: state.phase,
                position,
                movement_points: state.prisoner.movement_points,
                ring: state.grid.ring_index(position).unwrap_or_default(),
                ring_count: state.ring_count(),
                visible: prisoner_visibility(&state.grid, position),
                watched,
            })
        }
        Role::Watcher => Observation::Watcher(WatcherView {
            phase: state.phase,
            facing: state.watcher.facing,
            bluff: state.watcher.bluff,
            has_rotated: state.watcher.has_rotated,
            wedge: wedge_cells(&state.grid, state.watcher.facing),
            noise_markers: state
                .noise_markers
                .iter()
                .filter(|m| m.is_live())
                .copied()
                .collect(),
        }),
    }
}
