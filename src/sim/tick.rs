//! Per-frame passive update
//!
//! Noise decay is the only state change that happens without a command.

use super::state::GameState;

/// Age every noise marker by `dt` seconds and drop the expired ones
///
/// No-op once the game is over. Negative or non-finite `dt` counts as zero.
pub fn tick(state: &mut GameState, dt: f32) {
    if state.phase.is_over() {
        return;
    }

    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    for marker in &mut state.noise_markers {
        marker.ttl -= dt;
    }

    let before = state.noise_markers.len();
    state.noise_markers.retain(|m| m.is_live());
    let expired = before - state.noise_markers.len();
    if expired > 0 {
        log::trace!("{} noise marker(s) faded", expired);
    }
}
