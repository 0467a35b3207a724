//! Line-of-sight for both roles
//!
//! The Prisoner sees along four cardinal rays; the Watcher sees a 90 degree
//! wedge out of the tower. Both are pure functions of the grid and positions.

use std::collections::HashSet;

use glam::IVec2;

use super::map::Grid;
use super::state::Direction;
use crate::consts::SIGHT_RANGE;

/// Cells the Prisoner can see from `pos`
///
/// Always contains `pos` itself. Each cardinal ray walks up to
/// `SIGHT_RANGE` cells and stops after the first wall or moat cell, which is
/// still marked visible.
pub fn prisoner_visibility(grid: &Grid, pos: IVec2) -> HashSet<IVec2> {
    let mut visible = HashSet::with_capacity(1 + 4 * SIGHT_RANGE as usize);
    visible.insert(pos);

    for dir in Direction::ALL {
        let step = dir.step();
        let mut cursor = pos;
        for _ in 0..SIGHT_RANGE {
            cursor += step;
            let Some(tile) = grid.tile(cursor) else {
                break;
            };
            visible.insert(cursor);
            if tile.blocks_sight() {
                break;
            }
        }
    }

    visible
}

/// Whether `point` lies in the Watcher's 90 degree wedge facing `dir`
///
/// The dominant-axis test is strict and the diagonal bound inclusive, so a
/// cell exactly on a diagonal lies in both adjacent wedges. The center lies
/// in none.
pub fn in_watcher_wedge(dir: Direction, point: IVec2, center: IVec2) -> bool {
    let d = point - center;
    match dir {
        Direction::North => d.y < 0 && d.x.abs() <= -d.y,
        Direction::East => d.x > 0 && d.y.abs() <= d.x,
        Direction::South => d.y > 0 && d.x.abs() <= d.y,
        Direction::West => d.x < 0 && d.y.abs() <= -d.x,
    }
}

/// The wedge containing `point`, `None` at the center
///
/// Diagonal cells sit in two wedges; the first in clockwise order from
/// North wins.
pub fn quadrant(point: IVec2, center: IVec2) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .find(|&dir| in_watcher_wedge(dir, point, center))
}

/// Every grid cell inside the wedge facing `dir`
pub fn wedge_cells(grid: &Grid, dir: Direction) -> Vec<IVec2> {
    let center = grid.center();
    grid.iter()
        .map(|(pos, _)| pos)
        .filter(|&pos| in_watcher_wedge(dir, pos, center))
        .collect()
}
