//! Ring-topology map generation
//!
//! Square grid around a 3x3 tower. Cells are banded by Chebyshev radius:
//! tower, moat, then playable rings numbered outward from 1. The border is
//! walled off and a seeded scatter sprinkles walls and floor objects over
//! the rings. No connectivity check is made; sealed pockets are possible.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{FloorObject, Obstacle, TileKind};
use crate::chebyshev;
use crate::consts::TOWER_RADIUS;
use crate::settings::{MapConfig, ObstacleSeed};

/// Ring index of non-playable cells (tower and moat)
pub const NOT_PLAYABLE: i32 = -1;

/// Ring index for a Chebyshev radius. Tower and moat map to `NOT_PLAYABLE`,
/// everything outside to `1..`.
pub fn ring_index_at(radius: i32, moat_thickness: i32, ring_thickness: i32) -> i32 {
    let ring_base = TOWER_RADIUS + moat_thickness;
    if radius <= ring_base {
        return NOT_PLAYABLE;
    }
    (radius - (ring_base + 1)) / ring_thickness.max(1) + 1
}

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub tile: TileKind,
    /// Only ever set on `Floor`
    pub object: FloorObject,
    pub ring: i32,
}

/// Exported form of a cell: turf path plus optional overlay path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TurfCell {
    pub turf: &'static str,
    pub overlay: Option<&'static str>,
}

/// The generated map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    size: i32,
    moat_thickness: i32,
    ring_thickness: i32,
    /// Outermost ring with non-border cells (the escape ring)
    ring_count: i32,
    /// Seed the scatter actually used
    seed: u64,
    /// Row-major
    cells: Vec<Cell>,
}

impl Grid {
    /// All-floor grid with no classification
    fn blank(size: i32, moat_thickness: i32, ring_thickness: i32, seed: u64) -> Self {
        Self {
            size,
            moat_thickness,
            ring_thickness,
            ring_count: 0,
            seed,
            cells: vec![Cell::default(); (size * size) as usize],
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn center(&self) -> IVec2 {
        IVec2::splat(self.size / 2)
    }

    pub fn ring_count(&self) -> i32 {
        self.ring_count
    }

    pub fn ring_thickness(&self) -> i32 {
        self.ring_thickness
    }

    pub fn moat_thickness(&self) -> i32 {
        self.moat_thickness
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.size && pos.y < self.size
    }

    pub fn is_border(&self, pos: IVec2) -> bool {
        pos.x == 0 || pos.y == 0 || pos.x == self.size - 1 || pos.y == self.size - 1
    }

    fn index(&self, pos: IVec2) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.size + pos.x) as usize)
    }

    pub fn cell(&self, pos: IVec2) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    fn cell_mut(&mut self, pos: IVec2) -> Option<&mut Cell> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    pub fn tile(&self, pos: IVec2) -> Option<TileKind> {
        self.cell(pos).map(|c| c.tile)
    }

    pub fn object(&self, pos: IVec2) -> Option<FloorObject> {
        self.cell(pos).map(|c| c.object)
    }

    pub fn ring_index(&self, pos: IVec2) -> Option<i32> {
        self.cell(pos).map(|c| c.ring)
    }

    /// What stops the Prisoner from entering `pos`, if anything
    pub fn obstacle_at(&self, pos: IVec2) -> Option<Obstacle> {
        let Some(cell) = self.cell(pos) else {
            return Some(Obstacle::OutOfBounds);
        };
        match (cell.tile, cell.object) {
            (TileKind::Wall, _) => Some(Obstacle::Wall),
            (TileKind::Moat, _) => Some(Obstacle::Moat),
            (TileKind::Floor, FloorObject::DoorLocked) => Some(Obstacle::LockedDoor),
            (TileKind::Floor, FloorObject::WallObject) => Some(Obstacle::WallObject),
            (TileKind::Floor, _) => None,
        }
    }

    /// Replace the object on a floor cell. Returns false for non-floor cells.
    pub(crate) fn set_object(&mut self, pos: IVec2, object: FloorObject) -> bool {
        match self.cell_mut(pos) {
            Some(cell) if cell.tile == TileKind::Floor => {
                cell.object = object;
                true
            }
            _ => false,
        }
    }

    /// Iterate over `(position, cell)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &Cell)> {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (IVec2::new(i as i32 % size, i as i32 / size), cell))
    }

    /// Rows of turf/overlay paths for map export
    pub fn turf_rows(&self) -> Vec<Vec<TurfCell>> {
        self.cells
            .chunks(self.size as usize)
            .map(|row| {
                row.iter()
                    .map(|cell| TurfCell {
                        turf: cell.tile.turf_path(),
                        overlay: cell.object.turf_path(),
                    })
                    .collect()
            })
            .collect()
    }
}

fn resolve_seed(seed: ObstacleSeed) -> u64 {
    match seed {
        ObstacleSeed::Fixed(seed) => seed,
        ObstacleSeed::Random => rand::random(),
    }
}

/// Generate a map. `config` must already be validated; cells in `keep_clear`
/// are never scattered over or given landmarks.
pub fn generate(config: &MapConfig, keep_clear: &[IVec2]) -> Grid {
    debug_assert!(config.validate().is_ok(), "map config must be validated");

    let seed = resolve_seed(config.obstacle_seed);
    let mut grid = Grid::blank(
        config.size,
        config.moat_thickness,
        config.ring_thickness,
        seed,
    );
    let center = grid.center();

    // Tower
    for dy in -TOWER_RADIUS..=TOWER_RADIUS {
        for dx in -TOWER_RADIUS..=TOWER_RADIUS {
            if let Some(cell) = grid.cell_mut(center + IVec2::new(dx, dy)) {
                cell.tile = TileKind::Wall;
                cell.ring = NOT_PLAYABLE;
            }
        }
    }

    // Moat and rings. Moat cells get NOT_PLAYABLE here and are never
    // reclassified; the tower keeps its walls.
    for y in 0..config.size {
        for x in 0..config.size {
            let pos = IVec2::new(x, y);
            let radius = chebyshev(pos, center);
            if radius <= TOWER_RADIUS {
                continue;
            }
            let ring = ring_index_at(radius, config.moat_thickness, config.ring_thickness);
            let is_border = grid.is_border(pos);
            if let Some(cell) = grid.cell_mut(pos) {
                cell.ring = ring;
                if ring == NOT_PLAYABLE && cell.tile == TileKind::Floor {
                    cell.tile = TileKind::Moat;
                }
            }
            if !is_border {
                grid.ring_count = grid.ring_count.max(ring);
            }
        }
    }

    // Border walls
    for i in 0..config.size {
        for pos in [
            IVec2::new(i, 0),
            IVec2::new(i, config.size - 1),
            IVec2::new(0, i),
            IVec2::new(config.size - 1, i),
        ] {
            if let Some(cell) = grid.cell_mut(pos) {
                cell.tile = TileKind::Wall;
            }
        }
    }

    let mut rng = Pcg32::seed_from_u64(seed);
    scatter(&mut grid, config, &mut rng, keep_clear);
    place_landmarks(&mut grid, config, keep_clear);

    log::info!(
        "Generated {}x{} map: seed={}, rings={}, moat={}, ring thickness={}",
        config.size,
        config.size,
        seed,
        grid.ring_count,
        config.moat_thickness,
        config.ring_thickness
    );
    grid
}

/// Sprinkle walls and floor objects over sampled cells outside the
/// protected radius
fn scatter(grid: &mut Grid, config: &MapConfig, rng: &mut Pcg32, keep_clear: &[IVec2]) {
    let center = grid.center();
    let span = config.size - 2 * config.scatter_margin;
    let mut walls = 0u32;
    let mut objects = 0u32;

    for _ in 0..config.scatter_samples {
        let pos = IVec2::new(
            config.scatter_margin + rng.random_range(0..span),
            config.scatter_margin + rng.random_range(0..span),
        );
        if chebyshev(pos, center) <= config.protected_radius || keep_clear.contains(&pos) {
            continue;
        }
        let wall_roll: f32 = rng.random();
        let object_roll: f32 = rng.random();
        let pick = rng.random_range(0..FloorObject::PLACEABLE.len());

        let Some(cell) = grid.cell_mut(pos) else {
            continue;
        };
        if cell.tile != TileKind::Floor || cell.object != FloorObject::None {
            continue;
        }
        if wall_roll < config.wall_chance {
            cell.tile = TileKind::Wall;
            walls += 1;
        } else if object_roll < config.object_chance {
            cell.object = FloorObject::PLACEABLE[pick];
            objects += 1;
        }
    }

    log::debug!("Scatter placed {} walls and {} objects", walls, objects);
}

fn place_landmarks(grid: &mut Grid, config: &MapConfig, keep_clear: &[IVec2]) {
    let center = grid.center();
    for landmark in &config.landmarks {
        let pos = center.saturating_add(landmark.offset);
        if keep_clear.contains(&pos) {
            continue;
        }
        if !grid.set_object(pos, landmark.object) {
            log::debug!(
                "Landmark {:?} at ({}, {}) skipped: not a floor cell",
                landmark.object,
                pos.x,
                pos.y
            );
        }
    }
}
