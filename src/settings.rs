//! Game configuration
//!
//! Everything the engine needs at construction, with documented defaults.
//! Loaded from JSON; any missing field falls back to its default.

use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::map::ring_index_at;
use crate::sim::state::FloorObject;

/// Map size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MapPreset {
    /// 31x31, thin moat, four-wide rings
    #[default]
    Compact,
    /// 41x41, wide moat and rings
    Classic,
}

impl MapPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapPreset::Compact => "Compact",
            MapPreset::Classic => "Classic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "compact" | "small" => Some(MapPreset::Compact),
            "classic" | "large" => Some(MapPreset::Classic),
            _ => None,
        }
    }

    /// Grid side length for this preset
    pub fn size(&self) -> i32 {
        match self {
            MapPreset::Compact => DEFAULT_GRID_SIZE,
            MapPreset::Classic => 41,
        }
    }

    pub fn moat_thickness(&self) -> i32 {
        match self {
            MapPreset::Compact => DEFAULT_MOAT_THICKNESS,
            MapPreset::Classic => 5,
        }
    }

    pub fn ring_thickness(&self) -> i32 {
        match self {
            MapPreset::Compact => DEFAULT_RING_THICKNESS,
            MapPreset::Classic => 5,
        }
    }

    /// Prisoner start, relative to the tower
    pub fn prisoner_start(&self) -> IVec2 {
        match self {
            MapPreset::Compact => IVec2::new(4, 6),
            MapPreset::Classic => IVec2::new(6, 8),
        }
    }
}

/// Seed for the obstacle scatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleSeed {
    /// Same map every time
    Fixed(u64),
    /// Fresh seed on every generation
    Random,
}

impl Default for ObstacleSeed {
    fn default() -> Self {
        ObstacleSeed::Fixed(OBSTACLE_SEED)
    }
}

/// A fixed object placed relative to the tower after scattering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmark {
    pub offset: IVec2,
    pub object: FloorObject,
}

fn default_landmarks() -> Vec<Landmark> {
    vec![
        Landmark {
            offset: IVec2::new(8, 2),
            object: FloorObject::DoorLocked,
        },
        Landmark {
            offset: IVec2::new(-9, -6),
            object: FloorObject::WallObject,
        },
        Landmark {
            offset: IVec2::new(12, -10),
            object: FloorObject::Glass,
        },
    ]
}

/// Map generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Grid side length, must be odd
    pub size: i32,
    pub moat_thickness: i32,
    pub ring_thickness: i32,
    /// Optional check against the ring count derived from the geometry
    pub ring_count: Option<i32>,
    pub obstacle_seed: ObstacleSeed,

    // === Scatter ===
    /// Candidate cells sampled for obstacles
    pub scatter_samples: u32,
    /// Cells closer than this to the border are never sampled
    pub scatter_margin: i32,
    /// Chebyshev radius around the tower that is never scattered
    pub protected_radius: i32,
    /// Chance a sampled floor cell becomes a wall
    pub wall_chance: f32,
    /// Chance a sampled floor cell receives a floor object
    pub object_chance: f32,

    pub landmarks: Vec<Landmark>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::from_preset(MapPreset::default())
    }
}

impl MapConfig {
    /// Map parameters from a size preset (scatter settings stay default)
    pub fn from_preset(preset: MapPreset) -> Self {
        Self {
            size: preset.size(),
            moat_thickness: preset.moat_thickness(),
            ring_thickness: preset.ring_thickness(),
            ring_count: None,
            obstacle_seed: ObstacleSeed::default(),
            scatter_samples: SCATTER_SAMPLES,
            scatter_margin: SCATTER_MARGIN,
            protected_radius: SCATTER_PROTECTED_RADIUS,
            wall_chance: WALL_CHANCE,
            object_chance: OBJECT_CHANCE,
            landmarks: default_landmarks(),
        }
    }

    /// A map with no scattered obstacles or landmarks
    pub fn open(mut self) -> Self {
        self.wall_chance = 0.0;
        self.object_chance = 0.0;
        self.landmarks.clear();
        self
    }

    /// Center cell (the tower)
    pub fn center(&self) -> IVec2 {
        IVec2::splat(self.size / 2)
    }

    /// Outermost ring that still has non-border cells
    pub fn derived_ring_count(&self) -> i32 {
        ring_index_at(self.size / 2 - 1, self.moat_thickness, self.ring_thickness)
    }

    /// Smallest odd size that fits tower, moat and one ring inside the border
    fn min_size(&self) -> i32 {
        self.moat_thickness
            .checked_add(TOWER_RADIUS + 2)
            .and_then(|half| half.checked_mul(2))
            .and_then(|side| side.checked_add(1))
            .unwrap_or(i32::MAX)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size % 2 == 0 {
            return Err(ConfigError::EvenGridSize(self.size));
        }
        if self.size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                size: self.size,
                max: MAX_GRID_SIZE,
            });
        }
        if self.moat_thickness < 0 {
            return Err(ConfigError::NegativeMoat(self.moat_thickness));
        }
        if self.ring_thickness < 1 {
            return Err(ConfigError::ZeroRingThickness(self.ring_thickness));
        }
        let min = self.min_size();
        if self.size < min {
            return Err(ConfigError::GridTooSmall {
                size: self.size,
                min,
            });
        }
        if self.scatter_margin < 0 || self.scatter_margin > (self.size - 1) / 2 {
            return Err(ConfigError::ScatterMargin {
                margin: self.scatter_margin,
                size: self.size,
            });
        }
        for (name, value) in [
            ("wall_chance", self.wall_chance),
            ("object_chance", self.object_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ChanceOutOfRange { name, value });
            }
        }
        if let Some(configured) = self.ring_count {
            let derived = self.derived_ring_count();
            if configured != derived {
                return Err(ConfigError::RingCountMismatch {
                    configured,
                    derived,
                });
            }
        }
        Ok(())
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map: MapConfig,
    /// Prisoner start, relative to the tower
    pub prisoner_start: IVec2,
    /// Prisoner moves per turn
    pub max_movement_points: u32,
    /// Noise marker lifetime in seconds
    pub noise_ttl: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_preset(MapPreset::default())
    }
}

impl GameConfig {
    /// Create a config from a map preset
    pub fn from_preset(preset: MapPreset) -> Self {
        Self {
            map: MapConfig::from_preset(preset),
            prisoner_start: preset.prisoner_start(),
            max_movement_points: MAX_MOVEMENT_POINTS,
            noise_ttl: NOISE_TTL,
        }
    }

    /// Absolute Prisoner start cell
    pub fn start_cell(&self) -> IVec2 {
        self.map.center().saturating_add(self.prisoner_start)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.map.validate()?;
        if self.max_movement_points == 0 {
            return Err(ConfigError::ZeroMovementPoints);
        }
        if !(self.noise_ttl > 0.0 && self.noise_ttl.is_finite()) {
            return Err(ConfigError::NoiseTtl(self.noise_ttl));
        }

        let start = self.start_cell();
        let border = self.map.size - 1;
        let inside = start.x > 0 && start.y > 0 && start.x < border && start.y < border;
        let ring = inside.then(|| {
            let radius = crate::chebyshev(start, self.map.center());
            ring_index_at(radius, self.map.moat_thickness, self.map.ring_thickness)
        });
        match ring {
            Some(ring) if ring >= 1 && ring < self.map.derived_ring_count() => Ok(()),
            Some(ring) if ring >= 1 => Err(ConfigError::StartOnEscapeRing {
                x: start.x,
                y: start.y,
            }),
            _ => Err(ConfigError::StartNotPlayable {
                x: start.x,
                y: start.y,
            }),
        }
    }

    /// Parse a config from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Config saved to {}", path.as_ref().display());
        Ok(())
    }
}
