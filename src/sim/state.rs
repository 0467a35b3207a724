//! Game state and core simulation types
//!
//! The engine owns one `GameState`; collaborators only read it.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::map::{self, Grid};
use crate::settings::GameConfig;

/// Terrain of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Floor,
    Wall,
    Moat,
}

impl TileKind {
    pub fn blocks_movement(&self) -> bool {
        !matches!(self, TileKind::Floor)
    }

    /// Prisoner sight rays stop on (and include) the first blocking tile
    pub fn blocks_sight(&self) -> bool {
        !matches!(self, TileKind::Floor)
    }

    pub fn turf_path(&self) -> &'static str {
        match self {
            TileKind::Floor => "/turf/floor",
            TileKind::Wall => "/turf/wall",
            TileKind::Moat => "/turf/moat",
        }
    }
}

/// Object lying on a floor cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FloorObject {
    #[default]
    None,
    /// Crunches when stepped on
    Glass,
    /// Opens (noisily) when stepped on, then stays open
    Door,
    DoorLocked,
    WallObject,
}

impl FloorObject {
    /// Every placeable object, in scatter order
    pub const PLACEABLE: [FloorObject; 4] = [
        FloorObject::Glass,
        FloorObject::Door,
        FloorObject::DoorLocked,
        FloorObject::WallObject,
    ];

    pub fn blocks_movement(&self) -> bool {
        matches!(self, FloorObject::DoorLocked | FloorObject::WallObject)
    }

    /// Overlay path for map export (`None` when the cell is bare)
    pub fn turf_path(&self) -> Option<&'static str> {
        match self {
            FloorObject::None => None,
            FloorObject::Glass => Some("/turf/window"),
            FloorObject::Door => Some("/turf/door"),
            FloorObject::DoorLocked => Some("/turf/door/locked"),
            FloorObject::WallObject => Some("/turf/wall"),
        }
    }
}

/// Cardinal facing, clockwise from North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn index(&self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Quarter turns; positive is clockwise
    pub fn rotated(&self, quarter_turns: i32) -> Self {
        let index = (self.index() as i32 + quarter_turns).rem_euclid(4);
        Self::from_index(index as usize)
    }

    pub fn opposite(&self) -> Self {
        self.rotated(2)
    }

    /// Unit step in grid coordinates (y grows southward)
    pub fn step(&self) -> IVec2 {
        match self {
            Direction::North => IVec2::new(0, -1),
            Direction::East => IVec2::new(1, 0),
            Direction::South => IVec2::new(0, 1),
            Direction::West => IVec2::new(-1, 0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::East => "East",
            Direction::South => "South",
            Direction::West => "West",
        }
    }
}

/// The two sides of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Prisoner,
    Watcher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Prisoner => "Prisoner",
            Role::Watcher => "Watcher",
        }
    }
}

/// Current phase of the turn state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    PrisonerTurn,
    WatcherTurn,
    /// Terminal until reset
    GameOver { winner: Role },
}

impl GamePhase {
    /// Role whose commands are accepted, if any
    pub fn active_turn(&self) -> Option<Role> {
        match self {
            GamePhase::PrisonerTurn => Some(Role::Prisoner),
            GamePhase::WatcherTurn => Some(Role::Watcher),
            GamePhase::GameOver { .. } => None,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self, GamePhase::GameOver { .. })
    }
}

/// The escaping side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prisoner {
    pub position: IVec2,
    pub movement_points: u32,
    /// Where the current turn started (end-of-turn noise source)
    pub turn_start: IVec2,
}

impl Prisoner {
    pub fn new(position: IVec2, movement_points: u32) -> Self {
        Self {
            position,
            movement_points,
            turn_start: position,
        }
    }
}

/// The tower's occupant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Watcher {
    pub facing: Direction,
    /// Declared (false) facing shown to the Prisoner
    pub bluff: Option<Direction>,
    pub has_rotated: bool,
}

/// A decaying sound event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseMarker {
    pub position: IVec2,
    /// Seconds left
    pub ttl: f32,
}

impl NoiseMarker {
    pub fn is_live(&self) -> bool {
        self.ttl > 0.0
    }
}

/// What caused a noise marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseSource {
    /// Moved two or more tiles in one turn
    Footsteps,
    Glass,
    Door,
}

/// Why a move was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Obstacle {
    OutOfBounds,
    Wall,
    Moat,
    LockedDoor,
    WallObject,
}

impl Obstacle {
    pub fn describe(&self) -> &'static str {
        match self {
            Obstacle::OutOfBounds => "the edge of the world",
            Obstacle::Wall => "a wall",
            Obstacle::Moat => "the moat",
            Obstacle::LockedDoor => "a locked door",
            Obstacle::WallObject => "a wall object",
        }
    }
}

/// Why a command was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// Issued during the other role's turn
    WrongTurn,
    /// Game already over
    GameOver,
    /// Reset outside game over
    NotOver,
    NoMovementPoints,
    Blocked(Obstacle),
    AlreadyRotated,
    /// Bluff equals the true facing or its opposite
    BluffNotAllowed,
}

/// Observable side channel for renderers and audio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Moved { from: IVec2, to: IVec2 },
    NoiseMade { at: IVec2, source: NoiseSource },
    DoorOpened { at: IVec2 },
    MoveBlocked { at: IVec2, obstacle: Obstacle },
    Rotated { facing: Direction },
    BluffDeclared { direction: Direction },
    TurnEnded { next: Role },
    /// Prisoner's quadrant matches the true or bluffed facing (cosmetic)
    BeingWatched { quadrant: Direction },
    GameOver { winner: Role },
    Reset,
    CommandIgnored { rejection: Rejection },
}

impl GameEvent {
    /// Sound cue key, if this event has one
    pub fn cue(&self) -> Option<&'static str> {
        match self {
            GameEvent::Moved { .. } => Some("move"),
            GameEvent::NoiseMade { source, .. } => Some(match source {
                NoiseSource::Footsteps => "noise",
                NoiseSource::Glass => "glass",
                NoiseSource::Door => "door",
            }),
            GameEvent::DoorOpened { .. } => None,
            GameEvent::MoveBlocked { obstacle, .. } => Some(match obstacle {
                Obstacle::LockedDoor => "keys",
                _ => "wallhit",
            }),
            GameEvent::Rotated { .. } => Some("rotate"),
            GameEvent::BluffDeclared { .. } => Some("bluff"),
            GameEvent::TurnEnded { next } => Some(match next {
                Role::Watcher => "end_prisoner",
                Role::Prisoner => "end_watcher",
            }),
            GameEvent::BeingWatched { .. } => Some("paranoia"),
            GameEvent::GameOver { .. } => Some("game_over"),
            GameEvent::Reset => None,
            GameEvent::CommandIgnored { .. } => None,
        }
    }
}

/// Complete game state (serializable snapshot)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub grid: Grid,
    pub prisoner: Prisoner,
    pub watcher: Watcher,
    /// Live markers, oldest first; duplicates allowed
    pub noise_markers: Vec<NoiseMarker>,
}

impl GameState {
    /// Generate a fresh map and place both actors at their start
    pub fn new(config: &GameConfig) -> Self {
        let start = config.start_cell();
        let grid = map::generate(&config.map, &[start]);
        Self {
            phase: GamePhase::PrisonerTurn,
            grid,
            prisoner: Prisoner::new(start, config.max_movement_points),
            watcher: Watcher::default(),
            noise_markers: Vec::new(),
        }
    }

    pub fn active_turn(&self) -> Option<Role> {
        self.phase.active_turn()
    }

    pub fn ring_count(&self) -> i32 {
        self.grid.ring_count()
    }

    pub fn ring_thickness(&self) -> i32 {
        self.grid.ring_thickness()
    }

    pub fn moat_thickness(&self) -> i32 {
        self.grid.moat_thickness()
    }

    /// Any live marker on this cell
    pub fn is_noisy(&self, pos: IVec2) -> bool {
        self.noise_markers
            .iter()
            .any(|m| m.is_live() && m.position == pos)
    }
}
