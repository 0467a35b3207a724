//! Turn engine
//!
//! Owns the game state and enforces the turn rules:
//!
//! ```text
//! PrisonerTurn --end_turn--> WatcherTurn --end_turn--> PrisonerTurn
//!      |  move onto last ring        |
//!      v                             v  (capture check on entry)
//!  GameOver(Prisoner)          GameOver(Watcher)
//! ```
//!
//! Commands run to completion one at a time. Malformed arguments are errors;
//! commands that are illegal right now are ignored, reported through the
//! returned `CommandOutcome` and the event stream.

use std::collections::HashSet;

use glam::IVec2;

use super::observe::{self, Observation};
use super::state::{
    Direction, FloorObject, GameEvent, GamePhase, GameState, NoiseMarker, NoiseSource, Rejection,
    Role, TileKind,
};
use super::tick;
use super::visibility::{self, in_watcher_wedge};
use crate::consts::{MAX_PENDING_EVENTS, NOISE_MOVE_THRESHOLD};
use crate::error::{CommandError, ConfigError, Result};
use crate::manhattan;
use crate::settings::GameConfig;

/// What happened to a well-formed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Ignored(Rejection),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

/// A single game session
#[derive(Debug, Clone)]
pub struct Engine {
    config: GameConfig,
    state: GameState,
    /// Pending events, oldest first, at most `MAX_PENDING_EVENTS`
    events: Vec<GameEvent>,
    /// Last paranoia alert, kept until the Prisoner ends its turn
    watched: Option<Direction>,
}

impl Engine {
    /// Validate `config` and start a session on a freshly generated map
    pub fn new(config: GameConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let state = GameState::new(&config);
        log::info!(
            "New session: prisoner at ({}, {}), escape ring {}",
            state.prisoner.position.x,
            state.prisoner.position.y,
            state.ring_count()
        );
        Ok(Self {
            config,
            state,
            events: Vec::new(),
            watched: None,
        })
    }

    // === Queries ===

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<TileKind> {
        self.state.grid.tile(IVec2::new(x, y))
    }

    pub fn ring_index(&self, x: i32, y: i32) -> Option<i32> {
        self.state.grid.ring_index(IVec2::new(x, y))
    }

    pub fn floor_object(&self, x: i32, y: i32) -> Option<FloorObject> {
        self.state.grid.object(IVec2::new(x, y))
    }

    pub fn prisoner_visibility(&self) -> HashSet<IVec2> {
        visibility::prisoner_visibility(&self.state.grid, self.state.prisoner.position)
    }

    pub fn is_in_watcher_wedge(&self, dir: Direction, x: i32, y: i32) -> bool {
        in_watcher_wedge(dir, IVec2::new(x, y), self.state.grid.center())
    }

    pub fn noise_markers(&self) -> &[NoiseMarker] {
        &self.state.noise_markers
    }

    /// What `role` is allowed to see right now
    pub fn observe(&self, role: Role) -> Observation {
        observe::observe(&self.state, role, self.watched)
    }

    /// Events not yet drained
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending events
    ///
    /// Consumers should drain once per frame. Only the newest
    /// `MAX_PENDING_EVENTS` are kept; older ones are dropped.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Prisoner commands ===

    /// Step the Prisoner one cell. `(dx, dy)` must be a unit cardinal step.
    pub fn move_prisoner(&mut self, dx: i32, dy: i32) -> Result<CommandOutcome> {
        let step = IVec2::new(dx, dy);
        if manhattan(step, IVec2::ZERO) != 1 {
            return Err(CommandError::InvalidStep { dx, dy });
        }
        if let Some(rejection) = self.turn_rejection(Role::Prisoner) {
            return Ok(self.ignore(rejection));
        }
        if self.state.prisoner.movement_points == 0 {
            return Ok(self.ignore(Rejection::NoMovementPoints));
        }

        let from = self.state.prisoner.position;
        let to = from + step;
        if let Some(obstacle) = self.state.grid.obstacle_at(to) {
            log::debug!("Move to ({}, {}) blocked by {}", to.x, to.y, obstacle.describe());
            self.emit(GameEvent::MoveBlocked { at: to, obstacle });
            return Ok(CommandOutcome::Ignored(Rejection::Blocked(obstacle)));
        }

        self.state.prisoner.movement_points -= 1;
        self.state.prisoner.position = to;
        self.emit(GameEvent::Moved { from, to });
        log::debug!(
            "Prisoner moved to ({}, {}), {} MP left",
            to.x,
            to.y,
            self.state.prisoner.movement_points
        );

        match self.state.grid.object(to) {
            Some(FloorObject::Glass) => self.make_noise(to, NoiseSource::Glass),
            Some(FloorObject::Door) => {
                self.make_noise(to, NoiseSource::Door);
                self.state.grid.set_object(to, FloorObject::None);
                self.emit(GameEvent::DoorOpened { at: to });
            }
            _ => {}
        }

        if self.state.grid.ring_index(to) == Some(self.state.ring_count()) {
            self.finish(Role::Prisoner);
        }
        Ok(CommandOutcome::Applied)
    }

    // === Watcher commands ===

    /// Turn the Watcher a quarter turn; `delta` is +1 (clockwise) or -1.
    /// Only once per Watcher turn.
    pub fn rotate_watcher(&mut self, delta: i32) -> Result<CommandOutcome> {
        if delta != 1 && delta != -1 {
            return Err(CommandError::InvalidRotation { delta });
        }
        if let Some(rejection) = self.turn_rejection(Role::Watcher) {
            return Ok(self.ignore(rejection));
        }
        if self.state.watcher.has_rotated {
            return Ok(self.ignore(Rejection::AlreadyRotated));
        }

        let facing = self.state.watcher.facing.rotated(delta);
        self.state.watcher.facing = facing;
        self.state.watcher.has_rotated = true;
        self.emit(GameEvent::Rotated { facing });
        log::debug!("Watcher rotated to {}", facing.as_str());
        Ok(CommandOutcome::Applied)
    }

    /// Declare a false facing. The true facing and its opposite are refused.
    pub fn set_bluff(&mut self, direction: Direction) -> CommandOutcome {
        if let Some(rejection) = self.turn_rejection(Role::Watcher) {
            return self.ignore(rejection);
        }
        let facing = self.state.watcher.facing;
        if direction == facing || direction == facing.opposite() {
            return self.ignore(Rejection::BluffNotAllowed);
        }

        self.state.watcher.bluff = Some(direction);
        self.emit(GameEvent::BluffDeclared { direction });
        log::debug!("Watcher bluff declared: {}", direction.as_str());
        CommandOutcome::Applied
    }

    // === Shared commands ===

    /// Hand the turn to the other role
    pub fn end_turn(&mut self) -> CommandOutcome {
        match self.state.phase {
            GamePhase::PrisonerTurn => self.end_prisoner_turn(),
            GamePhase::WatcherTurn => self.end_watcher_turn(),
            GamePhase::GameOver { .. } => return self.ignore(Rejection::GameOver),
        }
        CommandOutcome::Applied
    }

    /// Advance simulated time by `dt` seconds (noise decay only)
    pub fn tick(&mut self, dt: f32) {
        tick::tick(&mut self.state, dt);
    }

    /// Start over on a regenerated map. Only valid once the game is over.
    pub fn reset(&mut self) -> CommandOutcome {
        if !self.state.phase.is_over() {
            return self.ignore(Rejection::NotOver);
        }
        self.state = GameState::new(&self.config);
        self.watched = None;
        self.emit(GameEvent::Reset);
        log::info!("Session reset (map seed {})", self.state.grid.seed());
        CommandOutcome::Applied
    }

    // === Transitions ===

    fn end_prisoner_turn(&mut self) {
        let prisoner = &self.state.prisoner;
        let start = prisoner.turn_start;
        if manhattan(prisoner.position, start) >= NOISE_MOVE_THRESHOLD {
            self.make_noise(start, NoiseSource::Footsteps);
        }

        self.state.prisoner.movement_points = 0;
        self.state.watcher.has_rotated = false;
        self.watched = None;
        self.state.phase = GamePhase::WatcherTurn;
        self.emit(GameEvent::TurnEnded {
            next: Role::Watcher,
        });
        log::info!("Turn ended: Watcher");

        if self.is_captured() {
            self.finish(Role::Watcher);
        }
    }

    fn end_watcher_turn(&mut self) {
        // Paranoia is cosmetic: it only feeds the event stream and the
        // Prisoner's observation.
        // Checked against the same wedges as capture, so diagonal cells
        // alert for either neighbouring facing.
        let position = self.state.prisoner.position;
        let center = self.state.grid.center();
        let watcher = &self.state.watcher;
        self.watched = [Some(watcher.facing), watcher.bluff]
            .into_iter()
            .flatten()
            .find(|&dir| in_watcher_wedge(dir, position, center));
        if let Some(quadrant) = self.watched {
            self.emit(GameEvent::BeingWatched { quadrant });
            log::info!("Prisoner feels watched from the {}", quadrant.as_str());
        }

        self.state.watcher.bluff = None;
        self.state.prisoner.movement_points = self.config.max_movement_points;
        self.state.prisoner.turn_start = position;
        self.state.phase = GamePhase::PrisonerTurn;
        self.emit(GameEvent::TurnEnded {
            next: Role::Prisoner,
        });
        log::info!("Turn ended: Prisoner");
    }

    /// Live noise on the Prisoner's current cell, inside the true facing wedge
    fn is_captured(&self) -> bool {
        let position = self.state.prisoner.position;
        self.state.is_noisy(position)
            && in_watcher_wedge(
                self.state.watcher.facing,
                position,
                self.state.grid.center(),
            )
    }

    fn finish(&mut self, winner: Role) {
        self.state.phase = GamePhase::GameOver { winner };
        self.emit(GameEvent::GameOver { winner });
        log::info!("Game over: {} wins", winner.as_str());
    }

    // === Helpers ===

    fn turn_rejection(&self, role: Role) -> Option<Rejection> {
        match self.state.phase.active_turn() {
            None => Some(Rejection::GameOver),
            Some(active) if active == role => None,
            Some(_) => Some(Rejection::WrongTurn),
        }
    }

    fn emit(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            let dropped = self.events.len() + 1 - MAX_PENDING_EVENTS;
            self.events.drain(..dropped);
            log::debug!("Event buffer full, dropped {} oldest", dropped);
        }
        self.events.push(event);
    }

    fn ignore(&mut self, rejection: Rejection) -> CommandOutcome {
        log::debug!("Command ignored: {:?}", rejection);
        self.emit(GameEvent::CommandIgnored { rejection });
        CommandOutcome::Ignored(rejection)
    }

    fn make_noise(&mut self, at: IVec2, source: NoiseSource) {
        self.state.noise_markers.push(NoiseMarker {
            position: at,
            ttl: self.config.noise_ttl,
        });
        self.emit(GameEvent::NoiseMade { at, source });
        log::debug!("Noise at ({}, {}) from {:?}", at.x, at.y, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MapConfig;
    use crate::sim::state::Obstacle;
    use proptest::prelude::*;

    fn open_engine() -> Engine {
        let mut config = GameConfig::default();
        config.map = MapConfig::default().open();
        Engine::new(config).unwrap()
    }

    fn place(engine: &mut Engine, pos: IVec2) {
        engine.state.prisoner.position = pos;
        engine.state.prisoner.turn_start = pos;
    }

    fn pass_watcher_turn(engine: &mut Engine) {
        assert!(engine.end_turn().is_applied());
        assert!(engine.end_turn().is_applied());
    }

    #[test]
    fn test_move_spends_movement_points() {
        let mut engine = open_engine();
        for expected in [2, 1, 0] {
            let outcome = engine.move_prisoner(1, 0).unwrap();
            assert_eq!(outcome, CommandOutcome::Applied);
            assert_eq!(engine.state().prisoner.movement_points, expected);
        }
        assert_eq!(engine.state().prisoner.position, IVec2::new(22, 21));

        let outcome = engine.move_prisoner(1, 0).unwrap();
        assert_eq!(outcome, CommandOutcome::Ignored(Rejection::NoMovementPoints));
        assert_eq!(engine.state().prisoner.movement_points, 0);
        assert_eq!(engine.state().prisoner.position, IVec2::new(22, 21));
    }

    #[test]
    fn test_move_rejects_non_unit_steps() {
        let mut engine = open_engine();
        for (dx, dy) in [(0, 0), (1, 1), (2, 0), (0, -3), (-1, 1)] {
            assert_eq!(
                engine.move_prisoner(dx, dy),
                Err(CommandError::InvalidStep { dx, dy })
            );
        }
        assert_eq!(engine.state().prisoner.movement_points, 3);
        assert_eq!(engine.state().prisoner.position, IVec2::new(19, 21));
    }

    #[test]
    fn test_move_blocked_by_terrain() {
        let mut engine = open_engine();
        place(&mut engine, IVec2::new(20, 15));
        assert_eq!(
            engine.move_prisoner(-1, 0).unwrap(),
            CommandOutcome::Ignored(Rejection::Blocked(Obstacle::Moat))
        );

        place(&mut engine, IVec2::new(29, 15));
        assert_eq!(
            engine.move_prisoner(1, 0).unwrap(),
            CommandOutcome::Ignored(Rejection::Blocked(Obstacle::Wall))
        );
        assert_eq!(engine.state().prisoner.movement_points, 3);

        let cues: Vec<_> = engine.drain_events().iter().filter_map(|e| e.cue()).collect();
        assert_eq!(cues, vec!["wallhit", "wallhit"]);
    }

    #[test]
    fn test_move_blocked_by_objects() {
        let mut engine = open_engine();
        engine
            .state
            .grid
            .set_object(IVec2::new(20, 21), FloorObject::DoorLocked);
        engine
            .state
            .grid
            .set_object(IVec2::new(19, 22), FloorObject::WallObject);

        assert_eq!(
            engine.move_prisoner(1, 0).unwrap(),
            CommandOutcome::Ignored(Rejection::Blocked(Obstacle::LockedDoor))
        );
        assert_eq!(
            engine.move_prisoner(0, 1).unwrap(),
            CommandOutcome::Ignored(Rejection::Blocked(Obstacle::WallObject))
        );
        assert_eq!(engine.state().prisoner.movement_points, 3);
        assert_eq!(
            engine.floor_object(20, 21),
            Some(FloorObject::DoorLocked)
        );
        let cues: Vec<_> = engine.drain_events().iter().filter_map(|e| e.cue()).collect();
        assert_eq!(cues, vec!["keys", "wallhit"]);
    }

    #[test]
    fn test_glass_makes_noise_immediately() {
        let mut engine = open_engine();
        engine
            .state
            .grid
            .set_object(IVec2::new(20, 21), FloorObject::Glass);
        engine.move_prisoner(1, 0).unwrap();
        assert_eq!(
            engine.noise_markers(),
            &[NoiseMarker {
                position: IVec2::new(20, 21),
                ttl: 4.0
            }]
        );
        // Glass stays
        assert_eq!(engine.floor_object(20, 21), Some(FloorObject::Glass));
    }

    #[test]
    fn test_door_opens_for_good() {
        let mut engine = open_engine();
        engine
            .state
            .grid
            .set_object(IVec2::new(20, 21), FloorObject::Door);
        engine.move_prisoner(1, 0).unwrap();
        assert_eq!(engine.noise_markers().len(), 1);
        assert_eq!(engine.floor_object(20, 21), Some(FloorObject::None));

        // Walking back over the open door is silent
        engine.move_prisoner(-1, 0).unwrap();
        engine.move_prisoner(1, 0).unwrap();
        assert_eq!(engine.noise_markers().len(), 1);
        assert!(engine
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::DoorOpened { .. })));
    }

    #[test]
    fn test_escape_on_outermost_ring() {
        let mut engine = open_engine();
        // radius 12 is ring 2, radius 13 is ring 3 (the last)
        place(&mut engine, IVec2::new(27, 21));
        assert_eq!(engine.ring_index(27, 21), Some(2));
        engine.move_prisoner(1, 0).unwrap();
        assert_eq!(
            engine.phase(),
            GamePhase::GameOver {
                winner: Role::Prisoner
            }
        );

        // Frozen
        assert_eq!(
            engine.move_prisoner(-1, 0).unwrap(),
            CommandOutcome::Ignored(Rejection::GameOver)
        );
        assert_eq!(engine.end_turn(), CommandOutcome::Ignored(Rejection::GameOver));
        assert_eq!(
            engine.set_bluff(Direction::East),
            CommandOutcome::Ignored(Rejection::GameOver)
        );
    }

    #[test]
    fn test_no_escape_below_last_ring() {
        let mut engine = open_engine();
        place(&mut engine, IVec2::new(26, 21));
        engine.move_prisoner(1, 0).unwrap();
        assert_eq!(engine.phase(), GamePhase::PrisonerTurn);
    }

    #[test]
    fn test_end_turn_noise_threshold() {
        let mut engine = open_engine();
        engine.move_prisoner(1, 0).unwrap();
        engine.end_turn();
        assert!(engine.noise_markers().is_empty());
        assert_eq!(engine.state().prisoner.movement_points, 0);
        assert_eq!(engine.phase(), GamePhase::WatcherTurn);

        engine.end_turn();
        assert_eq!(engine.state().prisoner.turn_start, IVec2::new(20, 21));
        engine.move_prisoner(0, -1).unwrap();
        engine.move_prisoner(1, 0).unwrap();
        engine.end_turn();
        assert_eq!(
            engine.noise_markers(),
            &[NoiseMarker {
                position: IVec2::new(20, 21),
                ttl: 4.0
            }]
        );
    }

    #[test]
    fn test_there_and_back_is_quiet() {
        let mut engine = open_engine();
        engine.move_prisoner(1, 0).unwrap();
        engine.move_prisoner(1, 0).unwrap();
        engine.move_prisoner(-1, 0).unwrap();
        engine.end_turn();
        assert!(engine.noise_markers().is_empty());
    }

    #[test]
    fn test_prisoner_commands_rejected_on_watcher_turn() {
        let mut engine = open_engine();
        engine.end_turn();
        assert_eq!(
            engine.move_prisoner(1, 0).unwrap(),
            CommandOutcome::Ignored(Rejection::WrongTurn)
        );
        engine.end_turn();
        assert_eq!(
            engine.rotate_watcher(1).unwrap(),
            CommandOutcome::Ignored(Rejection::WrongTurn)
        );
        assert_eq!(
            engine.set_bluff(Direction::East),
            CommandOutcome::Ignored(Rejection::WrongTurn)
        );
    }

    #[test]
    fn test_single_rotation_per_turn() {
        let mut engine = open_engine();
        engine.end_turn();
        assert!(engine.rotate_watcher(-1).unwrap().is_applied());
        assert_eq!(engine.state().watcher.facing, Direction::West);
        assert_eq!(
            engine.rotate_watcher(1).unwrap(),
            CommandOutcome::Ignored(Rejection::AlreadyRotated)
        );
        assert_eq!(engine.state().watcher.facing, Direction::West);

        // Allowed again next Watcher turn
        pass_watcher_turn(&mut engine);
        assert!(engine.rotate_watcher(1).unwrap().is_applied());
        assert_eq!(engine.state().watcher.facing, Direction::North);
    }

    #[test]
    fn test_rotation_delta_precondition() {
        let mut engine = open_engine();
        engine.end_turn();
        assert_eq!(
            engine.rotate_watcher(2),
            Err(CommandError::InvalidRotation { delta: 2 })
        );
        assert!(!engine.state().watcher.has_rotated);
    }

    #[test]
    fn test_bluff_rules() {
        let mut engine = open_engine();
        engine.end_turn();
        assert_eq!(
            engine.set_bluff(Direction::North),
            CommandOutcome::Ignored(Rejection::BluffNotAllowed)
        );
        assert_eq!(
            engine.set_bluff(Direction::South),
            CommandOutcome::Ignored(Rejection::BluffNotAllowed)
        );
        assert_eq!(engine.state().watcher.bluff, None);
        assert!(engine.set_bluff(Direction::East).is_applied());
        assert!(engine.set_bluff(Direction::West).is_applied());
        assert_eq!(engine.state().watcher.bluff, Some(Direction::West));

        engine.end_turn();
        assert_eq!(engine.state().watcher.bluff, None);
        assert_eq!(engine.state().prisoner.movement_points, 3);
    }

    #[test]
    fn test_capture_needs_noise_and_wedge() {
        // Glass at (20,20) sits on the East/South diagonal
        let mut engine = open_engine();
        engine
            .state
            .grid
            .set_object(IVec2::new(20, 20), FloorObject::Glass);
        place(&mut engine, IVec2::new(20, 21));

        // Facing North: noise but outside the wedge
        engine.move_prisoner(0, -1).unwrap();
        engine.end_turn();
        assert_eq!(engine.phase(), GamePhase::WatcherTurn);

        // Watcher turns East; Prisoner steps off and back onto the glass
        engine.rotate_watcher(1).unwrap();
        engine.end_turn();
        engine.tick(10.0);
        assert!(engine.noise_markers().is_empty());
        engine.move_prisoner(0, 1).unwrap();
        engine.move_prisoner(0, -1).unwrap();
        engine.end_turn();
        assert_eq!(
            engine.phase(),
            GamePhase::GameOver {
                winner: Role::Watcher
            }
        );
    }

    #[test]
    fn test_no_capture_without_noise() {
        let mut engine = open_engine();
        place(&mut engine, IVec2::new(22, 21));
        engine.state.watcher.facing = Direction::East;
        engine.end_turn();
        assert_eq!(engine.phase(), GamePhase::WatcherTurn);
    }

    #[test]
    fn test_expired_noise_does_not_capture() {
        let mut engine = open_engine();
        place(&mut engine, IVec2::new(22, 21));
        engine.state.watcher.facing = Direction::East;
        engine.state.noise_markers.push(NoiseMarker {
            position: IVec2::new(22, 21),
            ttl: 0.5,
        });
        engine.tick(0.5);
        engine.end_turn();
        assert_eq!(engine.phase(), GamePhase::WatcherTurn);
    }

    #[test]
    fn test_paranoia_is_cosmetic() {
        let mut engine = open_engine();
        // (19,21) lies in the South wedge
        engine.end_turn();
        engine.rotate_watcher(1).unwrap();
        engine.set_bluff(Direction::South);
        engine.drain_events();
        engine.end_turn();

        let events = engine.drain_events();
        assert_eq!(
            events[0],
            GameEvent::BeingWatched {
                quadrant: Direction::South
            }
        );
        assert_eq!(engine.phase(), GamePhase::PrisonerTurn);
        let Observation::Prisoner(view) = engine.observe(Role::Prisoner) else {
            panic!("expected prisoner view");
        };
        assert_eq!(view.watched, Some(Direction::South));

        // Cleared when the Prisoner hands the turn back
        engine.end_turn();
        let Observation::Prisoner(view) = engine.observe(Role::Prisoner) else {
            panic!("expected prisoner view");
        };
        assert_eq!(view.watched, None);
    }

    #[test]
    fn test_no_paranoia_when_facing_away() {
        let mut engine = open_engine();
        pass_watcher_turn(&mut engine);
        assert!(!engine
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::BeingWatched { .. })));
    }

    #[test]
    fn test_paranoia_matches_capture_wedge_on_diagonal() {
        // (20,20) lies in both the East and South wedges
        let mut engine = open_engine();
        place(&mut engine, IVec2::new(20, 20));
        engine.end_turn();
        engine.state.watcher.facing = Direction::South;
        engine.drain_events();
        engine.end_turn();
        assert!(engine.is_in_watcher_wedge(Direction::South, 20, 20));
        assert!(engine.events().contains(&GameEvent::BeingWatched {
            quadrant: Direction::South
        }));

        // A bluff covering the diagonal alerts too
        engine.end_turn();
        engine.state.watcher.facing = Direction::North;
        engine.set_bluff(Direction::East);
        engine.drain_events();
        engine.end_turn();
        assert!(engine.events().contains(&GameEvent::BeingWatched {
            quadrant: Direction::East
        }));
    }

    #[test]
    fn test_undrained_events_are_capped() {
        let mut engine = open_engine();
        engine.end_turn();
        engine.drain_events();
        for _ in 0..MAX_PENDING_EVENTS + 10 {
            engine.move_prisoner(1, 0).unwrap();
        }
        engine.rotate_watcher(1).unwrap();

        let events = engine.drain_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        assert_eq!(
            events.last(),
            Some(&GameEvent::Rotated {
                facing: Direction::East
            })
        );
        assert!(engine.events().is_empty());
    }

    #[test]
    fn test_reset_only_after_game_over() {
        let mut engine = open_engine();
        assert_eq!(engine.reset(), CommandOutcome::Ignored(Rejection::NotOver));

        place(&mut engine, IVec2::new(27, 21));
        engine.move_prisoner(1, 0).unwrap();
        engine.state.noise_markers.push(NoiseMarker {
            position: IVec2::new(5, 5),
            ttl: 4.0,
        });
        assert!(engine.reset().is_applied());
        assert_eq!(engine.phase(), GamePhase::PrisonerTurn);
        assert_eq!(engine.state().prisoner.position, IVec2::new(19, 21));
        assert_eq!(engine.state().prisoner.movement_points, 3);
        assert_eq!(engine.state().watcher.facing, Direction::North);
        assert!(engine.noise_markers().is_empty());
    }

    #[test]
    fn test_queries() {
        let engine = open_engine();
        assert_eq!(engine.tile(15, 15), Some(TileKind::Wall));
        assert_eq!(engine.tile(17, 15), Some(TileKind::Moat));
        assert_eq!(engine.tile(40, 40), None);
        assert_eq!(engine.ring_index(19, 21), Some(1));
        assert!(engine.is_in_watcher_wedge(Direction::South, 19, 21));
        assert!(engine.prisoner_visibility().contains(&IVec2::new(19, 21)));
    }

    fn arb_step() -> impl Strategy<Value = (i32, i32)> {
        prop_oneof![Just((1, 0)), Just((-1, 0)), Just((0, 1)), Just((0, -1))]
    }

    proptest! {
        #[test]
        fn prop_movement_points_accounting(steps in proptest::collection::vec(arb_step(), 0..8)) {
            let mut engine = open_engine();
            for (dx, dy) in steps {
                let before = engine.state().prisoner.movement_points;
                let pos = engine.state().prisoner.position;
                match engine.move_prisoner(dx, dy).unwrap() {
                    CommandOutcome::Applied => {
                        prop_assert_eq!(engine.state().prisoner.movement_points, before - 1);
                        prop_assert_ne!(engine.state().prisoner.position, pos);
                    }
                    CommandOutcome::Ignored(_) => {
                        prop_assert_eq!(engine.state().prisoner.movement_points, before);
                        prop_assert_eq!(engine.state().prisoner.position, pos);
                    }
                }
            }
        }

        #[test]
        fn prop_noise_iff_moved_two(steps in proptest::collection::vec(arb_step(), 0..4)) {
            let mut engine = open_engine();
            let start = engine.state().prisoner.position;
            for (dx, dy) in steps {
                engine.move_prisoner(dx, dy).unwrap();
            }
            let moved = manhattan(engine.state().prisoner.position, start);
            engine.end_turn();
            let markers = engine.noise_markers();
            if moved >= 2 {
                prop_assert_eq!(markers, &[NoiseMarker { position: start, ttl: 4.0 }][..]);
            } else {
                prop_assert!(markers.is_empty());
            }
        }
    }
}
