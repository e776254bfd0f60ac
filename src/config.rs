//! Configuration constants and setup parameters for the tank arena.

use crate::error::ArenaError;
use std::f64::consts::PI;

// World and grid
pub const WORLD_SIZE: f64 = 100_000.0; // Full edge length of the square world
pub const BUILDING_SPACING: f64 = 3000.0; // Distance between building rows/columns
pub const BUILDING_OFFSET: f64 = 435.0; // Shift applied to every building grid coordinate
pub const SPAWN_GRID_STEP: f64 = 3000.0; // AI tanks spawn on multiples of this
pub const SPAWN_GRID_RANGE: i32 = 15; // Spawn cells span [-range, range] on each axis
pub const MIN_ENEMIES: u32 = 5; // Inclusive
pub const MAX_ENEMIES: u32 = 50; // Exclusive
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10_000; // Per tank, before giving up
pub const DEFAULT_SEED: u64 = 0x7A4E_4B00;

// Tank dimensions (X/Z are half-extents, Y is full height)
pub const TANK_HALF_WIDTH: f64 = 310.0;
pub const TANK_HEIGHT: f64 = 350.0;
pub const TANK_HALF_LENGTH: f64 = 340.0;
pub const BARREL_LENGTH: f64 = 300.0;
pub const MUZZLE_SETBACK: f64 = 30.0; // Muzzle sits this far behind the barrel pivot

// Building dimensions (X/Z are half-extents, Y is full height)
pub const BUILDING_HALF_WIDTH: f64 = 450.0;
pub const BUILDING_HEIGHT: f64 = 900.0;
pub const BUILDING_HALF_DEPTH: f64 = 450.0;

// Tank kinematics (per move/turn call)
pub const MOVEMENT_SPEED: f64 = 10.0;
pub const FRONT_WHEEL_ROTATION_SPEED: f64 = MOVEMENT_SPEED / 75.0;
pub const BACK_WHEEL_ROTATION_SPEED: f64 = MOVEMENT_SPEED / 100.0;
pub const STEER_ROTATION_SPEED: f64 = PI / 200.0;
pub const TURRET_ROTATION_SPEED: f64 = PI / 250.0;
pub const CANNON_ROTATION_SPEED: f64 = PI / 500.0;
pub const MAX_STEER: f64 = PI / 6.0; // +/- 30 degrees
pub const MAX_TURRET: f64 = PI / 2.0; // +/- 90 degrees relative to heading
pub const MAX_CANNON_RAISE: f64 = PI / 4.0; // Cannon angle lives in [-45, 0] degrees

// Health and weapons
pub const PLAYER_HEALTH: i32 = 10;
pub const AI_HEALTH: i32 = 1;
pub const SHELL_SPEED: f64 = 3000.0;
pub const SHELL_RADIUS: f64 = 15.0;
pub const AI_CANNON_COOLDOWN: f64 = 3.0; // Seconds
pub const HUMAN_CANNON_COOLDOWN: f64 = 1.5; // Seconds
pub const INITIAL_LAST_FIRED: f64 = -1.5; // Lets a fresh tank fire immediately

// Ballistics
pub const GRAVITY: f64 = 980.0665;
pub const SHELL_CHECK_HEIGHT: f64 = 1015.0; // Collision checks only run below this
pub const GROUND_EPSILON: f64 = 15.0; // Shells below this have hit the ground
pub const SHELL_TANK_REACH: f64 = 596.0; // Broad phase, shell vs tank
pub const SHELL_BUILDING_REACH: f64 = 1400.0; // Broad phase, shell vs building

// Tank collision broad phase
pub const TANK_TANK_REACH: f64 = 921.0;
pub const TANK_BUILDING_REACH: f64 = 1300.0;

// AI tuning
pub const AI_CELL_SIZE: f64 = 1000.0;
pub const AI_LATTICE_MODULUS: i64 = 3;
pub const AI_LATTICE_OFFSET: i64 = 2;
pub const AI_ADVANCE_CELLS: f64 = 6.0; // Move closer when further than this
pub const AI_RETREAT_CELLS: f64 = 4.0; // Back off when closer than this
pub const AI_FORWARD_STOP: f64 = 2500.0;
pub const AI_BACKWARD_STOP: f64 = 1500.0;
pub const AI_STEER_SNAP: f64 = 1.0 / 300.0;
pub const AI_AIM_TOLERANCE: f64 = PI / 10.0; // +/- 18 degrees
pub const AI_RANGE_TOLERANCE: f64 = 600.0;
pub const AI_RANGE_DEAD_ZONE: f64 = 300.0;
pub const AI_TARGET_HEIGHT: f64 = 400.0; // Drop height used for range estimates
pub const AI_MUZZLE_REACH: f64 = 350.0; // Added to every range estimate
pub const AI_FIRE_RANGE: f64 = 8000.0;
pub const AI_HESITATION_ODDS: u32 = 4; // 1 in N chance per tick to stop hesitating

// Simulation clock
pub const FIXED_TICK_SECONDS: f64 = 1.0 / 60.0;

/// Parameters for building the world before the simulation starts.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub world_size: f64,
    pub building_spacing: f64,
    pub building_offset: f64,
    pub spawn_grid_step: f64,
    pub spawn_grid_range: i32,
    pub min_enemies: u32,
    pub max_enemies: u32, // Exclusive
    pub max_placement_attempts: u32,
    pub player_health: i32,
    pub seed: u64,
    pub lattice: LatticeConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            world_size: WORLD_SIZE,
            building_spacing: BUILDING_SPACING,
            building_offset: BUILDING_OFFSET,
            spawn_grid_step: SPAWN_GRID_STEP,
            spawn_grid_range: SPAWN_GRID_RANGE,
            min_enemies: MIN_ENEMIES,
            max_enemies: MAX_ENEMIES,
            max_placement_attempts: MAX_PLACEMENT_ATTEMPTS,
            player_health: PLAYER_HEALTH,
            seed: DEFAULT_SEED,
            lattice: LatticeConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Half of the world edge; tanks may not poke a corner past it.
    pub fn half_extent(&self) -> f64 {
        self.world_size / 2.0
    }

    pub fn validate(&self) -> Result<(), ArenaError> {
        if !(self.world_size.is_finite() && self.world_size > 0.0) {
            return Err(ArenaError::InvalidConfig(format!(
                "world size must be positive, got {}",
                self.world_size
            )));
        }
        if self.building_spacing <= 0.0 || self.spawn_grid_step <= 0.0 {
            return Err(ArenaError::InvalidConfig(
                "building spacing and spawn grid step must be positive".to_string(),
            ));
        }
        if self.min_enemies >= self.max_enemies {
            return Err(ArenaError::InvalidConfig(format!(
                "enemy range {}..{} is empty",
                self.min_enemies, self.max_enemies
            )));
        }
        if self.spawn_grid_range < 0 {
            return Err(ArenaError::InvalidConfig(
                "spawn grid range cannot be negative".to_string(),
            ));
        }
        if self.player_health <= 0 {
            return Err(ArenaError::InvalidConfig(
                "player health must be at least 1".to_string(),
            ));
        }
        self.lattice.validate()
    }
}

/// Grid the AI uses to plan corridor moves. Tied to how buildings are laid out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeConfig {
    pub cell_size: f64,
    pub modulus: i64,
    pub offset: i64,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        LatticeConfig {
            cell_size: AI_CELL_SIZE,
            modulus: AI_LATTICE_MODULUS,
            offset: AI_LATTICE_OFFSET,
        }
    }
}

impl LatticeConfig {
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.modulus <= 0 {
            return Err(ArenaError::InvalidConfig(format!(
                "lattice modulus must be positive, got {}",
                self.modulus
            )));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ArenaError::InvalidConfig(format!(
                "lattice cell size must be positive, got {}",
                self.cell_size
            )));
        }
        Ok(())
    }

    /// True when a cell coordinate sits on one of the corridor lines.
    pub fn on_line(&self, cell: i64) -> bool {
        (cell.abs() - self.offset) % self.modulus == 0
    }
}
