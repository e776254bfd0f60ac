//! Computer-controlled tanks.
//!
//! Every tick an AI tank runs two independent loops. The movement planner walks a
//! coarse grid towards the human player, one straight leg or quarter turn at a time.
//! The aim loop swings the turret and cannon until the predicted impact lands near the
//! player, then fires after a random hesitation.

use crate::arena::TankControl;
use crate::config::{
    AI_ADVANCE_CELLS, AI_AIM_TOLERANCE, AI_BACKWARD_STOP, AI_FIRE_RANGE, AI_FORWARD_STOP,
    AI_HESITATION_ODDS, AI_MUZZLE_REACH, AI_RANGE_DEAD_ZONE, AI_RANGE_TOLERANCE, AI_RETREAT_CELLS,
    AI_STEER_SNAP, AI_TARGET_HEIGHT, GRAVITY, LatticeConfig, SHELL_SPEED,
};
use crate::tank::{MoveDirection, Tank, quarter_turn};
use crate::types::{Point, Vec3};
use crate::utils::{bearing, normalize_relative, sign};
use rand::Rng;
use std::f64::consts::FRAC_PI_2;

/// The movement leg an AI tank is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AiCommand {
    #[default]
    None,
    /// Drive forward until the heading-axis projection reaches `stop_at`.
    Forward { stop_at: f64 },
    /// Reverse until the heading-axis projection drops to `stop_at`.
    Backward { stop_at: f64 },
    TurnLeft { target: f64 },
    TurnRight { target: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AiState {
    pub command: AiCommand,
    pub aiming: bool,
    pub enemy: Option<Vec3>, // Last known position of the human player
}

/// Runs one tick of AI for the controlled tank.
pub fn update<R: Rng>(control: &mut TankControl<'_>, lattice: &LatticeConfig, rng: &mut R) {
    if let Some(position) = control.human_position() {
        control.tank_mut().ai.enemy = Some(position);
    }
    let Some(enemy) = control.tank().ai.enemy else {
        return;
    };

    advance_plan(control, enemy, lattice);
    aim_and_fire(control, enemy, rng);
}

// --- Movement planner ---

/// Grid cell of a coordinate: truncated towards zero, then pushed one cell along `side`
/// (-1, 0 or 1).
pub fn cell(value: f64, cell_size: f64, side: f64) -> f64 {
    (value / cell_size).trunc() + side
}

// Both tanks are pushed along the observer's quadrant
fn cell_of(position: Vec3, cell_size: f64, observer: Vec3) -> Point {
    Point::new(
        cell(position.x, cell_size, sign(observer.x)),
        cell(position.z, cell_size, sign(observer.z)),
    )
}

// Heading-axis projection of where a forward leg should end
fn forward_stop(tank: &Tank, cell_size: f64) -> f64 {
    let own = cell_of(tank.position, cell_size, tank.position);
    let (sin, cos) = tank.heading().sin_cos();
    (own.x * cell_size - AI_FORWARD_STOP * sign(tank.position.x)) * sin
        + (own.z * cell_size - AI_FORWARD_STOP * sign(tank.position.z)) * cos
}

fn backward_stop(tank: &Tank, cell_size: f64) -> f64 {
    let own = cell_of(tank.position, cell_size, tank.position);
    let (sin, cos) = tank.heading().sin_cos();
    (own.x * cell_size + AI_BACKWARD_STOP * sign(tank.position.x)) * sin
        + (own.z * cell_size + AI_BACKWARD_STOP * sign(tank.position.z)) * cos
}

/// Picks the next movement leg for an idle tank.
///
/// Ahead (strictly within 90 degrees): close in when far, back off when close, else hold.
/// Behind: keep driving while on a corridor line, otherwise quarter-turn towards the
/// enemy's side.
pub fn plan(tank: &Tank, enemy: Vec3, lattice: &LatticeConfig) -> AiCommand {
    let own = cell_of(tank.position, lattice.cell_size, tank.position);
    let delta = cell_of(enemy, lattice.cell_size, tank.position) - own;
    let relative = normalize_relative(bearing(delta.x, delta.z) - tank.heading());

    if relative.abs() < FRAC_PI_2 {
        let distance = delta.length();
        if distance > AI_ADVANCE_CELLS {
            AiCommand::Forward {
                stop_at: forward_stop(tank, lattice.cell_size),
            }
        } else if distance < AI_RETREAT_CELLS {
            AiCommand::Backward {
                stop_at: backward_stop(tank, lattice.cell_size),
            }
        } else {
            AiCommand::None
        }
    } else if lattice.on_line(own.x as i64) || lattice.on_line(own.z as i64) {
        AiCommand::Forward {
            stop_at: forward_stop(tank, lattice.cell_size),
        }
    } else if relative > 0.0 {
        AiCommand::TurnLeft {
            target: quarter_turn(tank.heading(), true),
        }
    } else {
        AiCommand::TurnRight {
            target: quarter_turn(tank.heading(), false),
        }
    }
}

fn advance_plan(control: &mut TankControl<'_>, enemy: Vec3, lattice: &LatticeConfig) {
    let (id, tick) = (control.tank().id, control.tick());
    let next = match control.tank().ai.command {
        AiCommand::None => {
            let next = plan(control.tank(), enemy, lattice);
            if next != AiCommand::None {
                crate::debug_ai!(id, tick, "New leg {:?}", next);
            }
            next
        }
        AiCommand::Forward { stop_at } => {
            if control.tank().projected_position() < stop_at {
                control.drive(MoveDirection::Forward);
                AiCommand::Forward { stop_at }
            } else {
                AiCommand::None
            }
        }
        AiCommand::Backward { stop_at } => {
            if control.tank().projected_position() > stop_at {
                control.drive(MoveDirection::Backward);
                AiCommand::Backward { stop_at }
            } else {
                AiCommand::None
            }
        }
        AiCommand::TurnLeft { target } => quarter_turn_step(control, target, true, lattice),
        AiCommand::TurnRight { target } => quarter_turn_step(control, target, false, lattice),
    };
    control.tank_mut().ai.command = next;
}

// One tick of a quarter turn: steer and creep forward until the heading passes the
// target, then straighten the wheels and lock the heading onto the target
fn quarter_turn_step(control: &mut TankControl<'_>, target: f64, left: bool, lattice: &LatticeConfig) -> AiCommand {
    let remaining = normalize_relative(target - control.tank().heading());
    let reached = if left { remaining <= 0.0 } else { remaining >= 0.0 };
    let pending = if left {
        AiCommand::TurnLeft { target }
    } else {
        AiCommand::TurnRight { target }
    };

    if !reached {
        if left {
            control.tank_mut().turn_left();
        } else {
            control.tank_mut().turn_right();
        }
        if !control.drive(MoveDirection::Forward) {
            // Stuck against something; give back the steering we just added
            if left {
                control.tank_mut().turn_right();
            } else {
                control.tank_mut().turn_left();
            }
        }
        return pending;
    }

    let tank = control.tank_mut();
    if tank.steering() != 0.0 {
        tank.straighten_steering(AI_STEER_SNAP);
        return pending;
    }

    tank.set_heading(target);
    AiCommand::Forward {
        stop_at: forward_stop(tank, lattice.cell_size),
    }
}

// --- Aim and fire ---

/// Where the enemy is relative to the turret, and where the cannon would land a shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimSolution {
    pub relative_bearing: f64, // Enemy bearing relative to the hull
    pub distance: f64,         // Ground distance to the enemy
    pub aim_distance: f64,     // Ground distance the shell would travel at this elevation
}

impl AimSolution {
    pub fn new(tank: &Tank, enemy: Vec3) -> Self {
        let offset = enemy.ground() - tank.position.ground();
        AimSolution {
            relative_bearing: normalize_relative(bearing(offset.x, offset.z) - tank.heading()),
            distance: offset.length(),
            aim_distance: predicted_range(tank.cannon()),
        }
    }

    /// Turret within the aim tolerance and predicted range within the range tolerance,
    /// both exclusive.
    pub fn is_locked(&self, turret: f64) -> bool {
        turret < self.relative_bearing + AI_AIM_TOLERANCE
            && turret > self.relative_bearing - AI_AIM_TOLERANCE
            && self.aim_distance < self.distance + AI_RANGE_TOLERANCE
            && self.aim_distance > self.distance - AI_RANGE_TOLERANCE
    }
}

/// Ground distance a shell fired at `cannon` elevation covers before dropping
/// `AI_TARGET_HEIGHT` below the muzzle.
pub fn predicted_range(cannon: f64) -> f64 {
    let vertical = SHELL_SPEED * (-cannon).sin();
    let flight_time = (vertical + (vertical * vertical + 2.0 * GRAVITY * AI_TARGET_HEIGHT).sqrt()) / GRAVITY;
    AI_MUZZLE_REACH + SHELL_SPEED * cannon.cos() * flight_time
}

fn aim_and_fire<R: Rng>(control: &mut TankControl<'_>, enemy: Vec3, rng: &mut R) {
    let solution = AimSolution::new(control.tank(), enemy);
    let turret = control.tank().turret();

    if solution.is_locked(turret) {
        if rng.gen_range(0..AI_HESITATION_ODDS) == 1 {
            control.tank_mut().ai.aiming = false;
        }
        if !control.tank().ai.aiming && solution.distance < AI_FIRE_RANGE && control.fire() {
            let (id, tick) = (control.tank().id, control.tick());
            crate::debug_ai!(id, tick, "Fired at range {:.0}", solution.distance);
        }
        return;
    }

    let tank = control.tank_mut();
    tank.ai.aiming = true;

    if turret > solution.relative_bearing + AI_AIM_TOLERANCE {
        tank.turn_turret_right();
    } else if turret < solution.relative_bearing - AI_AIM_TOLERANCE {
        tank.turn_turret_left();
    } else if rng.gen_range(0..2) < 1 {
        tank.turn_turret_left();
    } else {
        tank.turn_turret_right();
    }

    if solution.aim_distance > solution.distance + AI_RANGE_DEAD_ZONE {
        tank.cannon_down();
    } else if solution.aim_distance < solution.distance - AI_RANGE_DEAD_ZONE {
        tank.cannon_up();
    } else if rng.gen_range(0..2) < 1 {
        tank.cannon_up();
    } else {
        tank.cannon_down();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NullSink, WorldEvent};
    use crate::obstacles::{Building, ObstacleRegistry};
    use crate::shell::Launch;
    use crate::tank::Controller;
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    fn ai_tank(x: f64, z: f64, heading: f64) -> Tank {
        let mut tank = Tank::new(1, Vec3::new(x, 0.0, z), Controller::Ai);
        tank.set_heading(heading);
        tank
    }

    #[test]
    fn test_cell_pushes_away_from_origin() {
        assert_eq!(cell(0.0, 1000.0, 0.0), 0.0);
        assert_eq!(cell(500.0, 1000.0, 1.0), 1.0);
        assert_eq!(cell(-500.0, 1000.0, -1.0), -1.0);
        assert_eq!(cell(10_500.0, 1000.0, 1.0), 11.0);
        assert_eq!(cell(-2999.0, 1000.0, -1.0), -3.0);
        // Pushed along the observer's side, not the value's own
        assert_eq!(cell(-500.0, 1000.0, 1.0), 1.0);
    }

    #[test]
    fn test_enemy_across_axis_shares_observer_cell() {
        let lattice = LatticeConfig::default();
        let tank = ai_tank(500.0, 500.0, 0.0);
        // Both land in cell (1, 1): zero bearing, zero distance, so back off
        let command = plan(&tank, Vec3::new(-500.0, 0.0, 500.0), &lattice);
        assert!(matches!(command, AiCommand::Backward { .. }), "got {:?}", command);
    }

    #[test]
    fn test_enemy_far_ahead_means_forward() {
        let lattice = LatticeConfig::default();
        let tank = ai_tank(500.0, 500.0, 0.0);
        // Own cell (1, 1), enemy cell (1, 11): bearing 0, ten cells away
        let command = plan(&tank, Vec3::new(500.0, 0.0, 10_500.0), &lattice);
        assert!(matches!(command, AiCommand::Forward { .. }));
    }

    #[test]
    fn test_enemy_exactly_abeam_is_not_ahead() {
        let lattice = LatticeConfig::default();
        let tank = ai_tank(500.0, 500.0, 0.0);
        // Bearing exactly 90 degrees; cell (1, 1) is off the corridor lines so it turns
        let command = plan(&tank, Vec3::new(10_500.0, 0.0, 500.0), &lattice);
        match command {
            AiCommand::TurnLeft { target } => assert_approx_eq!(target, PI / 2.0),
            other => panic!("expected a left turn, got {:?}", other),
        }
    }

    #[test]
    fn test_enemy_close_ahead_means_backward() {
        let lattice = LatticeConfig::default();
        let tank = ai_tank(500.0, 500.0, 0.0);
        let command = plan(&tank, Vec3::new(500.0, 0.0, 2500.0), &lattice);
        assert!(matches!(command, AiCommand::Backward { .. }));
        // Five cells away: comfortable, hold
        let command = plan(&tank, Vec3::new(500.0, 0.0, 5500.0), &lattice);
        assert_eq!(command, AiCommand::None);
    }

    #[test]
    fn test_enemy_behind_on_corridor_drives_on() {
        let lattice = LatticeConfig::default();
        // x = 1500 is cell 2, a corridor line
        let tank = ai_tank(1500.0, 500.0, 0.0);
        let command = plan(&tank, Vec3::new(1500.0, 0.0, -20_000.0), &lattice);
        assert!(matches!(command, AiCommand::Forward { .. }));
    }

    #[test]
    fn test_right_turn_wraps_target() {
        let lattice = LatticeConfig::default();
        let tank = ai_tank(500.0, 500.0, 0.0);
        let command = plan(&tank, Vec3::new(-10_500.0, 0.0, 500.0), &lattice);
        match command {
            AiCommand::TurnRight { target } => assert_approx_eq!(target, 3.0 * PI / 2.0),
            other => panic!("expected a right turn, got {:?}", other),
        }
    }

    #[test]
    fn test_predicted_range_level_cannon() {
        let expected = AI_MUZZLE_REACH + SHELL_SPEED * (2.0 * AI_TARGET_HEIGHT / GRAVITY).sqrt();
        assert_approx_eq!(predicted_range(0.0), expected);
        // Raising the cannon reaches further
        assert!(predicted_range(-0.1) > predicted_range(0.0));
    }

    #[test]
    fn test_lock_boundaries_are_exclusive() {
        let solution = AimSolution {
            relative_bearing: AI_AIM_TOLERANCE,
            distance: 5000.0,
            aim_distance: 5000.0,
        };
        // Turret exactly 18 degrees off
        assert!(!solution.is_locked(0.0));
        assert!(solution.is_locked(0.01));

        let solution = AimSolution {
            relative_bearing: 0.0,
            distance: 5000.0,
            aim_distance: 5600.0,
        };
        assert!(!solution.is_locked(0.0));
        let solution = AimSolution {
            aim_distance: 5599.0,
            ..solution
        };
        assert!(solution.is_locked(0.0));
    }

    #[test]
    fn test_unlocked_aim_swings_turret_towards_enemy() {
        let mut tanks = vec![
            ai_tank(0.0, 0.0, 0.0),
            Tank::new(2, Vec3::new(3000.0, 0.0, 0.0), Controller::Human),
        ];
        let buildings = ObstacleRegistry::new();
        let mut launches: Vec<Launch> = Vec::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut control = TankControl {
            tanks: &mut tanks,
            index: 0,
            buildings: &buildings,
            half_extent: 50_000.0,
            now: 0.0,
            tick: 1,
            launches: &mut launches,
            sink: &mut NullSink,
        };

        update(&mut control, &LatticeConfig::default(), &mut rng);
        assert!(control.tank().turret() > 0.0);
        assert!(control.tank().ai.aiming);
        assert_eq!(control.tank().ai.enemy, Some(Vec3::new(3000.0, 0.0, 0.0)));
        assert!(launches.is_empty());
    }

    #[test]
    fn test_locked_aim_fires() {
        let mut tanks = vec![
            ai_tank(0.0, 0.0, 0.0),
            Tank::new(2, Vec3::new(0.0, 0.0, 3000.0), Controller::Human),
        ];
        let buildings = ObstacleRegistry::new();
        let mut launches: Vec<Launch> = Vec::new();
        let mut events: Vec<WorldEvent> = Vec::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut control = TankControl {
            tanks: &mut tanks,
            index: 0,
            buildings: &buildings,
            half_extent: 50_000.0,
            now: 0.0,
            tick: 1,
            launches: &mut launches,
            sink: &mut events,
        };

        update(&mut control, &LatticeConfig::default(), &mut rng);
        assert!(control.tank().is_reloading());
        assert_eq!(launches.len(), 1);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_quarter_turn_completes() {
        let mut tanks = vec![
            ai_tank(500.0, 500.0, 0.0),
            Tank::new(2, Vec3::new(10_500.0, 0.0, 500.0), Controller::Human),
        ];
        let buildings = ObstacleRegistry::new();
        let mut launches: Vec<Launch> = Vec::new();
        let mut control = TankControl {
            tanks: &mut tanks,
            index: 0,
            buildings: &buildings,
            half_extent: 50_000.0,
            now: 0.0,
            tick: 1,
            launches: &mut launches,
            sink: &mut NullSink,
        };
        let lattice = LatticeConfig::default();
        let enemy = Vec3::new(10_500.0, 0.0, 500.0);

        let mut finished = false;
        for _ in 0..2000 {
            advance_plan(&mut control, enemy, &lattice);
            if matches!(control.tank().ai.command, AiCommand::Forward { .. }) {
                finished = true;
                break;
            }
        }
        assert!(finished, "turn never completed");
        assert_eq!(control.tank().heading(), quarter_turn(0.0, true));
        assert_eq!(control.tank().steering(), 0.0);
    }

    #[test]
    fn test_right_turn_across_zero_completes() {
        let mut tanks = vec![ai_tank(500.0, 500.0, 0.0)];
        let buildings = ObstacleRegistry::new();
        let mut launches: Vec<Launch> = Vec::new();
        let mut control = TankControl {
            tanks: &mut tanks,
            index: 0,
            buildings: &buildings,
            half_extent: 50_000.0,
            now: 0.0,
            tick: 1,
            launches: &mut launches,
            sink: &mut NullSink,
        };
        let lattice = LatticeConfig::default();
        let target = quarter_turn(0.0, false);
        control.tank_mut().ai.command = AiCommand::TurnRight { target };

        let mut finished = false;
        for _ in 0..2000 {
            advance_plan(&mut control, Vec3::new(-10_500.0, 0.0, 500.0), &lattice);
            if matches!(control.tank().ai.command, AiCommand::Forward { .. }) {
                finished = true;
                break;
            }
        }
        assert!(finished, "turn never completed");
        assert_approx_eq!(control.tank().heading(), 3.0 * PI / 2.0);
        assert_eq!(control.tank().steering(), 0.0);
    }

    #[test]
    fn test_blocked_turn_gives_back_steering() {
        let mut tanks = vec![ai_tank(500.0, 500.0, 0.0)];
        let mut buildings = ObstacleRegistry::new();
        // Nose 5 units short of the wall; a 10 unit step would overlap
        buildings.insert(Building::new(3, Vec3::new(500.0, 0.0, 500.0 + 340.0 + 450.0 + 5.0)));
        let mut launches: Vec<Launch> = Vec::new();
        let mut control = TankControl {
            tanks: &mut tanks,
            index: 0,
            buildings: &buildings,
            half_extent: 50_000.0,
            now: 0.0,
            tick: 1,
            launches: &mut launches,
            sink: &mut NullSink,
        };
        let lattice = LatticeConfig::default();
        let target = quarter_turn(0.0, true);
        control.tank_mut().ai.command = AiCommand::TurnLeft { target };

        for _ in 0..3 {
            advance_plan(&mut control, Vec3::new(10_500.0, 0.0, 500.0), &lattice);
        }
        assert_eq!(control.tank().steering(), 0.0);
        assert_eq!(control.tank().position, Vec3::new(500.0, 0.0, 500.0));
        assert_eq!(control.tank().heading(), 0.0);
        assert_eq!(control.tank().ai.command, AiCommand::TurnLeft { target });
    }

    #[test]
    fn test_forward_leg_stops_at_target() {
        // Facing -Z from cell (1, 6); the leg ends at z = 6000 - 2500
        let mut tanks = vec![ai_tank(500.0, 5500.0, PI)];
        let buildings = ObstacleRegistry::new();
        let mut launches: Vec<Launch> = Vec::new();
        let mut control = TankControl {
            tanks: &mut tanks,
            index: 0,
            buildings: &buildings,
            half_extent: 50_000.0,
            now: 0.0,
            tick: 1,
            launches: &mut launches,
            sink: &mut NullSink,
        };
        let lattice = LatticeConfig::default();
        let enemy = Vec3::new(500.0, 0.0, -10_500.0);

        advance_plan(&mut control, enemy, &lattice);
        match control.tank().ai.command {
            AiCommand::Forward { stop_at } => assert_approx_eq!(stop_at, -3500.0),
            other => panic!("expected a forward leg, got {:?}", other),
        }

        let mut steps = 0;
        while control.tank().ai.command != AiCommand::None {
            advance_plan(&mut control, enemy, &lattice);
            steps += 1;
            assert!(steps < 1000, "leg never ended");
        }
        let z = control.tank().position.z;
        assert!(z <= 3500.0 + 1e-6 && z > 3489.0, "stopped at z = {}", z);
        assert_approx_eq!(control.tank().position.x, 500.0, 1e-6);
    }
}
