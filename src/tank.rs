use crate::ai::AiState;
use crate::config::{self, *};
use crate::shell::Launch;
use crate::types::{EntityId, Point, Vec3};
use crate::utils::{step_clamped, wrap_angle};
use std::f64::consts::TAU;

// Who issues commands to a tank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    Human,
    Ai,
}

impl Controller {
    // Human players reload faster so their effective fire rate stays ahead of the AI
    pub fn cannon_cooldown(self) -> f64 {
        match self {
            Controller::Human => HUMAN_CANNON_COOLDOWN,
            Controller::Ai => AI_CANNON_COOLDOWN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
}

/// Position and heading, the part of a tank a rejected move must restore.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub heading: f64,
}

// Represents the cannon's reload cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CannonState {
    pub cooldown: f64,    // Seconds between shots
    pub last_fired: f64,  // Total game time of the last shot
    pub reloading: bool,
}

impl CannonState {
    fn new(controller: Controller) -> Self {
        CannonState {
            cooldown: controller.cannon_cooldown(),
            last_fired: INITIAL_LAST_FIRED,
            reloading: false,
        }
    }
}

// Represents a tank in the arena
#[derive(Debug, Clone)]
pub struct Tank {
    pub id: EntityId,
    pub position: Vec3,
    pub size: Vec3, // X/Z half-extents, Y full height
    pub health: i32,
    pub ai: AiState,
    heading: f64,        // Radians in [0, 2π)
    steering: f64,       // Radians in [-MAX_STEER, MAX_STEER]
    turret: f64,         // Radians relative to heading in [-MAX_TURRET, MAX_TURRET]
    cannon: f64,         // Radians in [-MAX_CANNON_RAISE, 0], negative is raised
    front_wheel: f64,    // Cosmetic, radians in [0, 2π)
    back_wheel: f64,     // Cosmetic, radians in [0, 2π)
    controller: Controller,
    cannon_state: CannonState,
    destroyed: bool,
}

impl Tank {
    pub fn new(id: EntityId, position: Vec3, controller: Controller) -> Self {
        Tank {
            id,
            position,
            size: Vec3::new(TANK_HALF_WIDTH, TANK_HEIGHT, TANK_HALF_LENGTH),
            health: match controller {
                Controller::Human => PLAYER_HEALTH,
                Controller::Ai => AI_HEALTH,
            },
            ai: AiState::default(),
            heading: 0.0,
            steering: 0.0,
            turret: 0.0,
            cannon: 0.0,
            front_wheel: 0.0,
            back_wheel: 0.0,
            controller,
            cannon_state: CannonState::new(controller),
            destroyed: false,
        }
    }

    // --- Accessors ---

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn steering(&self) -> f64 {
        self.steering
    }

    pub fn turret(&self) -> f64 {
        self.turret
    }

    /// World yaw of the turret.
    pub fn turret_heading(&self) -> f64 {
        self.heading + self.turret
    }

    pub fn cannon(&self) -> f64 {
        self.cannon
    }

    pub fn wheels(&self) -> (f64, f64) {
        (self.front_wheel, self.back_wheel)
    }

    pub fn controller(&self) -> Controller {
        self.controller
    }

    pub fn is_ai(&self) -> bool {
        self.controller == Controller::Ai
    }

    pub fn cannon_state(&self) -> CannonState {
        self.cannon_state
    }

    pub fn is_reloading(&self) -> bool {
        self.cannon_state.reloading
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Ground-plane half-extents.
    pub fn half_extents(&self) -> Point {
        Point::new(self.size.x, self.size.z)
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            heading: self.heading,
        }
    }

    // --- Setup helpers ---

    /// Switches between human and AI control; the reload time follows the controller.
    pub fn set_controller(&mut self, controller: Controller) {
        self.controller = controller;
        self.cannon_state.cooldown = controller.cannon_cooldown();
    }

    /// Sets the heading, wrapped into [0, 2π).
    pub fn set_heading(&mut self, heading: f64) {
        self.heading = wrap_angle(heading);
    }

    /// Sets the steering angle, clamped to its bounds.
    pub fn set_steering(&mut self, steering: f64) {
        self.steering = steering.clamp(-MAX_STEER, MAX_STEER);
    }

    pub(crate) fn restore(&mut self, pose: Pose) {
        self.position = pose.position;
        self.heading = pose.heading;
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.destroyed = true;
    }

    // --- Movement ---

    /// Integrates one movement step without any collision check.
    ///
    /// The hull translates along `heading + steering` and the heading turns by an amount
    /// that grows with steering and shrinks with hull length, so a tank only turns while
    /// it drives. Callers must check the new pose and [`Tank::restore`] on collision.
    pub(crate) fn integrate_move(&mut self, direction: MoveDirection) {
        let speed = config::MOVEMENT_SPEED;
        let (sign, wheel_sign) = match direction {
            MoveDirection::Forward => (1.0, 1.0),
            MoveDirection::Backward => (-1.0, -1.0),
        };

        // Wheels spin whether or not the move sticks
        self.front_wheel = wrap_angle(self.front_wheel + wheel_sign * FRONT_WHEEL_ROTATION_SPEED);
        self.back_wheel = wrap_angle(self.back_wheel + wheel_sign * BACK_WHEEL_ROTATION_SPEED);

        let travel = self.heading + self.steering;
        self.position.x += sign * speed * travel.sin();
        self.position.z += sign * speed * travel.cos();

        // Forward vector rotated by the steering angle alone
        let (steer_x, steer_z) = (speed * self.steering.sin(), speed * self.steering.cos());
        let turn = match direction {
            MoveDirection::Forward => (steer_x / (self.size.z - steer_z)).atan(),
            MoveDirection::Backward => -(steer_x / (self.size.z + steer_z)).atan(),
        };
        self.heading = wrap_angle(self.heading + turn);
    }

    // --- Steering, turret and cannon ---

    pub fn turn_left(&mut self) {
        self.steering = step_clamped(self.steering, STEER_ROTATION_SPEED, -MAX_STEER, MAX_STEER);
    }

    pub fn turn_right(&mut self) {
        self.steering = step_clamped(self.steering, -STEER_ROTATION_SPEED, -MAX_STEER, MAX_STEER);
    }

    pub fn turn_turret_left(&mut self) {
        self.turret = step_clamped(self.turret, TURRET_ROTATION_SPEED, -MAX_TURRET, MAX_TURRET);
    }

    pub fn turn_turret_right(&mut self) {
        self.turret = step_clamped(self.turret, -TURRET_ROTATION_SPEED, -MAX_TURRET, MAX_TURRET);
    }

    pub fn cannon_up(&mut self) {
        self.cannon = step_clamped(self.cannon, -CANNON_ROTATION_SPEED, -MAX_CANNON_RAISE, 0.0);
    }

    pub fn cannon_down(&mut self) {
        self.cannon = step_clamped(self.cannon, CANNON_ROTATION_SPEED, -MAX_CANNON_RAISE, 0.0);
    }

    /// Steps the steering back towards straight, snapping to exactly zero once it is
    /// within `snap` of it. A step never carries the wheels past straight.
    pub(crate) fn straighten_steering(&mut self, snap: f64) {
        if self.steering > 0.0 {
            self.steering = (self.steering - STEER_ROTATION_SPEED).max(0.0);
        } else if self.steering < 0.0 {
            self.steering = (self.steering + STEER_ROTATION_SPEED).min(0.0);
        }
        if self.steering.abs() < snap {
            self.steering = 0.0;
        }
    }

    // --- Weapon ---

    /// Clears the reload flag once the cooldown has passed.
    pub fn update_reload(&mut self, now: f64) {
        if self.cannon_state.reloading && now - self.cannon_state.last_fired > self.cannon_state.cooldown {
            self.cannon_state.reloading = false;
        }
    }

    /// Fires the cannon if it is loaded. Returns where and how fast the shell leaves.
    pub fn fire_cannon(&mut self, now: f64) -> Option<Launch> {
        if self.cannon_state.reloading {
            crate::debug_weapon!("Tank {} fire ignored at {:.2}s, still reloading", self.id, now);
            return None;
        }

        let aim = self.turret_heading();
        let (aim_sin, aim_cos) = aim.sin_cos();
        let (heading_sin, heading_cos) = self.heading.sin_cos();
        let elevation = -self.cannon;

        let velocity = Vec3::new(
            SHELL_SPEED * self.cannon.cos() * aim_sin,
            SHELL_SPEED * elevation.sin(),
            SHELL_SPEED * self.cannon.cos() * aim_cos,
        );

        let muzzle = Vec3::new(
            self.position.x - MUZZLE_SETBACK * heading_sin + BARREL_LENGTH * elevation.cos() * aim_sin,
            self.position.y + self.size.y + BARREL_LENGTH * elevation.sin(),
            self.position.z - MUZZLE_SETBACK * heading_cos + BARREL_LENGTH * elevation.cos() * aim_cos,
        );

        self.cannon_state.reloading = true;
        self.cannon_state.last_fired = now;

        crate::debug_weapon!(
            "Tank {} fired at {:.2}s from ({:.1}, {:.1}, {:.1}) velocity ({:.1}, {:.1}, {:.1})",
            self.id,
            now,
            muzzle.x,
            muzzle.y,
            muzzle.z,
            velocity.x,
            velocity.y,
            velocity.z
        );

        Some(Launch {
            owner: self.id,
            muzzle,
            velocity,
        })
    }

    /// Projection of the position onto the heading axis, used for "drive until" goals.
    pub fn projected_position(&self) -> f64 {
        let (sin, cos) = self.heading.sin_cos();
        self.position.x * sin + self.position.z * cos
    }
}

/// Heading after a quarter turn, wrapped so that a full circle is stored as 0.
pub fn quarter_turn(heading: f64, left: bool) -> f64 {
    let delta = if left { TAU / 4.0 } else { -TAU / 4.0 };
    wrap_angle(heading + delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::PI;

    fn tank() -> Tank {
        Tank::new(1, Vec3::ZERO, Controller::Ai)
    }

    #[test]
    fn test_steering_stays_in_bounds() {
        let mut tank = tank();
        for _ in 0..500 {
            tank.turn_left();
            assert!(tank.steering() <= MAX_STEER);
        }
        assert_approx_eq!(tank.steering(), MAX_STEER);
        for _ in 0..500 {
            tank.turn_right();
            assert!(tank.steering() >= -MAX_STEER);
        }
        assert_approx_eq!(tank.steering(), -MAX_STEER);
    }

    #[test]
    fn test_turret_and_cannon_bounds() {
        let mut tank = tank();
        for _ in 0..1000 {
            tank.turn_turret_left();
            tank.cannon_up();
        }
        assert_approx_eq!(tank.turret(), PI / 2.0);
        assert_approx_eq!(tank.cannon(), -PI / 4.0);
        for _ in 0..1000 {
            tank.turn_turret_right();
            tank.cannon_down();
        }
        assert_approx_eq!(tank.turret(), -PI / 2.0);
        assert_eq!(tank.cannon(), 0.0);
    }

    #[test]
    fn test_straight_move_keeps_heading() {
        let mut tank = tank();
        tank.integrate_move(MoveDirection::Forward);
        assert_approx_eq!(tank.position.z, MOVEMENT_SPEED);
        assert_approx_eq!(tank.position.x, 0.0);
        assert_eq!(tank.heading(), 0.0);

        tank.integrate_move(MoveDirection::Backward);
        assert_approx_eq!(tank.position.z, 0.0);
    }

    #[test]
    fn test_steered_move_turns_hull() {
        let mut tank = tank();
        for _ in 0..10 {
            tank.turn_left();
        }
        tank.integrate_move(MoveDirection::Forward);
        assert!(tank.heading() > 0.0 && tank.heading() < 0.1);

        let mut reversing = Tank::new(2, Vec3::ZERO, Controller::Ai);
        for _ in 0..10 {
            reversing.turn_left();
        }
        reversing.integrate_move(MoveDirection::Backward);
        // Reversing with left steering swings the nose the other way, across the wrap
        assert!(reversing.heading() > 6.0);
    }

    #[test]
    fn test_wheels_wrap() {
        let mut tank = tank();
        tank.integrate_move(MoveDirection::Backward);
        let (front, back) = tank.wheels();
        assert!(front > 0.0 && front < TAU);
        assert!(back > 0.0 && back < TAU);
    }

    #[test]
    fn test_fire_straight_ahead() {
        let mut tank = tank();
        let launch = tank.fire_cannon(0.0).expect("loaded cannon fires");
        assert_approx_eq!(launch.velocity.x, 0.0);
        assert_approx_eq!(launch.velocity.y, 0.0);
        assert_approx_eq!(launch.velocity.z, SHELL_SPEED);
        assert_approx_eq!(launch.muzzle.z, BARREL_LENGTH - MUZZLE_SETBACK);
        assert_approx_eq!(launch.muzzle.y, TANK_HEIGHT);
        assert_eq!(launch.owner, 1);
    }

    #[test]
    fn test_fire_raised_cannon_goes_up() {
        let mut tank = tank();
        for _ in 0..1000 {
            tank.cannon_up();
        }
        let launch = tank.fire_cannon(0.0).expect("loaded cannon fires");
        assert_approx_eq!(launch.velocity.y, SHELL_SPEED * (PI / 4.0).sin());
        assert_approx_eq!(launch.velocity.z, SHELL_SPEED * (PI / 4.0).cos());
    }

    #[test]
    fn test_reload_cycle() {
        let mut tank = tank();
        assert!(tank.fire_cannon(10.0).is_some());
        assert!(tank.is_reloading());
        assert!(tank.fire_cannon(10.5).is_none());

        tank.update_reload(13.0); // exactly the cooldown, not past it
        assert!(tank.is_reloading());
        tank.update_reload(13.01);
        assert!(!tank.is_reloading());
        assert!(tank.fire_cannon(13.01).is_some());
    }

    #[test]
    fn test_controller_sets_cooldown() {
        let mut tank = tank();
        assert_approx_eq!(tank.cannon_state().cooldown, AI_CANNON_COOLDOWN);
        tank.set_controller(Controller::Human);
        assert_approx_eq!(tank.cannon_state().cooldown, HUMAN_CANNON_COOLDOWN);
        assert_eq!(Tank::new(3, Vec3::ZERO, Controller::Human).health, PLAYER_HEALTH);
    }

    #[test]
    fn test_straighten_steering_snaps() {
        let mut tank = tank();
        tank.set_steering(STEER_ROTATION_SPEED * 2.5);
        tank.straighten_steering(1.0 / 300.0);
        tank.straighten_steering(1.0 / 300.0);
        assert!(tank.steering() > 0.0);
        tank.straighten_steering(1.0 / 300.0);
        assert_eq!(tank.steering(), 0.0);
    }

    #[test]
    fn test_quarter_turn_wraps() {
        assert_approx_eq!(quarter_turn(3.0 * PI / 2.0, true), 0.0);
        assert_approx_eq!(quarter_turn(0.0, false), 3.0 * PI / 2.0);
        assert_approx_eq!(quarter_turn(PI / 4.0, true), 3.0 * PI / 4.0);
    }
}
