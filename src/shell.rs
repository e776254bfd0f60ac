use crate::config::{
    GRAVITY, GROUND_EPSILON, SHELL_BUILDING_REACH, SHELL_CHECK_HEIGHT, SHELL_RADIUS, SHELL_TANK_REACH,
};
use crate::geometry::{plane_intersection, point_in_rectangle, to_local_frame_3d, Plane};
use crate::obstacles::{Building, ObstacleRegistry};
use crate::tank::Tank;
use crate::types::{EntityId, Point, Vec3};

/// A freshly fired shell before the arena gives it an id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub owner: EntityId,
    pub muzzle: Vec3,
    pub velocity: Vec3,
}

/// What a shell ran into this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    Ground,
    Tank(EntityId),
    Building(EntityId),
}

// Represents a shell in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    pub id: EntityId,
    pub owner: EntityId,
    pub radius: f64,
    origin: Vec3,
    launch_velocity: Vec3,
    time: f64,       // Seconds since launch
    position: Vec3,  // Position at `time`
}

impl Shell {
    pub fn new(id: EntityId, launch: Launch) -> Self {
        Shell {
            id,
            owner: launch.owner,
            radius: SHELL_RADIUS,
            origin: launch.muzzle,
            launch_velocity: launch.velocity,
            time: 0.0,
            position: launch.muzzle,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Position `t` seconds after launch.
    pub fn trajectory(&self, t: f64) -> Vec3 {
        Vec3::new(
            self.origin.x + self.launch_velocity.x * t,
            self.origin.y + self.launch_velocity.y * t - 0.5 * GRAVITY * t * t,
            self.origin.z + self.launch_velocity.z * t,
        )
    }

    /// Instantaneous velocity at the shell's current time.
    pub fn velocity(&self) -> Vec3 {
        Vec3::new(
            self.launch_velocity.x,
            self.launch_velocity.y - GRAVITY * self.time,
            self.launch_velocity.z,
        )
    }

    /// Moves the shell `dt` seconds along its arc.
    pub fn advance(&mut self, dt: f64) {
        self.time += dt;
        self.position = self.trajectory(self.time);
    }

    /// Sweeps the shell's path over the next `dt` seconds against the ground, live tanks
    /// and live buildings. Targets are visited in id order and the first hit wins.
    ///
    /// Nothing is checked while the shell is above every target.
    pub fn find_impact(&self, tanks: &[Tank], buildings: &ObstacleRegistry, dt: f64) -> Option<Impact> {
        if self.position.y >= SHELL_CHECK_HEIGHT {
            return None;
        }
        if self.position.y < GROUND_EPSILON {
            return Some(Impact::Ground);
        }

        let mut tanks = tanks.iter().filter(|t| !t.is_destroyed()).peekable();
        let mut buildings = buildings.iter().peekable();
        loop {
            let tank_first = match (tanks.peek(), buildings.peek()) {
                (Some(tank), Some(building)) => tank.id < building.id,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => return None,
            };

            if tank_first {
                let tank = tanks.next()?;
                if self.hits_tank(tank, dt) {
                    return Some(Impact::Tank(tank.id));
                }
            } else {
                let building = buildings.next()?;
                if self.hits_building(building, dt) {
                    return Some(Impact::Building(building.id));
                }
            }
        }
    }

    fn hits_tank(&self, tank: &Tank, dt: f64) -> bool {
        if tank.id == self.owner
            || self.position.y >= tank.size.y + self.radius
            || self.position.distance(&tank.position) >= SHELL_TANK_REACH
        {
            return false;
        }

        let rotation = tank.heading();
        let local = to_local_frame_3d(self.position - tank.position.with_y(0.0), rotation);
        let velocity = to_local_frame_3d(self.velocity(), rotation);
        check_hit_box(self.inflate(tank.size), velocity, local, dt)
    }

    fn hits_building(&self, building: &Building, dt: f64) -> bool {
        if self.position.distance(&building.position) >= SHELL_BUILDING_REACH {
            return false;
        }

        let local = self.position - building.position.with_y(0.0);
        check_hit_box(self.inflate(building.size), self.velocity(), local, dt)
    }

    fn inflate(&self, size: Vec3) -> Vec3 {
        Vec3::new(size.x + self.radius, size.y + self.radius, size.z + self.radius)
    }
}

/// Swept point test against a box standing on the ground at the origin.
///
/// `hit_box` holds the X/Z half-extents and the full height. The point is a hit if it is
/// already inside, or if its straight path crosses a face it is outside of within `dt`.
/// Faces are tried top, -X, +X, +Z, -Z and the first crossing wins.
pub fn check_hit_box(hit_box: Vec3, velocity: Vec3, local: Vec3, dt: f64) -> bool {
    if local.y <= hit_box.y
        && local.x >= -hit_box.x
        && local.x <= hit_box.x
        && local.z >= -hit_box.z
        && local.z <= hit_box.z
    {
        return true;
    }

    let faces = [
        (local.y > hit_box.y, Plane::new(Vec3::new(0.0, -1.0, 0.0), hit_box.y)),
        (local.x < -hit_box.x, Plane::new(Vec3::new(-1.0, 0.0, 0.0), -hit_box.x)),
        (local.x > hit_box.x, Plane::new(Vec3::new(-1.0, 0.0, 0.0), hit_box.x)),
        (local.z > hit_box.z, Plane::new(Vec3::new(0.0, 0.0, -1.0), hit_box.z)),
        (local.z < -hit_box.z, Plane::new(Vec3::new(0.0, 0.0, -1.0), -hit_box.z)),
    ];

    faces
        .iter()
        .filter(|(outside, _)| *outside)
        .filter_map(|(_, plane)| plane_intersection(plane, velocity, local, dt).map(|hit| (plane, hit)))
        .any(|(plane, hit)| {
            // Project the hit onto the two axes spanning the face
            let (point, extents) = if plane.normal.y != 0.0 {
                (Point::new(hit.x, hit.z), Point::new(hit_box.x, hit_box.z))
            } else if plane.normal.x != 0.0 {
                (Point::new(hit.y, hit.z), Point::new(hit_box.y, hit_box.z))
            } else {
                (Point::new(hit.x, hit.y), Point::new(hit_box.x, hit_box.y))
            };
            point_in_rectangle(point, extents)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SHELL_SPEED;
    use crate::obstacles::Building;
    use crate::tank::Controller;
    use assert_approx_eq::assert_approx_eq;

    const DT: f64 = 1.0 / 60.0;

    fn shell(muzzle: Vec3, velocity: Vec3, owner: EntityId) -> Shell {
        Shell::new(100, Launch { owner, muzzle, velocity })
    }

    #[test]
    fn test_trajectory() {
        let shell = shell(Vec3::new(10.0, 400.0, -5.0), Vec3::new(100.0, 200.0, 300.0), 1);
        let p = shell.trajectory(2.0);
        assert_approx_eq!(p.x, 210.0);
        assert_approx_eq!(p.y, 400.0 + 400.0 - 2.0 * GRAVITY);
        assert_approx_eq!(p.z, 595.0);
    }

    #[test]
    fn test_straight_up_shell_lands() {
        let vy = 500.0;
        let mut shell = shell(Vec3::new(0.0, GROUND_EPSILON + 1.0, 0.0), Vec3::new(0.0, vy, 0.0), 1);
        let registry = ObstacleRegistry::new();
        let mut ticks = 0;
        while shell.find_impact(&[], &registry, DT).is_none() {
            shell.advance(DT);
            ticks += 1;
            assert!(ticks < 10_000, "shell never came down");
        }
        assert_eq!(shell.find_impact(&[], &registry, DT), Some(Impact::Ground));
        assert!(shell.time() <= 2.0 * vy / GRAVITY + DT);
        assert!(shell.position().y < GROUND_EPSILON);
    }

    #[test]
    fn test_high_shell_is_not_checked() {
        let shell = shell(Vec3::new(0.0, SHELL_CHECK_HEIGHT, 0.0), Vec3::ZERO, 1);
        let mut registry = ObstacleRegistry::new();
        registry.insert(Building::new(5, Vec3::ZERO));
        assert_eq!(shell.find_impact(&[], &registry, DT), None);
    }

    #[test]
    fn test_velocity_tracks_gravity() {
        let mut shell = shell(Vec3::new(0.0, 500.0, 0.0), Vec3::new(0.0, 100.0, SHELL_SPEED), 1);
        shell.advance(0.5);
        let v = shell.velocity();
        assert_approx_eq!(v.y, 100.0 - 0.5 * GRAVITY);
        assert_approx_eq!(v.z, SHELL_SPEED);
    }

    #[test]
    fn test_hit_box_inside_is_inclusive() {
        let hit_box = Vec3::new(100.0, 300.0, 100.0);
        assert!(check_hit_box(hit_box, Vec3::ZERO, Vec3::new(0.0, 300.0, 100.0), DT));
        assert!(check_hit_box(hit_box, Vec3::ZERO, Vec3::new(-100.0, 0.0, -100.0), DT));
        assert!(!check_hit_box(hit_box, Vec3::ZERO, Vec3::new(0.0, 300.1, 0.0), DT));
    }

    #[test]
    fn test_hit_box_top_face() {
        let hit_box = Vec3::new(100.0, 300.0, 100.0);
        assert!(check_hit_box(hit_box, Vec3::new(0.0, -1000.0, 0.0), Vec3::new(50.0, 500.0, 0.0), 1.0));
        // Falls beside the box
        assert!(!check_hit_box(hit_box, Vec3::new(0.0, -1000.0, 0.0), Vec3::new(150.0, 500.0, 0.0), 1.0));
        // Not enough time to reach it
        assert!(!check_hit_box(hit_box, Vec3::new(0.0, -1000.0, 0.0), Vec3::new(50.0, 500.0, 0.0), 0.1));
    }

    #[test]
    fn test_hit_box_side_faces() {
        let hit_box = Vec3::new(100.0, 300.0, 100.0);
        // -X face, reached after 0.1s
        assert!(check_hit_box(hit_box, Vec3::new(1000.0, 0.0, 0.0), Vec3::new(-200.0, 100.0, 0.0), 0.5));
        assert!(!check_hit_box(hit_box, Vec3::new(1000.0, 0.0, 0.0), Vec3::new(-200.0, 100.0, 0.0), 0.05));
        // +Z face, travelling away misses
        assert!(check_hit_box(hit_box, Vec3::new(0.0, 0.0, -1000.0), Vec3::new(0.0, 100.0, 200.0), 0.5));
        assert!(!check_hit_box(hit_box, Vec3::new(0.0, 0.0, 1000.0), Vec3::new(0.0, 100.0, 200.0), 0.5));
        // Passes over the -Z face
        assert!(!check_hit_box(hit_box, Vec3::new(0.0, 0.0, 1000.0), Vec3::new(0.0, 400.0, -200.0), 0.5));
    }

    #[test]
    fn test_shell_hits_tank_in_front() {
        let target = Tank::new(2, Vec3::new(0.0, 0.0, 500.0), Controller::Ai);
        let shell = shell(Vec3::new(0.0, 200.0, 100.0), Vec3::new(0.0, 0.0, SHELL_SPEED), 1);
        let registry = ObstacleRegistry::new();
        let impact = shell.find_impact(std::slice::from_ref(&target), &registry, 0.1);
        assert_eq!(impact, Some(Impact::Tank(2)));
    }

    #[test]
    fn test_owner_is_never_hit() {
        let owner = Tank::new(1, Vec3::ZERO, Controller::Ai);
        let shell = shell(Vec3::new(0.0, 200.0, 0.0), Vec3::new(0.0, 0.0, SHELL_SPEED), 1);
        let registry = ObstacleRegistry::new();
        assert_eq!(shell.find_impact(std::slice::from_ref(&owner), &registry, DT), None);
    }

    #[test]
    fn test_targets_checked_in_id_order() {
        // Shell sits inside both a building and a tank; the lower id wins
        let mut registry = ObstacleRegistry::new();
        registry.insert(Building::new(3, Vec3::ZERO));
        let tank = Tank::new(7, Vec3::ZERO, Controller::Ai);
        let shell = shell(Vec3::new(0.0, 100.0, 0.0), Vec3::ZERO, 1);
        assert_eq!(
            shell.find_impact(std::slice::from_ref(&tank), &registry, DT),
            Some(Impact::Building(3))
        );

        let mut later = ObstacleRegistry::new();
        later.insert(Building::new(9, Vec3::ZERO));
        assert_eq!(
            shell.find_impact(std::slice::from_ref(&tank), &later, DT),
            Some(Impact::Tank(7))
        );
    }
}
