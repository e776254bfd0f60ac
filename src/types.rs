//! Shared value types: ids, ground-plane points, 3D vectors and tick timing.

use std::ops::{Add, Mul, Sub};

/// Stable identity for every entity in the arena. Ids are never reused.
pub type EntityId = u32;

/// A point or offset on the ground plane. `z` is the world Z axis, not height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub z: f64,
}

impl Point {
    pub const fn new(x: f64, z: f64) -> Self {
        Point { x, z }
    }

    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.z * other.z
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (*self - *other).length()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.z + other.z)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.z - other.z)
    }
}

/// World-space vector. Y is height above the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(&self, other: &Vec3) -> f64 {
        (*self - *other).length()
    }

    /// Drops the height component.
    pub fn ground(&self) -> Point {
        Point::new(self.x, self.z)
    }

    pub fn with_y(self, y: f64) -> Vec3 {
        Vec3::new(self.x, y, self.z)
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, scalar: f64) -> Vec3 {
        Vec3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

/// Timing handed to the arena for one update pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickTime {
    pub elapsed: f64, // Seconds covered by this tick
    pub total: f64,   // Monotonic seconds since the simulation started
}

/// Accumulates frame times into `TickTime` values.
#[derive(Debug, Clone, Default)]
pub struct GameClock {
    total: f64,
    ticks: u64,
}

impl GameClock {
    pub fn new() -> Self {
        Default::default()
    }

    /// Advances the clock. Negative or non-finite frame times count as zero.
    pub fn advance(&mut self, elapsed: f64) -> TickTime {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        self.total += elapsed;
        self.ticks += 1;
        TickTime {
            elapsed,
            total: self.total,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}
