//! Stateless geometry used by both collision systems.
//!
//! Rotations follow the arena's yaw convention: an entity with rotation `r` faces
//! `(sin r, cos r)` on the ground plane, so a local offset `(x, z)` lands in the world at
//! `(x cos r + z sin r, z cos r - x sin r)`.

use crate::types::{Point, Vec3};

/// Infinite plane `N·p + D = 0` with unit normal `N`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f64,
}

impl Plane {
    pub const fn new(normal: Vec3, distance: f64) -> Self {
        Plane { normal, distance }
    }
}

/// Intersects the ray `local_position + t * velocity` with `plane` for `t` in
/// `[0, max_time]`. Parallel rays and roots outside the window yield `None`.
pub fn plane_intersection(
    plane: &Plane,
    velocity: Vec3,
    local_position: Vec3,
    max_time: f64,
) -> Option<Vec3> {
    let denominator = plane.normal.dot(&velocity);
    if denominator == 0.0 {
        return None;
    }
    let time = -(plane.normal.dot(&local_position) + plane.distance) / denominator;
    if !time.is_finite() || time < 0.0 || time > max_time {
        return None;
    }
    Some(local_position + velocity * time)
}

/// True when `point` lies inside the origin-centred rectangle, edges included.
pub fn point_in_rectangle(point: Point, half_extents: Point) -> bool {
    point.x >= -half_extents.x
        && point.x <= half_extents.x
        && point.z >= -half_extents.z
        && point.z <= half_extents.z
}

/// Barycentric point-in-triangle test. Degenerate triangles contain nothing.
pub fn point_in_triangle(a: Point, b: Point, c: Point, p: Point) -> bool {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;

    let dot00 = v0.dot(&v0);
    let dot01 = v0.dot(&v1);
    let dot02 = v0.dot(&v2);
    let dot11 = v1.dot(&v1);
    let dot12 = v1.dot(&v2);

    let determinant = dot00 * dot11 - dot01 * dot01;
    if determinant.abs() <= f64::EPSILON * dot00 * dot11 || determinant == 0.0 {
        return false;
    }
    let inverse = 1.0 / determinant;
    let u = (dot11 * dot02 - dot01 * dot12) * inverse;
    let v = (dot00 * dot12 - dot01 * dot02) * inverse;

    u >= 0.0 && v >= 0.0 && u + v < 1.0
}

/// Corners of a rotated footprint, in the order top-left, top-right, bottom-left,
/// bottom-right.
pub fn footprint_corners(center: Point, half_extents: Point, rotation: f64) -> [Point; 4] {
    let (sin, cos) = rotation.sin_cos();
    let (hx, hz) = (half_extents.x, half_extents.z);
    [
        Point::new(center.x + hx * cos + hz * sin, center.z + hz * cos - hx * sin),
        Point::new(center.x - hx * cos + hz * sin, center.z + hz * cos + hx * sin),
        Point::new(center.x + hx * cos - hz * sin, center.z - hz * cos - hx * sin),
        Point::new(center.x - hx * cos - hz * sin, center.z - hz * cos + hx * sin),
    ]
}

/// Expresses a world-space ground offset in the frame of an entity rotated by
/// `rotation`.
pub fn to_local_frame(offset: Point, rotation: f64) -> Point {
    let (sin, cos) = rotation.sin_cos();
    Point::new(
        offset.x * cos - offset.z * sin,
        offset.x * sin + offset.z * cos,
    )
}

/// Same as [`to_local_frame`] for a 3D vector; height is untouched.
pub fn to_local_frame_3d(offset: Vec3, rotation: f64) -> Vec3 {
    let ground = to_local_frame(offset.ground(), rotation);
    Vec3::new(ground.x, offset.y, ground.z)
}
