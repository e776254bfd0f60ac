//! Ground-plane overlap tests between a tank and everything it can drive into.
//!
//! All tests work in 2D on the X/Z plane; tanks never leave the ground.

use crate::config::{TANK_BUILDING_REACH, TANK_TANK_REACH};
use crate::geometry::{footprint_corners, point_in_rectangle, point_in_triangle, to_local_frame};
use crate::obstacles::{Building, ObstacleRegistry};
use crate::tank::Tank;
use crate::types::Point;

/// True if `tank`, at its current pose, overlaps the world border, another live tank or
/// a live building. `tanks` may contain `tank` itself; it is skipped by id.
pub fn collides_with_world(
    tank: &Tank,
    tanks: &[Tank],
    buildings: &ObstacleRegistry,
    half_extent: f64,
) -> bool {
    if crosses_border(tank, half_extent) {
        log::trace!(target: "collision", "Tank {} blocked by the world border", tank.id);
        return true;
    }

    if let Some(other) = tanks
        .iter()
        .filter(|other| !other.is_destroyed())
        .find(|other| tanks_overlap(tank, other))
    {
        log::trace!(target: "collision", "Tank {} blocked by tank {}", tank.id, other.id);
        return true;
    }

    if let Some(building) = buildings.iter().find(|b| overlaps_building(tank, b)) {
        log::trace!(target: "collision", "Tank {} blocked by building {}", tank.id, building.id);
        return true;
    }

    false
}

/// Any footprint corner at or beyond `half_extent` on either axis.
pub fn crosses_border(tank: &Tank, half_extent: f64) -> bool {
    footprint_corners(tank.position.ground(), tank.half_extents(), tank.heading())
        .iter()
        .any(|corner| corner.x.abs() >= half_extent || corner.z.abs() >= half_extent)
}

/// Oriented footprint test between two tanks, evaluated in `tank`'s frame.
pub fn tanks_overlap(tank: &Tank, other: &Tank) -> bool {
    if tank.id == other.id || tank.position.distance(&other.position) >= TANK_TANK_REACH {
        return false;
    }

    let offset = to_local_frame(other.position.ground() - tank.position.ground(), tank.heading());
    let corners = footprint_corners(offset, other.half_extents(), other.heading() - tank.heading());
    footprints_overlap(&corners, tank.half_extents())
}

/// Oriented footprint test between a tank and an unrotated building, evaluated in the
/// building's frame.
pub fn overlaps_building(tank: &Tank, building: &Building) -> bool {
    if tank.position.distance(&building.position) >= TANK_BUILDING_REACH {
        return false;
    }

    let offset = tank.position.ground() - building.position.ground();
    let corners = footprint_corners(offset, tank.half_extents(), tank.heading());
    footprints_overlap(&corners, building.half_extents())
}

// Corners of one footprint inside the origin-centred rectangle, or a corner of the
// rectangle inside the footprint (split into two triangles)
fn footprints_overlap(corners: &[Point; 4], rectangle: Point) -> bool {
    if corners.iter().any(|&corner| point_in_rectangle(corner, rectangle)) {
        return true;
    }

    let [top_left, top_right, bottom_left, bottom_right] = *corners;
    let reflections = [
        Point::new(rectangle.x, rectangle.z),
        Point::new(-rectangle.x, rectangle.z),
        Point::new(rectangle.x, -rectangle.z),
        Point::new(-rectangle.x, -rectangle.z),
    ];
    reflections.iter().any(|&p| {
        point_in_triangle(top_left, top_right, bottom_left, p)
            || point_in_triangle(bottom_right, top_right, bottom_left, p)
    })
}
