use std::f64::consts::{PI, TAU};

/// Wraps an angle into [0, 2π).
pub fn wrap_angle(radians: f64) -> f64 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Normalizes an angle difference into (-π, π].
pub fn normalize_relative(radians: f64) -> f64 {
    if radians > -PI && radians <= PI {
        return radians;
    }
    let mut angle = wrap_angle(radians);
    if angle > PI {
        angle -= TAU;
    }
    angle
}

/// Sign that maps zero to zero (unlike `f64::signum`).
pub fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Adds `step` to `value`, never letting the result leave [min, max].
pub fn step_clamped(value: f64, step: f64, min: f64, max: f64) -> f64 {
    (value + step).clamp(min, max)
}

/// Bearing of a ground-plane offset measured from +Z towards +X.
/// A zero offset has bearing 0.
pub fn bearing(dx: f64, dz: f64) -> f64 {
    if dx == 0.0 && dz == 0.0 {
        0.0
    } else {
        dx.atan2(dz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_wrap_angle() {
        assert_approx_eq!(wrap_angle(-PI / 2.0), 3.0 * PI / 2.0);
        assert_approx_eq!(wrap_angle(TAU + 0.25), 0.25);
        assert_eq!(wrap_angle(TAU), 0.0);
        assert!(wrap_angle(-1e-18) < TAU);
    }

    #[test]
    fn test_normalize_relative() {
        assert_approx_eq!(normalize_relative(3.0 * PI / 2.0), -PI / 2.0);
        assert_approx_eq!(normalize_relative(-3.0 * PI / 2.0), PI / 2.0);
        assert_approx_eq!(normalize_relative(PI), PI);
        assert_approx_eq!(normalize_relative(-PI), PI);
        assert_approx_eq!(normalize_relative(0.1), 0.1);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(3.5), 1.0);
        assert_eq!(sign(-0.1), -1.0);
        assert_eq!(sign(0.0), 0.0);
    }

    #[test]
    fn test_step_clamped() {
        assert_approx_eq!(step_clamped(0.5, 0.2, -0.6, 0.6), 0.6);
        assert_approx_eq!(step_clamped(-0.5, -0.2, -0.6, 0.6), -0.6);
        assert_approx_eq!(step_clamped(0.1, 0.2, -0.6, 0.6), 0.3);
    }

    #[test]
    fn test_bearing_quadrants() {
        assert_approx_eq!(bearing(0.0, 1.0), 0.0);
        assert_approx_eq!(bearing(1.0, 0.0), PI / 2.0);
        assert_approx_eq!(bearing(-1.0, 0.0), -PI / 2.0);
        assert_approx_eq!(bearing(0.0, -1.0), PI);
        assert_approx_eq!(bearing(-1.0, -1.0), -3.0 * PI / 4.0);
        assert_eq!(bearing(0.0, 0.0), 0.0);
    }
}
