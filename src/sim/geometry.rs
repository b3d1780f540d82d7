//! Planar geometry primitives
//!
//! Pure helpers over the world plane. Every function here is total: degenerate
//! inputs (coincident points, zero vectors) fall back to a fixed direction
//! instead of producing NaN.

use glam::{Vec2, Vec3};

/// Direction used when two points coincide (world +X)
pub const FALLBACK_DIRECTION: Vec2 = Vec2::X;

/// Squared lengths below this are treated as zero
const DEGENERATE_EPSILON_SQ: f32 = 1e-10;

/// Project a 3D position onto the world plane (drops height)
#[inline]
pub fn plane(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Lift a plane point back to 3D with the given height
#[inline]
pub fn lift(p: Vec2, y: f32) -> Vec3 {
    Vec3::new(p.x, y, p.y)
}

/// Planar distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// True if two circles overlap once `padding` is added between them
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32, padding: f32) -> bool {
    distance(a, b) < ra + rb + padding
}

/// Normalize, or return `fallback` for a (near) zero vector
#[inline]
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    if v.length_squared() < DEGENERATE_EPSILON_SQ {
        fallback
    } else {
        v.normalize()
    }
}

/// Unit direction from `from` toward `to` (fallback for coincident points)
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    normalize_or(to - from, FALLBACK_DIRECTION)
}

/// Point on the ray from `center` through `point`, `distance` away from `center`
#[inline]
pub fn push_out(point: Vec2, center: Vec2, distance: f32) -> Vec2 {
    center + direction(center, point) * distance
}

/// Unit tangent to a circle at the given outward normal.
///
/// Of the two tangents, returns the one best aligned with `heading` so that
/// sliding keeps the agent moving forward. Ties pick the counter-clockwise one.
pub fn tangent_toward(normal: Vec2, heading: Vec2) -> Vec2 {
    let tangent = normal.perp();
    if tangent.dot(heading) < 0.0 {
        -tangent
    } else {
        tangent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_drops_height() {
        let p = plane(Vec3::new(1.0, 50.0, -2.0));
        assert_eq!(p, Vec2::new(1.0, -2.0));
        assert_eq!(lift(p, 7.0), Vec3::new(1.0, 7.0, -2.0));
    }

    #[test]
    fn test_direction_coincident_points() {
        let d = direction(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0));
        assert_eq!(d, FALLBACK_DIRECTION);
        assert!(d.is_finite());
    }

    #[test]
    fn test_push_out_distance() {
        let center = Vec2::new(10.0, 0.0);
        let out = push_out(Vec2::new(11.0, 1.0), center, 5.0);
        assert!((distance(out, center) - 5.0).abs() < 1e-4);

        // Degenerate: pushed along +X
        let out = push_out(center, center, 5.0);
        assert_eq!(out, Vec2::new(15.0, 0.0));
    }

    #[test]
    fn test_circles_overlap_with_padding() {
        // rocks scenario: 8 apart, radii 5 + 5, padding 2
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(8.0, 0.0), 5.0, 2.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(12.0, 0.0), 5.0, 2.0));
    }

    #[test]
    fn test_tangent_follows_heading() {
        let normal = Vec2::new(-1.0, 0.0);
        let t = tangent_toward(normal, Vec2::new(1.0, 0.5));
        assert!(t.dot(normal).abs() < 1e-6);
        assert!(t.y > 0.0);

        let t = tangent_toward(normal, Vec2::new(1.0, -0.5));
        assert!(t.y < 0.0);
    }
}
