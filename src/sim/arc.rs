//! Arc geometry for arena rings
//!
//! An arena is a ring of rocks around a center point with one opening. In
//! local polar coordinates around that center the ring is defined by:
//! - radius: distance from the arena center
//! - jitter: radial wobble applied per rock (radius ± jitter)
//! - theta_start, theta_end: angular extent of the rock wall (the gap is the rest)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{normalize_angle, polar_to_cartesian};

/// A jittered arc around a local center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcSegment {
    /// Centerline radius from the arc's center
    pub radius: f32,
    /// Maximum radial offset of sampled points
    pub jitter: f32,
    /// Start angle (radians, normalized to [-π, π))
    pub theta_start: f32,
    /// End angle (radians, normalized to [-π, π))
    pub theta_end: f32,
}

impl ArcSegment {
    pub fn new(radius: f32, jitter: f32, theta_start: f32, theta_end: f32) -> Self {
        Self {
            radius,
            jitter,
            theta_start: normalize_angle(theta_start),
            theta_end: normalize_angle(theta_end),
        }
    }

    /// Full ring with an opening of `gap` radians centered on `facing`
    pub fn with_gap(radius: f32, jitter: f32, facing: f32, gap: f32) -> Self {
        let gap = gap.clamp(0.0, std::f32::consts::TAU);
        Self::new(radius, jitter, facing + gap / 2.0, facing - gap / 2.0)
    }

    /// Angular span of the arc (handles wraparound)
    pub fn angular_span(&self) -> f32 {
        let mut span = self.theta_end - self.theta_start;
        if span <= 0.0 {
            span += std::f32::consts::TAU;
        }
        span
    }

    /// Angles of `count` points stepped evenly along the arc, each centered in its slot
    pub fn step_angles(&self, count: usize) -> Vec<f32> {
        let span = self.angular_span();
        (0..count)
            .map(|i| {
                let t = (i as f32 + 0.5) / count as f32;
                normalize_angle(self.theta_start + t * span)
            })
            .collect()
    }

    /// Point on the centerline at `theta`, offset radially by `offset`
    /// (clamped to ± jitter), relative to `center`
    pub fn point_at(&self, center: Vec2, theta: f32, offset: f32) -> Vec2 {
        let offset = offset.clamp(-self.jitter, self.jitter);
        center + polar_to_cartesian(self.radius + offset, theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    /// Unsigned angular distance between two angles
    fn angle_between(a: f32, b: f32) -> f32 {
        normalize_angle(a - b).abs()
    }

    #[test]
    fn test_span_wraps_past_pi() {
        // Arc from 170° to -170° crosses ±180°
        let arc = ArcSegment::new(100.0, 10.0, 170.0_f32.to_radians(), -170.0_f32.to_radians());
        assert!((arc.angular_span() - 20.0_f32.to_radians()).abs() < 1e-4);
        for theta in arc.step_angles(4) {
            assert!(angle_between(theta, PI) <= 10.0_f32.to_radians() + 1e-4);
        }
    }

    #[test]
    fn test_gap_faces_requested_direction() {
        // Opening of 90° facing -X (toward a world center to the left)
        let arc = ArcSegment::with_gap(70.0, 5.0, PI, PI / 2.0);
        assert!((arc.angular_span() - 1.5 * PI).abs() < 1e-4);
        assert!((angle_between(arc.theta_start, PI) - PI / 4.0).abs() < 1e-4);
        assert!((angle_between(arc.theta_end, PI) - PI / 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_step_angles_stay_on_wall() {
        let arc = ArcSegment::with_gap(70.0, 5.0, 0.0, PI / 2.0);
        let angles = arc.step_angles(12);
        assert_eq!(angles.len(), 12);
        for theta in angles {
            assert!(angle_between(theta, 0.0) > PI / 4.0, "angle {theta} fell in the gap");
        }
    }

    #[test]
    fn test_point_at_clamps_jitter() {
        let arc = ArcSegment::new(50.0, 4.0, 0.0, PI);
        let center = Vec2::new(100.0, 0.0);
        let p = arc.point_at(center, 0.0, 100.0);
        assert!((p - Vec2::new(154.0, 0.0)).length() < 1e-4);
    }
}
