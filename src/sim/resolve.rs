//! Collision response for moving agents (ships, projectiles)
//!
//! Agents are not owned here: callers pass position, velocity and radius on
//! every call. Positions are 3D; only `x`/`z` take part and `y` is carried
//! through untouched.
//!
//! Caller contract, implemented by [`CollisionResolver::step_agent`]:
//! 1. Check the *current* position first. An agent already inside a feature is
//!    pushed out with [`CollisionResolver::calculate_safe_position`] and halted.
//!    The pushed position is re-checked, since it may land in a neighbour.
//! 2. Otherwise check the *proposed* position before committing it, and stop or
//!    deflect. Never move first and fix up afterwards.

use std::f32::consts::TAU;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::catalog::FeatureCatalog;
use super::collision::CollisionQuery;
use super::feature::Feature;
use super::geometry::{direction, lift, plane, tangent_toward};
use crate::consts::{DEFLECT_DAMPING, SHIP_SAFETY_MARGIN};

/// Extra clearance past the query margin after a push-out, so the corrected
/// position does not register as a hit on the next frame
const ESCAPE_SLACK: f32 = 0.01;

/// Follow-up push-outs when an escape lands inside a neighbouring feature
const MAX_ESCAPE_PASSES: usize = 4;
/// Directions tried around the original feature when push-outs keep colliding
const ESCAPE_RAYS: usize = 16;
/// Rings of candidates per ray, stepping outward from the feature
const ESCAPE_RINGS: usize = 8;

/// Smallest sampling step along a projectile's path
const MIN_SAMPLE_STEP: f32 = 0.5;
/// Upper bound on samples per projectile segment
const MAX_PATH_SAMPLES: usize = 1024;

/// What to do when the next position would enter a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePolicy {
    /// Cancel velocity and stay put
    HardStop,
    /// Slide along the obstacle's tangent with damped speed
    #[default]
    Deflect,
}

/// Agent state for one resolution step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
}

impl Agent {
    pub fn new(position: Vec3, velocity: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }
}

/// How an agent interacted with the world during a step
#[derive(Debug, Clone, PartialEq)]
pub enum Contact {
    /// No obstacle involved
    None,
    /// Was already inside this feature and got pushed out
    Escaped(Feature),
    /// Would have entered this feature; halted in place
    Stopped(Feature),
    /// Would have entered this feature; slid along it instead
    Deflected(Feature),
}

impl Contact {
    /// Feature touched this step, if any
    pub fn feature(&self) -> Option<&Feature> {
        match self {
            Contact::None => None,
            Contact::Escaped(f) | Contact::Stopped(f) | Contact::Deflected(f) => Some(f),
        }
    }
}

/// Corrected agent state after a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub position: Vec3,
    pub velocity: Vec3,
    pub contact: Contact,
}

/// A projectile striking a feature
#[derive(Debug, Clone, PartialEq)]
pub struct Impact {
    pub feature: Feature,
    /// First sampled point along the path that touches the feature
    pub point: Vec3,
}

/// Push-out and deflection math
#[derive(Debug, Clone)]
pub struct CollisionResolver {
    catalog: Arc<FeatureCatalog>,
    damping: f32,
    safety_margin: f32,
}

impl CollisionResolver {
    pub fn new(catalog: Arc<FeatureCatalog>) -> Self {
        Self {
            catalog,
            damping: DEFLECT_DAMPING,
            safety_margin: SHIP_SAFETY_MARGIN,
        }
    }

    /// Fraction of speed kept when deflecting
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Clearance added on top of the agent radius when pushing out
    pub fn with_safety_margin(mut self, safety_margin: f32) -> Self {
        self.safety_margin = safety_margin;
        self
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Position just outside `feature`, on the ray from its center through `pos`.
    ///
    /// The result sits exactly `agent_radius + safety_margin + R(feature)` from
    /// the center. If `pos` is the center itself the agent is pushed along +X.
    /// Height is preserved.
    pub fn calculate_safe_position(
        &self,
        pos: Vec3,
        feature: &Feature,
        agent_radius: f32,
        safety_margin: f32,
    ) -> Vec3 {
        let center = feature.position();
        let escape = direction(center, plane(pos));
        let push_distance = agent_radius + safety_margin + feature.effective_radius(&self.catalog);
        lift(center + escape * push_distance, pos.y)
    }

    /// Velocity after touching `feature` at `pos`
    pub fn resolve_velocity(
        &self,
        current_velocity: Vec3,
        pos: Vec3,
        feature: &Feature,
        policy: MovePolicy,
    ) -> Vec3 {
        match policy {
            MovePolicy::HardStop => Vec3::ZERO,
            MovePolicy::Deflect => {
                let planar = plane(current_velocity);
                let speed = planar.length();
                if speed <= f32::EPSILON {
                    return Vec3::new(0.0, current_velocity.y, 0.0);
                }
                let normal = direction(feature.position(), plane(pos));
                let slide = tangent_toward(normal, planar) * speed * self.damping;
                lift(slide, current_velocity.y)
            }
        }
    }

    /// Advance an agent by `dt`, resolving obstacles in two phases.
    pub fn step_agent(
        &self,
        query: &CollisionQuery,
        agent: Agent,
        dt: f32,
        policy: MovePolicy,
    ) -> StepResult {
        // Phase 1: already penetrating
        if let Some(feature) = query.check_point_collision(plane(agent.position), agent.radius) {
            let position = self.escape(query, &agent, &feature);
            log::debug!(
                "Agent inside {} at ({:.1}, {:.1}), pushed to ({:.1}, {:.1})",
                feature.id,
                agent.position.x,
                agent.position.z,
                position.x,
                position.z
            );
            return StepResult {
                position,
                velocity: Vec3::ZERO,
                contact: Contact::Escaped(feature),
            };
        }

        // Phase 2: about to enter
        let proposed = agent.position + agent.velocity * dt;
        let Some(feature) = query.check_point_collision(plane(proposed), agent.radius) else {
            return StepResult {
                position: proposed,
                velocity: agent.velocity,
                contact: Contact::None,
            };
        };

        let stopped = |feature: Feature| StepResult {
            position: agent.position,
            velocity: Vec3::ZERO,
            contact: Contact::Stopped(feature),
        };

        match policy {
            MovePolicy::HardStop => stopped(feature),
            MovePolicy::Deflect => {
                let velocity = self.resolve_velocity(agent.velocity, agent.position, &feature, policy);
                let slid = agent.position + velocity * dt;
                if query.check_point_collision(plane(slid), agent.radius).is_some() {
                    // Sliding would still enter something; hold position
                    stopped(feature)
                } else {
                    StepResult {
                        position: slid,
                        velocity,
                        contact: Contact::Deflected(feature),
                    }
                }
            }
        }
    }

    /// Push an agent out of `feature` to a position no feature claims.
    ///
    /// Follows up with push-outs from whatever the corrected position lands
    /// in. If those keep colliding, searches rays around `feature` for the
    /// nearest clear spot. In a world with no clear spot in reach, the last
    /// push-out is returned.
    fn escape(&self, query: &CollisionQuery, agent: &Agent, feature: &Feature) -> Vec3 {
        let clearance = self.safety_margin.max(query.margin()) + ESCAPE_SLACK;
        let mut position = self.calculate_safe_position(agent.position, feature, agent.radius, clearance);

        for _ in 0..MAX_ESCAPE_PASSES {
            match query.check_point_collision(plane(position), agent.radius) {
                None => return position,
                Some(next) => {
                    position = self.calculate_safe_position(position, &next, agent.radius, clearance);
                }
            }
        }
        if query.check_point_collision(plane(position), agent.radius).is_none() {
            return position;
        }

        match self.clear_escape_ray(query, agent, feature, clearance) {
            Some(clear) => clear,
            None => {
                log::warn!(
                    "No clear water around {} for an agent of radius {:.1}",
                    feature.id,
                    agent.radius
                );
                position
            }
        }
    }

    /// First clear candidate on rays around `feature`, nearest ring first and,
    /// within a ring, closest to the agent's own escape direction
    fn clear_escape_ray(
        &self,
        query: &CollisionQuery,
        agent: &Agent,
        feature: &Feature,
        clearance: f32,
    ) -> Option<Vec3> {
        let center = feature.position();
        let heading = direction(center, plane(agent.position));
        let reach = agent.radius + clearance + feature.effective_radius(&self.catalog);
        let stride = 2.0 * agent.radius + clearance;

        (0..ESCAPE_RINGS)
            .flat_map(|ring| (0..ESCAPE_RAYS).map(move |ray| (ring, ray)))
            .map(|(ring, ray)| {
                // 0, +1, -1, +2, -2, ... steps away from the heading
                let step = ray.div_ceil(2) as f32;
                let side = if ray % 2 == 1 { 1.0 } else { -1.0 };
                let ray_dir = Vec2::from_angle(side * step * TAU / ESCAPE_RAYS as f32).rotate(heading);
                let along = center + ray_dir * (reach + ring as f32 * stride);
                lift(along, agent.position.y)
            })
            .find(|candidate| query.check_point_collision(plane(*candidate), agent.radius).is_none())
    }
}

/// First feature hit by a projectile travelling from `from` to `to`.
///
/// The segment is sampled at steps no longer than the projectile radius so a
/// fast shot cannot skip over a small rock between frames.
pub fn projectile_impact(query: &CollisionQuery, from: Vec3, to: Vec3, radius: f32) -> Option<Impact> {
    let travel = plane(to) - plane(from);
    let step = radius.max(MIN_SAMPLE_STEP);
    let samples = ((travel.length() / step).ceil() as usize).clamp(1, MAX_PATH_SAMPLES);

    (0..=samples).find_map(|i| {
        let point = from.lerp(to, i as f32 / samples as f32);
        query
            .check_point_collision(plane(point), radius)
            .map(|feature| Impact { feature, point })
    })
}
