//! Point-vs-feature collision queries
//!
//! Linear scan over the registry snapshot. Feature counts are in the tens, so
//! there is no broad phase.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::catalog::{FeatureCatalog, FeatureType};
use super::feature::Feature;
use super::geometry::distance;
use super::registry::FeatureRegistry;
use crate::consts::COLLISION_MARGIN;

/// Which feature wins when a point intersects several
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First intersecting feature in registration order
    FirstRegistered,
    /// Intersecting feature whose center is closest to the point
    #[default]
    Nearest,
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// The intersected feature
    pub feature: Feature,
    /// Planar distance from the query point to the feature center
    pub distance: f32,
    /// Feature's effective radius (without margin)
    pub radius: f32,
}

/// One ring per feature for a debug overlay or minimap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugRing {
    pub id: String,
    pub kind: FeatureType,
    pub center: Vec2,
    pub radius: f32,
}

/// Collision query service over a shared registry
#[derive(Debug, Clone)]
pub struct CollisionQuery {
    registry: Arc<FeatureRegistry>,
    catalog: Arc<FeatureCatalog>,
    margin: f32,
    tie_break: TieBreak,
}

impl CollisionQuery {
    pub fn new(registry: Arc<FeatureRegistry>, catalog: Arc<FeatureCatalog>) -> Self {
        Self {
            registry,
            catalog,
            margin: COLLISION_MARGIN,
            tie_break: TieBreak::default(),
        }
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn registry(&self) -> &Arc<FeatureRegistry> {
        &self.registry
    }

    pub fn catalog(&self) -> &Arc<FeatureCatalog> {
        &self.catalog
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// `base_radius(kind) * scale`
    pub fn get_feature_radius(&self, kind: FeatureType, scale: f32) -> f32 {
        self.catalog.effective_radius(kind, scale)
    }

    /// Feature intersecting a circle of `extra_radius` around `point`, if any.
    ///
    /// A feature intersects when `distance < radius + margin + extra_radius`.
    pub fn check_point_collision(&self, point: Vec2, extra_radius: f32) -> Option<Feature> {
        self.check_collision(point, extra_radius).map(|hit| hit.feature)
    }

    /// Like `check_point_collision`, with distance and radius attached
    pub fn check_collision(&self, point: Vec2, extra_radius: f32) -> Option<CollisionResult> {
        let features = self.registry.features();
        let mut best: Option<CollisionResult> = None;

        for feature in features.iter() {
            let Some(hit) = self.test_feature(feature, point, extra_radius) else {
                continue;
            };
            match self.tie_break {
                TieBreak::FirstRegistered => return Some(hit),
                TieBreak::Nearest => {
                    // Strict less-than keeps registration order among equals
                    if best.as_ref().is_none_or(|b| hit.distance < b.distance) {
                        best = Some(hit);
                    }
                }
            }
        }

        best
    }

    /// Every intersecting feature, in registration order
    pub fn collisions_at(&self, point: Vec2, extra_radius: f32) -> Vec<CollisionResult> {
        self.registry
            .features()
            .iter()
            .filter_map(|f| self.test_feature(f, point, extra_radius))
            .collect()
    }

    /// Rings at each feature's effective radius
    pub fn debug_rings(&self) -> Vec<DebugRing> {
        self.registry
            .features()
            .iter()
            .map(|f| DebugRing {
                id: f.id.clone(),
                kind: f.kind,
                center: f.position(),
                radius: f.effective_radius(&self.catalog),
            })
            .collect()
    }

    fn test_feature(&self, feature: &Feature, point: Vec2, extra_radius: f32) -> Option<CollisionResult> {
        let radius = feature.effective_radius(&self.catalog);
        let d = distance(point, feature.position());
        if d < radius + self.margin + extra_radius {
            Some(CollisionResult {
                feature: feature.clone(),
                distance: d,
                radius,
            })
        } else {
            None
        }
    }
}
