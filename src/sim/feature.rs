//! Placed environment features
//!
//! A feature is an immutable circular obstacle on the world plane. Height is
//! never stored; `rotation_y` only travels through to the renderer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::catalog::{FeatureCatalog, FeatureType};

/// A placed obstacle (island, rocks, wreck, port, lighthouse)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FeatureRecord", into = "FeatureRecord")]
pub struct Feature {
    /// Unique id, assigned at placement and never reused
    pub id: String,
    pub kind: FeatureType,
    pub x: f32,
    pub z: f32,
    /// Multiplier on the type's base radius (positive)
    pub scale: f32,
    /// Yaw in radians, render-only
    pub rotation_y: f32,
    /// Original name of an `Unknown` type, written back on serialize
    unknown_name: Option<String>,
}

/// Wire form: the type travels as a plain string
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeatureRecord {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    x: f32,
    z: f32,
    scale: f32,
    rotation_y: f32,
}

impl From<FeatureRecord> for Feature {
    fn from(record: FeatureRecord) -> Self {
        let kind = FeatureType::from_name(&record.kind);
        let unknown_name = (kind == FeatureType::Unknown && record.kind != kind.as_str()).then_some(record.kind);
        Self {
            id: record.id,
            kind,
            x: record.x,
            z: record.z,
            scale: record.scale,
            rotation_y: record.rotation_y,
            unknown_name,
        }
    }
}

impl From<Feature> for FeatureRecord {
    fn from(feature: Feature) -> Self {
        Self {
            kind: feature.type_name().to_string(),
            id: feature.id,
            x: feature.x,
            z: feature.z,
            scale: feature.scale,
            rotation_y: feature.rotation_y,
        }
    }
}

impl Feature {
    pub fn new(id: impl Into<String>, kind: FeatureType, position: Vec2, scale: f32, rotation_y: f32) -> Self {
        Self {
            id: id.into(),
            kind,
            x: position.x,
            z: position.y,
            scale,
            rotation_y,
            unknown_name: None,
        }
    }

    /// Type name as loaded; unknown types keep the name they came with
    pub fn type_name(&self) -> &str {
        self.unknown_name.as_deref().unwrap_or(self.kind.as_str())
    }

    /// Center on the world plane
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }

    /// Collision radius under the given catalog
    #[inline]
    pub fn effective_radius(&self, catalog: &FeatureCatalog) -> f32 {
        catalog.effective_radius(self.kind, self.scale)
    }
}
