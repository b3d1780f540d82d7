//! World generation and collision settings
//!
//! Data-driven tuning for the placement generator and collision services.
//! Every field has a default, so a settings file only lists what it changes.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::sim::{CollisionQuery, FeatureCatalog, FeatureRegistry, FeatureType, TieBreak};

/// How crowded the generated world is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DensityPreset {
    Sparse,
    #[default]
    Normal,
    Dense,
}

impl DensityPreset {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sparse" | "low" => Some(DensityPreset::Sparse),
            "normal" | "medium" | "med" => Some(DensityPreset::Normal),
            "dense" | "high" => Some(DensityPreset::Dense),
            _ => None,
        }
    }

    /// Multiplier applied to every requested feature count
    pub fn count_multiplier(&self) -> f32 {
        match self {
            DensityPreset::Sparse => 0.5,
            DensityPreset::Normal => 1.0,
            DensityPreset::Dense => 1.5,
        }
    }
}

/// Inclusive scale range for a group of features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f32,
    pub max: f32,
}

impl ScaleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(scale: f32) -> Self {
        Self::new(scale, scale)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), SettingsError> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min <= 0.0 {
            return Err(SettingsError::invalid(field, "scales must be positive and finite"));
        }
        if self.min > self.max {
            return Err(SettingsError::invalid(field, format!("min {} > max {}", self.min, self.max)));
        }
        Ok(())
    }
}

/// Distance band measured from the world center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceBand {
    pub min: f32,
    pub max: f32,
}

impl DistanceBand {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), SettingsError> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min < 0.0 {
            return Err(SettingsError::invalid(field, "distances must be non-negative and finite"));
        }
        if self.min > self.max {
            return Err(SettingsError::invalid(field, format!("min {} > max {}", self.min, self.max)));
        }
        Ok(())
    }
}

/// Rock rings with one opening facing the world center
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    pub count: u32,
    pub rock_count: u32,
    /// Ring radius around the arena center
    pub radius: f32,
    /// Per-rock radial wobble (radius ± jitter)
    pub radius_jitter: f32,
    /// Opening width, degrees
    pub gap_degrees: f32,
    /// Where arena centers may land
    pub center_distance: DistanceBand,
    pub rock_scale: ScaleRange,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            count: 2,
            rock_count: 14,
            radius: 60.0,
            radius_jitter: 5.0,
            gap_degrees: 90.0,
            center_distance: DistanceBand::new(300.0, 600.0),
            rock_scale: ScaleRange::new(0.8, 1.3),
        }
    }
}

/// Clusters of same-type islands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchipelagoSettings {
    pub count: u32,
    pub island_count: u32,
    /// Scatter disk radius around the cluster center
    pub radius: f32,
    pub center_distance: DistanceBand,
    /// Each archipelago picks one of these
    pub island_types: Vec<FeatureType>,
    pub island_scale: ScaleRange,
}

impl Default for ArchipelagoSettings {
    fn default() -> Self {
        Self {
            count: 3,
            island_count: 5,
            radius: 150.0,
            center_distance: DistanceBand::new(350.0, 800.0),
            island_types: vec![
                FeatureType::Tropical,
                FeatureType::Volcanic,
                FeatureType::Atoll,
                FeatureType::Ice,
                FeatureType::Mountain,
            ],
            island_scale: ScaleRange::new(0.8, 1.4),
        }
    }
}

/// Two-endpoint shipping lanes with ports, lighthouses and the odd wreck
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    pub count: u32,
    /// Minimum distance between a route's endpoints
    pub min_length: f32,
    pub endpoint_distance: DistanceBand,
    /// Max distance from endpoint to its port
    pub port_offset: f32,
    /// Max distance from endpoint to its lighthouse
    pub lighthouse_offset: f32,
    /// Chance of a wreck partway along the lane
    pub wreck_chance: f64,
    pub port_scale: ScaleRange,
    pub lighthouse_scale: ScaleRange,
    pub wreck_scale: ScaleRange,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            count: 2,
            min_length: 400.0,
            endpoint_distance: DistanceBand::new(250.0, 850.0),
            port_offset: 30.0,
            lighthouse_offset: 45.0,
            wreck_chance: 0.6,
            port_scale: ScaleRange::new(0.9, 1.1),
            lighthouse_scale: ScaleRange::fixed(1.0),
            wreck_scale: ScaleRange::new(0.8, 1.2),
        }
    }
}

/// Standalone features of one type scattered around the world center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterRule {
    pub kind: FeatureType,
    pub count: u32,
    pub distance: DistanceBand,
    pub scale: ScaleRange,
}

impl ScatterRule {
    pub fn new(kind: FeatureType, count: u32, distance: DistanceBand, scale: ScaleRange) -> Self {
        Self {
            kind,
            count,
            distance,
            scale,
        }
    }
}

fn default_scatter() -> Vec<ScatterRule> {
    use FeatureType::*;
    vec![
        ScatterRule::new(Tropical, 6, DistanceBand::new(200.0, 900.0), ScaleRange::new(0.8, 1.5)),
        ScatterRule::new(Mountain, 3, DistanceBand::new(300.0, 900.0), ScaleRange::new(0.9, 1.4)),
        ScatterRule::new(Rocks, 12, DistanceBand::new(120.0, 950.0), ScaleRange::new(0.7, 1.6)),
        ScatterRule::new(Shipwreck, 4, DistanceBand::new(150.0, 900.0), ScaleRange::new(0.8, 1.2)),
        ScatterRule::new(Volcanic, 2, DistanceBand::new(400.0, 900.0), ScaleRange::new(1.0, 1.5)),
        ScatterRule::new(Atoll, 3, DistanceBand::new(250.0, 900.0), ScaleRange::new(0.8, 1.2)),
        ScatterRule::new(Ice, 2, DistanceBand::new(600.0, 950.0), ScaleRange::new(0.8, 1.3)),
        ScatterRule::new(Lighthouse, 2, DistanceBand::new(200.0, 800.0), ScaleRange::fixed(1.0)),
    ]
}

/// Full world tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub density: DensityPreset,

    // === World ===
    /// Features stay inside this disk
    pub world_radius: f32,
    /// Agent spawn point
    pub spawn_point: Vec2,
    /// No-placement disk around the spawn point
    pub protected_radius: f32,

    // === Placement ===
    /// Minimum gap between placed features
    pub padding: f32,
    /// Random draws per feature before giving up on it
    pub max_attempts: u32,

    // === Collision ===
    /// Added to feature radius on point queries
    pub collision_margin: f32,
    pub tie_break: TieBreak,
    /// Per-type base radius replacements
    pub radius_overrides: HashMap<FeatureType, f32>,

    // === Stages ===
    pub arenas: ArenaSettings,
    pub archipelagos: ArchipelagoSettings,
    pub routes: RouteSettings,
    pub scatter: Vec<ScatterRule>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            density: DensityPreset::Normal,

            world_radius: WORLD_RADIUS,
            spawn_point: Vec2::ZERO,
            protected_radius: PROTECTED_RADIUS,

            padding: PLACEMENT_PADDING,
            max_attempts: MAX_PLACEMENT_ATTEMPTS,

            collision_margin: COLLISION_MARGIN,
            tie_break: TieBreak::default(),
            radius_overrides: HashMap::new(),

            arenas: ArenaSettings::default(),
            archipelagos: ArchipelagoSettings::default(),
            routes: RouteSettings::default(),
            scatter: default_scatter(),
        }
    }
}

impl WorldSettings {
    /// Create settings from a density preset (everything else default)
    pub fn from_preset(preset: DensityPreset) -> Self {
        Self {
            density: preset,
            ..Self::default()
        }
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded world settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Requested count after the density multiplier
    pub fn scaled_count(&self, count: u32) -> u32 {
        (count as f32 * self.density.count_multiplier()).round() as u32
    }

    /// Catalog with this world's radius overrides applied
    pub fn catalog(&self) -> FeatureCatalog {
        FeatureCatalog::with_overrides(&self.radius_overrides)
    }

    /// Collision query over `registry` using this world's margin and tie-break
    pub fn collision_query(&self, registry: Arc<FeatureRegistry>) -> CollisionQuery {
        CollisionQuery::new(registry, Arc::new(self.catalog()))
            .with_margin(self.collision_margin)
            .with_tie_break(self.tie_break)
    }

    /// Check every range; generation assumes a validated config
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.world_radius.is_finite() || self.world_radius <= 0.0 {
            return Err(SettingsError::invalid("world_radius", "must be positive"));
        }
        if !self.spawn_point.is_finite() {
            return Err(SettingsError::invalid("spawn_point", "must be finite"));
        }
        if !self.protected_radius.is_finite() || self.protected_radius < 0.0 {
            return Err(SettingsError::invalid("protected_radius", "must be non-negative"));
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(SettingsError::invalid("padding", "must be non-negative"));
        }
        if !self.collision_margin.is_finite() || self.collision_margin < 0.0 {
            return Err(SettingsError::invalid("collision_margin", "must be non-negative"));
        }
        if self.max_attempts == 0 {
            return Err(SettingsError::invalid("max_attempts", "must be at least 1"));
        }
        for (kind, radius) in &self.radius_overrides {
            if !radius.is_finite() || *radius <= 0.0 {
                return Err(SettingsError::invalid(
                    "radius_overrides",
                    format!("radius for '{kind}' must be positive"),
                ));
            }
        }

        let arenas = &self.arenas;
        if !(0.0..360.0).contains(&arenas.gap_degrees) {
            return Err(SettingsError::invalid("arenas.gap_degrees", "must be in [0, 360)"));
        }
        if arenas.radius <= 0.0 || arenas.radius_jitter < 0.0 || arenas.radius_jitter >= arenas.radius {
            return Err(SettingsError::invalid(
                "arenas.radius",
                "radius must be positive and larger than its jitter",
            ));
        }
        arenas.center_distance.validate("arenas.center_distance")?;
        arenas.rock_scale.validate("arenas.rock_scale")?;

        let archipelagos = &self.archipelagos;
        if archipelagos.radius < 0.0 {
            return Err(SettingsError::invalid("archipelagos.radius", "must be non-negative"));
        }
        if archipelagos.count > 0 && archipelagos.island_types.is_empty() {
            return Err(SettingsError::invalid("archipelagos.island_types", "needs at least one type"));
        }
        if let Some(kind) = archipelagos.island_types.iter().find(|kind| !kind.is_island()) {
            return Err(SettingsError::invalid(
                "archipelagos.island_types",
                format!("'{kind}' is not an island type"),
            ));
        }
        archipelagos.center_distance.validate("archipelagos.center_distance")?;
        archipelagos.island_scale.validate("archipelagos.island_scale")?;

        let routes = &self.routes;
        if !(0.0..=1.0).contains(&routes.wreck_chance) {
            return Err(SettingsError::invalid("routes.wreck_chance", "must be in [0, 1]"));
        }
        if routes.min_length < 0.0 || routes.port_offset < 0.0 || routes.lighthouse_offset < 0.0 {
            return Err(SettingsError::invalid("routes", "lengths and offsets must be non-negative"));
        }
        routes.endpoint_distance.validate("routes.endpoint_distance")?;
        routes.port_scale.validate("routes.port_scale")?;
        routes.lighthouse_scale.validate("routes.lighthouse_scale")?;
        routes.wreck_scale.validate("routes.wreck_scale")?;

        for rule in &self.scatter {
            rule.distance.validate("scatter.distance")?;
            rule.scale.validate("scatter.scale")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        WorldSettings::default().validate().unwrap();
        for preset in [DensityPreset::Sparse, DensityPreset::Normal, DensityPreset::Dense] {
            WorldSettings::from_preset(preset).validate().unwrap();
        }
    }

    #[test]
    fn test_density_scales_counts() {
        assert_eq!(WorldSettings::from_preset(DensityPreset::Sparse).scaled_count(12), 6);
        assert_eq!(WorldSettings::from_preset(DensityPreset::Normal).scaled_count(12), 12);
        assert_eq!(WorldSettings::from_preset(DensityPreset::Dense).scaled_count(12), 18);
        assert_eq!(DensityPreset::from_str("HIGH"), Some(DensityPreset::Dense));
        assert_eq!(DensityPreset::from_str("extreme"), None);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = WorldSettings::from_json(
            r#"{ "density": "dense", "protected_radius": 120.0, "tie_break": "first_registered",
                 "radius_overrides": { "rocks": 6.0 }, "arenas": { "count": 0 } }"#,
        )
        .unwrap();
        assert_eq!(settings.density, DensityPreset::Dense);
        assert_eq!(settings.protected_radius, 120.0);
        assert_eq!(settings.tie_break, TieBreak::FirstRegistered);
        assert_eq!(settings.arenas.count, 0);
        assert_eq!(settings.arenas.rock_count, ArenaSettings::default().rock_count);
        assert_eq!(settings.world_radius, WORLD_RADIUS);
        assert_eq!(settings.catalog().base_radius(FeatureType::Rocks), 6.0);
    }

    #[test]
    fn test_json_roundtrip_keeps_scatter() {
        let settings = WorldSettings::default();
        let json = settings.to_json().unwrap();
        let back = WorldSettings::from_json(&json).unwrap();
        assert_eq!(back.scatter.len(), settings.scatter.len());
        assert_eq!(back.scatter[2].kind, FeatureType::Rocks);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = WorldSettings::from_json(r#"{ "max_attempts": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "max_attempts", .. }));

        let err = WorldSettings::from_json(r#"{ "routes": { "wreck_chance": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "routes.wreck_chance", .. }));

        let mut settings = WorldSettings::default();
        settings.arenas.rock_scale = ScaleRange::new(2.0, 1.0);
        assert!(settings.validate().is_err());

        let err = WorldSettings::from_json(r#"{ "archipelagos": { "island_types": ["atoll", "lighthouse"] } }"#)
            .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "archipelagos.island_types", .. }));

        let err = WorldSettings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = WorldSettings::load("/nonexistent/shoalwatch/world.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    #[test]
    fn test_collision_query_uses_settings() {
        let mut settings = WorldSettings::default();
        settings.collision_margin = 0.5;
        settings.tie_break = TieBreak::FirstRegistered;
        let query = settings.collision_query(Arc::new(FeatureRegistry::new()));
        assert_eq!(query.margin(), 0.5);
        assert_eq!(query.tie_break(), TieBreak::FirstRegistered);
    }
}
