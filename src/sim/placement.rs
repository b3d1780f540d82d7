//! Procedural feature placement
//!
//! One pass, four stages, in order: arenas, archipelagos, shipping routes,
//! standalone scatter. Every candidate is tested against everything placed so
//! far (across stages), the protected zone around the spawn point, and the
//! world boundary. A candidate that cannot find a slot within the attempt
//! budget is dropped; generation itself never fails.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::arc::ArcSegment;
use super::catalog::{FeatureCatalog, FeatureType};
use super::feature::Feature;
use super::geometry::{circles_overlap, distance};
use crate::polar_to_cartesian;
use crate::settings::{DistanceBand, ScaleRange, WorldSettings};

/// Generation stages, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Arenas,
    Archipelagos,
    Routes,
    Scatter,
}

/// Why a candidate position was turned down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Footprint reaches into the no-placement disk around the spawn point
    ProtectedZone,
    /// Footprint leaves the world disk
    OutOfBounds,
    /// Too close to an already placed feature
    Overlap { with: String },
}

/// Requested vs placed counts for one stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub requested: u32,
    pub placed: u32,
}

impl StageReport {
    pub fn dropped(&self) -> u32 {
        self.requested.saturating_sub(self.placed)
    }
}

/// Summary of a generation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlacementReport {
    pub seed: u64,
    pub arenas: StageReport,
    pub archipelagos: StageReport,
    pub routes: StageReport,
    pub scatter: StageReport,
    pub rejected_protected: u32,
    pub rejected_out_of_bounds: u32,
    pub rejected_overlap: u32,
}

impl PlacementReport {
    pub fn stage(&self, stage: Stage) -> &StageReport {
        match stage {
            Stage::Arenas => &self.arenas,
            Stage::Archipelagos => &self.archipelagos,
            Stage::Routes => &self.routes,
            Stage::Scatter => &self.scatter,
        }
    }

    fn stage_mut(&mut self, stage: Stage) -> &mut StageReport {
        match stage {
            Stage::Arenas => &mut self.arenas,
            Stage::Archipelagos => &mut self.archipelagos,
            Stage::Routes => &mut self.routes,
            Stage::Scatter => &mut self.scatter,
        }
    }

    fn record(&mut self, rejection: &Rejection) {
        match rejection {
            Rejection::ProtectedZone => self.rejected_protected += 1,
            Rejection::OutOfBounds => self.rejected_out_of_bounds += 1,
            Rejection::Overlap { .. } => self.rejected_overlap += 1,
        }
    }

    pub fn total_requested(&self) -> u32 {
        self.arenas.requested + self.archipelagos.requested + self.routes.requested + self.scatter.requested
    }

    pub fn total_placed(&self) -> u32 {
        self.arenas.placed + self.archipelagos.placed + self.routes.placed + self.scatter.placed
    }
}

/// Result of a generation pass
#[derive(Debug, Clone)]
pub struct Placement {
    pub features: Vec<Feature>,
    pub report: PlacementReport,
}

/// Overlap predicate shared by every stage
#[inline]
pub fn overlaps(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32, padding: f32) -> bool {
    circles_overlap(a, radius_a, b, radius_b, padding)
}

/// Uniform random point in a disk around the origin
fn random_in_disk<R: Rng>(rng: &mut R, radius: f32) -> Vec2 {
    let r = radius * rng.random::<f32>().sqrt();
    polar_to_cartesian(r, rng.random_range(0.0..TAU))
}

/// Random point at a banded distance from the world center
fn random_in_band<R: Rng>(rng: &mut R, band: &DistanceBand) -> Vec2 {
    polar_to_cartesian(band.sample(rng), rng.random_range(0.0..TAU))
}

/// Builds a non-overlapping feature set
pub struct PlacementGenerator<R: Rng> {
    settings: WorldSettings,
    catalog: FeatureCatalog,
    rng: R,
    seed: u64,
    placed: Vec<Feature>,
    /// Effective radius of `placed[i]`
    radii: Vec<f32>,
    next_id: u32,
    report: PlacementReport,
}

impl PlacementGenerator<Pcg32> {
    /// Reproducible generator
    pub fn seeded(settings: WorldSettings, seed: u64) -> Self {
        Self::new(settings, Pcg32::seed_from_u64(seed), seed)
    }
}

impl<R: Rng> PlacementGenerator<R> {
    /// `seed` only prefixes feature ids and tags the report; randomness comes from `rng`
    pub fn new(settings: WorldSettings, rng: R, seed: u64) -> Self {
        let catalog = settings.catalog();
        Self {
            settings,
            catalog,
            rng,
            seed,
            placed: Vec::new(),
            radii: Vec::new(),
            next_id: 1,
            report: PlacementReport {
                seed,
                ..Default::default()
            },
        }
    }

    /// Features placed so far
    pub fn placed(&self) -> &[Feature] {
        &self.placed
    }

    /// Run all four stages and hand back the features
    pub fn generate(mut self) -> Placement {
        self.place_arenas();
        self.place_archipelagos();
        self.place_routes();
        self.place_scatter();

        let report = self.report;
        log::info!(
            "Environment {:016x}: placed {}/{} features (arenas {}/{}, archipelagos {}/{}, routes {}/{}, scatter {}/{})",
            report.seed,
            report.total_placed(),
            report.total_requested(),
            report.arenas.placed,
            report.arenas.requested,
            report.archipelagos.placed,
            report.archipelagos.requested,
            report.routes.placed,
            report.routes.requested,
            report.scatter.placed,
            report.scatter.requested,
        );
        log::info!(
            "Rejected draws: {} protected zone, {} out of bounds, {} overlap",
            report.rejected_protected,
            report.rejected_out_of_bounds,
            report.rejected_overlap
        );

        Placement {
            features: self.placed,
            report,
        }
    }

    /// Test a candidate against the protected zone, world bounds and every
    /// placed feature
    pub fn check_candidate(&self, kind: FeatureType, position: Vec2, scale: f32) -> Result<(), Rejection> {
        self.check_footprint(position, self.catalog.effective_radius(kind, scale))
    }

    /// Place a specific feature if it fits (hand-authored landmarks)
    pub fn place_at(&mut self, kind: FeatureType, position: Vec2, scale: f32) -> Result<&Feature, Rejection> {
        let radius = self.catalog.effective_radius(kind, scale);
        self.check_footprint(position, radius)?;
        let rotation_y = self.rng.random_range(0.0..TAU);
        Ok(self.commit(kind, position, scale, rotation_y, radius))
    }

    fn check_footprint(&self, position: Vec2, radius: f32) -> Result<(), Rejection> {
        let settings = &self.settings;
        if distance(position, settings.spawn_point) < settings.protected_radius + radius {
            return Err(Rejection::ProtectedZone);
        }
        if position.length() + radius > settings.world_radius {
            return Err(Rejection::OutOfBounds);
        }
        let padding = settings.padding;
        if let Some(other) = self
            .placed
            .iter()
            .zip(&self.radii)
            .find(|(f, r)| overlaps(position, radius, f.position(), **r, padding))
        {
            return Err(Rejection::Overlap {
                with: other.0.id.clone(),
            });
        }
        Ok(())
    }

    fn commit(&mut self, kind: FeatureType, position: Vec2, scale: f32, rotation_y: f32, radius: f32) -> &Feature {
        let id = format!("{:016x}-{}-{}", self.seed, kind, self.next_id);
        self.next_id += 1;
        self.placed.push(Feature::new(id, kind, position, scale, rotation_y));
        self.radii.push(radius);
        &self.placed[self.placed.len() - 1]
    }

    /// Draw positions from `sample` until one fits or the attempt budget runs out
    fn try_place(
        &mut self,
        stage: Stage,
        kind: FeatureType,
        scale: ScaleRange,
        mut sample: impl FnMut(&mut R) -> Vec2,
    ) -> bool {
        let scale = scale.sample(&mut self.rng);
        let radius = self.catalog.effective_radius(kind, scale);
        self.report.stage_mut(stage).requested += 1;

        for _ in 0..self.settings.max_attempts {
            let position = sample(&mut self.rng);
            match self.check_footprint(position, radius) {
                Ok(()) => {
                    let rotation_y = self.rng.random_range(0.0..TAU);
                    self.commit(kind, position, scale, rotation_y, radius);
                    self.report.stage_mut(stage).placed += 1;
                    return true;
                }
                Err(rejection) => self.report.record(&rejection),
            }
        }

        log::debug!(
            "{:?}: dropped {} (scale {:.2}) after {} attempts",
            stage,
            kind,
            scale,
            self.settings.max_attempts
        );
        false
    }

    /// Count requested features that never got a chance (no anchor found)
    fn skip(&mut self, stage: Stage, count: u32) {
        self.report.stage_mut(stage).requested += count;
    }

    /// Pick an anchor point by rejection sampling
    fn find_anchor(&mut self, mut sample: impl FnMut(&mut R) -> Vec2, accept: impl Fn(Vec2) -> bool) -> Option<Vec2> {
        (0..self.settings.max_attempts)
            .map(|_| sample(&mut self.rng))
            .find(|p| accept(*p))
    }

    fn place_arenas(&mut self) {
        let arenas = self.settings.arenas.clone();
        let count = self.settings.scaled_count(arenas.count);
        let spawn = self.settings.spawn_point;
        let protected = self.settings.protected_radius;
        let world_radius = self.settings.world_radius;
        let padding = self.settings.padding;
        let reach = arenas.radius + arenas.radius_jitter;
        let mut centers: Vec<Vec2> = Vec::new();

        for index in 0..count {
            let taken = centers.clone();
            let center = self.find_anchor(
                |rng| random_in_band(rng, &arenas.center_distance),
                |c| {
                    distance(c, spawn) >= protected + reach
                        && c.length() + reach <= world_radius
                        && taken.iter().all(|o| distance(c, *o) >= 2.0 * reach + padding)
                },
            );
            let Some(center) = center else {
                log::debug!("Arena {}: no room for a ring, skipping", index);
                self.skip(Stage::Arenas, arenas.rock_count);
                continue;
            };
            centers.push(center);

            // Opening faces the world center
            let to_center = -center;
            let facing = to_center.y.atan2(to_center.x);
            let ring = ArcSegment::with_gap(
                arenas.radius,
                arenas.radius_jitter,
                facing,
                arenas.gap_degrees.to_radians(),
            );
            let jitter = ring.jitter;

            for theta in ring.step_angles(arenas.rock_count as usize) {
                self.try_place(Stage::Arenas, FeatureType::Rocks, arenas.rock_scale, |rng| {
                    ring.point_at(center, theta, rng.random_range(-jitter..=jitter))
                });
            }
        }
    }

    fn place_archipelagos(&mut self) {
        let archipelagos = self.settings.archipelagos.clone();
        if archipelagos.island_types.is_empty() {
            return;
        }
        let count = self.settings.scaled_count(archipelagos.count);
        let spawn = self.settings.spawn_point;
        let protected = self.settings.protected_radius;
        let world_radius = self.settings.world_radius;

        for index in 0..count {
            let kind = archipelagos.island_types[self.rng.random_range(0..archipelagos.island_types.len())];
            let center = self.find_anchor(
                |rng| random_in_band(rng, &archipelagos.center_distance),
                |c| distance(c, spawn) >= protected && c.length() <= world_radius,
            );
            let Some(center) = center else {
                log::debug!("Archipelago {}: no center found, skipping", index);
                self.skip(Stage::Archipelagos, archipelagos.island_count);
                continue;
            };

            for _ in 0..archipelagos.island_count {
                self.try_place(Stage::Archipelagos, kind, archipelagos.island_scale, |rng| {
                    center + random_in_disk(rng, archipelagos.radius)
                });
            }
        }
    }

    fn place_routes(&mut self) {
        let routes = self.settings.routes.clone();
        let count = self.settings.scaled_count(routes.count);

        for index in 0..count {
            let start = random_in_band(&mut self.rng, &routes.endpoint_distance);
            // Second endpoint must be far enough from the first
            let end = self.find_anchor(
                |rng| random_in_band(rng, &routes.endpoint_distance),
                |p| distance(p, start) >= routes.min_length,
            );
            let Some(end) = end else {
                log::debug!("Route {}: no endpoint pair {} apart, skipping", index, routes.min_length);
                self.skip(Stage::Routes, 4);
                continue;
            };

            for endpoint in [start, end] {
                self.try_place(Stage::Routes, FeatureType::Port, routes.port_scale, |rng| {
                    endpoint + random_in_disk(rng, routes.port_offset)
                });
                self.try_place(Stage::Routes, FeatureType::Lighthouse, routes.lighthouse_scale, |rng| {
                    endpoint + random_in_disk(rng, routes.lighthouse_offset)
                });
            }

            if self.rng.random_bool(routes.wreck_chance) {
                let lane = end - start;
                let side = lane.perp().normalize_or_zero();
                let drift = routes.port_offset.max(1.0);
                self.try_place(Stage::Routes, FeatureType::Shipwreck, routes.wreck_scale, |rng| {
                    start + lane * rng.random_range(0.3f32..0.7) + side * rng.random_range(-drift..=drift)
                });
            }
        }
    }

    fn place_scatter(&mut self) {
        let rules = self.settings.scatter.clone();
        for rule in &rules {
            let count = self.settings.scaled_count(rule.count);
            for _ in 0..count {
                self.try_place(Stage::Scatter, rule.kind, rule.scale, |rng| {
                    random_in_band(rng, &rule.distance)
                });
            }
        }
    }
}

/// Generate a fresh world with an unseeded source; the drawn seed is logged so
/// the layout can be reproduced with [`generate_environment_seeded`].
pub fn generate_environment(settings: &WorldSettings) -> Vec<Feature> {
    let seed: u64 = rand::random();
    log::info!("Generating environment with seed {}", seed);
    generate_environment_seeded(settings, seed).features
}

/// Generate a world reproducibly from `seed`
pub fn generate_environment_seeded(settings: &WorldSettings, seed: u64) -> Placement {
    PlacementGenerator::seeded(settings.clone(), seed).generate()
}
