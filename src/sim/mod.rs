//! Deterministic collision and placement module
//!
//! Everything here is pure, synchronous game logic:
//! - Seeded RNG only (placement takes an injected `Rng`)
//! - Stable iteration order (registration order)
//! - No rendering, audio or platform dependencies
//!
//! Data flow: `PlacementGenerator` -> `FeatureRegistry` (swapped once per world)
//! -> `CollisionQuery` / `CollisionResolver` (every frame).

pub mod arc;
pub mod catalog;
pub mod collision;
pub mod feature;
pub mod geometry;
pub mod placement;
pub mod registry;
pub mod resolve;

pub use arc::ArcSegment;
pub use catalog::{FeatureCatalog, FeatureType};
pub use collision::{CollisionQuery, CollisionResult, DebugRing, TieBreak};
pub use feature::Feature;
pub use placement::{
    Placement, PlacementGenerator, PlacementReport, Rejection, Stage, StageReport,
    generate_environment, generate_environment_seeded, overlaps,
};
pub use registry::FeatureRegistry;
pub use resolve::{
    Agent, CollisionResolver, Contact, Impact, MovePolicy, StepResult, projectile_impact,
};
