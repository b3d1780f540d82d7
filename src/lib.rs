//! Shoalwatch - obstacle collision and world placement for a top-down naval arena
//!
//! Core modules:
//! - `sim`: Deterministic collision and placement (geometry, catalog, registry, resolver, generator)
//! - `settings`: Data-driven world tuning, loadable from JSON
//! - `error`: Errors for the settings surface (the simulation itself never fails)
//!
//! World-plane coordinates travel as `glam::Vec2` where `x` is world X and
//! `y` is world Z. Height is never part of collision.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SettingsError;
pub use settings::{DensityPreset, WorldSettings};

use glam::Vec2;

/// World configuration constants
pub mod consts {
    /// Extra distance added to a feature's radius for point queries
    pub const COLLISION_MARGIN: f32 = 2.0;
    /// Minimum gap between two placed features' collision circles
    pub const PLACEMENT_PADDING: f32 = 2.0;
    /// Base radius used for feature types missing from the catalog
    pub const DEFAULT_BASE_RADIUS: f32 = 10.0;

    /// Speed kept when an agent slides along an obstacle
    pub const DEFLECT_DAMPING: f32 = 0.8;
    /// Random draws per feature before it is dropped
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 30;

    /// World disk radius (features never leave it)
    pub const WORLD_RADIUS: f32 = 1000.0;
    /// No-placement disk around the spawn point
    pub const PROTECTED_RADIUS: f32 = 80.0;

    /// Ship defaults
    pub const SHIP_RADIUS: f32 = 6.0;
    pub const SHIP_SAFETY_MARGIN: f32 = 1.0;
    /// Cannonball radius
    pub const PROJECTILE_RADIUS: f32 = 0.5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian plane coordinates (x, z)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Install the platform log backend (console on web, env_logger natively).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = console_log::init_with_level(log::Level::Info);
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = env_logger::try_init();
    }
}
