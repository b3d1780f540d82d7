//! Shoalwatch demo entry point
//!
//! Generates a world, prints it as JSON for the debug overlay, and sails a
//! sample ship through it.
//!
//! Usage: `shoalwatch [seed] [settings.json | sparse | normal | dense]`

use shoalwatch::{DensityPreset, WorldSettings};

/// Seed and world settings from the command line. A missing seed is drawn at
/// random; the second argument is a density preset name or a settings file.
#[cfg_attr(target_arch = "wasm32", allow(dead_code))]
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(u64, WorldSettings), String> {
    let seed = match args.next() {
        Some(arg) => arg.parse::<u64>().map_err(|e| format!("Invalid seed '{arg}': {e}"))?,
        None => rand::random(),
    };
    let settings = match args.next() {
        Some(arg) => match DensityPreset::from_str(&arg) {
            Some(preset) => WorldSettings::from_preset(preset),
            None => WorldSettings::load(&arg).map_err(|e| format!("Failed to load {arg}: {e}"))?,
        },
        None => WorldSettings::default(),
    };
    Ok((seed, settings))
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::sync::Arc;

    use glam::Vec3;
    use shoalwatch::consts::{PROJECTILE_RADIUS, SHIP_RADIUS};
    use shoalwatch::sim::{
        Agent, CollisionResolver, Contact, FeatureRegistry, MovePolicy, generate_environment_seeded,
        projectile_impact,
    };

    shoalwatch::init_logging();
    log::info!("Shoalwatch (native) starting...");

    let (seed, settings) = match parse_args(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };

    let placement = generate_environment_seeded(&settings, seed);
    let registry = Arc::new(FeatureRegistry::new());
    registry.set_features(placement.features.clone());

    let query = settings.collision_query(Arc::clone(&registry));
    let resolver = CollisionResolver::new(Arc::clone(query.catalog()));

    let dump = serde_json::json!({
        "seed": seed,
        "report": placement.report,
        "features": placement.features,
        "rings": query.debug_rings(),
    });
    match serde_json::to_string_pretty(&dump) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize world: {}", e),
    }

    // Sail east from the spawn point for 60 seconds at 30 Hz
    let spawn = settings.spawn_point;
    let mut ship = Agent::new(Vec3::new(spawn.x, 0.0, spawn.y), Vec3::new(12.0, 0.0, 3.0), SHIP_RADIUS);
    let dt = 1.0 / 30.0;
    let mut contacts = 0;
    for _ in 0..(60 * 30) {
        let step = resolver.step_agent(&query, ship, dt, MovePolicy::Deflect);
        if let Some(feature) = step.contact.feature() {
            contacts += 1;
            if matches!(step.contact, Contact::Escaped(_)) {
                log::warn!("Ship was inside {} and got pushed out", feature.id);
            }
        }
        ship.position = step.position;
        // Captain keeps the throttle open
        ship.velocity = if step.velocity.length_squared() > 0.0 {
            step.velocity
        } else {
            Vec3::new(12.0, 0.0, 3.0)
        };
    }
    log::info!(
        "Ship finished at ({:.1}, {:.1}) after {} obstacle contacts",
        ship.position.x,
        ship.position.z,
        contacts
    );

    let muzzle = ship.position + Vec3::Y;
    let target = muzzle + Vec3::new(-400.0, 0.0, 0.0);
    match projectile_impact(&query, muzzle, target, PROJECTILE_RADIUS) {
        Some(impact) => log::info!("Broadside struck {} at x={:.1}", impact.feature.id, impact.point.x),
        None => log::info!("Broadside splashed into open water"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web builds link the library directly
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_seed_and_preset() {
        let (seed, settings) = parse_args(args(&["42", "dense"])).unwrap();
        assert_eq!(seed, 42);
        assert_eq!(settings.density, DensityPreset::Dense);
    }

    #[test]
    fn test_parse_defaults() {
        let (_, settings) = parse_args(args(&[])).unwrap();
        assert_eq!(settings.density, DensityPreset::Normal);
    }

    #[test]
    fn test_parse_errors_are_returned() {
        let err = parse_args(args(&["not-a-seed"])).unwrap_err();
        assert!(err.starts_with("Invalid seed 'not-a-seed'"));

        let err = parse_args(args(&["7", "/nonexistent/shoalwatch/world.json"])).unwrap_err();
        assert!(err.starts_with("Failed to load /nonexistent/shoalwatch/world.json"));
    }
}
