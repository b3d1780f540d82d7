//! End-to-end: generate a world, register it, and sail through it

use std::sync::Arc;

use glam::{Vec2, Vec3};
use shoalwatch::WorldSettings;
use shoalwatch::consts::SHIP_RADIUS;
use shoalwatch::sim::{
    Agent, CollisionResolver, Contact, FeatureRegistry, MovePolicy, generate_environment_seeded,
};

fn world(seed: u64) -> (WorldSettings, Arc<FeatureRegistry>) {
    let settings = WorldSettings::default();
    let placement = generate_environment_seeded(&settings, seed);
    let registry = Arc::new(FeatureRegistry::new());
    registry.set_features(placement.features);
    (settings, registry)
}

#[test]
fn test_spawn_point_is_open_water() {
    let (settings, registry) = world(2024);
    let query = settings.collision_query(registry);
    assert!(
        query
            .check_point_collision(settings.spawn_point, SHIP_RADIUS)
            .is_none()
    );
}

#[test]
fn test_every_feature_collides_at_its_center() {
    let (settings, registry) = world(77);
    let query = settings.collision_query(Arc::clone(&registry));
    for feature in registry.features().iter() {
        let hit = query.check_point_collision(feature.position(), 0.0);
        assert_eq!(hit.map(|f| f.id), Some(feature.id.clone()));
    }
}

#[test]
fn test_ship_never_ends_a_step_inside_a_feature() {
    for policy in [MovePolicy::Deflect, MovePolicy::HardStop] {
        let (settings, registry) = world(31337);
        let query = settings.collision_query(registry);
        let resolver = CollisionResolver::new(Arc::clone(query.catalog()));

        // Fan out ships in every direction at speed
        for i in 0..16 {
            let heading = i as f32 / 16.0 * std::f32::consts::TAU;
            let velocity = Vec3::new(heading.cos(), 0.0, heading.sin()) * 40.0;
            let mut ship = Agent::new(Vec3::ZERO, velocity, SHIP_RADIUS);

            for _ in 0..600 {
                let step = resolver.step_agent(&query, ship, 1.0 / 30.0, policy);
                assert!(
                    !matches!(step.contact, Contact::Escaped(_)),
                    "{policy:?} ship {i} ended up inside a feature"
                );
                assert!(
                    query
                        .check_point_collision(Vec2::new(step.position.x, step.position.z), SHIP_RADIUS)
                        .is_none()
                );
                ship.position = step.position;
                if step.velocity != Vec3::ZERO {
                    ship.velocity = step.velocity;
                }
            }
        }
    }
}

#[test]
fn test_restart_swaps_world() {
    let (settings, registry) = world(1);
    let before = registry.features();
    let next = generate_environment_seeded(&settings, 2).features;
    registry.set_features(next.clone());

    assert_eq!(*registry.features(), next);
    assert_ne!(*before, next);
    assert_eq!(registry.generation(), 2);
}
