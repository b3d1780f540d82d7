//! Active feature set
//!
//! One writer (world generation, again on restart), many readers (ship
//! movement, projectiles, debug overlay, minimap). Writes swap the whole
//! snapshot so a reader never sees a half-updated list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::feature::Feature;

/// Owned store of the currently placed features.
///
/// No validation happens here: callers other than the placement generator must
/// not insert overlapping features.
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    snapshot: RwLock<Arc<Vec<Feature>>>,
    generation: AtomicU64,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with `features`
    pub fn with_features(features: Vec<Feature>) -> Self {
        let registry = Self::new();
        registry.set_features(features);
        registry
    }

    /// Replace the full set in one swap
    pub fn set_features(&self, features: Vec<Feature>) {
        let next = Arc::new(features);
        let count = next.len();
        {
            let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
            *guard = next;
        }
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        log::debug!("Feature registry generation {}: {} features", generation, count);
    }

    /// Current snapshot (cheap: clones an `Arc`)
    pub fn features(&self) -> Arc<Vec<Feature>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop every feature
    pub fn clear(&self) {
        self.set_features(Vec::new());
    }

    pub fn len(&self) -> usize {
        self.features().len()
    }

    pub fn is_empty(&self) -> bool {
        self.features().is_empty()
    }

    /// Look up a feature by id
    pub fn find(&self, id: &str) -> Option<Feature> {
        self.features().iter().find(|f| f.id == id).cloned()
    }

    /// Number of `set_features` calls so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::FeatureType;
    use glam::Vec2;

    fn sample(n: usize) -> Vec<Feature> {
        (0..n)
            .map(|i| {
                Feature::new(
                    format!("f-{i}"),
                    FeatureType::Rocks,
                    Vec2::new(i as f32 * 20.0, 0.0),
                    1.0,
                    0.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_by_default() {
        let registry = FeatureRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.generation(), 0);
    }

    #[test]
    fn test_set_then_get_preserves_order() {
        let registry = FeatureRegistry::new();
        let features = sample(5);
        registry.set_features(features.clone());
        assert_eq!(*registry.features(), features);
        assert_eq!(registry.generation(), 1);
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let registry = FeatureRegistry::with_features(sample(5));
        let old = registry.features();
        registry.set_features(sample(2));

        // Old snapshot is untouched, new reads see the new set
        assert_eq!(old.len(), 5);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.generation(), 2);
    }

    #[test]
    fn test_find_and_clear() {
        let registry = FeatureRegistry::with_features(sample(3));
        assert_eq!(registry.find("f-1").map(|f| f.x), Some(20.0));
        assert!(registry.find("missing").is_none());
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let registry = Arc::new(FeatureRegistry::with_features(sample(4)));
        let writer = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for i in 0..50 {
                    registry.set_features(sample(if i % 2 == 0 { 8 } else { 4 }));
                }
            })
        };
        for _ in 0..200 {
            let len = registry.features().len();
            assert!(len == 4 || len == 8, "observed partial snapshot of {len}");
        }
        writer.join().unwrap();
    }
}
