//! Feature types and their collision radii
//!
//! Radii are tuning constants, not derived from mesh geometry. Whatever the
//! table says, a feature's effective radius is always `base_radius * scale`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_BASE_RADIUS;

/// Environment feature types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    Tropical,
    Mountain,
    Rocks,
    Shipwreck,
    Port,
    Lighthouse,
    Volcanic,
    Atoll,
    Ice,
    /// Any type the catalog does not know (radius falls back to the default).
    /// A deserialized `Feature` keeps the original name.
    #[serde(other)]
    Unknown,
}

impl FeatureType {
    /// Every known type, in catalog order
    pub const KNOWN: [FeatureType; 9] = [
        FeatureType::Tropical,
        FeatureType::Mountain,
        FeatureType::Rocks,
        FeatureType::Shipwreck,
        FeatureType::Port,
        FeatureType::Lighthouse,
        FeatureType::Volcanic,
        FeatureType::Atoll,
        FeatureType::Ice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Tropical => "tropical",
            FeatureType::Mountain => "mountain",
            FeatureType::Rocks => "rocks",
            FeatureType::Shipwreck => "shipwreck",
            FeatureType::Port => "port",
            FeatureType::Lighthouse => "lighthouse",
            FeatureType::Volcanic => "volcanic",
            FeatureType::Atoll => "atoll",
            FeatureType::Ice => "ice",
            FeatureType::Unknown => "unknown",
        }
    }

    /// Parse a type name; unrecognized names map to `Unknown`
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "tropical" => FeatureType::Tropical,
            "mountain" | "mountainous" => FeatureType::Mountain,
            "rocks" | "rock" => FeatureType::Rocks,
            "shipwreck" | "wreck" => FeatureType::Shipwreck,
            "port" => FeatureType::Port,
            "lighthouse" => FeatureType::Lighthouse,
            "volcanic" => FeatureType::Volcanic,
            "atoll" => FeatureType::Atoll,
            "ice" => FeatureType::Ice,
            _ => FeatureType::Unknown,
        }
    }

    /// Built-in base collision radius (None for `Unknown`)
    pub fn default_base_radius(&self) -> Option<f32> {
        match self {
            FeatureType::Tropical => Some(20.0),
            FeatureType::Mountain => Some(25.0),
            FeatureType::Rocks => Some(5.0),
            FeatureType::Shipwreck => Some(8.0),
            FeatureType::Port => Some(15.0),
            FeatureType::Lighthouse => Some(6.0),
            FeatureType::Volcanic => Some(22.0),
            FeatureType::Atoll => Some(18.0),
            FeatureType::Ice => Some(12.0),
            FeatureType::Unknown => None,
        }
    }

    /// Islands that can form an archipelago
    pub fn is_island(&self) -> bool {
        matches!(
            self,
            FeatureType::Tropical
                | FeatureType::Mountain
                | FeatureType::Volcanic
                | FeatureType::Atoll
                | FeatureType::Ice
        )
    }
}

impl std::fmt::Display for FeatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base radius lookup table
#[derive(Debug, Clone)]
pub struct FeatureCatalog {
    radii: HashMap<FeatureType, f32>,
    fallback: f32,
}

impl Default for FeatureCatalog {
    fn default() -> Self {
        let radii = FeatureType::KNOWN
            .iter()
            .filter_map(|kind| kind.default_base_radius().map(|r| (*kind, r)))
            .collect();
        Self {
            radii,
            fallback: DEFAULT_BASE_RADIUS,
        }
    }
}

impl FeatureCatalog {
    /// Built-in table with per-type overrides applied on top
    pub fn with_overrides(overrides: &HashMap<FeatureType, f32>) -> Self {
        let mut catalog = Self::default();
        for (kind, radius) in overrides {
            catalog.set_base_radius(*kind, *radius);
        }
        catalog
    }

    /// Register or replace a type's base radius
    pub fn set_base_radius(&mut self, kind: FeatureType, radius: f32) {
        self.radii.insert(kind, radius);
    }

    /// Base collision radius for a type. Never fails: unknown types log a
    /// warning and get the fallback radius.
    pub fn base_radius(&self, kind: FeatureType) -> f32 {
        match self.radii.get(&kind) {
            Some(r) => *r,
            None => {
                log::warn!(
                    "No collision radius for feature type '{}', using default {}",
                    kind,
                    self.fallback
                );
                self.fallback
            }
        }
    }

    /// `base_radius(kind) * scale`
    #[inline]
    pub fn effective_radius(&self, kind: FeatureType, scale: f32) -> f32 {
        self.base_radius(kind) * scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::{Mutex, OnceLock};
    use std::thread::{self, ThreadId};

    /// Records every log line with the thread that emitted it
    struct CaptureLogger {
        records: Mutex<Vec<(ThreadId, log::Level, String)>>,
    }

    impl log::Log for CaptureLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            let line = (thread::current().id(), record.level(), record.args().to_string());
            self.records.lock().unwrap_or_else(|e| e.into_inner()).push(line);
        }

        fn flush(&self) {}
    }

    fn capture_logger() -> &'static CaptureLogger {
        static LOGGER: OnceLock<CaptureLogger> = OnceLock::new();
        LOGGER.get_or_init(|| CaptureLogger {
            records: Mutex::new(Vec::new()),
        })
    }

    /// Log lines emitted on this thread while running `f`
    fn logs_during(f: impl FnOnce()) -> Vec<(log::Level, String)> {
        static INSTALL: OnceLock<()> = OnceLock::new();
        let logger = capture_logger();
        INSTALL.get_or_init(|| {
            log::set_logger(logger).expect("no other logger in unit tests");
            log::set_max_level(log::LevelFilter::Trace);
        });

        let me = thread::current().id();
        let start = logger.records.lock().unwrap().len();
        f();
        logger.records.lock().unwrap()[start..]
            .iter()
            .filter(|(id, _, _)| *id == me)
            .map(|(_, level, line)| (*level, line.clone()))
            .collect()
    }

    #[test]
    fn test_known_types_have_radii() {
        let catalog = FeatureCatalog::default();
        for kind in FeatureType::KNOWN {
            assert!(catalog.base_radius(kind) > 0.0, "{kind} has no radius");
        }
        assert_eq!(catalog.base_radius(FeatureType::Rocks), 5.0);
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let catalog = FeatureCatalog::default();
        assert_eq!(catalog.base_radius(FeatureType::Unknown), DEFAULT_BASE_RADIUS);
        assert_eq!(catalog.effective_radius(FeatureType::Unknown, 2.0), 2.0 * DEFAULT_BASE_RADIUS);
    }

    #[test]
    fn test_unknown_type_logs_warning() {
        let catalog = FeatureCatalog::default();
        let logs = logs_during(|| {
            catalog.base_radius(FeatureType::Unknown);
        });
        assert!(
            logs.iter()
                .any(|(level, line)| *level == log::Level::Warn && line.contains("No collision radius")),
            "expected a warning, got {logs:?}"
        );
    }

    #[test]
    fn test_known_type_logs_nothing() {
        let catalog = FeatureCatalog::default();
        let logs = logs_during(|| {
            catalog.base_radius(FeatureType::Port);
        });
        assert!(logs.is_empty(), "unexpected log lines {logs:?}");
    }

    #[test]
    fn test_overrides_replace_table_entries() {
        let mut overrides = HashMap::new();
        overrides.insert(FeatureType::Rocks, 7.5);
        overrides.insert(FeatureType::Unknown, 3.0);
        let catalog = FeatureCatalog::with_overrides(&overrides);
        assert_eq!(catalog.base_radius(FeatureType::Rocks), 7.5);
        assert_eq!(catalog.base_radius(FeatureType::Unknown), 3.0);
        assert_eq!(catalog.base_radius(FeatureType::Port), 15.0);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(FeatureType::from_name("Lighthouse"), FeatureType::Lighthouse);
        assert_eq!(FeatureType::from_name(" wreck "), FeatureType::Shipwreck);
        assert_eq!(FeatureType::from_name("kraken"), FeatureType::Unknown);
        for kind in FeatureType::KNOWN {
            assert_eq!(FeatureType::from_name(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_serde_unknown_name() {
        let kind: FeatureType = serde_json::from_str("\"kraken\"").unwrap();
        assert_eq!(kind, FeatureType::Unknown);
        let kind: FeatureType = serde_json::from_str("\"atoll\"").unwrap();
        assert_eq!(kind, FeatureType::Atoll);
    }

    proptest! {
        #[test]
        fn prop_radius_strictly_increasing_in_scale(
            idx in 0usize..FeatureType::KNOWN.len(),
            a in 0.01f32..50.0,
            delta in 0.01f32..50.0,
        ) {
            let catalog = FeatureCatalog::default();
            let kind = FeatureType::KNOWN[idx];
            prop_assert!(catalog.effective_radius(kind, a) < catalog.effective_radius(kind, a + delta));
        }
    }
}
