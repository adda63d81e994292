//! Startup constants. Fixed for the lifetime of a session.

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;
use crate::persistence::BlobStore;

/// Storage key holding an optional JSON override of [`GameConfig`].
pub const CONFIG_KEY: &str = "geocache_config";

/// Largest generation radius accepted from an override, in cells.
pub const MAX_NEIGHBORHOOD_RADIUS: i32 = 64;
/// Smallest tile accepted from an override. Keeps every cell index of the
/// globe inside `i32`.
pub const MIN_TILE_DEGREES: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Edge length of a grid cell, in degrees.
    pub tile_degrees: f64,
    /// Caches are generated this many cells around the player.
    pub neighborhood_radius: i32,
    /// Chance that any given cell holds a cache.
    pub spawn_probability: f64,
    /// Caches farther than this from the player are hidden, in metres.
    pub visibility_radius_m: f64,
    pub start: LatLng,
    /// Storage key of the saved game.
    pub storage_key: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_degrees: 1e-4,
            neighborhood_radius: 8,
            spawn_probability: 0.1,
            visibility_radius_m: 90.0,
            start: LatLng::new(36.98949379578401, -122.06277128548504),
            storage_key: "geocache_state".to_string(),
        }
    }
}

impl GameConfig {
    /// Defaults, overlaid with whatever valid override is stored.
    pub fn load(store: &dyn BlobStore) -> Self {
        let raw = match store.get_blob(CONFIG_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(err) => {
                log::warn!("config override unreadable: {err}");
                return Self::default();
            }
        };
        match serde_json::from_str::<GameConfig>(&raw) {
            Ok(cfg) => cfg.validated(),
            Err(err) => {
                log::warn!("ignoring malformed config override: {err}");
                Self::default()
            }
        }
    }

    /// Replace out-of-range values with their defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.tile_degrees.is_finite() && self.tile_degrees >= MIN_TILE_DEGREES) {
            log::warn!("tile_degrees {} out of range, using default", self.tile_degrees);
            self.tile_degrees = defaults.tile_degrees;
        }
        if !(0..=MAX_NEIGHBORHOOD_RADIUS).contains(&self.neighborhood_radius) {
            log::warn!("neighborhood_radius {} out of range, using default", self.neighborhood_radius);
            self.neighborhood_radius = defaults.neighborhood_radius;
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            log::warn!("spawn_probability {} out of range, using default", self.spawn_probability);
            self.spawn_probability = defaults.spawn_probability;
        }
        if !(self.visibility_radius_m.is_finite() && self.visibility_radius_m > 0.0) {
            log::warn!("visibility_radius_m {} out of range, using default", self.visibility_radius_m);
            self.visibility_radius_m = defaults.visibility_radius_m;
        }
        if self.storage_key.is_empty() {
            self.storage_key = defaults.storage_key;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn defaults_without_override() {
        let store = MemoryStore::default();
        assert_eq!(GameConfig::load(&store), GameConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let store = MemoryStore::default();
        store
            .set_blob(CONFIG_KEY, r#"{"spawn_probability": 0.25, "neighborhood_radius": 3}"#)
            .unwrap();
        let cfg = GameConfig::load(&store);
        assert_eq!(cfg.spawn_probability, 0.25);
        assert_eq!(cfg.neighborhood_radius, 3);
        assert_eq!(cfg.tile_degrees, 1e-4);
    }

    #[test]
    fn malformed_override_ignored() {
        let store = MemoryStore::default();
        store.set_blob(CONFIG_KEY, "{not json").unwrap();
        assert_eq!(GameConfig::load(&store), GameConfig::default());
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = GameConfig {
            tile_degrees: -1.0,
            spawn_probability: 3.0,
            visibility_radius_m: 0.0,
            neighborhood_radius: -2,
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn oversized_override_is_clamped() {
        let store = MemoryStore::default();
        store
            .set_blob(CONFIG_KEY, r#"{"neighborhood_radius": 40000, "tile_degrees": 1e-9}"#)
            .unwrap();
        let cfg = GameConfig::load(&store);
        assert_eq!(cfg.neighborhood_radius, GameConfig::default().neighborhood_radius);
        assert_eq!(cfg.tile_degrees, GameConfig::default().tile_degrees);
    }

    #[test]
    fn bounds_themselves_are_accepted() {
        let cfg = GameConfig {
            tile_degrees: MIN_TILE_DEGREES,
            neighborhood_radius: MAX_NEIGHBORHOOD_RADIUS,
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(cfg.tile_degrees, MIN_TILE_DEGREES);
        assert_eq!(cfg.neighborhood_radius, MAX_NEIGHBORHOOD_RADIUS);
    }
}
