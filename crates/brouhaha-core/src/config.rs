use serde::{Deserialize, Serialize};

use crate::geo::miles_to_meters;

/// Default proximity radius used when entering the AR view.
pub const DEFAULT_SEARCH_RADIUS_MILES: f64 = 0.1;

/// Largest world map artifact accepted on download (3 MiB).
pub const DEFAULT_MAX_MAP_BYTES: u64 = 3 * 1024 * 1024;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ArConfig {
    /// Radius of the nearby-session lookup, in miles.
    pub search_radius_miles: f64,
    /// Download size bound for archived world maps.
    pub max_map_bytes: u64,
    /// Distance in front of the camera at which objects are placed, in meters.
    pub placement_offset_m: f32,
    /// Slider width is divided by this to get the object size in meters.
    pub width_divisor: f32,
    /// Slider width selected when a session starts.
    pub default_width: f32,
}

impl Default for ArConfig {
    fn default() -> Self {
        Self {
            search_radius_miles: DEFAULT_SEARCH_RADIUS_MILES,
            max_map_bytes: DEFAULT_MAX_MAP_BYTES,
            placement_offset_m: 1.0,
            width_divisor: 200.0,
            default_width: 3.0,
        }
    }
}

impl ArConfig {
    pub fn search_radius_meters(&self) -> f64 {
        miles_to_meters(self.search_radius_miles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ArConfig = toml::from_str("search_radius_miles = 0.5").unwrap();
        assert_eq!(config.search_radius_miles, 0.5);
        assert_eq!(config.max_map_bytes, DEFAULT_MAX_MAP_BYTES);
        assert_eq!(config.width_divisor, 200.0);
    }

    #[test]
    fn test_search_radius_meters() {
        let config = ArConfig::default();
        assert!((config.search_radius_meters() - 160.934).abs() < 1e-9);
    }
}
