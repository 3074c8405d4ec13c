use crate::geo::GeoCoordinate;

/// Device location capability.
pub trait LocationProvider: Send + Sync {
    /// Latest known coordinate, or `None` while location is unavailable.
    fn current_coordinate(&self) -> Option<GeoCoordinate>;
}

/// A provider that always reports the same coordinate.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Option<GeoCoordinate>);

impl LocationProvider for FixedLocation {
    fn current_coordinate(&self) -> Option<GeoCoordinate> {
        self.0
    }
}
