//! Proximity lookup of archived sessions.

mod index;
mod repository;

pub use index::{ProximityHit, ProximityIndex};
pub use repository::{GeoEntry, GeoIndex};
