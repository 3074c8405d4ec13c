//! Core domain of Brouhaha AR sessions.
//!
//! Location-anchored "spray paint" sessions: placing shapes in a tracked
//! world, grouping them into undoable strokes, and finding previously saved
//! sessions near the device.

pub mod archive;
pub mod config;
pub mod error;
pub mod geo;
pub mod location;
pub mod proximity;
pub mod spatial;

// Re-export common error type
pub use error::ArError;
pub use geo::{GeoCoordinate, miles_to_meters};
