//! Spatial session domain module.
//!
//! # Module Structure
//!
//! - `model`: Poses, shapes, colors and placed objects
//! - `stroke_log`: Undo-capable log of stroke batches (`StrokeLog`)
//! - `tracker`: World-tracking capability trait (`WorldTracker`)
//! - `session`: Live session driving per-tick placement (`SpatialSession`)

mod model;
mod session;
mod stroke_log;
mod tracker;

pub use model::{Orientation, PlacedObject, Pose, Rgba, ShapeGeometry, ShapeKind, Vec3};
pub use session::{PlacementMode, PlacementParams, SpatialSession, TickOutcome, TrackingState};
pub use stroke_log::{StrokeBatch, StrokeLog};
pub use tracker::{SerializedMap, TrackingOptions, WorldTracker};
