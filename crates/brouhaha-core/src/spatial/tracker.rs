//! World-tracking capability consumed by [`SpatialSession`](super::SpatialSession).

use serde::{Deserialize, Serialize};

use super::model::Pose;
use crate::error::Result;

/// Exported bytes of a tracking session's discovered surfaces and anchors.
///
/// Opaque to the core; only the world tracker that produced it can import it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedMap(pub Vec<u8>);

impl SerializedMap {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Options applied when (re)starting world tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingOptions {
    pub detect_horizontal_planes: bool,
    /// Discard the previous tracking state and its anchors.
    pub reset_tracking: bool,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self {
            detect_horizontal_planes: true,
            reset_tracking: true,
        }
    }
}

/// Device world-tracking capability.
///
/// Calls are made from the single UI-bound control flow; implementations are
/// expected to return promptly.
pub trait WorldTracker {
    /// Resumable map type produced by [`WorldTracker::import_snapshot`].
    type Map;

    /// Starts (or restarts) tracking, optionally from a previously imported map.
    fn start(&mut self, resume_from: Option<Self::Map>, options: TrackingOptions) -> Result<()>;

    /// Current camera pose, or `None` while tracking is not established.
    fn current_pose(&self) -> Option<Pose>;

    /// Exports the current spatial map.
    fn export_snapshot(&self) -> Result<SerializedMap>;

    /// Decodes a previously exported map.
    fn import_snapshot(&self, snapshot: &SerializedMap) -> Result<Self::Map>;

    /// Suspends tracking, keeping state.
    fn pause(&mut self);

    /// Stops tracking.
    fn stop(&mut self);
}
