//! Live AR session: tracking lifecycle, placement mode and per-tick placement.

use super::model::{PlacedObject, Pose, Rgba, ShapeKind};
use super::stroke_log::StrokeLog;
use super::tracker::{SerializedMap, TrackingOptions, WorldTracker};
use crate::config::ArConfig;
use crate::error::{ArError, Result};

/// Tracking lifecycle of a [`SpatialSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    Stopped,
    Running,
    Paused,
}

/// What each tick does with the computed placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementMode {
    /// Nothing is placed.
    #[default]
    Idle,
    /// Every tick commits an object to the open stroke.
    Drawing,
    /// Every tick moves a single floating preview object.
    Editing,
}

/// Result of one [`SpatialSession::on_tick`] call, for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing to render.
    Idle,
    /// A permanent object was added to the open stroke.
    Committed(PlacedObject),
    /// The preview moved; `replaced` must be removed from the scene.
    Preview {
        object: PlacedObject,
        replaced: Option<PlacedObject>,
    },
}

/// Shape, width and color applied to the next placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementParams {
    pub shape: ShapeKind,
    /// Slider width; the placed size is `width / width_divisor` meters.
    pub width: f32,
    pub color: Rgba,
}

/// Owns the live tracking session, the current mode and the stroke log.
///
/// All methods run on the UI-bound control flow. `on_tick` is called once per
/// rendered frame and never performs I/O.
pub struct SpatialSession<T: WorldTracker> {
    tracker: T,
    state: TrackingState,
    mode: PlacementMode,
    params: PlacementParams,
    placement_offset: f32,
    width_divisor: f32,
    strokes: StrokeLog,
    preview: Option<PlacedObject>,
    next_object_id: u64,
}

impl<T: WorldTracker> SpatialSession<T> {
    pub fn new(tracker: T, config: &ArConfig) -> Self {
        Self {
            tracker,
            state: TrackingState::Stopped,
            mode: PlacementMode::Idle,
            params: PlacementParams {
                shape: ShapeKind::default(),
                width: config.default_width,
                color: Rgba::default(),
            },
            placement_offset: config.placement_offset_m,
            width_divisor: config.width_divisor,
            strokes: StrokeLog::new(),
            preview: None,
            next_object_id: 0,
        }
    }

    /// Starts tracking, resuming from `resume_from` when given.
    ///
    /// A map that cannot be imported is dropped and a fresh session starts
    /// instead. Calling this on a running or stopped session resets it:
    /// strokes and the preview are discarded. Coming back from
    /// [`pause`](Self::pause) keeps the stroke log, so undo still reaches
    /// strokes drawn before the pause.
    pub fn begin(&mut self, resume_from: Option<SerializedMap>) -> Result<()> {
        let map = match resume_from {
            Some(snapshot) => match self.tracker.import_snapshot(&snapshot) {
                Ok(map) => Some(map),
                Err(e) => {
                    tracing::warn!(
                        "[SpatialSession] Could not import prior world map, starting fresh: {}",
                        e
                    );
                    None
                }
            },
            None => None,
        };
        let resumed = map.is_some();

        self.tracker
            .start(map, TrackingOptions::default())
            .map_err(|e| ArError::capture(format!("Failed to start tracking: {}", e)))?;

        if self.state != TrackingState::Paused {
            self.strokes.clear();
        }
        self.state = TrackingState::Running;
        self.preview = None;
        tracing::debug!("[SpatialSession] Tracking started (resumed: {})", resumed);
        Ok(())
    }

    /// Switches placement mode and returns the preview object that the
    /// renderer must remove, if any.
    ///
    /// Entering `Editing` or `Idle` clears the preview; entering `Drawing`
    /// leaves it alone.
    pub fn set_mode(&mut self, mode: PlacementMode) -> Option<PlacedObject> {
        self.mode = mode;
        match mode {
            PlacementMode::Editing | PlacementMode::Idle => self.preview.take(),
            PlacementMode::Drawing => None,
        }
    }

    /// Gesture start: opens a stroke batch and enters drawing mode.
    pub fn begin_stroke(&mut self) {
        self.strokes.start_batch();
        self.mode = PlacementMode::Drawing;
    }

    /// Gesture end: closes the stroke batch and stops drawing.
    pub fn end_stroke(&mut self) {
        self.strokes.end_batch();
        if self.mode == PlacementMode::Drawing {
            self.mode = PlacementMode::Idle;
        }
    }

    /// Removes the most recent stroke; the caller removes the returned objects
    /// from the scene.
    pub fn undo(&mut self) -> Vec<PlacedObject> {
        self.strokes.undo_last()
    }

    /// Computes this frame's placement from `current_pose`.
    pub fn on_tick(&mut self, current_pose: Pose) -> TickOutcome {
        if self.state != TrackingState::Running || self.mode == PlacementMode::Idle {
            return TickOutcome::Idle;
        }

        let object = self.make_object(current_pose);
        match self.mode {
            PlacementMode::Drawing => match self.strokes.append(object.clone()) {
                Ok(()) => TickOutcome::Committed(object),
                Err(_) => TickOutcome::Idle,
            },
            PlacementMode::Editing => {
                let replaced = self.preview.replace(object.clone());
                TickOutcome::Preview { object, replaced }
            }
            PlacementMode::Idle => TickOutcome::Idle,
        }
    }

    /// Ticks with the tracker's current pose; idle while the pose is unknown.
    pub fn tick(&mut self) -> TickOutcome {
        match self.tracker.current_pose() {
            Some(pose) => self.on_tick(pose),
            None => TickOutcome::Idle,
        }
    }

    pub fn select_shape(&mut self, shape: ShapeKind) {
        self.params.shape = shape;
    }

    pub fn set_size(&mut self, width: f32) {
        self.params.width = width.max(0.0);
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.params.color = color.clamped();
    }

    /// Stops tracking and exports the accumulated map.
    ///
    /// # Errors
    ///
    /// [`ArError::Capture`] when no session is live or export fails. A failed
    /// export leaves tracking running so the user can retry.
    pub fn end(&mut self) -> Result<SerializedMap> {
        let snapshot = self.capture_map()?;
        self.stop();
        Ok(snapshot)
    }

    /// Exports the accumulated map while tracking keeps running.
    ///
    /// # Errors
    ///
    /// [`ArError::Capture`] when no session is live or export fails.
    pub fn capture_map(&self) -> Result<SerializedMap> {
        if self.state == TrackingState::Stopped {
            return Err(ArError::capture("No active tracking session"));
        }

        let snapshot = self
            .tracker
            .export_snapshot()
            .map_err(|e| ArError::capture(format!("Failed to export world map: {}", e)))?;
        tracing::debug!("[SpatialSession] Exported {} map bytes", snapshot.len());
        Ok(snapshot)
    }

    /// Stops tracking. No-op when already stopped.
    pub fn stop(&mut self) {
        if self.state == TrackingState::Stopped {
            return;
        }
        self.tracker.stop();
        self.state = TrackingState::Stopped;
        self.preview = None;
        tracing::debug!("[SpatialSession] Tracking ended");
    }

    /// Suspends tracking without dropping state.
    pub fn pause(&mut self) {
        if self.state == TrackingState::Running {
            self.tracker.pause();
            self.state = TrackingState::Paused;
        }
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    pub fn params(&self) -> PlacementParams {
        self.params
    }

    pub fn preview(&self) -> Option<&PlacedObject> {
        self.preview.as_ref()
    }

    pub fn strokes(&self) -> &StrokeLog {
        &self.strokes
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    fn make_object(&mut self, pose: Pose) -> PlacedObject {
        let id = self.next_object_id;
        self.next_object_id += 1;

        PlacedObject {
            id,
            shape: self.params.shape,
            size: self.params.width / self.width_divisor,
            color: self.params.color,
            pose: Pose::new(pose.ahead(self.placement_offset), pose.orientation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::model::{Orientation, Vec3};

    // Mock WorldTracker for testing
    #[derive(Default)]
    struct MockTracker {
        started_with: Vec<Option<String>>,
        paused: bool,
        stopped: bool,
        fail_export: bool,
        pose: Option<Pose>,
    }

    impl WorldTracker for MockTracker {
        type Map = String;

        fn start(&mut self, resume_from: Option<String>, options: TrackingOptions) -> Result<()> {
            assert!(options.detect_horizontal_planes);
            self.started_with.push(resume_from);
            self.paused = false;
            self.stopped = false;
            Ok(())
        }

        fn current_pose(&self) -> Option<Pose> {
            self.pose
        }

        fn export_snapshot(&self) -> Result<SerializedMap> {
            if self.fail_export {
                return Err(ArError::internal("map not ready"));
            }
            Ok(SerializedMap::new(b"map".to_vec()))
        }

        fn import_snapshot(&self, snapshot: &SerializedMap) -> Result<String> {
            String::from_utf8(snapshot.as_bytes().to_vec())
                .map_err(|e| ArError::internal(e.to_string()))
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn stop(&mut self) {
            self.stopped = true;
        }
    }

    fn running_session() -> SpatialSession<MockTracker> {
        let mut session = SpatialSession::new(MockTracker::default(), &ArConfig::default());
        session.begin(None).unwrap();
        session
    }

    fn origin() -> Pose {
        Pose::new(Vec3::ZERO, Orientation::IDENTITY)
    }

    #[test]
    fn test_begin_fresh_and_resumed() {
        let mut session = SpatialSession::new(MockTracker::default(), &ArConfig::default());
        session.begin(None).unwrap();
        session
            .begin(Some(SerializedMap::new(b"prior".to_vec())))
            .unwrap();

        assert_eq!(
            session.tracker().started_with,
            vec![None, Some("prior".to_string())]
        );
        assert_eq!(session.state(), TrackingState::Running);
    }

    #[test]
    fn test_begin_with_corrupt_map_starts_fresh() {
        let mut session = SpatialSession::new(MockTracker::default(), &ArConfig::default());
        session
            .begin(Some(SerializedMap::new(vec![0xff, 0xfe])))
            .unwrap();
        assert_eq!(session.tracker().started_with, vec![None]);
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut session = running_session();
        assert_eq!(session.on_tick(origin()), TickOutcome::Idle);
        assert!(session.strokes().is_empty());
    }

    #[test]
    fn test_drawing_commits_to_stroke() {
        let mut session = running_session();
        session.select_shape(ShapeKind::Box);
        session.set_size(4.0);

        session.begin_stroke();
        let first = session.on_tick(origin());
        let second = session.on_tick(origin());
        session.end_stroke();

        let TickOutcome::Committed(object) = first else {
            panic!("expected committed object");
        };
        assert_eq!(object.shape, ShapeKind::Box);
        assert!((object.size - 0.02).abs() < 1e-6);
        assert!((object.pose.position.z + 1.0).abs() < 1e-6);
        assert!(matches!(second, TickOutcome::Committed(_)));

        assert_eq!(session.mode(), PlacementMode::Idle);
        assert_eq!(session.strokes().len(), 1);
        assert_eq!(session.undo().len(), 2);
        assert!(session.undo().is_empty());
    }

    #[test]
    fn test_drawing_without_open_stroke_places_nothing() {
        let mut session = running_session();
        session.set_mode(PlacementMode::Drawing);
        assert_eq!(session.on_tick(origin()), TickOutcome::Idle);
    }

    #[test]
    fn test_editing_replaces_preview() {
        let mut session = running_session();
        session.set_mode(PlacementMode::Editing);

        let first = session.on_tick(origin());
        let TickOutcome::Preview { object: a, replaced } = first else {
            panic!("expected preview");
        };
        assert!(replaced.is_none());

        let second = session.on_tick(origin());
        let TickOutcome::Preview { object: b, replaced } = second else {
            panic!("expected preview");
        };
        assert_eq!(replaced, Some(a));
        assert_eq!(session.preview(), Some(&b));
        assert!(session.strokes().is_empty());
    }

    #[test]
    fn test_leaving_edit_mode_clears_preview() {
        let mut session = running_session();
        session.set_mode(PlacementMode::Editing);
        session.on_tick(origin());

        let cleared = session.set_mode(PlacementMode::Idle);
        assert!(cleared.is_some());
        assert!(session.preview().is_none());
    }

    #[test]
    fn test_entering_drawing_keeps_preview() {
        let mut session = running_session();
        session.set_mode(PlacementMode::Editing);
        session.on_tick(origin());

        assert!(session.set_mode(PlacementMode::Drawing).is_none());
        assert!(session.preview().is_some());
    }

    #[test]
    fn test_end_without_session_is_capture_error() {
        let mut session = SpatialSession::new(MockTracker::default(), &ArConfig::default());
        let err = session.end().unwrap_err();
        assert!(err.is_capture());
    }

    #[test]
    fn test_end_export_failure_keeps_tracking() {
        let tracker = MockTracker {
            fail_export: true,
            ..Default::default()
        };
        let mut session = SpatialSession::new(tracker, &ArConfig::default());
        session.begin(None).unwrap();

        assert!(session.end().unwrap_err().is_capture());
        assert_eq!(session.state(), TrackingState::Running);
    }

    #[test]
    fn test_end_stops_and_exports() {
        let mut session = running_session();
        let map = session.end().unwrap();
        assert_eq!(map.as_bytes(), b"map");
        assert_eq!(session.state(), TrackingState::Stopped);
        assert!(session.tracker().stopped);
    }

    #[test]
    fn test_paused_session_ignores_ticks_but_can_end() {
        let mut session = running_session();
        session.begin_stroke();
        session.pause();

        assert!(session.tracker().paused);
        assert_eq!(session.on_tick(origin()), TickOutcome::Idle);
        assert!(session.end().is_ok());
    }

    #[test]
    fn test_begin_after_pause_keeps_strokes() {
        let mut session = running_session();
        session.begin_stroke();
        session.on_tick(origin());
        session.end_stroke();

        session.pause();
        session.begin(None).unwrap();

        assert_eq!(session.state(), TrackingState::Running);
        assert_eq!(session.undo().len(), 1);
    }

    #[test]
    fn test_begin_on_running_session_resets_strokes() {
        let mut session = running_session();
        session.begin_stroke();
        session.on_tick(origin());
        session.end_stroke();

        session.begin(None).unwrap();
        assert!(session.strokes().is_empty());
    }

    #[test]
    fn test_capture_map_keeps_tracking() {
        let mut session = running_session();
        let map = session.capture_map().unwrap();

        assert_eq!(map.as_bytes(), b"map");
        assert_eq!(session.state(), TrackingState::Running);
        assert!(!session.tracker().stopped);

        session.stop();
        assert_eq!(session.state(), TrackingState::Stopped);
        assert!(session.capture_map().unwrap_err().is_capture());
    }

    #[test]
    fn test_tick_uses_tracker_pose() {
        let tracker = MockTracker {
            pose: Some(origin()),
            ..Default::default()
        };
        let mut session = SpatialSession::new(tracker, &ArConfig::default());
        session.begin(None).unwrap();
        session.begin_stroke();
        assert!(matches!(session.tick(), TickOutcome::Committed(_)));
    }
}
