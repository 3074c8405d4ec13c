//! Save and load of AR sessions through blob storage and the record store.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;

use brouhaha_core::archive::{ArchivedSession, BlobStorage, RecordStore, SaveState};
use brouhaha_core::error::{ArError, Result};
use brouhaha_core::proximity::{ProximityHit, ProximityIndex};
use brouhaha_core::spatial::SerializedMap;
use brouhaha_core::GeoCoordinate;

/// Persists captured sessions and fetches them back for resumption.
///
/// A save runs `CapturingPreview -> UploadingPreview -> UploadingMap ->
/// Registering -> Done`, or stops in `Failed`. The record is written only
/// after both uploads succeed, and the session is registered for proximity
/// lookup only after the record is written. If registration fails the record
/// is deleted again, so a failed save leaves no record behind.
///
/// Only one save runs at a time; a second call while one is in flight fails
/// with [`ArError::SaveInProgress`].
pub struct SessionArchive {
    blobs: Arc<dyn BlobStorage>,
    records: Arc<dyn RecordStore>,
    proximity: ProximityIndex,
    max_map_bytes: u64,
    state: watch::Sender<SaveState>,
    save_lock: Mutex<()>,
}

impl SessionArchive {
    pub fn new(
        blobs: Arc<dyn BlobStorage>,
        records: Arc<dyn RecordStore>,
        proximity: ProximityIndex,
        max_map_bytes: u64,
    ) -> Self {
        let (state, _) = watch::channel(SaveState::Idle);
        Self {
            blobs,
            records,
            proximity,
            max_map_bytes,
            state,
            save_lock: Mutex::new(()),
        }
    }

    /// Current save state.
    pub fn save_state(&self) -> SaveState {
        self.state.borrow().clone()
    }

    /// Subscribes to save state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SaveState> {
        self.state.subscribe()
    }

    /// True while a save holds the archive.
    pub fn is_saving(&self) -> bool {
        self.save_lock.try_lock().is_err()
    }

    pub fn proximity(&self) -> &ProximityIndex {
        &self.proximity
    }

    /// Archives `map` with its `preview` image at `coordinate`.
    ///
    /// # Errors
    ///
    /// - [`ArError::SaveInProgress`] if another save is running
    /// - [`ArError::Persist`] for any upload, record or registration failure
    pub async fn save(
        &self,
        map: SerializedMap,
        preview: Vec<u8>,
        coordinate: GeoCoordinate,
    ) -> Result<ArchivedSession> {
        let _guard = self
            .save_lock
            .try_lock()
            .map_err(|_| ArError::SaveInProgress)?;

        let result = self.run_save(map, preview, coordinate).await;
        match &result {
            Ok(record) => {
                tracing::info!("[SessionArchive] Saved session {}", record.id);
                self.transition(SaveState::Done);
            }
            Err(e) => {
                tracing::error!("[SessionArchive] Save failed: {}", e);
                self.transition(SaveState::Failed(e.to_string()));
            }
        }
        result
    }

    async fn run_save(
        &self,
        map: SerializedMap,
        preview: Vec<u8>,
        coordinate: GeoCoordinate,
    ) -> Result<ArchivedSession> {
        self.transition(SaveState::CapturingPreview);
        if preview.is_empty() {
            return Err(ArError::persist("Preview image is empty"));
        }
        if map.is_empty() {
            return Err(ArError::persist("World map snapshot is empty"));
        }

        let created_at = Utc::now();
        let id = ArchivedSession::id_for(&created_at);

        self.transition(SaveState::UploadingPreview);
        let preview_ref = self
            .blobs
            .upload(preview, &ArchivedSession::preview_key(&id))
            .await
            .map_err(ArError::into_persist)?;

        self.transition(SaveState::UploadingMap);
        let map_ref = self
            .blobs
            .upload(map.into_bytes(), &ArchivedSession::map_key(&id))
            .await
            .map_err(ArError::into_persist)?;

        self.transition(SaveState::Registering);
        let record = ArchivedSession {
            id,
            created_at,
            preview_ref,
            map_ref,
            coordinate,
        };
        self.records
            .write(&record)
            .await
            .map_err(ArError::into_persist)?;
        if let Err(e) = self.proximity.register(&record.id, coordinate).await {
            // An unregistered record could never be found by location.
            if let Err(delete_err) = self.records.delete(&record.id).await {
                tracing::error!(
                    "[SessionArchive] Could not roll back record {}: {}",
                    record.id,
                    delete_err
                );
            }
            return Err(e.into_persist());
        }

        Ok(record)
    }

    /// Fetches the world map of archived session `id`.
    ///
    /// Only the map is downloaded; the preview image is left alone.
    ///
    /// # Errors
    ///
    /// [`ArError::Fetch`] when the record is missing or the download fails,
    /// [`ArError::FetchTooLarge`] when the map exceeds the size bound.
    pub async fn load(&self, id: &str) -> Result<SerializedMap> {
        let record = self
            .records
            .read(id)
            .await
            .map_err(ArError::into_fetch)?
            .ok_or_else(|| ArError::fetch(format!("No archived session '{}'", id)))?;

        let bytes = self
            .blobs
            .download(&record.map_ref, self.max_map_bytes)
            .await
            .map_err(ArError::into_fetch)?;

        tracing::debug!("[SessionArchive] Loaded {} map bytes for {}", bytes.len(), id);
        Ok(SerializedMap::new(bytes))
    }

    /// Picks a saved session near `center`, or `None`.
    ///
    /// Index failures are logged and treated as no results.
    pub async fn resolve_nearest(
        &self,
        center: GeoCoordinate,
        radius_meters: f64,
    ) -> Option<String> {
        self.resolve_nearest_cancellable(center, radius_meters, CancellationToken::new())
            .await
    }

    /// Like [`resolve_nearest`](Self::resolve_nearest), abandoned when `token`
    /// is cancelled.
    pub async fn resolve_nearest_cancellable(
        &self,
        center: GeoCoordinate,
        radius_meters: f64,
        token: CancellationToken,
    ) -> Option<String> {
        let stream = match self
            .proximity
            .query_cancellable(center, radius_meters, token.clone())
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("[SessionArchive] Proximity lookup failed: {}", e);
                return None;
            }
        };

        let hits: Vec<ProximityHit> = stream.collect().await;
        if token.is_cancelled() {
            tracing::debug!("[SessionArchive] Proximity lookup superseded");
            return None;
        }
        select_nearest(hits)
    }

    /// All archived sessions, newest first.
    pub async fn list(&self) -> Result<Vec<ArchivedSession>> {
        self.records.list().await
    }

    fn transition(&self, next: SaveState) {
        tracing::debug!("[SessionArchive] Save state -> {:?}", next);
        self.state.send_replace(next);
    }
}

/// Closest hit wins; equal distances go to the most recent id.
fn select_nearest(hits: Vec<ProximityHit>) -> Option<String> {
    hits.into_iter()
        .min_by(|a, b| {
            a.distance_meters
                .total_cmp(&b.distance_meters)
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|hit| hit.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use brouhaha_core::archive::BlobRef;
    use brouhaha_core::proximity::{GeoEntry, GeoIndex};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    type Events = Arc<StdMutex<Vec<String>>>;

    // Mock BlobStorage recording uploads
    struct MockBlobStorage {
        events: Events,
        blobs: StdMutex<Vec<(String, Vec<u8>)>>,
        fail_prefix: Option<&'static str>,
        map_gate: Option<Arc<Notify>>,
    }

    impl MockBlobStorage {
        fn new(events: Events) -> Self {
            Self {
                events,
                blobs: StdMutex::new(Vec::new()),
                fail_prefix: None,
                map_gate: None,
            }
        }
    }

    #[async_trait]
    impl BlobStorage for MockBlobStorage {
        async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<BlobRef> {
            if key.starts_with("maps/") {
                if let Some(gate) = &self.map_gate {
                    gate.notified().await;
                }
            }
            if let Some(prefix) = self.fail_prefix {
                if key.starts_with(prefix) {
                    return Err(ArError::io("network unreachable"));
                }
            }
            self.events.lock().unwrap().push(format!("upload {}", key));
            self.blobs.lock().unwrap().push((key.to_string(), bytes));
            Ok(BlobRef::new(format!("mem://{}", key)))
        }

        async fn download(&self, reference: &BlobRef, max_bytes: u64) -> Result<Vec<u8>> {
            let key = reference.as_str().trim_start_matches("mem://");
            let blobs = self.blobs.lock().unwrap();
            let (_, bytes) = blobs
                .iter()
                .find(|(k, _)| k == key)
                .ok_or_else(|| ArError::not_found("blob", key))?;
            if bytes.len() as u64 > max_bytes {
                return Err(ArError::FetchTooLarge {
                    size: bytes.len() as u64,
                    limit: max_bytes,
                });
            }
            Ok(bytes.clone())
        }
    }

    // Mock RecordStore
    struct MockRecordStore {
        events: Events,
        records: StdMutex<Vec<ArchivedSession>>,
    }

    #[async_trait]
    impl RecordStore for MockRecordStore {
        async fn write(&self, record: &ArchivedSession) -> Result<()> {
            self.events.lock().unwrap().push("write record".to_string());
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn read(&self, id: &str) -> Result<Option<ArchivedSession>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned())
        }

        async fn delete(&self, id: &str) -> Result<()> {
            self.events.lock().unwrap().push("delete record".to_string());
            self.records.lock().unwrap().retain(|r| r.id != id);
            Ok(())
        }

        async fn list(&self) -> Result<Vec<ArchivedSession>> {
            Ok(self.records.lock().unwrap().clone())
        }
    }

    // Mock GeoIndex
    struct MockGeoIndex {
        events: Events,
        entries: StdMutex<Vec<GeoEntry>>,
        unavailable: bool,
    }

    #[async_trait]
    impl GeoIndex for MockGeoIndex {
        async fn register(&self, key: &str, coordinate: GeoCoordinate) -> Result<()> {
            if self.unavailable {
                return Err(ArError::io("index down"));
            }
            self.events.lock().unwrap().push("register".to_string());
            self.entries.lock().unwrap().push(GeoEntry {
                key: key.to_string(),
                coordinate,
            });
            Ok(())
        }

        async fn query(&self, _center: GeoCoordinate, _radius: f64) -> Result<Vec<GeoEntry>> {
            Ok(self.entries.lock().unwrap().clone())
        }
    }

    struct Fixture {
        events: Events,
        records: Arc<MockRecordStore>,
        geo: Arc<MockGeoIndex>,
    }

    fn archive_with(blobs: MockBlobStorage, events: Events) -> (Arc<SessionArchive>, Fixture) {
        let records = Arc::new(MockRecordStore {
            events: events.clone(),
            records: StdMutex::new(Vec::new()),
        });
        let geo = Arc::new(MockGeoIndex {
            events: events.clone(),
            entries: StdMutex::new(Vec::new()),
            unavailable: false,
        });
        let archive = SessionArchive::new(
            Arc::new(blobs),
            records.clone(),
            ProximityIndex::new(geo.clone()),
            3 * 1024 * 1024,
        );
        (
            Arc::new(archive),
            Fixture {
                events,
                records,
                geo,
            },
        )
    }

    fn here() -> GeoCoordinate {
        GeoCoordinate::new(35.3, -120.66)
    }

    fn map() -> SerializedMap {
        SerializedMap::new(b"world map".to_vec())
    }

    #[tokio::test]
    async fn test_save_orders_uploads_record_and_registration() {
        let events: Events = Arc::default();
        let (archive, fixture) = archive_with(MockBlobStorage::new(events.clone()), events);

        let record = archive.save(map(), b"png".to_vec(), here()).await.unwrap();

        let events = fixture.events.lock().unwrap().clone();
        assert_eq!(events.len(), 4);
        assert!(events[0].starts_with("upload previews/"));
        assert!(events[1].starts_with("upload maps/"));
        assert_eq!(events[2], "write record");
        assert_eq!(events[3], "register");

        assert_eq!(record.coordinate, here());
        assert_eq!(archive.save_state(), SaveState::Done);
    }

    #[tokio::test]
    async fn test_map_upload_failure_writes_nothing() {
        let events: Events = Arc::default();
        let mut blobs = MockBlobStorage::new(events.clone());
        blobs.fail_prefix = Some("maps/");
        let (archive, fixture) = archive_with(blobs, events);

        let err = archive
            .save(map(), b"png".to_vec(), here())
            .await
            .unwrap_err();

        assert!(err.is_persist());
        assert!(fixture.records.records.lock().unwrap().is_empty());
        assert!(fixture.geo.entries.lock().unwrap().is_empty());
        // The preview did upload before the map failed.
        assert_eq!(fixture.events.lock().unwrap().len(), 1);
        assert!(matches!(archive.save_state(), SaveState::Failed(_)));
    }

    #[tokio::test]
    async fn test_registration_failure_rolls_back_record() {
        let events: Events = Arc::default();
        let records = Arc::new(MockRecordStore {
            events: events.clone(),
            records: StdMutex::new(Vec::new()),
        });
        let geo = Arc::new(MockGeoIndex {
            events: events.clone(),
            entries: StdMutex::new(Vec::new()),
            unavailable: true,
        });
        let archive = SessionArchive::new(
            Arc::new(MockBlobStorage::new(events.clone())),
            records.clone(),
            ProximityIndex::new(geo),
            3 * 1024 * 1024,
        );

        let err = archive
            .save(map(), b"png".to_vec(), here())
            .await
            .unwrap_err();

        assert!(err.is_persist());
        assert!(records.records.lock().unwrap().is_empty());
        assert!(archive.list().await.unwrap().is_empty());
        assert_eq!(events.lock().unwrap().last().unwrap(), "delete record");
        assert!(matches!(archive.save_state(), SaveState::Failed(_)));
    }

    #[tokio::test]
    async fn test_empty_preview_fails_before_upload() {
        let events: Events = Arc::default();
        let (archive, fixture) = archive_with(MockBlobStorage::new(events.clone()), events);

        let err = archive.save(map(), Vec::new(), here()).await.unwrap_err();
        assert!(err.is_persist());
        assert!(fixture.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_save_is_rejected() {
        let events: Events = Arc::default();
        let gate = Arc::new(Notify::new());
        let mut blobs = MockBlobStorage::new(events.clone());
        blobs.map_gate = Some(gate.clone());
        let (archive, fixture) = archive_with(blobs, events);

        let mut states = archive.subscribe();
        let first = {
            let archive = archive.clone();
            tokio::spawn(async move {
                archive
                    .save(SerializedMap::new(b"first".to_vec()), b"png".to_vec(), here())
                    .await
            })
        };

        while *states.borrow_and_update() != SaveState::UploadingMap {
            states.changed().await.unwrap();
        }
        assert!(archive.is_saving());

        let second = archive
            .save(SerializedMap::new(b"second".to_vec()), b"png".to_vec(), here())
            .await;
        assert!(matches!(second, Err(ArError::SaveInProgress)));

        gate.notify_one();
        first.await.unwrap().unwrap();

        let uploads: Vec<String> = fixture
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with("upload"))
            .cloned()
            .collect();
        assert_eq!(uploads.len(), 2);
        assert_eq!(fixture.records.records.lock().unwrap().len(), 1);
        assert!(!archive.is_saving());
    }

    #[tokio::test]
    async fn test_load_round_trips_map() {
        let events: Events = Arc::default();
        let (archive, _fixture) = archive_with(MockBlobStorage::new(events.clone()), events);

        let record = archive.save(map(), b"png".to_vec(), here()).await.unwrap();
        assert_eq!(archive.load(&record.id).await.unwrap(), map());
    }

    #[tokio::test]
    async fn test_load_unknown_id_is_fetch_error() {
        let events: Events = Arc::default();
        let (archive, _fixture) = archive_with(MockBlobStorage::new(events.clone()), events);

        assert!(archive.load("missing").await.unwrap_err().is_fetch());
    }

    #[tokio::test]
    async fn test_load_enforces_size_bound() {
        let events: Events = Arc::default();
        let records = Arc::new(MockRecordStore {
            events: events.clone(),
            records: StdMutex::new(Vec::new()),
        });
        let geo = Arc::new(MockGeoIndex {
            events: events.clone(),
            entries: StdMutex::new(Vec::new()),
            unavailable: false,
        });
        let archive = SessionArchive::new(
            Arc::new(MockBlobStorage::new(events)),
            records,
            ProximityIndex::new(geo),
            4,
        );

        let record = archive.save(map(), b"png".to_vec(), here()).await.unwrap();
        let err = archive.load(&record.id).await.unwrap_err();
        assert!(matches!(err, ArError::FetchTooLarge { limit: 4, .. }));
    }

    #[test]
    fn test_select_nearest_prefers_closest_then_newest() {
        let hit = |id: &str, d: f64| ProximityHit {
            id: id.to_string(),
            coordinate: here(),
            distance_meters: d,
        };

        assert_eq!(select_nearest(Vec::new()), None);
        assert_eq!(
            select_nearest(vec![hit("b", 50.0), hit("a", 10.0)]),
            Some("a".to_string())
        );
        assert_eq!(
            select_nearest(vec![hit("2019-01-01", 10.0), hit("2019-06-01", 10.0)]),
            Some("2019-06-01".to_string())
        );
    }
}
