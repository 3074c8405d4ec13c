//! Enter / save / leave flow of the AR view.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use brouhaha_core::archive::ArchivedSession;
use brouhaha_core::error::{ArError, Result};
use brouhaha_core::location::LocationProvider;
use brouhaha_core::spatial::{SerializedMap, SpatialSession, WorldTracker};

use crate::session_archive::SessionArchive;

/// How the AR view started tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterOutcome {
    Fresh,
    /// Resumed from the archived session with this id.
    Resumed(String),
}

/// A world map picked for resumption.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeCandidate {
    pub id: String,
    pub map: SerializedMap,
}

/// Drives a [`SpatialSession`] against the [`SessionArchive`].
pub struct ArViewUseCase {
    archive: Arc<SessionArchive>,
    location: Arc<dyn LocationProvider>,
    search_radius_meters: f64,
    pending_lookup: Mutex<Option<CancellationToken>>,
    added: Mutex<Vec<ArchivedSession>>,
}

impl ArViewUseCase {
    pub fn new(
        archive: Arc<SessionArchive>,
        location: Arc<dyn LocationProvider>,
        search_radius_meters: f64,
    ) -> Self {
        Self {
            archive,
            location,
            search_radius_meters,
            pending_lookup: Mutex::new(None),
            added: Mutex::new(Vec::new()),
        }
    }

    pub fn archive(&self) -> &Arc<SessionArchive> {
        &self.archive
    }

    /// Looks for a saved session near the current location and fetches its map.
    ///
    /// Starting a new lookup cancels the previous one. Every failure along the
    /// way is logged and yields `None`, so the caller falls back to a fresh
    /// session.
    pub async fn find_resume_map(&self) -> Option<ResumeCandidate> {
        let token = self.replace_lookup_token();

        let Some(here) = self.location.current_coordinate() else {
            tracing::info!("[ArView] Location unavailable, starting fresh");
            return None;
        };

        let id = self
            .archive
            .resolve_nearest_cancellable(here, self.search_radius_meters, token.clone())
            .await?;
        if token.is_cancelled() {
            return None;
        }

        match self.archive.load(&id).await {
            Ok(map) => {
                tracing::info!("[ArView] Resuming from saved session {}", id);
                Some(ResumeCandidate { id, map })
            }
            Err(e) => {
                tracing::warn!("[ArView] Could not fetch saved session {}: {}", id, e);
                None
            }
        }
    }

    /// Cancels an in-flight resume lookup, if any.
    pub fn cancel_lookup(&self) {
        if let Some(token) = self.lock_lookup().take() {
            token.cancel();
        }
    }

    /// Starts tracking, resuming from a nearby saved session when one exists.
    pub async fn enter<T: WorldTracker>(
        &self,
        session: &mut SpatialSession<T>,
    ) -> Result<EnterOutcome> {
        match self.find_resume_map().await {
            Some(candidate) => {
                session.begin(Some(candidate.map))?;
                Ok(EnterOutcome::Resumed(candidate.id))
            }
            None => {
                session.begin(None)?;
                Ok(EnterOutcome::Fresh)
            }
        }
    }

    /// Archives the map with `preview` at the current location, then ends
    /// tracking.
    ///
    /// Tracking stops only once the archive holds the session. On any error
    /// the session keeps running, so calling `save` again retries with a
    /// fresh snapshot.
    ///
    /// # Errors
    ///
    /// - [`ArError::SaveInProgress`] while another save runs
    /// - [`ArError::Capture`] without a location fix or when export fails
    /// - [`ArError::Persist`] when archiving fails
    pub async fn save<T: WorldTracker>(
        &self,
        session: &mut SpatialSession<T>,
        preview: Vec<u8>,
    ) -> Result<ArchivedSession> {
        if self.archive.is_saving() {
            return Err(ArError::SaveInProgress);
        }
        let coordinate = self
            .location
            .current_coordinate()
            .ok_or_else(|| ArError::capture("Location unavailable"))?;

        let map = session.capture_map()?;
        let record = self.archive.save(map, preview, coordinate).await?;
        session.stop();

        self.lock_added().push(record.clone());
        Ok(record)
    }

    /// Pauses tracking and hands back the sessions saved during this view.
    pub fn leave<T: WorldTracker>(
        &self,
        session: &mut SpatialSession<T>,
    ) -> Vec<ArchivedSession> {
        self.cancel_lookup();
        session.pause();
        std::mem::take(&mut *self.lock_added())
    }

    /// Sessions saved since entering the view.
    pub fn added_annotations(&self) -> Vec<ArchivedSession> {
        self.lock_added().clone()
    }

    fn replace_lookup_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.lock_lookup().replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    fn lock_lookup(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.pending_lookup
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_added(&self) -> std::sync::MutexGuard<'_, Vec<ArchivedSession>> {
        self.added
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
