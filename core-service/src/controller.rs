//! # Re-sequencing Controller
//!
//! Orchestrates load → sort → commit for one user session.
//!
//! ## Concurrency
//!
//! - A load holds the load guard for its whole duration; a second load, or a
//!   sort, while it runs fails with [`CoreError::LoadInProgress`].
//! - Commits hold the commit lock so write batches of two commits never
//!   interleave.
//! - Session state is only locked between network awaits.

use crate::error::{CoreError, Result};
use crate::session::PlaylistSession;
use bridge_traits::{ConfirmationPrompt, ConfirmationRequest};
use core_auth::CredentialProvider;
use core_library::models::{
    CreatedPlaylist, PlaylistHandle, Row, SortDirection, SortField, UserProfile,
};
use core_library::sort::{SmartSortParams, SortState, SortStrategy};
use core_runtime::config::{CoreConfig, LoadOrder, PlaylistSettings};
use core_runtime::events::{AuthEvent, CommitKind, CoreEvent, EventBus, SessionEvent};
use provider_spotify::SpotifyClient;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Result of an overwrite request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The playlist was rewritten in the visible order.
    Committed(CreatedPlaylist),
    /// The user declined the confirmation; nothing was written.
    Cancelled,
}

/// Clears the load flag when the load finishes, fails or is dropped.
struct LoadGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> LoadGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CoreError::LoadInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Session controller exposed to hosts.
pub struct ResequenceController {
    client: SpotifyClient,
    prompt: Arc<dyn ConfirmationPrompt>,
    event_bus: EventBus,
    smart_params: SmartSortParams,
    load_order: LoadOrder,
    playlist_settings: PlaylistSettings,
    user: RwLock<Option<UserProfile>>,
    session: Mutex<Option<PlaylistSession>>,
    loading: AtomicBool,
    commit_lock: Mutex<()>,
    rng: std::sync::Mutex<Box<dyn RngCore + Send>>,
}

impl ResequenceController {
    pub fn new(
        config: CoreConfig,
        credentials: Arc<dyn CredentialProvider>,
        event_bus: EventBus,
    ) -> Self {
        let smart_params = SmartSortParams {
            hook_len: config.smart_sort.hook_len,
            cooldown: config.smart_sort.cooldown,
            ..SmartSortParams::default()
        };

        Self {
            client: SpotifyClient::from_config(&config, credentials),
            prompt: config.confirmation_prompt,
            event_bus,
            smart_params,
            load_order: config.load_order,
            playlist_settings: config.playlist,
            user: RwLock::new(None),
            session: Mutex::new(None),
            loading: AtomicBool::new(false),
            commit_lock: Mutex::new(()),
            rng: std::sync::Mutex::new(Box::new(StdRng::from_entropy())),
        }
    }

    /// Replaces the shuffle RNG, e.g. with a seeded one.
    pub fn with_rng(self, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: std::sync::Mutex::new(Box::new(rng)),
            ..self
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_bus.emit(CoreEvent::Session(event));
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Fetches the signed-in user and caches it for commit-as-new.
    #[instrument(skip(self))]
    pub async fn refresh_identity(&self) -> Result<UserProfile> {
        let user = self.client.current_user().await?;
        *self.user.write().await = Some(user.clone());

        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: user.id.clone(),
            display_name: user.display_name.clone(),
        }));
        info!(user_id = %user.id, "Signed in as {}", user.label());

        Ok(user)
    }

    pub async fn user(&self) -> Option<UserProfile> {
        self.user.read().await.clone()
    }

    /// The user's playlists, sorted by name.
    pub async fn playlists(&self) -> Result<Vec<PlaylistHandle>> {
        Ok(self.client.list_playlists().await?)
    }

    // =========================================================================
    // Load & sort
    // =========================================================================

    /// Loads every track of `handle` and makes it the current session.
    ///
    /// The previous session is discarded before the first request. Returns the
    /// visible order after the configured load order is applied.
    #[instrument(skip(self, handle), fields(playlist_id = %handle.id))]
    pub async fn load(&self, handle: PlaylistHandle) -> Result<Vec<Row>> {
        let _guard = LoadGuard::acquire(&self.loading)?;

        *self.session.lock().await = None;
        info!(expected = ?handle.track_total, "Loading playlist");

        let tracks = match self.client.playlist_tracks(&handle.id).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(error = %e, "Playlist load failed");
                self.emit(SessionEvent::LoadFailed {
                    playlist_id: handle.id.clone(),
                    message: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let mut session = PlaylistSession::new(handle, tracks);

        if self.load_order == LoadOrder::PopularityDesc {
            let strategy = SortStrategy::column_directed(SortField::Popularity, SortDirection::Desc);
            let mut rng = self.lock_rng();
            session.apply(strategy, &self.smart_params, &mut **rng)?;
        }

        let order = session.visible_order().to_vec();
        let playlist_id = session.handle().id.clone();
        *self.session.lock().await = Some(session);

        self.emit(SessionEvent::Loaded {
            playlist_id,
            track_count: order.len(),
        });
        info!(tracks = order.len(), "Playlist loaded");

        Ok(order)
    }

    /// Applies `strategy` to the loaded playlist and returns the new visible
    /// order.
    #[instrument(skip(self))]
    pub async fn sort(&self, strategy: SortStrategy) -> Result<Vec<Row>> {
        if self.is_loading() {
            return Err(CoreError::LoadInProgress);
        }

        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(CoreError::EmptySelection)?;

        let order = {
            let mut rng = self.lock_rng();
            session
                .apply(strategy, &self.smart_params, &mut **rng)?
                .to_vec()
        };

        let state = session.sort_state();
        self.emit(SessionEvent::Sorted {
            playlist_id: session.handle().id.clone(),
            mode: state.mode.as_str().to_string(),
            field: state.field.clone(),
            direction: state.direction.as_str().to_string(),
        });
        debug!(mode = state.mode.as_str(), rows = order.len(), "Sorted");

        Ok(order)
    }

    pub async fn sort_state(&self) -> Option<SortState> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|session| session.sort_state().clone())
    }

    pub async fn visible_order(&self) -> Option<Vec<Row>> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|session| session.visible_order().to_vec())
    }

    pub async fn current_playlist(&self) -> Option<PlaylistHandle> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|session| session.handle().clone())
    }

    fn lock_rng(&self) -> std::sync::MutexGuard<'_, Box<dyn RngCore + Send>> {
        // The RNG holds no invariant a panic could break.
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Snapshot of what a commit writes: source playlist, URIs, new name.
    async fn commit_snapshot(&self) -> Result<(PlaylistHandle, Vec<String>, String)> {
        let guard = self.session.lock().await;
        let session = guard.as_ref().ok_or(CoreError::EmptySelection)?;

        let uris = session.uris();
        if uris.is_empty() {
            return Err(CoreError::EmptyResult);
        }

        Ok((session.handle().clone(), uris, session.saved_name()))
    }

    /// Creates a new playlist holding the visible order.
    #[instrument(skip(self))]
    pub async fn commit_as_new(&self) -> Result<CreatedPlaylist> {
        let user = self.user().await.ok_or(CoreError::MissingUser)?;
        let (source, uris, name) = self.commit_snapshot().await?;

        let _commit = self.commit_lock.lock().await;
        info!(source = %source.id, tracks = uris.len(), name = %name, "Saving as new playlist");

        let created = self
            .client
            .create_playlist(
                &user.id,
                &name,
                &self.playlist_settings.description,
                self.playlist_settings.public,
            )
            .await?;
        self.client.add_items(&created.id, &uris).await?;

        self.emit(SessionEvent::Committed {
            source_playlist_id: source.id,
            target_playlist_id: created.id.clone(),
            kind: CommitKind::New,
            track_count: uris.len(),
        });
        info!(playlist_id = %created.id, "New playlist created");

        Ok(created)
    }

    /// Rewrites the loaded playlist in the visible order after the user
    /// confirms.
    #[instrument(skip(self))]
    pub async fn commit_overwrite(&self) -> Result<CommitOutcome> {
        let (source, uris, _) = self.commit_snapshot().await?;

        let request = ConfirmationRequest::new(
            format!("Overwrite \"{}\" on Spotify?", source.display_name),
            "This will replace the track order in the selected playlist.",
        );
        let confirmed = self
            .prompt
            .confirm(request)
            .await
            .map_err(CoreError::Prompt)?;

        if !confirmed {
            info!(playlist_id = %source.id, "Overwrite cancelled");
            self.emit(SessionEvent::CommitCancelled {
                playlist_id: source.id,
            });
            return Ok(CommitOutcome::Cancelled);
        }

        let _commit = self.commit_lock.lock().await;
        info!(playlist_id = %source.id, tracks = uris.len(), "Overwriting playlist");

        self.client.overwrite_items(&source.id, &uris).await?;

        self.emit(SessionEvent::Committed {
            source_playlist_id: source.id.clone(),
            target_playlist_id: source.id.clone(),
            kind: CommitKind::Overwrite,
            track_count: uris.len(),
        });

        Ok(CommitOutcome::Committed(CreatedPlaylist::new(source.id, None)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);

        let guard = LoadGuard::acquire(&flag).unwrap();
        assert!(matches!(
            LoadGuard::acquire(&flag),
            Err(CoreError::LoadInProgress)
        ));

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(LoadGuard::acquire(&flag).is_ok());
    }
}
