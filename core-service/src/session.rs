//! Playlist session: the loaded playlist, its rows and the active sort.

use core_library::models::{PlaylistHandle, Row, Track};
use core_library::sort::{self, SmartSortParams, SortState, SortStrategy};
use core_library::{Result, TrackRepository};
use rand::RngCore;

/// Prefix of the suffix appended to playlists saved as new.
const SAVED_NAME_TAG: &str = "SpotiSort";

/// State owned by one selected playlist. Replaced wholesale on every load.
#[derive(Debug)]
pub struct PlaylistSession {
    handle: PlaylistHandle,
    repository: TrackRepository,
    sort_state: SortState,
}

impl PlaylistSession {
    pub fn new(handle: PlaylistHandle, tracks: Vec<Track>) -> Self {
        let mut repository = TrackRepository::new();
        repository.load(tracks);

        Self {
            handle,
            repository,
            sort_state: SortState::none(),
        }
    }

    pub fn handle(&self) -> &PlaylistHandle {
        &self.handle
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort_state
    }

    pub fn visible_order(&self) -> &[Row] {
        self.repository.current_order()
    }

    pub fn len(&self) -> usize {
        self.repository.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repository.is_empty()
    }

    /// Applies `strategy` to the rows in load order and makes the result
    /// visible.
    pub fn apply(
        &mut self,
        strategy: SortStrategy,
        params: &SmartSortParams,
        rng: &mut dyn RngCore,
    ) -> Result<&[Row]> {
        let (order, state) = sort::apply(
            strategy,
            self.repository.original_order(),
            &self.sort_state,
            params,
            rng,
        );

        match strategy {
            SortStrategy::Reset => self.repository.reset(),
            _ => self.repository.apply(order)?,
        }
        self.sort_state = state;

        Ok(self.repository.current_order())
    }

    /// Track URIs of the visible order. Tracks without an id are skipped.
    pub fn uris(&self) -> Vec<String> {
        self.repository.current_uris()
    }

    /// `"<name> (SpotiSort · <field> <dir>)"`, or `custom sort` when no
    /// field is active.
    pub fn saved_name(&self) -> String {
        format!(
            "{} ({} · {})",
            self.handle.display_name,
            SAVED_NAME_TAG,
            self.sort_state.name_suffix()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_library::models::{SortDirection, SortField, SortMode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session(popularities: &[u8]) -> PlaylistSession {
        let tracks = popularities
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Track::new(format!("t{}", i + 1), format!("Song {}", i + 1))
                    .with_artist(Some(&format!("artist-{}", i)), format!("Artist {}", i))
                    .with_popularity(*p)
            })
            .collect();
        PlaylistSession::new(PlaylistHandle::new("pl1", "Road Trip"), tracks)
    }

    fn indices(rows: &[Row]) -> Vec<usize> {
        rows.iter().map(|r| r.original_index).collect()
    }

    #[test]
    fn test_reset_restores_load_order() {
        let mut session = session(&[10, 90, 50, 50, 20, 90, 5]);
        let mut rng = StdRng::seed_from_u64(1);
        let params = SmartSortParams::default();

        session
            .apply(SortStrategy::column(SortField::Name), &params, &mut rng)
            .unwrap();
        session.apply(SortStrategy::Random, &params, &mut rng).unwrap();
        let order = session.apply(SortStrategy::Reset, &params, &mut rng).unwrap();

        assert_eq!(indices(order), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(session.sort_state().mode, SortMode::None);
    }

    #[test]
    fn test_saved_name_follows_sort_state() {
        let mut session = session(&[10, 90]);
        let mut rng = StdRng::seed_from_u64(1);
        let params = SmartSortParams::default();

        assert_eq!(session.saved_name(), "Road Trip (SpotiSort · custom sort)");

        session
            .apply(
                SortStrategy::column_directed(SortField::Popularity, SortDirection::Asc),
                &params,
                &mut rng,
            )
            .unwrap();
        assert_eq!(session.saved_name(), "Road Trip (SpotiSort · popularity asc)");

        session.apply(SortStrategy::Smart, &params, &mut rng).unwrap();
        assert_eq!(session.saved_name(), "Road Trip (SpotiSort · __smart__ desc)");
    }

    #[test]
    fn test_uris_follow_visible_order() {
        let mut session = session(&[10, 90, 50]);
        let mut rng = StdRng::seed_from_u64(1);

        session
            .apply(SortStrategy::Popularity, &SmartSortParams::default(), &mut rng)
            .unwrap();

        assert_eq!(
            session.uris(),
            vec!["spotify:track:t2", "spotify:track:t3", "spotify:track:t1"]
        );
    }
}
