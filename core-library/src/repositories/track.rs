//! In-memory track repository

use crate::error::{LibraryError, Result};
use crate::models::{Row, Track};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Ordered rows of one loaded playlist.
///
/// Keeps the rows as loaded (the "original order") next to whatever order the
/// last sort strategy produced.
#[derive(Debug, Clone, Default)]
pub struct TrackRepository {
    original: Vec<Row>,
    current: Vec<Row>,
}

impl TrackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all rows. `original_index` is the 1-based input position.
    ///
    /// Tracks without an id are kept; strategies that need one drop them.
    pub fn load(&mut self, tracks: Vec<Track>) {
        self.original = tracks
            .into_iter()
            .enumerate()
            .map(|(i, track)| Row::new(Arc::new(track), i + 1))
            .collect();
        self.current = self.original.clone();
        debug!(rows = self.original.len(), "Track repository loaded");
    }

    /// Rows in the order the last strategy produced.
    pub fn current_order(&self) -> &[Row] {
        &self.current
    }

    /// Rows in ascending `original_index` order.
    pub fn original_order(&self) -> &[Row] {
        &self.original
    }

    /// Restores ascending `original_index` order.
    pub fn reset(&mut self) {
        self.current = self.original.clone();
    }

    /// Installs a strategy result as the current order.
    ///
    /// Every row must come from this repository and appear at most once. Rows
    /// may be missing (smart sort drops tracks without an id).
    pub fn apply(&mut self, order: Vec<Row>) -> Result<()> {
        let mut seen = HashSet::with_capacity(order.len());

        for row in &order {
            let known = row
                .original_index
                .checked_sub(1)
                .and_then(|i| self.original.get(i))
                .is_some_and(|original| Arc::ptr_eq(&original.track, &row.track));

            if !known {
                return Err(LibraryError::OrderMismatch(format!(
                    "row {} does not belong to this playlist",
                    row.original_index
                )));
            }

            if !seen.insert(row.original_index) {
                return Err(LibraryError::OrderMismatch(format!(
                    "row {} appears twice",
                    row.original_index
                )));
            }
        }

        self.current = order;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Track URIs in current order, skipping tracks without an id.
    pub fn current_uris(&self) -> Vec<String> {
        self.current.iter().filter_map(|row| row.track.uri()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks(ids: &[&str]) -> Vec<Track> {
        ids.iter().map(|id| Track::new(*id, format!("Song {}", id))).collect()
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.track.id.as_str()).collect()
    }

    #[test]
    fn test_load_assigns_one_based_indices() {
        let mut repo = TrackRepository::new();
        assert!(repo.is_empty());

        repo.load(tracks(&["a", "b", "c"]));

        assert_eq!(repo.len(), 3);
        let indices: Vec<usize> = repo.current_order().iter().map(|r| r.original_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_load_replaces_previous_rows() {
        let mut repo = TrackRepository::new();
        repo.load(tracks(&["a", "b", "c"]));
        repo.load(tracks(&["x"]));

        assert_eq!(ids(repo.current_order()), vec!["x"]);
        assert_eq!(repo.original_order()[0].original_index, 1);
    }

    #[test]
    fn test_apply_then_reset() {
        let mut repo = TrackRepository::new();
        repo.load(tracks(&["a", "b", "c"]));

        let reversed: Vec<Row> = repo.original_order().iter().rev().cloned().collect();
        repo.apply(reversed).unwrap();
        assert_eq!(ids(repo.current_order()), vec!["c", "b", "a"]);

        repo.reset();
        assert_eq!(ids(repo.current_order()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_apply_rejects_foreign_and_duplicate_rows() {
        let mut repo = TrackRepository::new();
        repo.load(tracks(&["a", "b"]));

        let foreign = vec![Row::new(Arc::new(Track::new("a", "Song a")), 1)];
        assert!(matches!(repo.apply(foreign), Err(LibraryError::OrderMismatch(_))));

        let first = repo.original_order()[0].clone();
        assert!(matches!(
            repo.apply(vec![first.clone(), first]),
            Err(LibraryError::OrderMismatch(_))
        ));

        // Failed applies leave the order untouched.
        assert_eq!(ids(repo.current_order()), vec!["a", "b"]);
    }

    #[test]
    fn test_current_uris_skip_missing_ids() {
        let mut repo = TrackRepository::new();
        repo.load(tracks(&["a", "", "c"]));

        assert_eq!(
            repo.current_uris(),
            vec!["spotify:track:a".to_string(), "spotify:track:c".to_string()]
        );
    }
}
