//! # Sort Strategies
//!
//! Pure functions from rows to a new row order, plus the [`SortState`]
//! machine that records which strategy produced the visible order.
//!
//! Every strategy reads the rows in original load order, so results never
//! depend on the previous sort.
//!
//! ```text
//! none ──> column | popularity | smart | random ──> (any)
//!            │          │
//!            └ same field again: flip direction
//! ```

pub mod column;
pub mod shuffle;
pub mod smart;

pub use column::{collate, sort_by_column};
pub use shuffle::shuffle;
pub use smart::{smart_sort, SmartSortParams, Tier, SMART_SORT_FIELD};

use crate::models::{Row, SortDirection, SortField, SortMode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which strategy produced the visible order.
///
/// Replaced wholesale on every sort action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub mode: SortMode,
    /// Column name, [`SMART_SORT_FIELD`] after a smart sort, `None` otherwise
    pub field: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Original order, nothing active.
    pub fn none() -> Self {
        Self::default()
    }

    fn with(mode: SortMode, field: Option<&str>, direction: SortDirection) -> Self {
        Self {
            mode,
            field: field.map(str::to_string),
            direction,
        }
    }

    /// Suffix for a playlist saved in this order: `"<field> <dir>"` when a
    /// field is active, `"custom sort"` otherwise.
    pub fn name_suffix(&self) -> String {
        match &self.field {
            Some(field) => format!("{} {}", field, self.direction),
            None => "custom sort".to_string(),
        }
    }

    fn is_field(&self, field: SortField) -> bool {
        self.field.as_deref() == Some(field.as_str())
    }
}

/// One user-facing sort action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortStrategy {
    /// Sort by a column. Without an explicit direction, re-selecting the
    /// active field flips it and a new field starts descending.
    Column {
        field: SortField,
        direction: Option<SortDirection>,
    },
    /// Popularity column; descending first, flips while active.
    Popularity,
    /// Weighted interleave sort.
    Smart,
    /// Uniform shuffle.
    Random,
    /// Back to the order as loaded.
    Reset,
}

impl SortStrategy {
    /// Column sort that follows the header-click toggle rule.
    pub fn column(field: SortField) -> Self {
        SortStrategy::Column {
            field,
            direction: None,
        }
    }

    /// Column sort in a fixed direction.
    pub fn column_directed(field: SortField, direction: SortDirection) -> Self {
        SortStrategy::Column {
            field,
            direction: Some(direction),
        }
    }

    /// State after applying this strategy on top of `current`.
    pub fn next_state(&self, current: &SortState) -> SortState {
        let toggled = |field: SortField| {
            if current.is_field(field) {
                current.direction.flipped()
            } else {
                SortDirection::Desc
            }
        };

        match *self {
            SortStrategy::Column { field, direction } => SortState::with(
                SortMode::Column,
                Some(field.as_str()),
                direction.unwrap_or_else(|| toggled(field)),
            ),
            SortStrategy::Popularity => SortState::with(
                SortMode::Popularity,
                Some(SortField::Popularity.as_str()),
                toggled(SortField::Popularity),
            ),
            SortStrategy::Smart => {
                SortState::with(SortMode::Smart, Some(SMART_SORT_FIELD), SortDirection::Desc)
            }
            SortStrategy::Random => SortState::with(SortMode::Random, None, SortDirection::Desc),
            SortStrategy::Reset => SortState::none(),
        }
    }
}

/// Applies `strategy` to `rows` (original load order).
///
/// Returns the new visible order and the state that describes it.
pub fn apply<R: Rng + ?Sized>(
    strategy: SortStrategy,
    rows: &[Row],
    current: &SortState,
    params: &SmartSortParams,
    rng: &mut R,
) -> (Vec<Row>, SortState) {
    let state = strategy.next_state(current);

    let order = match strategy {
        SortStrategy::Column { field, .. } => sort_by_column(rows, field, state.direction),
        SortStrategy::Popularity => {
            sort_by_column(rows, SortField::Popularity, state.direction)
        }
        SortStrategy::Smart => smart_sort(rows, params),
        SortStrategy::Random => shuffle(rows, rng),
        SortStrategy::Reset => rows.to_vec(),
    };

    debug!(
        mode = state.mode.as_str(),
        field = ?state.field,
        direction = state.direction.as_str(),
        rows = order.len(),
        "Sort strategy applied"
    );

    (order, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Track;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn rows(popularities: &[u8]) -> Vec<Row> {
        popularities
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Row::new(
                    Arc::new(
                        Track::new(format!("t{}", i + 1), format!("Song {}", i + 1))
                            .with_artist(Some(&format!("a{}", i % 3)), "Artist")
                            .with_popularity(*p),
                    ),
                    i + 1,
                )
            })
            .collect()
    }

    fn run(strategy: SortStrategy, rows: &[Row], state: &SortState) -> (Vec<Row>, SortState) {
        let mut rng = StdRng::seed_from_u64(3);
        apply(strategy, rows, state, &SmartSortParams::default(), &mut rng)
    }

    #[test]
    fn test_popularity_toggle_alternates_direction() {
        let input = rows(&[10, 90, 50]);

        let (_, first) = run(SortStrategy::Popularity, &input, &SortState::none());
        assert_eq!(first.direction, SortDirection::Desc);
        assert_eq!(first.field.as_deref(), Some("popularity"));

        let (order, second) = run(SortStrategy::Popularity, &input, &first);
        assert_eq!(second.direction, SortDirection::Asc);
        assert_eq!(second.field, first.field);
        assert_eq!(
            order.iter().map(|r| r.original_index).collect::<Vec<_>>(),
            vec![1, 3, 2]
        );

        let (_, third) = run(SortStrategy::Popularity, &input, &second);
        assert_eq!(third.direction, SortDirection::Desc);
    }

    #[test]
    fn test_column_toggle_and_new_field() {
        let name = SortStrategy::column(SortField::Name);

        let first = name.next_state(&SortState::none());
        assert_eq!(first.mode, SortMode::Column);
        assert_eq!(first.direction, SortDirection::Desc);

        let second = name.next_state(&first);
        assert_eq!(second.direction, SortDirection::Asc);

        let other = SortStrategy::column(SortField::DurationMs).next_state(&second);
        assert_eq!(other.field.as_deref(), Some("duration_ms"));
        assert_eq!(other.direction, SortDirection::Desc);

        let fixed = SortStrategy::column_directed(SortField::Name, SortDirection::Asc)
            .next_state(&second);
        assert_eq!(fixed.direction, SortDirection::Asc);
    }

    #[test]
    fn test_smart_random_and_reset_states() {
        let asc = SortState {
            mode: SortMode::Column,
            field: Some("name".to_string()),
            direction: SortDirection::Asc,
        };

        let smart = SortStrategy::Smart.next_state(&asc);
        assert_eq!(smart.field.as_deref(), Some(SMART_SORT_FIELD));
        assert_eq!(smart.direction, SortDirection::Desc);

        let random = SortStrategy::Random.next_state(&asc);
        assert_eq!(random.mode, SortMode::Random);
        assert_eq!(random.direction, SortDirection::Desc);

        assert_eq!(SortStrategy::Reset.next_state(&asc), SortState::none());
    }

    #[test]
    fn test_name_suffix() {
        assert_eq!(SortState::none().name_suffix(), "custom sort");

        let popularity = SortStrategy::Popularity.next_state(&SortState::none());
        assert_eq!(popularity.name_suffix(), "popularity desc");

        let smart = SortStrategy::Smart.next_state(&SortState::none());
        assert_eq!(smart.name_suffix(), "__smart__ desc");

        let random = SortStrategy::Random.next_state(&smart);
        assert_eq!(random.name_suffix(), "custom sort");
    }

    #[test]
    fn test_reset_returns_input_order() {
        let input = rows(&[5, 4, 3, 2, 1]);
        let (order, state) = run(SortStrategy::Reset, &input, &SortState::none());

        assert_eq!(order, input);
        assert_eq!(state.mode, SortMode::None);
    }
}
