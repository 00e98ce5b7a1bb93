//! Column sort over a single projected field.

use crate::models::{Row, SortDirection, SortField};
use std::cmp::Ordering;

/// Value of `field` for one row.
#[derive(Debug, Clone, PartialEq)]
enum Projection<'a> {
    Text(&'a str),
    /// `None` compares as negative infinity.
    Number(Option<f64>),
}

fn project(row: &Row, field: SortField) -> Projection<'_> {
    let track = &row.track;
    match field {
        SortField::Name => Projection::Text(&track.name),
        SortField::Artist => Projection::Text(track.primary_artist_name()),
        SortField::Popularity => Projection::Number(track.popularity.map(f64::from)),
        SortField::DurationMs => Projection::Number(track.duration_ms.map(|d| d as f64)),
        SortField::OriginalIndex => Projection::Number(Some(row.original_index as f64)),
    }
}

fn compare_numbers(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.unwrap_or(f64::NEG_INFINITY);
    let b = b.unwrap_or(f64::NEG_INFINITY);
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Sorts `rows` by `field`.
///
/// Stable in both directions: descending reverses the comparator, so rows with
/// equal values keep their input order. Missing numbers are smaller than every
/// present number regardless of direction.
pub fn sort_by_column(rows: &[Row], field: SortField, direction: SortDirection) -> Vec<Row> {
    let mut sorted = rows.to_vec();

    sorted.sort_by(|a, b| {
        let ordering = match (project(a, field), project(b, field)) {
            (Projection::Text(x), Projection::Text(y)) => collate(x, y),
            (Projection::Number(x), Projection::Number(y)) => compare_numbers(x, y),
            // A field is either textual or numeric for every row.
            _ => Ordering::Equal,
        };

        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    sorted
}

/// Locale-style string comparison.
///
/// Compares accent- and case-folded text first, then accents, then case with
/// lowercase first. Close to a root-locale collator for Latin text.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| {
        s.chars()
            .map(fold_accent)
            .flat_map(char::to_lowercase)
            .collect::<Vec<_>>()
    };
    let secondary = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();

    primary(a)
        .cmp(&primary(b))
        .then_with(|| secondary(a).cmp(&secondary(b)))
        .then_with(|| compare_case(a, b))
}

fn compare_case(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => return x.cmp(&y),
        }
    }
    a.chars().count().cmp(&b.chars().count())
}

/// Strips the diacritic from common Latin letters.
fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' => 'A',
        'ç' | 'ć' | 'č' => 'c',
        'Ç' | 'Ć' | 'Č' => 'C',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ę' | 'Ě' => 'E',
        'ì' | 'í' | 'î' | 'ï' | 'ī' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' => 'I',
        'ñ' | 'ń' | 'ň' => 'n',
        'Ñ' | 'Ń' | 'Ň' => 'N',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' => 'O',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' | 'Ÿ' => 'Y',
        'š' | 'ś' => 's',
        'Š' | 'Ś' => 'S',
        'ž' | 'ź' | 'ż' => 'z',
        'Ž' | 'Ź' | 'Ż' => 'Z',
        'ł' => 'l',
        'Ł' => 'L',
        _ => c,
    }
}
