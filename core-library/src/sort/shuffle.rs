//! Uniform random shuffle.

use crate::models::Row;
use rand::Rng;

/// Fisher–Yates shuffle of a copy of `rows`.
///
/// Every permutation is equally likely given a uniform `rng`. Tests pass a
/// seeded generator for repeatable output.
pub fn shuffle<R: Rng + ?Sized>(rows: &[Row], rng: &mut R) -> Vec<Row> {
    let mut shuffled = rows.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}
