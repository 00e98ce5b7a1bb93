//! Weighted interleave ("smart") sort.
//!
//! Rows are scored, ranked and cut into three tiers. Output starts with a hook
//! drawn from the top tier, then cycles a tier pattern while keeping the same
//! primary artist out of a short recent window.

use crate::models::{Row, Track};
use std::collections::VecDeque;

/// Duration at which the short-track bonus reaches zero.
const DURATION_NORM_MS: f64 = 240_000.0;

/// Sentinel recorded as the sort field after a smart sort.
pub const SMART_SORT_FIELD: &str = "__smart__";

/// Score-ranked partition of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Top 20% (rounded up)
    A,
    /// Middle
    B,
    /// Bottom 20% (from the floored 80th percentile)
    C,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartSortParams {
    /// Length of the hook prefix
    pub hook_len: usize,
    /// Size of the recent-artist window
    pub cooldown: usize,
    /// Tier cycle used after the hook
    pub pattern: Vec<Tier>,
}

impl Default for SmartSortParams {
    fn default() -> Self {
        Self {
            hook_len: 5,
            cooldown: 2,
            pattern: vec![Tier::A, Tier::A, Tier::B, Tier::A, Tier::B, Tier::C],
        }
    }
}

/// `0.75 * popularity/100 + 0.25 * (1 - clamp01(duration/240000))`.
///
/// Missing popularity counts as 0. Missing duration also counts as 0, which
/// earns the full short-track bonus.
pub fn score(track: &Track) -> f64 {
    let popularity = f64::from(track.popularity.unwrap_or(0)) / 100.0;
    let duration = track.duration_ms.unwrap_or(0) as f64 / DURATION_NORM_MS;
    0.75 * popularity + 0.25 * (1.0 - duration.clamp(0.0, 1.0))
}

struct Candidate {
    row: Row,
    artist_key: String,
}

struct Buckets {
    a: VecDeque<Candidate>,
    b: VecDeque<Candidate>,
    c: VecDeque<Candidate>,
}

impl Buckets {
    fn split(mut ranked: Vec<Candidate>) -> Self {
        let n = ranked.len();
        let a_end = (n as f64 * 0.2).ceil() as usize;
        let c_start = ((n as f64 * 0.8).floor() as usize).max(a_end);

        let c = ranked.split_off(c_start);
        let b = ranked.split_off(a_end);

        Self {
            a: ranked.into(),
            b: b.into(),
            c: c.into(),
        }
    }

    fn tier(&mut self, tier: Tier) -> &mut VecDeque<Candidate> {
        match tier {
            Tier::A => &mut self.a,
            Tier::B => &mut self.b,
            Tier::C => &mut self.c,
        }
    }

    /// First candidate of `tier` whose artist is not in `recent`.
    fn pick_with_cooldown(&mut self, tier: Tier, recent: &VecDeque<String>) -> Option<Candidate> {
        let bucket = self.tier(tier);
        let position = bucket
            .iter()
            .position(|candidate| !recent.contains(&candidate.artist_key))?;
        bucket.remove(position)
    }

    /// Front of the first non-empty tier, ignoring the cooldown.
    fn pick_any(&mut self) -> Option<Candidate> {
        self.a
            .pop_front()
            .or_else(|| self.b.pop_front())
            .or_else(|| self.c.pop_front())
    }

    /// Cooldown-compliant pick from `preferred` in order, else any row.
    fn pick(&mut self, preferred: &[Tier], recent: &VecDeque<String>) -> Option<Candidate> {
        preferred
            .iter()
            .find_map(|tier| self.pick_with_cooldown(*tier, recent))
            .or_else(|| self.pick_any())
    }
}

/// Smart-sorts `rows`, dropping rows whose track has no id.
///
/// The output length equals the number of rows with an id.
pub fn smart_sort(rows: &[Row], params: &SmartSortParams) -> Vec<Row> {
    let mut scored: Vec<(f64, Candidate)> = rows
        .iter()
        .filter(|row| row.track.has_id())
        .map(|row| {
            let candidate = Candidate {
                artist_key: row.track.primary_artist_key().to_string(),
                row: row.clone(),
            };
            (score(&row.track), candidate)
        })
        .collect();

    // Stable, descending by score.
    scored.sort_by(|(x, _), (y, _)| y.total_cmp(x));

    let total = scored.len();
    let mut buckets = Buckets::split(scored.into_iter().map(|(_, c)| c).collect());

    let mut output = Vec::with_capacity(total);
    let mut recent: VecDeque<String> = VecDeque::with_capacity(params.cooldown + 1);

    for _ in 0..params.hook_len.min(total) {
        match buckets.pick(&[Tier::A, Tier::B, Tier::C], &recent) {
            Some(candidate) => emit(candidate, &mut output, &mut recent, params.cooldown),
            None => break,
        }
    }

    let mut step = 0usize;
    while output.len() < total {
        let preferred = match params.pattern.get(step % params.pattern.len().max(1)) {
            Some(tier) => [*tier, Tier::A, Tier::B, Tier::C],
            // An empty pattern drains the tiers in rank order.
            None => [Tier::A, Tier::A, Tier::B, Tier::C],
        };
        step += 1;

        match buckets.pick(&preferred, &recent) {
            Some(candidate) => emit(candidate, &mut output, &mut recent, params.cooldown),
            None => break,
        }
    }

    output
}

fn emit(
    candidate: Candidate,
    output: &mut Vec<Row>,
    recent: &mut VecDeque<String>,
    cooldown: usize,
) {
    recent.push_back(candidate.artist_key);
    while recent.len() > cooldown {
        recent.pop_front();
    }
    output.push(candidate.row);
}
