use serde::Serialize;

use crate::models::{Draw, NumberStats, mean_sum};
use crate::rules::LotteryRule;

/// Added to the history length for numbers never seen in the window,
/// so they always rank as the most stale.
pub const NEVER_SEEN_PENALTY: u32 = 10;

/// Occurrence count of every number in the rule range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    min_number: u8,
    counts: Vec<u32>,
    draws: usize,
}

impl FrequencyTable {
    pub fn count(&self, n: u8) -> u32 {
        n.checked_sub(self.min_number)
            .and_then(|i| self.counts.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| (self.min_number + i as u8, c))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of draws the table was computed from.
    pub fn draws(&self) -> usize {
        self.draws
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Fraction of draws in which `n` appeared.
    pub fn share(&self, n: u8) -> f64 {
        if self.draws == 0 {
            return 0.0;
        }
        self.count(n) as f64 / self.draws as f64
    }
}

/// Draws since each number was last seen (0 = in the most recent draw).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StalenessTable {
    min_number: u8,
    gaps: Vec<u32>,
    never_seen: u32,
}

impl StalenessTable {
    pub fn gap(&self, n: u8) -> u32 {
        n.checked_sub(self.min_number)
            .and_then(|i| self.gaps.get(i as usize))
            .copied()
            .unwrap_or(self.never_seen)
    }

    pub fn is_never_seen(&self, n: u8) -> bool {
        self.gap(n) == self.never_seen
    }

    /// Sentinel stored for numbers absent from the whole window.
    pub fn never_seen_value(&self) -> u32 {
        self.never_seen
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.gaps
            .iter()
            .enumerate()
            .map(|(i, &g)| (self.min_number + i as u8, g))
    }

    /// Most stale first, ties broken by ascending number.
    pub fn most_stale(&self, limit: usize) -> Vec<(u8, u32)> {
        let mut ranked: Vec<(u8, u32)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }
}

pub fn compute_frequencies(history: &[Draw], rule: &LotteryRule) -> FrequencyTable {
    let mut counts = vec![0u32; rule.range_size()];
    for draw in history {
        for &n in draw.numbers() {
            if rule.contains(n) {
                counts[rule.index_of(n)] += 1;
            }
        }
    }
    FrequencyTable {
        min_number: rule.min_number(),
        counts,
        draws: history.len(),
    }
}

/// Most frequent first. Ties are broken by ascending number so rankings are reproducible.
pub fn top_numbers(table: &FrequencyTable, limit: usize) -> Vec<(u8, u32)> {
    let mut ranked: Vec<(u8, u32)> = table.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// `history[0]` must be the most recent draw.
pub fn compute_staleness(history: &[Draw], rule: &LotteryRule) -> StalenessTable {
    let never_seen = history.len() as u32 + NEVER_SEEN_PENALTY;
    let mut gaps = vec![never_seen; rule.range_size()];
    for (t, draw) in history.iter().enumerate() {
        for &n in draw.numbers() {
            if rule.contains(n) {
                let idx = rule.index_of(n);
                if gaps[idx] == never_seen {
                    gaps[idx] = t as u32;
                }
            }
        }
    }
    StalenessTable {
        min_number: rule.min_number(),
        gaps,
        never_seen,
    }
}

pub fn compute_stats(history: &[Draw], rule: &LotteryRule) -> Vec<NumberStats> {
    let freqs = compute_frequencies(history, rule);
    let staleness = compute_staleness(history, rule);
    rule.numbers()
        .map(|n| NumberStats {
            number: n,
            frequency: freqs.count(n),
            gap: staleness.gap(n),
            never_seen: staleness.is_never_seen(n),
        })
        .collect()
}

/// Mean draw share of the three most frequent numbers of a bet, in `[0, 1]`.
pub fn frequency_confidence(numbers: &[u8], freqs: &FrequencyTable) -> f64 {
    let mut shares: Vec<f64> = numbers.iter().map(|&n| freqs.share(n)).collect();
    shares.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    shares.truncate(3);
    if shares.is_empty() {
        return 0.0;
    }
    (shares.iter().sum::<f64>() / shares.len() as f64).clamp(0.0, 1.0)
}

/// Acceptance band for a bet's sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SumBand {
    pub expected: f64,
    pub low: f64,
    pub high: f64,
}

impl SumBand {
    pub fn contains(&self, sum: u32) -> bool {
        let s = sum as f64;
        s >= self.low && s <= self.high
    }
}

/// Mean historical sum ± the rule tolerance. An empty history centres the
/// band on the range midpoint times the pick count.
pub fn sum_band(history: &[Draw], rule: &LotteryRule) -> SumBand {
    let expected = mean_sum(history)
        .unwrap_or_else(|| rule.midpoint() * rule.numbers_per_draw() as f64);
    let tolerance = rule.sum_tolerance() as f64;
    SumBand {
        expected,
        low: expected - tolerance,
        high: expected + tolerance,
    }
}
