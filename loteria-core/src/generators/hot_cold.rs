use serde::{Deserialize, Serialize};

use crate::generators::roulette;
use crate::models::Draw;
use crate::random::RandomSource;
use crate::rules::LotteryRule;
use crate::stats::{compute_frequencies, compute_staleness, top_numbers};

pub const DEFAULT_HOT_BIAS: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HotColdOptions {
    /// Probability that a slot is served from the hot pool first.
    pub hot_bias: f64,
    /// Defaults to twice the pick count. Always capped at half the range.
    pub hot_pool_size: Option<usize>,
    pub cold_pool_size: Option<usize>,
}

impl Default for HotColdOptions {
    fn default() -> Self {
        Self {
            hot_bias: DEFAULT_HOT_BIAS,
            hot_pool_size: None,
            cold_pool_size: None,
        }
    }
}

impl HotColdOptions {
    fn pool_sizes(&self, rule: &LotteryRule) -> (usize, usize) {
        let cap = rule.range_size() / 2;
        let default = rule.numbers_per_draw() * 2;
        (
            self.hot_pool_size.unwrap_or(default).min(cap),
            self.cold_pool_size.unwrap_or(default).min(cap),
        )
    }
}

fn is_even(n: u8) -> bool {
    n % 2 == 0
}

/// `ceil(n/2)` even slots and `floor(n/2)` odd slots, shuffled.
fn parity_plan<R: RandomSource + ?Sized>(picks: usize, rng: &mut R) -> Vec<bool> {
    let evens = picks.div_ceil(2);
    let mut plan: Vec<bool> = (0..picks).map(|i| i < evens).collect();
    for i in (1..plan.len()).rev() {
        let j = rng.next_index(i + 1);
        plan.swap(i, j);
    }
    plan
}

/// Weighted pick among the unchosen pool members whose parity matches.
fn pick_with_parity<R: RandomSource + ?Sized>(
    pool: &[(u8, u64)],
    want_even: Option<bool>,
    chosen: &[u8],
    rng: &mut R,
) -> Option<u8> {
    let candidates: Vec<(u8, u64)> = pool
        .iter()
        .copied()
        .filter(|(n, _)| !chosen.contains(n))
        .filter(|(n, _)| want_even.is_none_or(|even| is_even(*n) == even))
        .collect();
    roulette(&candidates, rng).map(|idx| candidates[idx].0)
}

/// Mixes frequent and long-absent numbers with a fixed even/odd split.
///
/// Each slot of the shuffled parity plan flips a `hot_bias` coin to pick a
/// primary pool, falls back to the other pool with the same parity, and only
/// then to the whole range. Parity is relaxed last, so the result always
/// holds `numbers_per_draw` distinct numbers.
pub fn generate_hot_cold_balanced_bet<R: RandomSource + ?Sized>(
    history: &[Draw],
    rule: &LotteryRule,
    options: &HotColdOptions,
    rng: &mut R,
) -> Vec<u8> {
    let picks = rule.numbers_per_draw();
    let freqs = compute_frequencies(history, rule);
    let staleness = compute_staleness(history, rule);
    let (hot_size, cold_size) = options.pool_sizes(rule);

    let hot_pool: Vec<(u8, u64)> = top_numbers(&freqs, hot_size)
        .into_iter()
        .map(|(n, c)| (n, c as u64 + 1))
        .collect();
    let cold_pool: Vec<(u8, u64)> = staleness
        .most_stale(cold_size)
        .into_iter()
        .map(|(n, g)| (n, g as u64 + 1))
        .collect();
    let full_range: Vec<(u8, u64)> = freqs.iter().map(|(n, c)| (n, c as u64 + 1)).collect();

    let plan = parity_plan(picks, rng);
    let mut chosen: Vec<u8> = Vec::with_capacity(picks);

    for want_even in plan {
        let (primary, secondary) = if rng.next_unit() < options.hot_bias {
            (&hot_pool, &cold_pool)
        } else {
            (&cold_pool, &hot_pool)
        };

        let pick = pick_with_parity(primary, Some(want_even), &chosen, rng)
            .or_else(|| pick_with_parity(secondary, Some(want_even), &chosen, rng))
            .or_else(|| {
                log::debug!(
                    "hot/cold pools exhausted for {} slot, using full range",
                    if want_even { "even" } else { "odd" }
                );
                pick_with_parity(&full_range, Some(want_even), &chosen, rng)
            })
            .or_else(|| pick_with_parity(&full_range, None, &chosen, rng));

        match pick {
            Some(n) => chosen.push(n),
            None => break,
        }
    }

    chosen.sort_unstable();
    chosen
}
