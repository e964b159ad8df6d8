pub mod deterministic;
pub mod hot_cold;
pub mod weighted;

pub use deterministic::generate_deterministic_bet_variant;
pub use hot_cold::{HotColdOptions, generate_hot_cold_balanced_bet};
pub use weighted::generate_weighted_bet;

use crate::random::RandomSource;

/// Roulette selection over `(number, weight)` pairs using a single draw from
/// `rng`. Returns the index of the chosen pair, `None` when all weights are zero.
pub(crate) fn roulette<R: RandomSource + ?Sized>(
    candidates: &[(u8, u64)],
    rng: &mut R,
) -> Option<usize> {
    let total: u64 = candidates.iter().map(|&(_, w)| w).sum();
    if total == 0 {
        return None;
    }
    let target = rng.next_unit() * total as f64;
    let mut cumulative = 0u64;
    let mut last_positive = None;
    for (i, &(_, w)) in candidates.iter().enumerate() {
        if w == 0 {
            continue;
        }
        cumulative += w;
        last_positive = Some(i);
        if cumulative as f64 > target {
            return Some(i);
        }
    }
    // Rounding can leave the target at the very top of the scale.
    last_positive
}
