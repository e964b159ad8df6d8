use crate::models::{Draw, GenerationResult};
use crate::rules::LotteryRule;
use crate::stats::{
    StalenessTable, SumBand, compute_frequencies, compute_staleness, frequency_confidence,
    sum_band, top_numbers,
};

/// A number counts as stale once its gap exceeds this multiple of the expected gap.
pub const STALE_GAP_FACTOR: f64 = 1.5;
pub const STALE_POOL_LIMIT: usize = 12;
/// Share of the non-neighbor slots served from the hot rank, in tenths (rounded up).
const HOT_SHARE_TENTHS: usize = 7;
const EMPTY_HISTORY_CONFIDENCE: f64 = 0.1;

/// Stale numbers, most stale first, ties by ascending number.
fn stale_rank(staleness: &StalenessTable, rule: &LotteryRule) -> Vec<u8> {
    let threshold = STALE_GAP_FACTOR * rule.expected_gap();
    staleness
        .most_stale(rule.range_size())
        .into_iter()
        .filter(|&(_, gap)| gap as f64 > threshold)
        .take(STALE_POOL_LIMIT)
        .map(|(n, _)| n)
        .collect()
}

/// `±1` neighbors of the latest draw that were not drawn themselves.
fn neighbor_candidates(latest: &Draw, rule: &LotteryRule) -> Vec<u8> {
    let mut neighbors = Vec::new();
    for &n in latest.numbers() {
        let below = n.checked_sub(1);
        let above = n.checked_add(1);
        for candidate in [below, above].into_iter().flatten() {
            if rule.contains(candidate) && !latest.contains(candidate) && !neighbors.contains(&candidate) {
                neighbors.push(candidate);
            }
        }
    }
    neighbors
}

/// Walks `pool` once starting at `variant % len`, taking up to `slots` unchosen numbers.
fn take_rotated(pool: &[u8], slots: usize, variant: usize, chosen: &mut Vec<u8>) -> usize {
    if pool.is_empty() || slots == 0 {
        return 0;
    }
    let offset = variant % pool.len();
    let mut taken = 0;
    for i in 0..pool.len() {
        if taken == slots {
            break;
        }
        let n = pool[(offset + i) % pool.len()];
        if !chosen.contains(&n) {
            chosen.push(n);
            taken += 1;
        }
    }
    taken
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairOutcome {
    pub swaps: usize,
    pub in_band: bool,
}

/// Greedy best-effort repair pulling the sum of `numbers` into `band`.
///
/// Too low: from the smallest number up, each number is replaced by the
/// largest unused number above it that does not push the sum past the band
/// ceiling. Too high is the mirror image, from the largest number down.
/// At most one pass over the numbers; the band may stay out of reach.
/// `numbers` is left sorted ascending.
pub fn repair_sum(numbers: &mut Vec<u8>, rule: &LotteryRule, band: &SumBand) -> RepairOutcome {
    numbers.sort_unstable();
    let mut sum: u32 = numbers.iter().map(|&n| n as u32).sum();
    let mut swaps = 0;

    if (sum as f64) < band.low {
        for i in 0..numbers.len() {
            if band.contains(sum) {
                break;
            }
            let current = numbers[i];
            let ceiling = band.high - (sum - current as u32) as f64;
            let replacement = (current.saturating_add(1)..=rule.max_number())
                .rev()
                .find(|&r| r > current && r as f64 <= ceiling && !numbers.contains(&r));
            if let Some(r) = replacement {
                sum = sum - current as u32 + r as u32;
                numbers[i] = r;
                swaps += 1;
            }
        }
    } else if (sum as f64) > band.high {
        for i in (0..numbers.len()).rev() {
            if band.contains(sum) {
                break;
            }
            let current = numbers[i];
            let floor = band.low - (sum - current as u32) as f64;
            let replacement = (rule.min_number()..current)
                .find(|&r| r as f64 >= floor && !numbers.contains(&r));
            if let Some(r) = replacement {
                sum = sum - current as u32 + r as u32;
                numbers[i] = r;
                swaps += 1;
            }
        }
    }

    numbers.sort_unstable();
    let in_band = band.contains(sum);
    if !in_band {
        log::debug!(
            "sum repair stopped at {} outside [{:.1}, {:.1}] after {} swaps",
            sum,
            band.low,
            band.high,
            swaps
        );
    }
    RepairOutcome { swaps, in_band }
}

/// Reproducible bet mixing neighbors of the latest draw, hot and stale numbers.
///
/// `history[0]` is the most recent draw. `variant_index` rotates where each
/// ranked pool is read from, so successive variants differ while the same
/// inputs always give the same bet.
pub fn generate_deterministic_bet_variant(
    history: &[Draw],
    rule: &LotteryRule,
    variant_index: usize,
) -> GenerationResult {
    let picks = rule.numbers_per_draw();

    let Some(latest) = history.first() else {
        let numbers: Vec<u8> = rule.numbers().take(picks).collect();
        let sum = numbers.iter().map(|&n| n as u32).sum();
        return GenerationResult {
            reasoning: format!(
                "no draw history: first {} numbers of {}-{}",
                picks,
                rule.min_number(),
                rule.max_number()
            ),
            numbers,
            sum,
            confidence: EMPTY_HISTORY_CONFIDENCE,
        };
    };

    let freqs = compute_frequencies(history, rule);
    let staleness = compute_staleness(history, rule);
    let hot: Vec<u8> = top_numbers(&freqs, rule.range_size())
        .into_iter()
        .map(|(n, _)| n)
        .collect();
    let stale = stale_rank(&staleness, rule);
    let neighbors = neighbor_candidates(latest, rule);

    let remaining = picks - 1;
    let hot_slots = (HOT_SHARE_TENTHS * remaining).div_ceil(10);
    let stale_slots = remaining - hot_slots;

    let mut numbers = Vec::with_capacity(picks);
    let from_neighbors = take_rotated(&neighbors, 1, variant_index, &mut numbers);
    let from_hot = take_rotated(&hot, hot_slots, variant_index, &mut numbers);
    let from_stale = take_rotated(&stale, stale_slots, variant_index, &mut numbers);

    let mut filled = 0;
    for n in hot.iter().copied().chain(rule.numbers()) {
        if numbers.len() >= picks {
            break;
        }
        if !numbers.contains(&n) {
            numbers.push(n);
            filled += 1;
        }
    }

    let band = sum_band(history, rule);
    let repair = repair_sum(&mut numbers, rule, &band);
    let sum: u32 = numbers.iter().map(|&n| n as u32).sum();

    let mut reasoning = format!(
        "variant {}: {} neighbor of contest {}, {} hot, {} stale",
        variant_index,
        from_neighbors,
        latest.contest(),
        from_hot,
        from_stale
    );
    if filled > 0 {
        reasoning.push_str(&format!(", {filled} filled from the hot rank"));
    }
    reasoning.push_str(&format!(
        "; sum {} {} [{:.1}, {:.1}] after {} swap(s); {} draws analysed",
        sum,
        if repair.in_band { "within" } else { "outside" },
        band.low,
        band.high,
        repair.swaps,
        history.len()
    ));

    GenerationResult {
        confidence: frequency_confidence(&numbers, &freqs),
        numbers,
        sum,
        reasoning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{draw, make_test_draws};
    use crate::rules::LotteryKind;

    fn small_history() -> Vec<Draw> {
        vec![
            draw(3, &[5, 10, 15, 20]),
            draw(2, &[1, 2, 3, 5]),
            draw(1, &[1, 2, 5, 7]),
        ]
    }

    fn wide_rule() -> LotteryRule {
        LotteryRule::new(1, 20, 4).unwrap().with_sum_tolerance(1000)
    }

    #[test]
    fn test_empty_history_sequential() {
        let rule = LotteryKind::MegaSena.rule();
        let result = generate_deterministic_bet_variant(&[], &rule, 3);
        assert_eq!(result.numbers, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(result.sum, 21);
        assert_eq!(result.confidence, EMPTY_HISTORY_CONFIDENCE);
        assert!(result.reasoning.contains("no draw history"));
    }

    #[test]
    fn test_empty_history_zero_based_range() {
        let rule = LotteryKind::Lotomania.rule();
        let result = generate_deterministic_bet_variant(&[], &rule, 0);
        assert_eq!(result.numbers, (0..20).collect::<Vec<u8>>());
    }

    #[test]
    fn test_neighbor_candidates() {
        let rule = wide_rule();
        let latest = draw(3, &[5, 6, 10, 20]);
        assert_eq!(neighbor_candidates(&latest, &rule), vec![4, 7, 9, 11, 19]);
    }

    #[test]
    fn test_stale_rank_threshold() {
        let rule = wide_rule();
        let staleness = compute_staleness(&small_history(), &rule);
        // expected gap 5, threshold 7.5: only never-seen numbers qualify
        assert_eq!(stale_rank(&staleness, &rule), vec![4, 6, 8, 9, 11, 12, 13, 14, 16, 17, 18, 19]);
    }

    #[test]
    fn test_stale_rank_capped() {
        let rule = LotteryKind::MegaSena.rule();
        let history: Vec<Draw> = (0..20).map(|i| draw(20 - i, &[1, 2, 3, 4, 5, 6])).collect();
        let staleness = compute_staleness(&history, &rule);
        assert_eq!(stale_rank(&staleness, &rule).len(), STALE_POOL_LIMIT);
    }

    #[test]
    fn test_variant_zero_composition() {
        let result = generate_deterministic_bet_variant(&small_history(), &wide_rule(), 0);
        assert_eq!(result.numbers, vec![1, 2, 4, 5]);
        assert_eq!(result.sum, 12);
        // shares 3/3, 2/3, 2/3
        assert!((result.confidence - 7.0 / 9.0).abs() < 1e-12, "{}", result.confidence);
        assert!(result.reasoning.starts_with("variant 0: 1 neighbor of contest 3, 3 hot, 0 stale"));
    }

    #[test]
    fn test_variant_rotation() {
        let history = small_history();
        let rule = wide_rule();
        let v1 = generate_deterministic_bet_variant(&history, &rule, 1);
        assert_eq!(v1.numbers, vec![1, 2, 3, 6]);
        let v7 = generate_deterministic_bet_variant(&history, &rule, 7);
        assert_eq!(v7.numbers, vec![4, 6, 8, 20]);
    }

    #[test]
    fn test_determinism() {
        let rule = LotteryKind::MegaSena.rule();
        let history = make_test_draws(100, &rule);
        for variant in [0, 1, 17, 1000] {
            let a = generate_deterministic_bet_variant(&history, &rule, variant);
            let b = generate_deterministic_bet_variant(&history, &rule, variant);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_invariants_across_presets() {
        for kind in LotteryKind::ALL {
            let rule = kind.rule();
            let history = make_test_draws(50, &rule);
            for variant in 0..25 {
                let result = generate_deterministic_bet_variant(&history, &rule, variant);
                let n = &result.numbers;
                assert_eq!(n.len(), rule.numbers_per_draw(), "{kind} v{variant}");
                assert!(n.windows(2).all(|w| w[0] < w[1]), "{kind} v{variant}: {n:?}");
                assert!(n.iter().all(|&x| rule.contains(x)), "{kind} v{variant}: {n:?}");
                assert_eq!(result.sum, n.iter().map(|&x| x as u32).sum::<u32>());
                assert!((0.0..=1.0).contains(&result.confidence));
            }
        }
    }

    #[test]
    fn test_sum_lands_in_band() {
        let rule = LotteryKind::MegaSena.rule();
        let history = make_test_draws(60, &rule);
        let band = sum_band(&history, &rule);
        for variant in 0..40 {
            let result = generate_deterministic_bet_variant(&history, &rule, variant);
            assert!(band.contains(result.sum), "v{variant}: {} not in {:?}", result.sum, band);
            assert!(result.reasoning.contains("within"));
        }
    }

    #[test]
    fn test_repair_raises_sum() {
        let rule = LotteryRule::new(1, 20, 3).unwrap();
        let band = SumBand { expected: 30.0, low: 28.0, high: 32.0 };
        let mut numbers = vec![3, 1, 2];
        let outcome = repair_sum(&mut numbers, &rule, &band);
        assert_eq!(numbers, vec![3, 9, 20]);
        assert_eq!(outcome, RepairOutcome { swaps: 2, in_band: true });
    }

    #[test]
    fn test_repair_lowers_sum() {
        let rule = LotteryRule::new(1, 20, 3).unwrap();
        let band = SumBand { expected: 30.0, low: 28.0, high: 32.0 };
        let mut numbers = vec![18, 19, 20];
        let outcome = repair_sum(&mut numbers, &rule, &band);
        assert_eq!(numbers, vec![1, 9, 18]);
        assert_eq!(outcome, RepairOutcome { swaps: 2, in_band: true });
    }

    #[test]
    fn test_repair_noop_inside_band() {
        let rule = LotteryRule::new(1, 20, 3).unwrap();
        let band = SumBand { expected: 30.0, low: 28.0, high: 32.0 };
        let mut numbers = vec![20, 1, 9];
        let outcome = repair_sum(&mut numbers, &rule, &band);
        assert_eq!(numbers, vec![1, 9, 20]);
        assert_eq!(outcome, RepairOutcome { swaps: 0, in_band: true });
    }

    #[test]
    fn test_repair_best_effort_when_unreachable() {
        let rule = LotteryRule::new(1, 3, 3).unwrap();
        let band = SumBand { expected: 100.0, low: 98.0, high: 102.0 };
        let mut numbers = vec![1, 2, 3];
        let outcome = repair_sum(&mut numbers, &rule, &band);
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(outcome, RepairOutcome { swaps: 0, in_band: false });
    }
}
