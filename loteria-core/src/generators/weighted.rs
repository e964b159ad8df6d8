use crate::generators::roulette;
use crate::random::RandomSource;
use crate::stats::FrequencyTable;

/// Frequency-biased draw without replacement over the whole table.
///
/// Each number weighs `count + 1`, so numbers never drawn stay selectable.
/// Every pick consumes one value from `rng`. The result is sorted and may be
/// shorter than `picks` only when the table runs out of numbers.
pub fn generate_weighted_bet<R: RandomSource + ?Sized>(
    table: &FrequencyTable,
    picks: usize,
    rng: &mut R,
) -> Vec<u8> {
    let mut weights: Vec<(u8, u64)> = table.iter().map(|(n, c)| (n, c as u64 + 1)).collect();
    let mut selected = Vec::with_capacity(picks);

    for _ in 0..picks {
        let Some(idx) = roulette(&weights, rng) else {
            log::debug!(
                "weighted sampler exhausted after {} of {} picks",
                selected.len(),
                picks
            );
            break;
        };
        selected.push(weights[idx].0);
        weights[idx].1 = 0;
    }

    selected.sort_unstable();
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{draw, make_test_draws};
    use crate::random::SequenceSource;
    use crate::rules::{LotteryKind, LotteryRule};
    use crate::stats::compute_frequencies;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_weighted_exact_sequence() {
        let rule = LotteryRule::new(1, 5, 2).unwrap();
        let history = vec![draw(3, &[5]), draw(2, &[5]), draw(1, &[5])];
        let table = compute_frequencies(&history, &rule);
        // weights 1,1,1,1,4 : 0.9 * 8 = 7.2 lands on 5, then 0.0 lands on 1
        let mut src = SequenceSource::new(vec![0.9, 0.0]);
        assert_eq!(generate_weighted_bet(&table, 2, &mut src), vec![1, 5]);
    }

    #[test]
    fn test_weighted_unseen_numbers_selectable() {
        let rule = LotteryRule::new(1, 5, 2).unwrap();
        let table = compute_frequencies(&[], &rule);
        // uniform weights: 0.0 -> 1, then remaining 2..5, 0.5 * 4 = 2.0 -> 4
        let mut src = SequenceSource::new(vec![0.0, 0.5]);
        assert_eq!(generate_weighted_bet(&table, 2, &mut src), vec![1, 4]);
    }

    #[test]
    fn test_weighted_shortfall_when_range_exhausted() {
        let rule = LotteryRule::new(1, 5, 2).unwrap();
        let table = compute_frequencies(&[], &rule);
        let mut src = SequenceSource::new(vec![0.3]);
        assert_eq!(generate_weighted_bet(&table, 7, &mut src), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_weighted_zero_picks() {
        let rule = LotteryKind::MegaSena.rule();
        let table = compute_frequencies(&[], &rule);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_weighted_bet(&table, 0, &mut rng).is_empty());
    }

    #[test]
    fn test_weighted_cardinality_and_range() {
        for kind in LotteryKind::ALL {
            let rule = kind.rule();
            let history = make_test_draws(60, &rule);
            let table = compute_frequencies(&history, &rule);
            let mut rng = StdRng::seed_from_u64(7);
            for _ in 0..20 {
                let bet = generate_weighted_bet(&table, rule.numbers_per_draw(), &mut rng);
                assert_eq!(bet.len(), rule.numbers_per_draw(), "{kind}");
                assert!(bet.windows(2).all(|w| w[0] < w[1]), "{kind}: {bet:?}");
                assert!(bet.iter().all(|&n| rule.contains(n)), "{kind}: {bet:?}");
            }
        }
    }

    #[test]
    fn test_weighted_seed_determinism() {
        let rule = LotteryKind::MegaSena.rule();
        let table = compute_frequencies(&make_test_draws(30, &rule), &rule);
        let a = generate_weighted_bet(&table, 6, &mut StdRng::seed_from_u64(99));
        let b = generate_weighted_bet(&table, 6, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_weighted_favours_frequent_numbers() {
        let rule = LotteryRule::new(1, 10, 1).unwrap();
        let history: Vec<_> = (0..50).map(|i| draw(50 - i, &[10])).collect();
        let table = compute_frequencies(&history, &rule);
        let mut rng = StdRng::seed_from_u64(3);
        let hits = (0..500)
            .filter(|_| generate_weighted_bet(&table, 1, &mut rng) == vec![10])
            .count();
        // weight 51 of 60: expect ~425 hits
        assert!(hits > 350, "hits = {hits}");
    }
}
