//! Exhaustive closures ("fechamentos"): every k-subset of a chosen pool.
//!
//! Generation is never capped here. Callers check [`combination_count`] or
//! [`check_closure_size`] first and refuse pools that would explode.

use std::fmt;

use serde::Serialize;

use crate::error::{LotteryError, Result};
use crate::rules::LotteryRule;

pub const DEFAULT_COST_PER_GAME: f64 = 6.00;
const HIGH_COST_GAMES: usize = 1000;
const MODERATE_COST_GAMES: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosureResult {
    pub combinations: Vec<Vec<u8>>,
    pub total_games: usize,
    pub target_hits: usize,
    pub cost_per_game: f64,
    pub estimated_cost: f64,
    pub description: String,
}

/// `C(n, k)`, saturating at `u128::MAX`.
pub fn combination_count(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // the running product of i+1 consecutive integers divides exactly
        result = match result.checked_mul((n - i) as u128) {
            Some(v) => v / (i as u128 + 1),
            None => return u128::MAX,
        };
    }
    result
}

/// Cheap pre-check of the game count a pool would produce.
pub fn check_closure_size(pool_len: usize, rule: &LotteryRule, cap: u128) -> Result<u128> {
    let games = combination_count(pool_len, rule.numbers_per_draw());
    if games > cap {
        return Err(LotteryError::ClosureTooLarge { games, cap });
    }
    Ok(games)
}

/// Sorted, de-duplicated pool once every precondition holds.
fn validated_pool(selected: &[u8], rule: &LotteryRule, target_hits: usize) -> Result<Vec<u8>> {
    let k = rule.numbers_per_draw();
    if target_hits == 0 || target_hits > k {
        return Err(LotteryError::InvalidTargetHits {
            target: target_hits,
            max: k,
        });
    }
    if let Some(&n) = selected.iter().find(|&&n| !rule.contains(n)) {
        return Err(LotteryError::NumberOutOfRange {
            number: n,
            min: rule.min_number(),
            max: rule.max_number(),
        });
    }
    let mut pool = selected.to_vec();
    pool.sort_unstable();
    pool.dedup();

    let required = (target_hits + 2).max(k);
    if pool.len() < required {
        return Err(LotteryError::InsufficientPool {
            required,
            provided: pool.len(),
        });
    }
    Ok(pool)
}

fn backtrack(pool: &[u8], k: usize, start: usize, current: &mut Vec<u8>, out: &mut Vec<Vec<u8>>) {
    if current.len() == k {
        out.push(current.clone());
        return;
    }
    let needed = k - current.len();
    for i in start..=pool.len() - needed {
        current.push(pool[i]);
        backtrack(pool, k, i + 1, current, out);
        current.pop();
    }
}

/// All k-subsets of `pool` (sorted) in lexicographic order.
fn enumerate_combinations(pool: &[u8], k: usize) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    if k > pool.len() {
        return out;
    }
    let mut current = Vec::with_capacity(k);
    backtrack(pool, k, 0, &mut current, &mut out);
    out
}

pub fn generate_closure(selected: &[u8], rule: &LotteryRule, target_hits: usize) -> Result<ClosureResult> {
    generate_closure_with_cost(selected, rule, target_hits, DEFAULT_COST_PER_GAME)
}

pub fn generate_closure_with_cost(
    selected: &[u8],
    rule: &LotteryRule,
    target_hits: usize,
    cost_per_game: f64,
) -> Result<ClosureResult> {
    let pool = validated_pool(selected, rule, target_hits)?;
    let k = rule.numbers_per_draw();
    let combinations = enumerate_combinations(&pool, k);
    let total_games = combinations.len();
    let estimated_cost = total_games as f64 * cost_per_game;
    log::debug!("closure of {} numbers: {} games", pool.len(), total_games);

    Ok(ClosureResult {
        description: format!(
            "{} numbers closed into {} games of {} numbers; total cost {:.2}",
            pool.len(),
            total_games,
            k,
            estimated_cost
        ),
        combinations,
        total_games,
        target_hits,
        cost_per_game,
        estimated_cost,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CostTier {
    High,
    Moderate,
    Low,
}

impl CostTier {
    pub fn for_games(total_games: usize) -> Self {
        if total_games > HIGH_COST_GAMES {
            CostTier::High
        } else if total_games > MODERATE_COST_GAMES {
            CostTier::Moderate
        } else {
            CostTier::Low
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            CostTier::High => "high cost: consider a smaller pool or a shared bet",
            CostTier::Moderate => "moderate cost: check the budget before betting",
            CostTier::Low => "low cost: affordable closure",
        }
    }
}

impl fmt::Display for CostTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostAnalysis {
    pub break_even_odds: f64,
    pub cost_per_combination: f64,
    pub recommendation: CostTier,
}

pub fn analyze_cost(closure: &ClosureResult) -> CostAnalysis {
    let cost_per_combination = if closure.total_games > 0 {
        closure.estimated_cost / closure.total_games as f64
    } else {
        0.0
    };
    let break_even_odds = if closure.target_hits > 0 {
        closure.estimated_cost / closure.target_hits as f64
    } else {
        0.0
    };
    CostAnalysis {
        break_even_odds,
        cost_per_combination,
        recommendation: CostTier::for_games(closure.total_games),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosureMatch {
    pub matched_games: Vec<Vec<u8>>,
    pub total_matches: usize,
    /// `hit_counts[h]` = games with exactly `h` drawn numbers.
    pub hit_counts: Vec<usize>,
    pub best_hits: usize,
}

/// Post-hoc check of a closure against an actual draw. Never alters `combinations`.
pub fn validate_closure_match(combinations: &[Vec<u8>], drawn: &[u8], target_hits: usize) -> ClosureMatch {
    let width = combinations.iter().map(Vec::len).max().unwrap_or(0);
    let mut hit_counts = vec![0usize; width + 1];
    let mut matched_games = Vec::new();

    for game in combinations {
        let hits = game.iter().filter(|n| drawn.contains(n)).count();
        hit_counts[hits] += 1;
        if hits >= target_hits {
            matched_games.push(game.clone());
        }
    }

    let best_hits = hit_counts.iter().rposition(|&c| c > 0).unwrap_or(0);
    ClosureMatch {
        total_matches: matched_games.len(),
        matched_games,
        hit_counts,
        best_hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::LotteryKind;

    fn mega() -> LotteryRule {
        LotteryKind::MegaSena.rule()
    }

    #[test]
    fn test_combination_count() {
        assert_eq!(combination_count(10, 6), 210);
        assert_eq!(combination_count(60, 6), 50_063_860);
        assert_eq!(combination_count(6, 6), 1);
        assert_eq!(combination_count(5, 6), 0);
        assert_eq!(combination_count(7, 0), 1);
        assert_eq!(combination_count(100, 50), 100_891_344_545_564_193_334_812_497_256);
    }

    #[test]
    fn test_combination_count_saturates() {
        assert_eq!(combination_count(255, 127), u128::MAX);
    }

    #[test]
    fn test_closure_of_ten_numbers() {
        let pool: Vec<u8> = (1..=10).collect();
        let closure = generate_closure(&pool, &mega(), 4).unwrap();
        assert_eq!(closure.total_games, 210);
        assert_eq!(closure.combinations.len(), 210);
        assert_eq!(closure.total_games as u128, combination_count(10, 6));
        assert!((closure.estimated_cost - 210.0 * DEFAULT_COST_PER_GAME).abs() < 1e-9);
    }

    #[test]
    fn test_closure_lexicographic_order() {
        let pool = [9, 3, 7, 1, 5, 11, 2, 4];
        let closure = generate_closure(&pool, &mega(), 4).unwrap();
        assert_eq!(closure.combinations[0], vec![1, 2, 3, 4, 5, 7]);
        assert_eq!(closure.combinations[1], vec![1, 2, 3, 4, 5, 9]);
        assert_eq!(closure.combinations.last().unwrap(), &vec![3, 4, 5, 7, 9, 11]);
        assert!(closure.combinations.windows(2).all(|w| w[0] < w[1]));
        assert!(closure.combinations.iter().all(|c| c.len() == 6 && c.windows(2).all(|w| w[0] < w[1])));
    }

    #[test]
    fn test_closure_description() {
        let pool: Vec<u8> = (1..=8).collect();
        let closure = generate_closure_with_cost(&pool, &mega(), 4, 5.0).unwrap();
        assert_eq!(closure.total_games, 28);
        assert_eq!(closure.description, "8 numbers closed into 28 games of 6 numbers; total cost 140.00");
    }

    #[test]
    fn test_insufficient_pool() {
        let err = generate_closure(&[1, 2, 3], &mega(), 4).unwrap_err();
        assert_eq!(err, LotteryError::InsufficientPool { required: 6, provided: 3 });
    }

    #[test]
    fn test_insufficient_pool_counts_distinct_numbers() {
        let err = generate_closure(&[1, 1, 2, 2, 3, 3, 4, 5], &mega(), 5).unwrap_err();
        assert_eq!(err, LotteryError::InsufficientPool { required: 7, provided: 5 });
    }

    #[test]
    fn test_invalid_target_hits() {
        let pool: Vec<u8> = (1..=10).collect();
        assert!(matches!(
            generate_closure(&pool, &mega(), 0),
            Err(LotteryError::InvalidTargetHits { .. })
        ));
        assert!(matches!(
            generate_closure(&pool, &mega(), 7),
            Err(LotteryError::InvalidTargetHits { target: 7, max: 6 })
        ));
    }

    #[test]
    fn test_out_of_range_pool() {
        let err = generate_closure(&[1, 2, 3, 4, 5, 6, 61], &mega(), 4).unwrap_err();
        assert!(matches!(err, LotteryError::NumberOutOfRange { number: 61, .. }));
    }

    #[test]
    fn test_check_closure_size() {
        assert_eq!(check_closure_size(10, &mega(), 5000).unwrap(), 210);
        assert!(matches!(
            check_closure_size(20, &mega(), 5000),
            Err(LotteryError::ClosureTooLarge { games: 38_760, cap: 5000 })
        ));
    }

    #[test]
    fn test_analyze_cost() {
        let pool: Vec<u8> = (1..=10).collect();
        let closure = generate_closure_with_cost(&pool, &mega(), 4, 5.0).unwrap();
        let analysis = analyze_cost(&closure);
        assert!((analysis.cost_per_combination - 5.0).abs() < 1e-9);
        assert!((analysis.break_even_odds - 1050.0 / 4.0).abs() < 1e-9);
        assert_eq!(analysis.recommendation, CostTier::Low);
    }

    #[test]
    fn test_cost_tiers() {
        assert_eq!(CostTier::for_games(1001), CostTier::High);
        assert_eq!(CostTier::for_games(1000), CostTier::Moderate);
        assert_eq!(CostTier::for_games(501), CostTier::Moderate);
        assert_eq!(CostTier::for_games(500), CostTier::Low);
        assert!(CostTier::High.to_string().starts_with("high cost"));
    }

    #[test]
    fn test_validate_match_exact() {
        let combinations = vec![vec![1, 2, 3, 4, 5, 6], vec![1, 2, 3, 4, 5, 7]];
        let result = validate_closure_match(&combinations, &[1, 2, 3, 4, 5, 6], 6);
        assert_eq!(result.total_matches, 1);
        assert_eq!(result.matched_games, vec![vec![1, 2, 3, 4, 5, 6]]);
        assert_eq!(result.hit_counts, vec![0, 0, 0, 0, 0, 1, 1]);
        assert_eq!(result.best_hits, 6);
    }

    #[test]
    fn test_validate_match_threshold() {
        let pool: Vec<u8> = (1..=8).collect();
        let closure = generate_closure(&pool, &mega(), 4).unwrap();
        let drawn = [1, 2, 3, 4, 50, 60];
        let result = validate_closure_match(&closure.combinations, &drawn, 4);
        // every game holds 6 of 8 numbers, so at least 2 of {1,2,3,4}; exactly 4 in C(4,2) games
        assert_eq!(result.total_matches, 6);
        assert_eq!(result.best_hits, 4);
        assert_eq!(result.hit_counts.iter().sum::<usize>(), 28);
        assert_eq!(closure.combinations.len(), 28);
    }

    #[test]
    fn test_validate_match_empty() {
        let result = validate_closure_match(&[], &[1, 2, 3], 3);
        assert_eq!(result.total_matches, 0);
        assert_eq!(result.hit_counts, vec![0]);
        assert_eq!(result.best_hits, 0);
    }
}
