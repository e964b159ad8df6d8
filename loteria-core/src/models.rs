use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{LotteryError, Result};
use crate::rules::LotteryRule;

/// One historical round. Numbers are kept sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draw {
    contest: u32,
    date: NaiveDate,
    numbers: Vec<u8>,
}

impl Draw {
    pub fn new(contest: u32, date: NaiveDate, mut numbers: Vec<u8>) -> Self {
        numbers.sort_unstable();
        Self { contest, date, numbers }
    }

    pub fn contest(&self) -> u32 {
        self.contest
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn date_iso(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }

    pub fn contains(&self, n: u8) -> bool {
        self.numbers.binary_search(&n).is_ok()
    }

    pub fn sum(&self) -> u32 {
        self.numbers.iter().map(|&n| n as u32).sum()
    }

    /// Checks cardinality, range and uniqueness against `rule`.
    pub fn validate(&self, rule: &LotteryRule) -> Result<()> {
        let invalid = |reason: String| LotteryError::InvalidDraw {
            contest: self.contest,
            reason,
        };
        if self.numbers.len() != rule.numbers_per_draw() {
            return Err(invalid(format!(
                "{} numbers instead of {}",
                self.numbers.len(),
                rule.numbers_per_draw()
            )));
        }
        if let Some(&n) = self.numbers.iter().find(|&&n| !rule.contains(n)) {
            return Err(invalid(format!(
                "number {} outside {}-{}",
                n,
                rule.min_number(),
                rule.max_number()
            )));
        }
        if let Some(w) = self.numbers.windows(2).find(|w| w[0] == w[1]) {
            return Err(invalid(format!("duplicate number {}", w[0])));
        }
        Ok(())
    }
}

/// True when contests strictly decrease, i.e. index 0 is the most recent draw.
pub fn is_newest_first(history: &[Draw]) -> bool {
    history.windows(2).all(|w| w[0].contest > w[1].contest)
}

/// Mean of the draw sums, `None` for an empty history.
pub fn mean_sum(history: &[Draw]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let total: u64 = history.iter().map(|d| d.sum() as u64).sum();
    Some(total as f64 / history.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub numbers: Vec<u8>,
    pub sum: u32,
    pub reasoning: String,
    /// Advisory only, in `[0, 1]`.
    pub confidence: f64,
}

impl GenerationResult {
    /// Wraps a sampled bet, sorting it and computing its sum.
    pub fn from_numbers(mut numbers: Vec<u8>, reasoning: String, confidence: f64) -> Self {
        numbers.sort_unstable();
        let sum = numbers.iter().map(|&n| n as u32).sum();
        Self {
            numbers,
            sum,
            reasoning,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberStats {
    pub number: u8,
    pub frequency: u32,
    pub gap: u32,
    pub never_seen: bool,
}

/// Synthetic newest-first history whose draws are valid for `rule`.
#[cfg(test)]
pub(crate) fn make_test_draws(n: usize, rule: &LotteryRule) -> Vec<Draw> {
    let range = rule.range_size();
    let picks = rule.numbers_per_draw();
    let stride = range / picks;
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..n)
        .map(|i| {
            let contest = (n - i) as u32;
            let numbers = (0..picks)
                .map(|j| rule.min_number() + ((i * 7 + j * stride) % range) as u8)
                .collect();
            let date = start + chrono::Days::new(contest as u64 * 3);
            Draw::new(contest, date, numbers)
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn draw(contest: u32, numbers: &[u8]) -> Draw {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(contest as u64);
    Draw::new(contest, date, numbers.to_vec())
}
