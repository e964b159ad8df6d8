use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{LotteryError, Result};

/// Half-width of the sum acceptance band when the rule does not override it.
pub const DEFAULT_SUM_TOLERANCE: u32 = 30;

/// Static description of a lottery variant. Validated once, immutable after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LotteryRule {
    min_number: u8,
    max_number: u8,
    numbers_per_draw: usize,
    sum_tolerance: u32,
}

impl LotteryRule {
    pub fn new(min_number: u8, max_number: u8, numbers_per_draw: usize) -> Result<Self> {
        if min_number > max_number {
            return Err(LotteryError::InvalidRule(format!(
                "min number {min_number} is above max number {max_number}"
            )));
        }
        let range = (max_number - min_number) as usize + 1;
        if numbers_per_draw == 0 {
            return Err(LotteryError::InvalidRule(
                "a draw must contain at least one number".to_string(),
            ));
        }
        if numbers_per_draw > range {
            return Err(LotteryError::InvalidRule(format!(
                "{numbers_per_draw} numbers per draw do not fit in range {min_number}-{max_number}"
            )));
        }
        Ok(Self {
            min_number,
            max_number,
            numbers_per_draw,
            sum_tolerance: DEFAULT_SUM_TOLERANCE,
        })
    }

    pub fn with_sum_tolerance(mut self, tolerance: u32) -> Self {
        self.sum_tolerance = tolerance;
        self
    }

    pub fn min_number(&self) -> u8 {
        self.min_number
    }

    pub fn max_number(&self) -> u8 {
        self.max_number
    }

    pub fn numbers_per_draw(&self) -> usize {
        self.numbers_per_draw
    }

    pub fn sum_tolerance(&self) -> u32 {
        self.sum_tolerance
    }

    pub fn range_size(&self) -> usize {
        (self.max_number - self.min_number) as usize + 1
    }

    pub fn contains(&self, n: u8) -> bool {
        n >= self.min_number && n <= self.max_number
    }

    pub fn numbers(&self) -> std::ops::RangeInclusive<u8> {
        self.min_number..=self.max_number
    }

    pub fn index_of(&self, n: u8) -> usize {
        (n - self.min_number) as usize
    }

    /// Draws a number is expected to wait between appearances.
    pub fn expected_gap(&self) -> f64 {
        self.range_size() as f64 / self.numbers_per_draw as f64
    }

    pub fn midpoint(&self) -> f64 {
        (self.min_number as f64 + self.max_number as f64) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LotteryKind {
    MegaSena,
    Lotofacil,
    Quina,
    Lotomania,
    DuplaSena,
    Timemania,
    DiaDeSorte,
}

impl LotteryKind {
    pub const ALL: [LotteryKind; 7] = [
        LotteryKind::MegaSena,
        LotteryKind::Lotofacil,
        LotteryKind::Quina,
        LotteryKind::Lotomania,
        LotteryKind::DuplaSena,
        LotteryKind::Timemania,
        LotteryKind::DiaDeSorte,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LotteryKind::MegaSena => "mega-sena",
            LotteryKind::Lotofacil => "lotofacil",
            LotteryKind::Quina => "quina",
            LotteryKind::Lotomania => "lotomania",
            LotteryKind::DuplaSena => "dupla-sena",
            LotteryKind::Timemania => "timemania",
            LotteryKind::DiaDeSorte => "dia-de-sorte",
        }
    }

    fn bounds(&self) -> (u8, u8, usize) {
        match self {
            LotteryKind::MegaSena => (1, 60, 6),
            LotteryKind::Lotofacil => (1, 25, 15),
            LotteryKind::Quina => (1, 80, 5),
            LotteryKind::Lotomania => (0, 99, 20),
            LotteryKind::DuplaSena => (1, 50, 6),
            LotteryKind::Timemania => (1, 80, 7),
            LotteryKind::DiaDeSorte => (1, 31, 7),
        }
    }

    pub fn rule(&self) -> LotteryRule {
        let (min, max, picks) = self.bounds();
        LotteryRule {
            min_number: min,
            max_number: max,
            numbers_per_draw: picks,
            sum_tolerance: DEFAULT_SUM_TOLERANCE,
        }
    }

    /// Price of a single minimum bet.
    pub fn cost_per_game(&self) -> f64 {
        match self {
            LotteryKind::MegaSena => 6.00,
            LotteryKind::Lotofacil => 3.50,
            LotteryKind::Quina => 3.00,
            LotteryKind::Lotomania => 3.00,
            LotteryKind::DuplaSena => 3.00,
            LotteryKind::Timemania => 3.50,
            LotteryKind::DiaDeSorte => 2.50,
        }
    }
}

impl fmt::Display for LotteryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LotteryKind {
    type Err = LotteryError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        LotteryKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| LotteryError::UnknownLottery(s.to_string()))
    }
}
