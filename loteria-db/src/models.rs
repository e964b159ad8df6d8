use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

/// Generator that produced a stored bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetStrategy {
    Weighted,
    HotCold,
    Deterministic,
}

impl BetStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetStrategy::Weighted => "weighted",
            BetStrategy::HotCold => "hot-cold",
            BetStrategy::Deterministic => "deterministic",
        }
    }
}

impl fmt::Display for BetStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "weighted" => Ok(BetStrategy::Weighted),
            "hot-cold" => Ok(BetStrategy::HotCold),
            "deterministic" => Ok(BetStrategy::Deterministic),
            other => bail!("Estratégia desconhecida: '{}'", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredBet {
    pub id: i64,
    pub lottery: String,
    pub created_at: String,
    pub strategy: BetStrategy,
    pub numbers: Vec<u8>,
    pub sum: u32,
    pub confidence: f64,
    pub reasoning: String,
}

pub fn encode_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn decode_numbers(raw: &str) -> Result<Vec<u8>> {
    raw.split_whitespace()
        .map(|s| {
            s.parse::<u8>()
                .with_context(|| format!("Número inválido no banco: '{}'", s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_numbers() {
        assert_eq!(encode_numbers(&[4, 8, 15, 16, 23, 42]), "4 8 15 16 23 42");
        assert_eq!(decode_numbers("0 7  99").unwrap(), vec![0, 7, 99]);
        assert!(decode_numbers("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_numbers("1 x 3").is_err());
        assert!(decode_numbers("300").is_err());
    }

    #[test]
    fn test_strategy_from_str() {
        for s in [BetStrategy::Weighted, BetStrategy::HotCold, BetStrategy::Deterministic] {
            assert_eq!(s.as_str().parse::<BetStrategy>().unwrap(), s);
        }
        assert!("random".parse::<BetStrategy>().is_err());
    }
}
