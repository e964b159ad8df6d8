use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use loteria_core::generators::HotColdOptions;
use loteria_core::generators::hot_cold::DEFAULT_HOT_BIAS;
use loteria_core::{LotteryKind, LotteryRule};

/// Closures above this many games are refused before generation.
pub const DEFAULT_CLOSURE_CAP: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub closure_cap: u64,
    pub window: u32,
    pub hot_bias: f64,
    pub hot_pool_size: Option<usize>,
    pub cold_pool_size: Option<usize>,
    pub sum_tolerance: Option<u32>,
    pub cost_per_game: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            closure_cap: DEFAULT_CLOSURE_CAP,
            window: 100,
            hot_bias: DEFAULT_HOT_BIAS,
            hot_pool_size: None,
            cold_pool_size: None,
            sum_tolerance: None,
            cost_per_game: None,
        }
    }
}

impl Settings {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Não foi possível ler {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&json)
            .with_context(|| format!("JSON inválido em {}", path.display()))?;
        log::debug!("settings loaded from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    pub fn rule(&self, kind: LotteryKind) -> LotteryRule {
        let rule = kind.rule();
        match self.sum_tolerance {
            Some(t) => rule.with_sum_tolerance(t),
            None => rule,
        }
    }

    pub fn cost_per_game(&self, kind: LotteryKind) -> f64 {
        self.cost_per_game.unwrap_or_else(|| kind.cost_per_game())
    }

    pub fn hot_cold_options(&self) -> HotColdOptions {
        HotColdOptions {
            hot_bias: self.hot_bias,
            hot_pool_size: self.hot_pool_size,
            cold_pool_size: self.cold_pool_size,
        }
    }
}
