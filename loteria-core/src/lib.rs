pub mod closure;
pub mod error;
pub mod generators;
pub mod models;
pub mod random;
pub mod rules;
pub mod stats;

pub use error::{LotteryError, Result};
pub use models::{Draw, GenerationResult};
pub use rules::{LotteryKind, LotteryRule};
