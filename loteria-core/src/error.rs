use thiserror::Error;

pub type Result<T> = std::result::Result<T, LotteryError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LotteryError {
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    #[error("invalid draw {contest}: {reason}")]
    InvalidDraw { contest: u32, reason: String },

    #[error("pool too small: {provided} distinct numbers given, at least {required} required")]
    InsufficientPool { required: usize, provided: usize },

    #[error("target hits {target} must be between 1 and {max}")]
    InvalidTargetHits { target: usize, max: usize },

    #[error("number {number} outside range {min}-{max}")]
    NumberOutOfRange { number: u8, min: u8, max: u8 },

    #[error("unknown lottery '{0}'")]
    UnknownLottery(String),

    #[error("closure would produce {games} games, above the cap of {cap}")]
    ClosureTooLarge { games: u128, cap: u128 },
}
