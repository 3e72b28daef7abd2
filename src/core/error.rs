//! Errors raised by gameplay actions

use thiserror::Error;

use super::state::Skill;

/// Result alias for gameplay actions
pub type GameResult<T> = Result<T, GameError>;

/// A gameplay rule refused an action
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("Not enough coins: need ¥{needed:.2}, have ¥{available:.2}")]
    InsufficientFunds { needed: f64, available: f64 },

    #[error("Not enough stamina: need {needed}, have {available}. Take a rest first")]
    InsufficientStamina { needed: u32, available: u32 },

    #[error("Stamina is already full")]
    StaminaFull,

    #[error("Order {0} not found")]
    NoSuchOrder(String),

    #[error("Order {id} cannot do that while {status}")]
    InvalidOrderState { id: String, status: String },

    #[error("Already carrying {0} orders")]
    ActiveOrderLimit(usize),

    #[error("Enter an amount greater than zero")]
    InvalidAmount,

    #[error("Medical insurance is already active")]
    AlreadyInsured,

    #[error("{0} is already installed")]
    UpgradeOwned(String),

    #[error("Unknown stock {0}")]
    UnknownStock(String),

    #[error("Share count must be greater than zero")]
    InvalidShares,

    #[error("Leverage must be between 1x and {max}x")]
    InvalidLeverage { max: f64 },

    #[error("Position in {symbol} is held at {held}x, cannot add at {requested}x")]
    LeverageMismatch {
        symbol: String,
        held: f64,
        requested: f64,
    },

    #[error("No position in {0}")]
    NoPosition(String),

    #[error("Only {held} shares held, cannot sell {requested}")]
    InsufficientShares { held: u32, requested: u32 },

    #[error("Invalid lottery numbers: {0}")]
    InvalidLotteryNumbers(String),

    #[error("{skill} level {current} is below the required {required}")]
    RequirementNotMet {
        skill: Skill,
        required: u32,
        current: u32,
    },

    #[error("Not enrolled in {0}")]
    NotEnrolled(String),

    #[error("Already enrolled in {0}")]
    AlreadyEnrolled(String),

    #[error("{0} is already completed")]
    CourseCompleted(String),

    #[error("Studied {studied} of {required} minutes, keep studying")]
    InsufficientStudyTime { studied: u32, required: u32 },

    #[error("Monthly bill not due yet: {days_left} days left")]
    NotDueYet { days_left: u32 },

    #[error("No customer is waiting for a reply")]
    NoPendingInteraction,

    #[error("That reply is not available")]
    InvalidOption,

    #[error("Already working as {0}")]
    AlreadyInCareer(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_numbers() {
        let err = GameError::InsufficientFunds {
            needed: 12.5,
            available: 3.0,
        };
        assert_eq!(err.to_string(), "Not enough coins: need ¥12.50, have ¥3.00");

        let err = GameError::RequirementNotMet {
            skill: Skill::Communication,
            required: 2,
            current: 0,
        };
        assert_eq!(
            err.to_string(),
            "Communication level 0 is below the required 2"
        );
    }
}
