//! Unified error types for the habit-rewards ledger.
//!
//! All validation failures are returned as typed errors to the caller with no
//! partial mutation committed; the presentation layer owns user-facing
//! wording. No error here is fatal to the process - every operation can be
//! retried by re-issuing the same user intent.

use crate::entities::PointType;
use thiserror::Error;

/// Crate-wide error type covering validation, lookup, and infrastructure failures
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong
        message: String,
    },

    #[error("User {id} not found")]
    UserNotFound {
        /// Platform user id that failed to resolve
        id: i64,
    },

    #[error("Group {id} not found")]
    GroupNotFound {
        /// Group id that failed to resolve
        id: i64,
    },

    #[error("Habit {id} not found or not accessible")]
    HabitNotFound {
        /// Habit id that failed to resolve for the caller
        id: i64,
    },

    #[error("Reward {id} not found, inactive, or out of stock")]
    RewardNotFound {
        /// Reward id that failed to resolve
        id: i64,
    },

    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount as supplied by the caller
        amount: i64,
    },

    #[error("Insufficient {point_type:?} balance: have {current}, need {required}")]
    InsufficientBalance {
        /// The balance that would have gone negative; None means coins
        point_type: Option<PointType>,
        /// Balance at validation time
        current: i64,
        /// Amount the operation needed
        required: i64,
    },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
