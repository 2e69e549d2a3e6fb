//! Point-type conversion engine.
//!
//! Converts an even amount of one point type into another at the base 2:1
//! rate, improved by the caller-supplied medal-bonus schedule (see
//! `config::conversion` for the shipped tier table). The debit, the credit,
//! and the append-only audit record commit as one transaction.

use crate::{
    config::conversion::{ConversionSchedule, MIN_CONVERSION_AMOUNT},
    core::{
        streak::medal_count,
        user::{adjust_points_atomic, require_user},
    },
    entities::{PointType, conversion},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};

/// Result of a conversion, including both updated balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionOutcome {
    /// Source point type
    pub from_type: PointType,
    /// Destination point type
    pub to_type: PointType,
    /// Amount actually debited from the source type
    pub debited: i64,
    /// Amount actually credited to the destination type
    pub credited: i64,
    /// Updated source balance
    pub from_balance: i64,
    /// Updated destination balance
    pub to_balance: i64,
}

/// Converts `amount` of `from_type` into `to_type` for one user.
///
/// `amount` must be a positive even integer of at least
/// [`MIN_CONVERSION_AMOUNT`], and the two types must differ; violations fail
/// with `InvalidAmount`. A short source balance fails with
/// `InsufficientBalance`. Nothing is mutated on a validation failure.
pub async fn convert(
    db: &DatabaseConnection,
    schedule: &ConversionSchedule,
    user_id: i64,
    from_type: PointType,
    to_type: PointType,
    amount: i64,
) -> Result<ConversionOutcome> {
    if from_type == to_type {
        return Err(Error::InvalidAmount { amount });
    }
    if amount < MIN_CONVERSION_AMOUNT || amount % 2 != 0 {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;

    let user = require_user(&txn, user_id).await?;
    let current = user.points(from_type);
    if current < amount {
        return Err(Error::InsufficientBalance {
            point_type: Some(from_type),
            current,
            required: amount,
        });
    }

    let medals = medal_count(&txn, user_id).await?;
    let credited = schedule.credit_for(amount, medals);

    adjust_points_atomic(&txn, user_id, from_type, -amount).await?;
    let updated = adjust_points_atomic(&txn, user_id, to_type, credited).await?;

    let record = conversion::ActiveModel {
        user_id: Set(user_id),
        from_type: Set(from_type),
        to_type: Set(to_type),
        amount_from: Set(amount),
        amount_to: Set(credited),
        timestamp: Set(chrono::Utc::now()),
        ..Default::default()
    };
    record.insert(&txn).await?;

    txn.commit().await?;

    Ok(ConversionOutcome {
        from_type,
        to_type,
        debited: amount,
        credited,
        from_balance: updated.points(from_type),
        to_balance: updated.points(to_type),
    })
}
