//! Balance reconciliation from source facts.
//!
//! A user's typed balance is derivable at any time from the append-only
//! record: completions of non-deleted habits, sale credits, purchase debits,
//! and conversion legs. This module recomputes that value, logs any drift
//! between stored and recomputed balances, and corrects the stored side.
//! It backs habit deletion/retyping and the standalone "recalculate all
//! points" repair operation.
//!
//! Coins are deliberately out of scope: group achievement bonuses carry no
//! audit rows, so there is no fact set to recompute the coin balance from.

use crate::{
    entities::{Completion, Conversion, Habit, Purchase, User, completion, conversion, purchase, user, PointType},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::warn;

/// Stored-versus-recomputed balance for one point type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDiff {
    /// The point type examined
    pub point_type: PointType,
    /// Balance found in the users row
    pub stored: i64,
    /// Balance recomputed from source facts
    pub recomputed: i64,
}

impl BalanceDiff {
    /// Whether the stored balance disagreed with the recomputation.
    #[must_use]
    pub const fn drifted(&self) -> bool {
        self.stored != self.recomputed
    }
}

/// Reconciliation result for one user: the before/after of all five types.
#[derive(Debug, Clone)]
pub struct UserReconciliation {
    /// The user examined
    pub user_id: i64,
    /// One entry per point type, stored versus recomputed
    pub diffs: Vec<BalanceDiff>,
}

impl UserReconciliation {
    /// Whether any balance was corrected for this user.
    #[must_use]
    pub fn corrected(&self) -> bool {
        self.diffs.iter().any(BalanceDiff::drifted)
    }
}

/// Result of a full repair pass over every user.
#[derive(Debug, Clone)]
pub struct RecalculationReport {
    /// Per-user reconciliation results, in user-id order
    pub users: Vec<UserReconciliation>,
    /// Number of users whose stored balances had drifted
    pub corrected_users: usize,
    /// Number of users skipped because their reconciliation failed
    pub skipped_users: usize,
}

/// Recomputes one typed balance from source facts:
/// completions of non-deleted habits of that type, plus sale credits, minus
/// purchase debits, plus conversion credits, minus conversion debits.
pub async fn recompute_type_balance<C>(
    db: &C,
    user_id: i64,
    point_type: PointType,
) -> Result<i64>
where
    C: ConnectionTrait,
{
    // Cast safety: a user cannot complete more habits than fit in i64.
    #[allow(clippy::cast_possible_wrap)]
    let completed = Completion::find()
        .filter(completion::Column::UserId.eq(user_id))
        .find_also_related(Habit)
        .all(db)
        .await?
        .into_iter()
        .filter(|(_, habit)| {
            habit
                .as_ref()
                .is_some_and(|h| !h.is_deleted && h.point_type == point_type)
        })
        .count() as i64;

    let sold: i64 = Purchase::find()
        .filter(purchase::Column::SellerId.eq(user_id))
        .all(db)
        .await?
        .iter()
        .map(|p| p.breakdown.0.get(&point_type).copied().unwrap_or(0))
        .sum();

    let bought: i64 = Purchase::find()
        .filter(purchase::Column::BuyerId.eq(user_id))
        .all(db)
        .await?
        .iter()
        .map(|p| p.breakdown.0.get(&point_type).copied().unwrap_or(0))
        .sum();

    let converted_in: i64 = Conversion::find()
        .filter(conversion::Column::UserId.eq(user_id))
        .filter(conversion::Column::ToType.eq(point_type))
        .all(db)
        .await?
        .iter()
        .map(|c| c.amount_to)
        .sum();

    let converted_out: i64 = Conversion::find()
        .filter(conversion::Column::UserId.eq(user_id))
        .filter(conversion::Column::FromType.eq(point_type))
        .all(db)
        .await?
        .iter()
        .map(|c| c.amount_from)
        .sum();

    Ok(completed + sold - bought + converted_in - converted_out)
}

/// Recomputes one typed balance and rewrites the stored value when it
/// disagrees. Drift is logged, never silently ignored.
///
/// Returns the (stored, recomputed) pair for reporting.
pub async fn sync_type_balance<C>(
    db: &C,
    user_id: i64,
    point_type: PointType,
) -> Result<BalanceDiff>
where
    C: ConnectionTrait,
{
    let user = crate::core::user::require_user(db, user_id).await?;
    let stored = user.points(point_type);
    let recomputed = recompute_type_balance(db, user_id, point_type).await?;

    if stored != recomputed {
        warn!(
            user_id,
            point_type = point_type.as_str(),
            stored,
            recomputed,
            "stored balance disagrees with recomputation, correcting"
        );

        let mut active: user::ActiveModel = user.into();
        match point_type {
            PointType::Physical => active.points_physical = Set(recomputed),
            PointType::Arts => active.points_arts = Set(recomputed),
            PointType::FoodRelated => active.points_food_related = Set(recomputed),
            PointType::Educational => active.points_educational = Set(recomputed),
            PointType::Other => active.points_other = Set(recomputed),
        }
        active.update(db).await?;
    }

    Ok(BalanceDiff { point_type, stored, recomputed })
}

/// Reconciles all five typed balances for one user.
pub async fn reconcile_user<C>(db: &C, user_id: i64) -> Result<UserReconciliation>
where
    C: ConnectionTrait,
{
    let mut diffs = Vec::with_capacity(PointType::ALL.len());
    for point_type in PointType::ALL {
        diffs.push(sync_type_balance(db, user_id, point_type).await?);
    }
    Ok(UserReconciliation { user_id, diffs })
}

/// The standalone repair operation: reconciles every user's typed balances
/// from source facts.
///
/// Each user is processed in their own transaction; a user whose
/// reconciliation fails (e.g. dangling references after manual edits) is
/// logged and skipped rather than aborting the whole pass. Running the pass
/// twice in a row produces identical balances.
pub async fn recalculate_all_points(db: &DatabaseConnection) -> Result<RecalculationReport> {
    let users = User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?;

    let mut results = Vec::with_capacity(users.len());
    let mut corrected_users = 0;
    let mut skipped_users = 0;

    for user in users {
        let txn = db.begin().await?;
        match reconcile_user(&txn, user.id).await {
            Ok(reconciliation) => {
                txn.commit().await?;
                if reconciliation.corrected() {
                    corrected_users += 1;
                }
                results.push(reconciliation);
            }
            Err(error) => {
                warn!(user_id = user.id, %error, "skipping user in repair pass");
                skipped_users += 1;
                // Dropping the transaction rolls it back
            }
        }
    }

    Ok(RecalculationReport {
        users: results,
        corrected_users,
        skipped_users,
    })
}
