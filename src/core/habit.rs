//! Habit business logic - creation, editing, and deletion with reconciliation.
//!
//! Habits are shared per group. Editing a habit's point type and deleting a
//! habit both invalidate previously credited points, so those paths rebuild
//! the affected users' balances from source facts instead of patching them
//! incrementally.

use crate::{
    core::reconcile::{BalanceDiff, sync_type_balance},
    entities::{Completion, Habit, PointType, Streak, completion, habit, streak},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::BTreeSet;

/// One user's balance correction caused by a habit deletion or retype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffectedUser {
    /// The user whose balance was rebuilt
    pub user_id: i64,
    /// Stored-versus-recomputed balance for the habit's point type
    pub diff: BalanceDiff,
}

/// Result of deleting a habit: the removed habit plus the per-user
/// before/after balance diff of its point type.
#[derive(Debug, Clone)]
pub struct HabitDeletion {
    /// The habit that was removed
    pub habit: habit::Model,
    /// Number of completion rows removed with it
    pub completions_removed: u64,
    /// Balance corrections applied, one entry per affected user
    pub affected: Vec<AffectedUser>,
}

/// Creates a new habit in a group.
pub async fn create_habit(
    db: &DatabaseConnection,
    group_id: i64,
    name: String,
    point_type: PointType,
) -> Result<habit::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Habit name cannot be empty".to_string(),
        });
    }

    crate::core::group::get_group(db, group_id)
        .await?
        .ok_or(Error::GroupNotFound { id: group_id })?;

    let habit = habit::ActiveModel {
        group_id: Set(group_id),
        name: Set(name.trim().to_string()),
        point_type: Set(point_type),
        is_deleted: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    habit.insert(db).await.map_err(Into::into)
}

/// Fetches a habit by id, returning None when missing or deleted.
pub async fn get_habit<C>(db: &C, habit_id: i64) -> Result<Option<habit::Model>>
where
    C: ConnectionTrait,
{
    Ok(Habit::find_by_id(habit_id)
        .one(db)
        .await?
        .filter(|habit| !habit.is_deleted))
}

/// All active habits of a group, oldest first (the daily checklist order).
pub async fn get_group_habits(
    db: &DatabaseConnection,
    group_id: i64,
) -> Result<Vec<habit::Model>> {
    Habit::find()
        .filter(habit::Column::GroupId.eq(group_id))
        .filter(habit::Column::IsDeleted.eq(false))
        .order_by_asc(habit::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Renames and/or retypes a habit.
///
/// A retype moves every past completion's credit to the new point type, so
/// both the old and the new typed balance of each affected user are rebuilt
/// from source facts inside the same transaction.
pub async fn update_habit(
    db: &DatabaseConnection,
    habit_id: i64,
    new_name: String,
    new_point_type: PointType,
) -> Result<habit::Model> {
    if new_name.trim().is_empty() {
        return Err(Error::Config {
            message: "Habit name cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    let habit = get_habit(&txn, habit_id)
        .await?
        .ok_or(Error::HabitNotFound { id: habit_id })?;
    let old_point_type = habit.point_type;

    let mut active: habit::ActiveModel = habit.into();
    active.name = Set(new_name.trim().to_string());
    active.point_type = Set(new_point_type);
    let updated = active.update(&txn).await?;

    if old_point_type != new_point_type {
        for user_id in affected_user_ids(&txn, habit_id).await? {
            sync_type_balance(&txn, user_id, old_point_type).await?;
            sync_type_balance(&txn, user_id, new_point_type).await?;
        }
    }

    txn.commit().await?;
    Ok(updated)
}

/// Deletes a habit and all its completions, then rebuilds every affected
/// user's balance of the habit's point type from the remaining source facts.
///
/// The habit row itself is soft-deleted so audit rows keep a valid referent;
/// its completions and cached streaks are removed for real. Medals earned on
/// the habit persist.
pub async fn delete_habit(db: &DatabaseConnection, habit_id: i64) -> Result<HabitDeletion> {
    let txn = db.begin().await?;

    let habit = get_habit(&txn, habit_id)
        .await?
        .ok_or(Error::HabitNotFound { id: habit_id })?;

    let user_ids = affected_user_ids(&txn, habit_id).await?;

    let removed = Completion::delete_many()
        .filter(completion::Column::HabitId.eq(habit_id))
        .exec(&txn)
        .await?
        .rows_affected;

    Streak::delete_many()
        .filter(streak::Column::HabitId.eq(habit_id))
        .exec(&txn)
        .await?;

    let mut active: habit::ActiveModel = habit.clone().into();
    active.is_deleted = Set(true);
    let deleted = active.update(&txn).await?;

    let mut affected = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        let diff = sync_type_balance(&txn, user_id, habit.point_type).await?;
        affected.push(AffectedUser { user_id, diff });
    }

    txn.commit().await?;

    Ok(HabitDeletion {
        habit: deleted,
        completions_removed: removed,
        affected,
    })
}

/// Distinct users with at least one completion of the habit.
async fn affected_user_ids<C>(db: &C, habit_id: i64) -> Result<BTreeSet<i64>>
where
    C: ConnectionTrait,
{
    Ok(Completion::find()
        .filter(completion::Column::HabitId.eq(habit_id))
        .all(db)
        .await?
        .into_iter()
        .map(|completion| completion.user_id)
        .collect())
}
