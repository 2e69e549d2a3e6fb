//! Habit completion toggling - the daily checklist operation.
//!
//! One call per tap: if no completion exists for (user, habit, date) it is
//! created and one unit of the habit's point type credited; if one exists it
//! is deleted and the unit debited. Both directions recompute the streak and
//! run the medal/group-achievement evaluation inside the same transaction,
//! so a crash can never leave a completion without its credit.

use crate::{
    core::{
        streak::{MEDAL_STREAK_DAYS, award_medal, maybe_award_group_bonus, recompute_streak},
        user::{adjust_points_atomic, require_user},
    },
    entities::{Completion, PointType, completion},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};

/// Result of a completion toggle, consumed by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// True when the toggle created a completion, false when it removed one
    pub completed: bool,
    /// The habit's point type
    pub point_type: PointType,
    /// Updated balance of that point type
    pub balance: i64,
    /// Current streak length after recomputation
    pub streak_length: i32,
    /// Whether this toggle earned the 30-day medal
    pub medal_awarded: bool,
    /// Whether this toggle completed the group achievement payout
    pub group_bonus_awarded: bool,
}

/// Habit ids the user completed on the given date, for the daily checklist.
pub async fn completions_on_date(
    db: &DatabaseConnection,
    user_id: i64,
    date: Date,
) -> Result<Vec<i64>> {
    Ok(Completion::find()
        .filter(completion::Column::UserId.eq(user_id))
        .filter(completion::Column::Date.eq(date))
        .all(db)
        .await?
        .into_iter()
        .map(|completion| completion.habit_id)
        .collect())
}

/// Toggles a habit completion for one calendar date.
///
/// Fails with `HabitNotFound` when the habit is deleted or does not belong
/// to a group the user is in. Untoggling when the typed balance is already
/// zero (the points were converted or spent) fails with
/// `InsufficientBalance` and leaves the completion in place - a balance is
/// never allowed to go negative.
pub async fn toggle_completion(
    db: &DatabaseConnection,
    user_id: i64,
    habit_id: i64,
    date: Date,
) -> Result<ToggleOutcome> {
    let txn = db.begin().await?;

    let user = require_user(&txn, user_id).await?;
    let habit = crate::core::habit::get_habit(&txn, habit_id)
        .await?
        .ok_or(Error::HabitNotFound { id: habit_id })?;
    if user.group_id != Some(habit.group_id) {
        return Err(Error::HabitNotFound { id: habit_id });
    }

    // Re-read inside the transaction: a racing duplicate tap resolves to
    // the opposite toggle instead of a conflict error
    let existing = Completion::find()
        .filter(completion::Column::UserId.eq(user_id))
        .filter(completion::Column::HabitId.eq(habit_id))
        .filter(completion::Column::Date.eq(date))
        .one(&txn)
        .await?;

    let (completed, updated_user) = match existing {
        Some(row) => {
            let current = user.points(habit.point_type);
            if current < 1 {
                return Err(Error::InsufficientBalance {
                    point_type: Some(habit.point_type),
                    current,
                    required: 1,
                });
            }
            row.delete(&txn).await?;
            let updated = adjust_points_atomic(&txn, user_id, habit.point_type, -1).await?;
            (false, updated)
        }
        None => {
            let row = completion::ActiveModel {
                user_id: Set(user_id),
                habit_id: Set(habit_id),
                date: Set(date),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            };
            row.insert(&txn).await?;
            let updated = adjust_points_atomic(&txn, user_id, habit.point_type, 1).await?;
            (true, updated)
        }
    };

    let streak = recompute_streak(&txn, user_id, habit_id).await?;

    let mut medal_awarded = false;
    let mut group_bonus_awarded = false;
    if completed && streak.current_length >= MEDAL_STREAK_DAYS {
        medal_awarded = award_medal(&txn, user_id, habit_id).await?;
        if medal_awarded {
            group_bonus_awarded = maybe_award_group_bonus(&txn, &habit).await?;
        }
    }

    txn.commit().await?;

    Ok(ToggleOutcome {
        completed,
        point_type: habit.point_type,
        balance: updated_user.points(habit.point_type),
        streak_length: streak.current_length,
        medal_awarded,
        group_bonus_awarded,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::streak::{get_streak, medal_count};
    use crate::test_utils::*;
    use chrono::NaiveDate;

    fn march(day: u32) -> Date {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_toggle_credits_one_unit() -> Result<()> {
        let (db, group, user) = setup_with_member().await?;
        let habit = create_test_habit(&db, group.id, "Run", PointType::Physical).await?;

        let outcome = toggle_completion(&db, user.id, habit.id, march(1)).await?;
        assert!(outcome.completed);
        assert_eq!(outcome.point_type, PointType::Physical);
        assert_eq!(outcome.balance, 1);
        assert_eq!(outcome.streak_length, 1);
        assert!(!outcome.medal_awarded);

        assert_eq!(completions_on_date(&db, user.id, march(1)).await?, vec![habit.id]);

        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_prior_state() -> Result<()> {
        let (db, group, user) = setup_with_member().await?;
        let habit = create_test_habit(&db, group.id, "Run", PointType::Physical).await?;

        toggle_completion(&db, user.id, habit.id, march(1)).await?;
        let outcome = toggle_completion(&db, user.id, habit.id, march(1)).await?;

        assert!(!outcome.completed);
        assert_eq!(outcome.balance, 0);
        assert_eq!(outcome.streak_length, 0);

        assert!(completions_on_date(&db, user.id, march(1)).await?.is_empty());
        let user = crate::core::user::require_user(&db, user.id).await?;
        assert_eq!(user.points_physical, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_requires_membership() -> Result<()> {
        let (db, group, _member) = setup_with_member().await?;
        let habit = create_test_habit(&db, group.id, "Run", PointType::Physical).await?;

        // A user with no group cannot toggle the habit
        let outsider = create_test_user(&db, 99).await?;
        let result = toggle_completion(&db, outsider.id, habit.id, march(1)).await;
        assert!(matches!(result.unwrap_err(), Error::HabitNotFound { id: _ }));

        // Nor can a member of a different group
        let other_group = create_test_group(&db, "Others").await?;
        crate::core::group::join_group(&db, outsider.id, other_group.id).await?;
        let result = toggle_completion(&db, outsider.id, habit.id, march(1)).await;
        assert!(matches!(result.unwrap_err(), Error::HabitNotFound { id: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_deleted_habit() -> Result<()> {
        let (db, group, user) = setup_with_member().await?;
        let habit = create_test_habit(&db, group.id, "Run", PointType::Physical).await?;
        crate::core::habit::delete_habit(&db, habit.id).await?;

        let result = toggle_completion(&db, user.id, habit.id, march(1)).await;
        assert!(matches!(result.unwrap_err(), Error::HabitNotFound { id: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_untoggle_with_spent_balance_rejected() -> Result<()> {
        let (db, group, user) = setup_with_member().await?;
        let habit = create_test_habit(&db, group.id, "Run", PointType::Physical).await?;

        toggle_completion(&db, user.id, habit.id, march(1)).await?;
        toggle_completion(&db, user.id, habit.id, march(2)).await?;

        // Convert both physical points away, then try to untoggle
        let schedule = crate::config::conversion::ConversionSchedule::default();
        crate::core::convert::convert(
            &db,
            &schedule,
            user.id,
            PointType::Physical,
            PointType::Arts,
            2,
        )
        .await?;

        let result = toggle_completion(&db, user.id, habit.id, march(1)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientBalance { current: 0, required: 1, .. }
        ));

        // The completion is still there, and no balance went negative
        assert_eq!(completions_on_date(&db, user.id, march(1)).await?, vec![habit.id]);
        let user = crate::core::user::require_user(&db, user.id).await?;
        assert_eq!(user.points_physical, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_thirty_consecutive_days_awards_medal_once() -> Result<()> {
        let (db, group, user) = setup_with_member().await?;
        let habit = create_test_habit(&db, group.id, "Run", PointType::Physical).await?;

        let mut medal_days = Vec::new();
        for day in 1..=31 {
            let outcome = toggle_completion(&db, user.id, habit.id, march(day)).await?;
            if outcome.medal_awarded {
                medal_days.push(day);
            }
        }

        // Awarded exactly once, on the 30th day; the streak keeps growing
        assert_eq!(medal_days, vec![30]);
        assert_eq!(medal_count(&db, user.id).await?, 1);
        let streak = get_streak(&db, user.id, habit.id).await?.unwrap();
        assert_eq!(streak.current_length, 31);

        Ok(())
    }

    #[tokio::test]
    async fn test_gap_resets_streak() -> Result<()> {
        let (db, group, user) = setup_with_member().await?;
        let habit = create_test_habit(&db, group.id, "Run", PointType::Physical).await?;

        for day in 1..=14 {
            toggle_completion(&db, user.id, habit.id, march(day)).await?;
        }
        // Day 15 missed; day 16 begins a fresh streak of 1
        let outcome = toggle_completion(&db, user.id, habit.id, march(16)).await?;
        assert_eq!(outcome.streak_length, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_medal_completes_group_achievement() -> Result<()> {
        let (db, group, alice) = setup_with_member().await?;
        let bob = create_test_user(&db, 2).await?;
        crate::core::group::join_group(&db, bob.id, group.id).await?;
        let habit = create_test_habit(&db, group.id, "Run", PointType::Physical).await?;

        for day in 1..=30 {
            toggle_completion(&db, alice.id, habit.id, march(day)).await?;
        }
        let mut bob_outcomes = Vec::new();
        for day in 1..=30 {
            bob_outcomes.push(toggle_completion(&db, bob.id, habit.id, march(day)).await?);
        }

        // Bob's medal completed the set: his 30th toggle paid the bonus
        let last = bob_outcomes.last().unwrap();
        assert!(last.medal_awarded);
        assert!(last.group_bonus_awarded);

        let alice = crate::core::user::require_user(&db, alice.id).await?;
        let bob = crate::core::user::require_user(&db, bob.id).await?;
        assert_eq!(alice.coins, crate::core::streak::GROUP_MEDAL_BONUS_COINS);
        assert_eq!(bob.coins, crate::core::streak::GROUP_MEDAL_BONUS_COINS);

        Ok(())
    }
}
