//! Streak recomputation, medal awards, and group achievements.
//!
//! The streak state machine per (user, habit) is `NoStreak -> Active(n) ->
//! Active(n+1) -> ... -> Medaled`: consecutive-day completions extend the
//! run, any gap day resets it, and the 30th consecutive day awards a
//! permanent medal. The streak count keeps growing past 30; the medal is
//! granted once, enforced by the (user, habit) unique key. Streak rows are
//! pure caches rebuilt from completion dates on every change, which also
//! makes backdated toggles safe.

use crate::{
    core::{group::get_group_members, user::adjust_coins_atomic},
    entities::{
        Completion, Medal, Streak, SystemState, completion, habit, medal, streak, system_state,
    },
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Consecutive days needed for a medal.
pub const MEDAL_STREAK_DAYS: i32 = 30;

/// Flat coin bonus paid to every group member when all of them hold a medal
/// for the same habit.
pub const GROUP_MEDAL_BONUS_COINS: i64 = 10;

/// One-shot marker key for a group achievement payout.
fn group_bonus_key(group_id: i64, habit_id: i64) -> String {
    format!("group_medal_bonus:{group_id}:{habit_id}")
}

/// Rebuilds the cached streak row for (user, habit) from completion dates.
///
/// The current streak is the consecutive run ending at the most recent
/// completion; `best_length` keeps the longest run ever observed, including
/// runs wiped out by later untoggles.
pub async fn recompute_streak<C>(db: &C, user_id: i64, habit_id: i64) -> Result<streak::Model>
where
    C: ConnectionTrait,
{
    let dates: Vec<Date> = Completion::find()
        .filter(completion::Column::UserId.eq(user_id))
        .filter(completion::Column::HabitId.eq(habit_id))
        .order_by_desc(completion::Column::Date)
        .all(db)
        .await?
        .into_iter()
        .map(|completion| completion.date)
        .collect();

    let mut current = 0;
    let mut best = 0;
    if !dates.is_empty() {
        current = 1;
        best = 1;
        let mut run = 1;
        let mut leading = true;
        for pair in dates.windows(2) {
            // Dates are unique and descending, so the gap is at least one day
            if (pair[0] - pair[1]).num_days() == 1 {
                run += 1;
                if leading {
                    current += 1;
                }
            } else {
                leading = false;
                run = 1;
            }
            best = best.max(run);
        }
    }
    let last_date = dates.first().copied();

    let existing = Streak::find_by_id((user_id, habit_id)).one(db).await?;
    match existing {
        Some(row) => {
            let best = best.max(row.best_length);
            let mut active: streak::ActiveModel = row.into();
            active.current_length = Set(current);
            active.best_length = Set(best);
            active.last_date = Set(last_date);
            active.update(db).await.map_err(Into::into)
        }
        None => {
            let row = streak::ActiveModel {
                user_id: Set(user_id),
                habit_id: Set(habit_id),
                current_length: Set(current),
                best_length: Set(best),
                last_date: Set(last_date),
            };
            row.insert(db).await.map_err(Into::into)
        }
    }
}

/// Fetches the cached streak row, if one exists yet.
pub async fn get_streak<C>(db: &C, user_id: i64, habit_id: i64) -> Result<Option<streak::Model>>
where
    C: ConnectionTrait,
{
    Streak::find_by_id((user_id, habit_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Whether the user already holds a medal for this habit.
pub async fn has_medal<C>(db: &C, user_id: i64, habit_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(Medal::find()
        .filter(medal::Column::UserId.eq(user_id))
        .filter(medal::Column::HabitId.eq(habit_id))
        .one(db)
        .await?
        .is_some())
}

/// Number of medals the user holds across all habits. Drives the conversion
/// bonus tier; medals on deleted habits still count.
pub async fn medal_count<C>(db: &C, user_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    Medal::find()
        .filter(medal::Column::UserId.eq(user_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// All medals of a user, newest first.
pub async fn get_user_medals<C>(db: &C, user_id: i64) -> Result<Vec<medal::Model>>
where
    C: ConnectionTrait,
{
    Medal::find()
        .filter(medal::Column::UserId.eq(user_id))
        .order_by_desc(medal::Column::AwardedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Awards a medal for (user, habit) unless one was already earned.
/// Returns whether a new medal was created.
pub async fn award_medal<C>(db: &C, user_id: i64, habit_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    if has_medal(db, user_id, habit_id).await? {
        return Ok(false);
    }

    let medal = medal::ActiveModel {
        user_id: Set(user_id),
        habit_id: Set(habit_id),
        awarded_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    medal.insert(db).await?;
    Ok(true)
}

/// Checks whether every member of the habit's group now holds a medal for
/// it, and if so pays each member the flat coin bonus. One-shot per
/// (group, habit): a marker row makes repeat calls no-ops, including after
/// new members join.
pub async fn maybe_award_group_bonus<C>(db: &C, habit: &habit::Model) -> Result<bool>
where
    C: ConnectionTrait,
{
    let key = group_bonus_key(habit.group_id, habit.id);
    let already_paid = SystemState::find()
        .filter(system_state::Column::Key.eq(key.as_str()))
        .one(db)
        .await?
        .is_some();
    if already_paid {
        return Ok(false);
    }

    let members = get_group_members(db, habit.group_id).await?;
    if members.is_empty() {
        return Ok(false);
    }

    let holders: std::collections::BTreeSet<i64> = Medal::find()
        .filter(medal::Column::HabitId.eq(habit.id))
        .all(db)
        .await?
        .into_iter()
        .map(|medal| medal.user_id)
        .collect();

    if !members.iter().all(|member| holders.contains(&member.id)) {
        return Ok(false);
    }

    for member in &members {
        adjust_coins_atomic(db, member.id, GROUP_MEDAL_BONUS_COINS).await?;
    }

    let marker = system_state::ActiveModel {
        key: Set(key),
        value: Set(chrono::Utc::now().to_rfc3339()),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    marker.insert(db).await?;

    Ok(true)
}
