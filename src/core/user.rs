//! User store operations and balance primitives.
//!
//! Users are created on first interaction and never deleted while referenced
//! by a group. The balance helpers here are the single write path for every
//! engine: an atomic database-level `balance = balance + delta` update, so a
//! read-modify-write can never lose a concurrent update. Non-negativity is
//! enforced by the calling engine, which validates inside the same
//! transaction that applies the debit.

use crate::{
    entities::{PointType, Streak, User, streak, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Snapshot of one user's six balances, returned by every engine that
/// touches points so the presentation layer never re-reads the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    /// Physical points
    pub physical: i64,
    /// Arts points
    pub arts: i64,
    /// Food-related points
    pub food_related: i64,
    /// Educational points
    pub educational: i64,
    /// Other points
    pub other: i64,
    /// Coins
    pub coins: i64,
}

impl Balances {
    /// Extracts the balances from a user row.
    #[must_use]
    pub const fn of(user: &user::Model) -> Self {
        Self {
            physical: user.points_physical,
            arts: user.points_arts,
            food_related: user.points_food_related,
            educational: user.points_educational,
            other: user.points_other,
            coins: user.coins,
        }
    }

    /// Returns the balance for one point type.
    #[must_use]
    pub const fn get(&self, point_type: PointType) -> i64 {
        match point_type {
            PointType::Physical => self.physical,
            PointType::Arts => self.arts,
            PointType::FoodRelated => self.food_related,
            PointType::Educational => self.educational,
            PointType::Other => self.other,
        }
    }
}

/// Fetches a user by platform id.
pub async fn get_user<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Fetches a user by platform id, failing with `UserNotFound` when absent.
pub async fn require_user<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    get_user(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

/// Creates a user on first interaction, or refreshes the stored platform
/// names on subsequent ones. All balances start at zero.
pub async fn get_or_create_user(
    db: &DatabaseConnection,
    user_id: i64,
    username: Option<String>,
    first_name: Option<String>,
) -> Result<user::Model> {
    if let Some(existing) = get_user(db, user_id).await? {
        if existing.username == username && existing.first_name == first_name {
            return Ok(existing);
        }
        let mut active: user::ActiveModel = existing.into();
        active.username = Set(username);
        active.first_name = Set(first_name);
        return active.update(db).await.map_err(Into::into);
    }

    let user = user::ActiveModel {
        id: Set(user_id),
        username: Set(username),
        first_name: Set(first_name),
        group_id: Set(None),
        points_physical: Set(0),
        points_arts: Set(0),
        points_food_related: Set(0),
        points_educational: Set(0),
        points_other: Set(0),
        coins: Set(0),
        joined_at: Set(chrono::Utc::now()),
    };
    user.insert(db).await.map_err(Into::into)
}

/// Adjusts one typed balance by atomically adding a delta.
///
/// Performs a single SQL `UPDATE users SET col = col + delta WHERE id = ?`
/// rather than a read-modify-write, then returns the updated row. Callers
/// are responsible for validating that a negative delta cannot push the
/// balance below zero, inside the same transaction.
pub async fn adjust_points_atomic<C>(
    db: &C,
    user_id: i64,
    point_type: PointType,
    delta: i64,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    // First verify the user exists
    let _user = require_user(db, user_id).await?;

    let column = user::points_column(point_type);
    User::update_many()
        .col_expr(column, Expr::col(column).add(delta))
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;

    require_user(db, user_id).await
}

/// Everything the "my stats" view needs in one read.
#[derive(Debug, Clone)]
pub struct UserStats {
    /// The six current balances
    pub balances: Balances,
    /// Total medals held
    pub medal_count: u64,
    /// Cached streaks, one per habit the user ever completed
    pub streaks: Vec<streak::Model>,
}

/// Assembles the stats summary for one user.
pub async fn get_user_stats(db: &DatabaseConnection, user_id: i64) -> Result<UserStats> {
    let user = require_user(db, user_id).await?;
    let medal_count = crate::core::streak::medal_count(db, user_id).await?;
    let streaks = Streak::find()
        .filter(streak::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    Ok(UserStats {
        balances: Balances::of(&user),
        medal_count,
        streaks,
    })
}

/// Adjusts the coin balance by atomically adding a delta.
pub async fn adjust_coins_atomic<C>(db: &C, user_id: i64, delta: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let _user = require_user(db, user_id).await?;

    User::update_many()
        .col_expr(
            user::Column::Coins,
            Expr::col(user::Column::Coins).add(delta),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;

    require_user(db, user_id).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_get_or_create_user_creates_with_zero_balances() -> Result<()> {
        let db = setup_test_db().await?;

        let user =
            get_or_create_user(&db, 100, Some("ada".to_string()), Some("Ada".to_string())).await?;

        assert_eq!(user.id, 100);
        assert_eq!(user.username.as_deref(), Some("ada"));
        for point_type in PointType::ALL {
            assert_eq!(user.points(point_type), 0);
        }
        assert_eq!(user.coins, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_or_create_user_refreshes_names() -> Result<()> {
        let db = setup_test_db().await?;

        get_or_create_user(&db, 100, Some("ada".to_string()), None).await?;
        let updated =
            get_or_create_user(&db, 100, Some("countess".to_string()), Some("Ada".to_string()))
                .await?;

        assert_eq!(updated.id, 100);
        assert_eq!(updated.username.as_deref(), Some("countess"));
        assert_eq!(updated.first_name.as_deref(), Some("Ada"));

        // Still a single row
        assert!(get_user(&db, 100).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_points_atomic() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 1).await?;

        let updated = adjust_points_atomic(&db, user.id, PointType::Arts, 5).await?;
        assert_eq!(updated.points_arts, 5);

        let updated = adjust_points_atomic(&db, user.id, PointType::Arts, -2).await?;
        assert_eq!(updated.points_arts, 3);

        // Other balances untouched
        assert_eq!(updated.points_physical, 0);
        assert_eq!(updated.coins, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_points_unknown_user() -> Result<()> {
        let db = setup_test_db().await?;

        let result = adjust_points_atomic(&db, 999, PointType::Other, 1).await;
        assert!(matches!(result.unwrap_err(), Error::UserNotFound { id: 999 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_coins_atomic() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 1).await?;

        let updated = adjust_coins_atomic(&db, user.id, 10).await?;
        assert_eq!(updated.coins, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_user_stats() -> Result<()> {
        let (db, group, user) = setup_with_member().await?;
        let habit = create_test_habit(&db, group.id, "Run", PointType::Physical).await?;

        complete_on(&db, user.id, habit.id, "2024-03-01").await?;
        crate::core::streak::recompute_streak(&db, user.id, habit.id).await?;
        crate::core::streak::award_medal(&db, user.id, habit.id).await?;

        let stats = get_user_stats(&db, user.id).await?;
        assert_eq!(stats.balances.physical, 1);
        assert_eq!(stats.medal_count, 1);
        assert_eq!(stats.streaks.len(), 1);
        assert_eq!(stats.streaks[0].current_length, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_balances_snapshot() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 1).await?;

        adjust_points_atomic(&db, user.id, PointType::Physical, 4).await?;
        let user = adjust_coins_atomic(&db, user.id, 2).await?;

        let balances = Balances::of(&user);
        assert_eq!(balances.get(PointType::Physical), 4);
        assert_eq!(balances.get(PointType::Educational), 0);
        assert_eq!(balances.coins, 2);

        Ok(())
    }
}
