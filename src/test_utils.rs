//! Shared test utilities for `HabitRewards`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{group, habit, user},
    entities::{self, PointType, completion},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with platform id `user_id` and zeroed balances.
pub async fn create_test_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<entities::user::Model> {
    user::get_or_create_user(
        db,
        user_id,
        Some(format!("user{user_id}")),
        Some(format!("User {user_id}")),
    )
    .await
}

/// Creates a test group with the given name.
pub async fn create_test_group(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::group::Model> {
    group::create_group(db, name.to_string()).await
}

/// Creates a test habit in a group.
pub async fn create_test_habit(
    db: &DatabaseConnection,
    group_id: i64,
    name: &str,
    point_type: PointType,
) -> Result<entities::habit::Model> {
    habit::create_habit(db, group_id, name.to_string(), point_type).await
}

/// Sets up a database, one group, and user 1 as its member.
/// Returns (db, group, user) for common test scenarios.
pub async fn setup_with_member() -> Result<(
    DatabaseConnection,
    entities::group::Model,
    entities::user::Model,
)> {
    let db = setup_test_db().await?;
    let group = create_test_group(&db, "Test Group").await?;
    let user = create_test_user(&db, 1).await?;
    let user = group::join_group(&db, user.id, group.id).await?;
    Ok((db, group, user))
}

/// Records a completion fact directly: inserts the row and credits one unit
/// of the habit's point type, without streak or medal side effects. Used
/// when a test needs a known fact set rather than the full toggle flow.
pub async fn complete_on(
    db: &DatabaseConnection,
    user_id: i64,
    habit_id: i64,
    date: &str,
) -> Result<entities::completion::Model> {
    let date = date.parse().map_err(|_| Error::Config {
        message: format!("Bad test date: {date}"),
    })?;

    let habit = habit::get_habit(db, habit_id)
        .await?
        .ok_or(Error::HabitNotFound { id: habit_id })?;

    let row = completion::ActiveModel {
        user_id: Set(user_id),
        habit_id: Set(habit_id),
        date: Set(date),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let row = row.insert(db).await?;

    user::adjust_points_atomic(db, user_id, habit.point_type, 1).await?;

    Ok(row)
}
