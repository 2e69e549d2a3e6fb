//! Database configuration module for `HabitRewards` V2.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs; the uniqueness rules that span multiple columns (one completion
//! per user/habit/date, one medal per user/habit) are added as explicit
//! unique indexes on top.

use crate::entities::{
    Completion, Conversion, Group, Habit, Medal, Purchase, Reward, Streak, SystemState, User,
    completion, medal,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/habit_rewards.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL`
/// environment variable, falling back to a default local `SQLite` file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation
/// from entity definitions, plus the composite unique indexes.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let group_table = schema.create_table_from_entity(Group);
    let user_table = schema.create_table_from_entity(User);
    let habit_table = schema.create_table_from_entity(Habit);
    let completion_table = schema.create_table_from_entity(Completion);
    let streak_table = schema.create_table_from_entity(Streak);
    let medal_table = schema.create_table_from_entity(Medal);
    let reward_table = schema.create_table_from_entity(Reward);
    let conversion_table = schema.create_table_from_entity(Conversion);
    let purchase_table = schema.create_table_from_entity(Purchase);
    let system_state_table = schema.create_table_from_entity(SystemState);

    db.execute(builder.build(&group_table)).await?;
    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&habit_table)).await?;
    db.execute(builder.build(&completion_table)).await?;
    db.execute(builder.build(&streak_table)).await?;
    db.execute(builder.build(&medal_table)).await?;
    db.execute(builder.build(&reward_table)).await?;
    db.execute(builder.build(&conversion_table)).await?;
    db.execute(builder.build(&purchase_table)).await?;
    db.execute(builder.build(&system_state_table)).await?;

    // One completion per (user, habit, date); toggling re-creates the row
    let completion_index = Index::create()
        .name("idx_completions_user_habit_date")
        .table(Completion)
        .col(completion::Column::UserId)
        .col(completion::Column::HabitId)
        .col(completion::Column::Date)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&completion_index)).await?;

    // One medal per (user, habit), ever
    let medal_index = Index::create()
        .name("idx_medals_user_habit")
        .table(Medal)
        .col(medal::Column::UserId)
        .col(medal::Column::HabitId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&medal_index)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        completion::Model as CompletionModel, habit::Model as HabitModel,
        reward::Model as RewardModel, user::Model as UserModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<HabitModel> = Habit::find().limit(1).all(&db).await?;
        let _: Vec<CompletionModel> = Completion::find().limit(1).all(&db).await?;
        let _: Vec<RewardModel> = Reward::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Index creation uses IF NOT EXISTS, so a second index pass must not fail
        let builder = db.get_database_backend();
        let completion_index = Index::create()
            .name("idx_completions_user_habit_date")
            .table(Completion)
            .col(completion::Column::UserId)
            .col(completion::Column::HabitId)
            .col(completion::Column::Date)
            .unique()
            .if_not_exists()
            .to_owned();
        db.execute(builder.build(&completion_index)).await?;

        Ok(())
    }

    #[test]
    fn test_default_database_url() {
        // Only assert the fallback shape; the env var may be set in CI
        if std::env::var("DATABASE_URL").is_err() {
            assert!(get_database_url().starts_with("sqlite://"));
        }
    }
}
