//! Completion entity - a (user, habit, calendar-date) fact.
//!
//! At most one row exists per triple, enforced by a unique index created in
//! `config::database::create_tables`. Presence of a row implies exactly one
//! unit of the habit's point type was credited for that date.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Habit completion database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "habit_completions")]
pub struct Model {
    /// Unique identifier for the completion
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who completed the habit
    pub user_id: i64,
    /// Habit that was completed
    pub habit_id: i64,
    /// Calendar date the completion counts for
    pub date: Date,
    /// When the completion row was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Completion and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each completion belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each completion belongs to one habit
    #[sea_orm(
        belongs_to = "super::habit::Entity",
        from = "Column::HabitId",
        to = "super::habit::Column::Id"
    )]
    Habit,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::habit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Habit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
