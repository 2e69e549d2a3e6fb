//! Streak entity - cached consecutive-day run per (user, habit).
//!
//! Derived state: the row is recomputed from completions on every toggle,
//! so it can always be rebuilt. `best_length` keeps the longest run ever
//! observed even after the current run resets.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Streak database model, keyed by (user, habit)
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "streaks")]
pub struct Model {
    /// User the streak belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    /// Habit the streak is for
    #[sea_orm(primary_key, auto_increment = false)]
    pub habit_id: i64,
    /// Length of the consecutive run ending at `last_date`
    pub current_length: i32,
    /// Longest run ever recorded for this pair
    pub best_length: i32,
    /// Most recent completion date, None when no completions remain
    pub last_date: Option<Date>,
}

/// Defines relationships between Streak and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each streak belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each streak is for one habit
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
