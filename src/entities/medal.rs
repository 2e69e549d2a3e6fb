//! Medal entity - permanent award for a 30-day streak on one habit.
//!
//! At most one medal per (user, habit), enforced by a unique index. Medals
//! persist once earned and raise the holder's conversion bonus tier.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Medal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "medals")]
pub struct Model {
    /// Unique identifier for the medal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User the medal was awarded to
    pub user_id: i64,
    /// Habit the 30-day streak was on
    pub habit_id: i64,
    /// When the medal was awarded
    pub awarded_at: DateTimeUtc,
}

/// Defines relationships between Medal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each medal belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each medal is for one habit
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
