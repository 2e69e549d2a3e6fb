//! Habit entity - a group-shared daily habit with a fixed point type.
//!
//! Habits are soft-deleted so purchase and completion audit rows keep a
//! valid referent; deletion additionally removes completions and reconciles
//! balances (see `core::habit::delete_habit`).

use super::point_type::PointType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Habit database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "habits")]
pub struct Model {
    /// Unique identifier for the habit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Group that owns this habit
    pub group_id: i64,
    /// Human-readable habit name (e.g., "Read 20 pages")
    pub name: String,
    /// Point type credited for each completion
    pub point_type: PointType,
    /// Soft delete flag - if true, habit is hidden but audit rows survive
    pub is_deleted: bool,
    /// When the habit was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Habit and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each habit belongs to one group
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id"
    )]
    Group,
    /// One habit has many completions
    #[sea_orm(has_many = "super::completion::Entity")]
    Completions,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::completion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Completions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
