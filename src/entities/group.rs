//! Group entity - the join target for users and owner of habits.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Group database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    /// Unique identifier for the group
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable group name
    pub name: String,
    /// Linked broadcast channel id, if the group set one up
    pub chat_id: Option<i64>,
    /// When the group was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Group and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One group has many members
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
    /// One group owns many habits
    #[sea_orm(has_many = "super::habit::Entity")]
    Habits,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::habit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Habits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
