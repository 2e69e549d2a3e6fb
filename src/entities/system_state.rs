//! System state entity - stores key-value pairs for system bookkeeping.
//! Used for one-shot markers such as group achievement awards, so a bonus
//! that has been paid out once is never paid again.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// System state database model - stores key-value pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_state")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Bookkeeping key (e.g., `"group_medal_bonus:{group}:{habit}"`)
    pub key: String,
    /// Value stored as string
    pub value: String,
    /// When this entry was last modified
    pub updated_at: DateTimeUtc,
}

/// `SystemState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
