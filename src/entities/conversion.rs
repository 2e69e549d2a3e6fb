//! Conversion entity - an immutable audit entry for point-type exchanges.
//!
//! Append-only: rows are never updated or deleted, and the reconciliation
//! pass replays them when recomputing balances from source facts.

use super::point_type::PointType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Conversion audit database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "conversions")]
pub struct Model {
    /// Unique identifier for the conversion
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User whose balances were exchanged
    pub user_id: i64,
    /// Source point type
    pub from_type: PointType,
    /// Destination point type
    pub to_type: PointType,
    /// Amount debited from the source type
    pub amount_from: i64,
    /// Amount credited to the destination type
    pub amount_to: i64,
    /// When the conversion happened
    pub timestamp: DateTimeUtc,
}

/// Defines relationships between Conversion and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each conversion belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
