//! Reward entity - items purchasable with points or coins.
//!
//! A reward with an owner is a peer-shop item priced in one point type, or
//! in "any" mix of types when `point_type` is None. A reward without an
//! owner is a communal (town-mall) item priced in coins, usually with finite
//! stock. Rewards are soft-deleted so purchase history keeps a valid
//! referent.

use super::point_type::PointType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reward database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rewards")]
pub struct Model {
    /// Unique identifier for the reward
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user, or None for communal items
    pub owner_id: Option<i64>,
    /// Human-readable reward name (e.g., "Cooking your favourite dish")
    pub name: String,
    /// Price in points (peer rewards) or coins (communal rewards)
    pub price: i64,
    /// Required point type; None means "any" mix for peer rewards and is
    /// ignored for communal rewards, which are coin-priced
    pub point_type: Option<PointType>,
    /// Remaining stock; None means unlimited
    pub stock: Option<i32>,
    /// Soft delete flag - if true, reward is hidden but purchases survive
    pub is_deleted: bool,
    /// When the reward was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Whether this is a communal (coin-priced) reward.
    #[must_use]
    pub const fn is_communal(&self) -> bool {
        self.owner_id.is_none()
    }
}

/// Defines relationships between Reward and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each peer reward belongs to its owner
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    /// One reward has many purchases
    #[sea_orm(has_many = "super::purchase::Entity")]
    Purchases,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
