//! User entity - one row per platform user.
//!
//! The primary key is the chat platform's user id, so rows are created with
//! an explicit id on first interaction rather than auto-incremented. The five
//! typed point balances and the coin balance live directly on the row; every
//! engine mutates them through atomic column expressions.

use super::point_type::PointType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Platform user id (assigned by the chat platform, not auto-incremented)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Platform username, if the user has one
    pub username: Option<String>,
    /// Display name, if shared by the platform
    pub first_name: Option<String>,
    /// Group the user belongs to, None until they join one
    pub group_id: Option<i64>,
    /// Balance of physical points
    pub points_physical: i64,
    /// Balance of arts points
    pub points_arts: i64,
    /// Balance of food-related points
    pub points_food_related: i64,
    /// Balance of educational points
    pub points_educational: i64,
    /// Balance of other points
    pub points_other: i64,
    /// Coin balance (communal shop currency)
    pub coins: i64,
    /// When the user first interacted with the system
    pub joined_at: DateTimeUtc,
}

impl Model {
    /// Returns the stored balance for one point type.
    #[must_use]
    pub const fn points(&self, point_type: PointType) -> i64 {
        match point_type {
            PointType::Physical => self.points_physical,
            PointType::Arts => self.points_arts,
            PointType::FoodRelated => self.points_food_related,
            PointType::Educational => self.points_educational,
            PointType::Other => self.points_other,
        }
    }
}

/// Maps a point type to its balance column, for atomic `balance = balance + delta` updates.
#[must_use]
pub const fn points_column(point_type: PointType) -> Column {
    match point_type {
        PointType::Physical => Column::PointsPhysical,
        PointType::Arts => Column::PointsArts,
        PointType::FoodRelated => Column::PointsFoodRelated,
        PointType::Educational => Column::PointsEducational,
        PointType::Other => Column::PointsOther,
    }
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each user optionally belongs to one group
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id"
    )]
    Group,
    /// One user has many habit completions
    #[sea_orm(has_many = "super::completion::Entity")]
    Completions,
    /// One user has many medals
    #[sea_orm(has_many = "super::medal::Entity")]
    Medals,
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

impl Related<super::medal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Medals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
