//! Purchase entity - an immutable audit entry for reward purchases.
//!
//! Peer purchases record the per-type payment breakdown as JSON; communal
//! purchases record the coins spent. Append-only, replayed by the
//! reconciliation pass.

use super::point_type::PointType;
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a purchase price was split across point types.
///
/// For a typed reward this holds a single entry; for an "any" reward it
/// holds the buyer-selected mix. Communal (coin) purchases store an empty
/// breakdown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PaymentBreakdown(pub BTreeMap<PointType, i64>);

impl PaymentBreakdown {
    /// A breakdown paying the whole amount from one point type.
    #[must_use]
    pub fn single(point_type: PointType, amount: i64) -> Self {
        Self(BTreeMap::from([(point_type, amount)]))
    }

    /// Sum of all components.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }

    /// Iterates over (point type, amount) components.
    pub fn iter(&self) -> impl Iterator<Item = (PointType, i64)> + '_ {
        self.0.iter().map(|(point_type, amount)| (*point_type, *amount))
    }
}

impl FromIterator<(PointType, i64)> for PaymentBreakdown {
    fn from_iter<I: IntoIterator<Item = (PointType, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Purchase audit database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    /// Unique identifier for the purchase
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Reward that was bought
    pub reward_id: i64,
    /// Buying user
    pub buyer_id: i64,
    /// Selling user, or None for communal purchases
    pub seller_id: Option<i64>,
    /// Point payment split; empty for communal purchases
    pub breakdown: PaymentBreakdown,
    /// Coins spent; 0 for point purchases
    pub coins_spent: i64,
    /// When the purchase happened
    pub timestamp: DateTimeUtc,
}

/// Defines relationships between Purchase and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each purchase references one reward
    #[sea_orm(
        belongs_to = "super::reward::Entity",
        from = "Column::RewardId",
        to = "super::reward::Column::Id"
    )]
    Reward,
    /// Each purchase has one buyer
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::BuyerId",
        to = "super::user::Column::Id"
    )]
    Buyer,
}

impl Related<super::reward::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reward.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Buyer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_breakdown_total_and_json_shape() {
        let breakdown: PaymentBreakdown = [
            (PointType::Physical, 3),
            (PointType::Educational, 2),
        ]
        .into_iter()
        .collect();

        assert_eq!(breakdown.total(), 5);

        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["physical"], 3);
        assert_eq!(json["educational"], 2);
    }

    #[test]
    fn test_breakdown_single() {
        let breakdown = PaymentBreakdown::single(PointType::Arts, 7);
        assert_eq!(breakdown.total(), 7);
        assert_eq!(breakdown.0.get(&PointType::Arts), Some(&7));
    }
}
