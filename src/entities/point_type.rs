//! Point type enum - the closed set of habit categories.
//!
//! Every habit, balance column, conversion, and purchase breakdown is keyed
//! by one of these five types. "Any" is not a type: rewards that accept a
//! mixed payment store `Option<PointType>::None` instead, so nothing else in
//! the system can accidentally treat "any" as a creditable balance.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The five habit/point categories, stored as strings in the database
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PointType {
    /// Exercise, sports, movement
    #[sea_orm(string_value = "physical")]
    Physical,
    /// Creative practice
    #[sea_orm(string_value = "arts")]
    Arts,
    /// Cooking and nutrition
    #[sea_orm(string_value = "food_related")]
    FoodRelated,
    /// Study and reading
    #[sea_orm(string_value = "educational")]
    Educational,
    /// Everything else
    #[sea_orm(string_value = "other")]
    Other,
}

impl PointType {
    /// All five point types, in canonical display order.
    pub const ALL: [Self; 5] = [
        Self::Physical,
        Self::Arts,
        Self::FoodRelated,
        Self::Educational,
        Self::Other,
    ];

    /// The stored string form of this type (e.g. `"food_related"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Arts => "arts",
            Self::FoodRelated => "food_related",
            Self::Educational => "educational",
            Self::Other => "other",
        }
    }
}
