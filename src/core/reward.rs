//! Reward shop business logic - peer shops and the communal catalog.
//!
//! Every user runs their own reward shop; rewards are priced in one point
//! type, or in "any" mix of types (`point_type: None`). Communal rewards
//! have no owner, are priced in coins, and usually carry finite stock -
//! they are seeded from config.toml. Rewards are soft-deleted so purchase
//! history keeps a valid referent.

use crate::{
    config::shop::ShopConfig,
    entities::{PointType, Reward, reward},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates a new reward in a user's shop.
///
/// `point_type: None` means the price may be paid from any mix of types.
pub async fn create_reward(
    db: &DatabaseConnection,
    owner_id: i64,
    name: String,
    price: i64,
    point_type: Option<PointType>,
) -> Result<reward::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Reward name cannot be empty".to_string(),
        });
    }
    if price < 1 {
        return Err(Error::InvalidAmount { amount: price });
    }

    crate::core::user::require_user(db, owner_id).await?;

    let reward = reward::ActiveModel {
        owner_id: Set(Some(owner_id)),
        name: Set(name.trim().to_string()),
        price: Set(price),
        point_type: Set(point_type),
        stock: Set(None),
        is_deleted: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    reward.insert(db).await.map_err(Into::into)
}

/// Creates a communal (coin-priced) reward with optional finite stock.
pub async fn create_communal_reward(
    db: &DatabaseConnection,
    name: String,
    price: i64,
    stock: Option<i32>,
) -> Result<reward::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Reward name cannot be empty".to_string(),
        });
    }
    if price < 1 {
        return Err(Error::InvalidAmount { amount: price });
    }
    if let Some(stock) = stock {
        if stock < 0 {
            return Err(Error::InvalidAmount { amount: i64::from(stock) });
        }
    }

    let reward = reward::ActiveModel {
        owner_id: Set(None),
        name: Set(name.trim().to_string()),
        price: Set(price),
        point_type: Set(None),
        stock: Set(stock),
        is_deleted: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    reward.insert(db).await.map_err(Into::into)
}

/// Fetches a reward by id, returning None when missing or deleted.
pub async fn get_reward<C>(db: &C, reward_id: i64) -> Result<Option<reward::Model>>
where
    C: ConnectionTrait,
{
    Ok(Reward::find_by_id(reward_id)
        .one(db)
        .await?
        .filter(|reward| !reward.is_deleted))
}

/// All active rewards in one user's shop, cheapest first.
pub async fn get_user_rewards(
    db: &DatabaseConnection,
    owner_id: i64,
) -> Result<Vec<reward::Model>> {
    Reward::find()
        .filter(reward::Column::OwnerId.eq(owner_id))
        .filter(reward::Column::IsDeleted.eq(false))
        .order_by_asc(reward::Column::Price)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All active rewards offered by members of a group, cheapest first.
pub async fn get_group_rewards(
    db: &DatabaseConnection,
    group_id: i64,
) -> Result<Vec<reward::Model>> {
    let member_ids: Vec<i64> = crate::core::group::get_group_members(db, group_id)
        .await?
        .into_iter()
        .map(|member| member.id)
        .collect();

    Reward::find()
        .filter(reward::Column::OwnerId.is_in(member_ids))
        .filter(reward::Column::IsDeleted.eq(false))
        .order_by_asc(reward::Column::Price)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All active communal rewards, cheapest first.
pub async fn get_communal_rewards(db: &DatabaseConnection) -> Result<Vec<reward::Model>> {
    Reward::find()
        .filter(reward::Column::OwnerId.is_null())
        .filter(reward::Column::IsDeleted.eq(false))
        .order_by_asc(reward::Column::Price)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates a reward's name and/or price, leaving omitted fields unchanged.
pub async fn update_reward(
    db: &DatabaseConnection,
    reward_id: i64,
    new_name: Option<String>,
    new_price: Option<i64>,
) -> Result<reward::Model> {
    if let Some(name) = &new_name {
        if name.trim().is_empty() {
            return Err(Error::Config {
                message: "Reward name cannot be empty".to_string(),
            });
        }
    }
    if let Some(price) = new_price {
        if price < 1 {
            return Err(Error::InvalidAmount { amount: price });
        }
    }

    let mut reward: reward::ActiveModel = get_reward(db, reward_id)
        .await?
        .ok_or(Error::RewardNotFound { id: reward_id })?
        .into();

    if let Some(name) = new_name {
        reward.name = Set(name.trim().to_string());
    }
    if let Some(price) = new_price {
        reward.price = Set(price);
    }

    reward.update(db).await.map_err(Into::into)
}

/// Soft deletes a reward, preserving purchase history.
pub async fn delete_reward(db: &DatabaseConnection, reward_id: i64) -> Result<reward::Model> {
    let mut reward: reward::ActiveModel = get_reward(db, reward_id)
        .await?
        .ok_or(Error::RewardNotFound { id: reward_id })?
        .into();

    reward.is_deleted = Set(true);
    reward.update(db).await.map_err(Into::into)
}

/// Seeds communal rewards from config, inserting only items whose name is
/// not already in the communal catalog. Returns how many were created.
pub async fn seed_communal_rewards(db: &DatabaseConnection, config: &ShopConfig) -> Result<usize> {
    let existing: Vec<String> = get_communal_rewards(db)
        .await?
        .into_iter()
        .map(|reward| reward.name)
        .collect();

    let mut created = 0;
    for item in &config.items {
        if existing.iter().any(|name| name == &item.name) {
            continue;
        }
        create_communal_reward(db, item.name.clone(), item.price, item.stock).await?;
        created += 1;
    }

    Ok(created)
}
