//! Purchase engine - point transfers between buyers and sellers, and
//! coin-funded communal purchases.
//!
//! Every purchase validates inside the same transaction that applies the
//! debit/credit pair: both sides happen or neither does. Peer purchases
//! move points from the buyer to the reward's owner; communal purchases
//! burn coins and decrement stock without crediting anyone. Each path
//! appends an immutable purchase record.

use crate::{
    core::user::{Balances, adjust_coins_atomic, adjust_points_atomic, require_user},
    entities::{PaymentBreakdown, purchase, reward},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};

/// Result of a purchase, consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOutcome {
    /// The reward that was bought
    pub reward: reward::Model,
    /// Buyer's balances after the purchase
    pub buyer_balances: Balances,
    /// How the price was split across point types (empty for communal)
    pub breakdown: PaymentBreakdown,
    /// Coins spent (0 for point purchases)
    pub coins_spent: i64,
    /// Remaining stock after the purchase, when the reward tracks stock
    pub remaining_stock: Option<i32>,
}

/// Buys a reward.
///
/// For a typed peer reward the price is debited from the required point
/// type and `breakdown` is ignored. For an "any" peer reward the caller
/// must supply a breakdown whose components are positive and sum exactly to
/// the price (`InvalidAmount` otherwise). Communal rewards are paid in
/// coins. A reward that is missing, deleted, or out of stock fails with
/// `RewardNotFound`; any balance that cannot cover its share fails with
/// `InsufficientBalance` and nothing is mutated.
pub async fn buy(
    db: &DatabaseConnection,
    buyer_id: i64,
    reward_id: i64,
    breakdown: Option<PaymentBreakdown>,
) -> Result<PurchaseOutcome> {
    let txn = db.begin().await?;

    let reward = crate::core::reward::get_reward(&txn, reward_id)
        .await?
        .ok_or(Error::RewardNotFound { id: reward_id })?;
    if reward.stock.is_some_and(|stock| stock <= 0) {
        return Err(Error::RewardNotFound { id: reward_id });
    }

    let buyer = require_user(&txn, buyer_id).await?;

    let outcome = if let Some(seller_id) = reward.owner_id {
        let paid = match reward.point_type {
            Some(point_type) => PaymentBreakdown::single(point_type, reward.price),
            None => validate_breakdown(breakdown, reward.price)?,
        };

        for (point_type, amount) in paid.iter() {
            let current = buyer.points(point_type);
            if current < amount {
                return Err(Error::InsufficientBalance {
                    point_type: Some(point_type),
                    current,
                    required: amount,
                });
            }
        }

        require_user(&txn, seller_id).await?;

        let mut updated = buyer.clone();
        for (point_type, amount) in paid.iter() {
            updated = adjust_points_atomic(&txn, buyer_id, point_type, -amount).await?;
            adjust_points_atomic(&txn, seller_id, point_type, amount).await?;
        }

        let remaining_stock = decrement_stock(&txn, &reward).await?;

        let record = purchase::ActiveModel {
            reward_id: Set(reward.id),
            buyer_id: Set(buyer_id),
            seller_id: Set(Some(seller_id)),
            breakdown: Set(paid.clone()),
            coins_spent: Set(0),
            timestamp: Set(chrono::Utc::now()),
            ..Default::default()
        };
        record.insert(&txn).await?;

        PurchaseOutcome {
            reward,
            buyer_balances: Balances::of(&updated),
            breakdown: paid,
            coins_spent: 0,
            remaining_stock,
        }
    } else {
        // Communal reward: coin-funded, nobody is credited
        if buyer.coins < reward.price {
            return Err(Error::InsufficientBalance {
                point_type: None,
                current: buyer.coins,
                required: reward.price,
            });
        }

        let price = reward.price;
        let updated = adjust_coins_atomic(&txn, buyer_id, -price).await?;
        let remaining_stock = decrement_stock(&txn, &reward).await?;

        let record = purchase::ActiveModel {
            reward_id: Set(reward.id),
            buyer_id: Set(buyer_id),
            seller_id: Set(None),
            breakdown: Set(PaymentBreakdown::default()),
            coins_spent: Set(price),
            timestamp: Set(chrono::Utc::now()),
            ..Default::default()
        };
        record.insert(&txn).await?;

        PurchaseOutcome {
            reward,
            buyer_balances: Balances::of(&updated),
            breakdown: PaymentBreakdown::default(),
            coins_spent: price,
            remaining_stock,
        }
    };

    txn.commit().await?;
    Ok(outcome)
}

/// Checks an "any"-reward payment split: present, all components positive,
/// sum exactly equal to the price.
fn validate_breakdown(
    breakdown: Option<PaymentBreakdown>,
    price: i64,
) -> Result<PaymentBreakdown> {
    let breakdown = breakdown.ok_or(Error::InvalidAmount { amount: 0 })?;

    for (_, amount) in breakdown.iter() {
        if amount <= 0 {
            return Err(Error::InvalidAmount { amount });
        }
    }

    let total = breakdown.total();
    if total != price {
        return Err(Error::InvalidAmount { amount: total });
    }

    Ok(breakdown)
}

/// Decrements finite stock by one; unlimited stock passes through as None.
async fn decrement_stock<C>(db: &C, reward: &reward::Model) -> Result<Option<i32>>
where
    C: sea_orm::ConnectionTrait,
{
    match reward.stock {
        None => Ok(None),
        Some(stock) => {
            let mut active: reward::ActiveModel = reward.clone().into();
            active.stock = Set(Some(stock - 1));
            let updated = active.update(db).await?;
            Ok(updated.stock)
        }
    }
}
