//! Price history tracking - one append per package purchase.
//!
//! Entries are only ever appended at "now", so insertion order is
//! chronological by construction. The anomaly detector consumes the ordered
//! history; the weekly report consumes the last week of it.

use crate::{
    core::units::Unit,
    entities::{PriceHistory, price_history},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryOrder, QuerySelect, Set, prelude::*};

/// Appends an immutable price observation for an ingredient.
///
/// Accepts any connection type so it can run inside the purchase-update
/// transaction alongside the ingredient mutation.
pub async fn record<C>(
    db: &C,
    ingredient_id: i64,
    price: f64,
    quantity: f64,
    unit: Unit,
    at: DateTime<Utc>,
) -> Result<price_history::Model>
where
    C: ConnectionTrait,
{
    let entry = price_history::ActiveModel {
        ingredient_id: Set(ingredient_id),
        price: Set(price),
        quantity: Set(quantity),
        unit: Set(unit.to_string()),
        recorded_at: Set(at),
        ..Default::default()
    };

    let result = entry.insert(db).await?;
    Ok(result)
}

/// Returns the full price history of an ingredient, oldest first.
pub async fn history<C>(db: &C, ingredient_id: i64) -> Result<Vec<price_history::Model>>
where
    C: ConnectionTrait,
{
    PriceHistory::find()
        .filter(price_history::Column::IngredientId.eq(ingredient_id))
        .order_by_asc(price_history::Column::RecordedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the two most recent entries, newest first, or fewer if the
/// history is short.
pub async fn latest_two<C>(db: &C, ingredient_id: i64) -> Result<Vec<price_history::Model>>
where
    C: ConnectionTrait,
{
    PriceHistory::find()
        .filter(price_history::Column::IngredientId.eq(ingredient_id))
        .order_by_desc(price_history::Column::RecordedAt)
        .order_by_desc(price_history::Column::Id)
        .limit(2)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns entries recorded at or after `cutoff`, oldest first.
pub async fn history_since<C>(
    db: &C,
    ingredient_id: i64,
    cutoff: DateTime<Utc>,
) -> Result<Vec<price_history::Model>>
where
    C: ConnectionTrait,
{
    PriceHistory::find()
        .filter(price_history::Column::IngredientId.eq(ingredient_id))
        .filter(price_history::Column::RecordedAt.gte(cutoff))
        .order_by_asc(price_history::Column::RecordedAt)
        .all(db)
        .await
        .map_err(Into::into)
}
