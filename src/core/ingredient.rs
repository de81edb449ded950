//! Ingredient business logic - creation, purchase updates and lookups.
//!
//! A purchase update is the heart of the engine's data flow: normalize the
//! package tuple, append a price history entry, mutate the ingredient's
//! stored base price, and run the anomaly detector - all inside a single
//! database transaction so the ingredient row and its history can never
//! drift apart. Notification dispatch happens after commit, off the
//! critical path.

use crate::{
    config::settings::AlertSettings,
    core::{
        alert::{self, AlertDecision},
        price_history,
        units::{self, Unit},
    },
    entities::{Ingredient, User, ingredient, user},
    errors::{Error, Result},
    notify::{CostAlert, Notifier},
};
use chrono::Utc;
use sea_orm::{
    DatabaseConnection, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// Creates an ingredient from its first package purchase.
///
/// Normalizes the purchase tuple, inserts the ingredient and its first price
/// history entry in one transaction, and marks the owner as having created
/// an ingredient.
pub async fn create_ingredient(
    db: &DatabaseConnection,
    user_id: i64,
    name: String,
    package_price: f64,
    package_quantity: f64,
    package_unit: Unit,
) -> Result<ingredient::Model> {
    if name.trim().is_empty() {
        return Err(Error::EmptyName);
    }

    let (base_price, base_unit) = units::normalize(package_price, package_quantity, package_unit)?;
    let now = Utc::now();

    let txn = db.begin().await?;

    let model = ingredient::ActiveModel {
        name: Set(name.trim().to_string()),
        user_id: Set(user_id),
        package_price: Set(package_price),
        package_quantity: Set(package_quantity),
        package_unit: Set(package_unit.to_string()),
        base_price: Set(base_price),
        base_unit: Set(base_unit.to_string()),
        last_alerted_at: Set(None),
        created_at: Set(now),
        ..Default::default()
    };
    let result = model.insert(&txn).await?;

    price_history::record(
        &txn,
        result.id,
        package_price,
        package_quantity,
        package_unit,
        now,
    )
    .await?;

    User::update_many()
        .col_expr(user::Column::HasCreatedIngredient, Expr::value(true))
        .filter(user::Column::Id.eq(user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(result)
}

/// Records a new package purchase for an existing ingredient.
///
/// In one transaction: appends the price history entry, updates the
/// ingredient's package and base price fields, evaluates the anomaly
/// detector against the previous purchase, and claims the alert cooldown
/// slot when a spike qualifies. After commit, a firing alert is handed to
/// the notifier on a background task.
///
/// Returns the updated ingredient and the alert decision.
pub async fn update_ingredient_price(
    db: &DatabaseConnection,
    notifier: &Arc<dyn Notifier>,
    alerts: &AlertSettings,
    ingredient_id: i64,
    price: f64,
    quantity: f64,
    unit: Unit,
) -> Result<(ingredient::Model, AlertDecision)> {
    let (base_price, base_unit) = units::normalize(price, quantity, unit)?;
    let now = Utc::now();

    let txn = db.begin().await?;

    let existing = Ingredient::find_by_id(ingredient_id)
        .one(&txn)
        .await?
        .ok_or(Error::IngredientNotFound { id: ingredient_id })?;

    let previous = crate::entities::PriceHistory::find()
        .filter(crate::entities::PriceHistoryColumn::IngredientId.eq(ingredient_id))
        .order_by_desc(crate::entities::PriceHistoryColumn::RecordedAt)
        .order_by_desc(crate::entities::PriceHistoryColumn::Id)
        .limit(1)
        .one(&txn)
        .await?;

    let new_entry = price_history::record(&txn, ingredient_id, price, quantity, unit, now).await?;

    let mut active: ingredient::ActiveModel = existing.clone().into();
    active.package_price = Set(price);
    active.package_quantity = Set(quantity);
    active.package_unit = Set(unit.to_string());
    active.base_price = Set(base_price);
    active.base_unit = Set(base_unit.to_string());
    let mut updated = active.update(&txn).await?;

    let mut decision = previous.as_ref().map_or(AlertDecision::NoChange, |old| {
        alert::evaluate(
            old,
            &new_entry,
            alerts.threshold_percent,
            alerts.cooldown(),
            existing.last_alerted_at,
            now,
        )
    });

    if matches!(decision, AlertDecision::Fire { .. }) {
        if alert::claim_alert_slot(&txn, ingredient_id, now, alerts.cooldown()).await? {
            // Mirror the claim in the snapshot handed back to the caller.
            updated.last_alerted_at = Some(now);
        } else {
            // Lost the race against a concurrent purchase update.
            decision = AlertDecision::Suppressed;
        }
    }

    txn.commit().await?;

    if let AlertDecision::Fire { increase_percent } = decision {
        dispatch_alert(db, notifier, &updated, previous, price, unit, increase_percent).await;
    }

    Ok((updated, decision))
}

/// Hands a fired alert to the notifier after the purchase transaction has
/// committed. The purchase already succeeded, so any failure assembling the
/// payload is logged and swallowed rather than surfaced to the caller.
async fn dispatch_alert(
    db: &DatabaseConnection,
    notifier: &Arc<dyn Notifier>,
    updated: &ingredient::Model,
    previous: Option<crate::entities::PriceHistoryModel>,
    new_price: f64,
    new_unit: Unit,
    increase_percent: f64,
) {
    let Some(old) = previous else {
        return;
    };
    match build_alert(db, updated, &old, new_price, new_unit, increase_percent).await {
        Ok(alert) => crate::notify::dispatch_cost_alert(Arc::clone(notifier), alert),
        Err(e) => warn!(
            ingredient = %updated.name,
            error = %e,
            "cost alert skipped, payload could not be assembled"
        ),
    }
}

async fn build_alert(
    db: &DatabaseConnection,
    updated: &ingredient::Model,
    old: &crate::entities::PriceHistoryModel,
    new_price: f64,
    new_unit: Unit,
    increase_percent: f64,
) -> Result<CostAlert> {
    let owner = User::find_by_id(updated.user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            reference: updated.user_id.to_string(),
        })?;

    Ok(CostAlert {
        user: owner,
        ingredient_name: updated.name.clone(),
        old_price: old.price,
        old_unit: Unit::from_str(&old.unit)?,
        new_price,
        new_unit,
        increase_percent,
    })
}

/// Finds an ingredient by its unique ID.
pub async fn get_ingredient_by_id(
    db: &DatabaseConnection,
    ingredient_id: i64,
) -> Result<Option<ingredient::Model>> {
    Ingredient::find_by_id(ingredient_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all ingredients owned by a user, ordered alphabetically by name.
pub async fn get_ingredients_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<ingredient::Model>> {
    Ingredient::find()
        .filter(ingredient::Column::UserId.eq(user_id))
        .order_by_asc(ingredient::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes an ingredient and its price history.
pub async fn delete_ingredient(db: &DatabaseConnection, ingredient_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Ingredient::find_by_id(ingredient_id)
        .one(&txn)
        .await?
        .ok_or(Error::IngredientNotFound { id: ingredient_id })?;

    crate::entities::PriceHistory::delete_many()
        .filter(crate::entities::PriceHistoryColumn::IngredientId.eq(ingredient_id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}
