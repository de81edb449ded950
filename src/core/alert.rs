//! Cost anomaly detection for ingredient purchases.
//!
//! The detector compares the two most recent price history entries of an
//! ingredient and decides whether the latest purchase is an alertable spike.
//! Only the immediately preceding purchase is the baseline, not a rolling
//! average, so one anomalous historical entry can mask or trigger a signal.
//! Known limitation, kept for predictability.
//!
//! A cooldown bounds notification frequency: the first qualifying spike
//! always fires, repeats within the window are suppressed. The
//! check-and-set on `last_alerted_at` is a single conditional UPDATE so two
//! near-simultaneous purchase updates cannot both pass the gate.

use crate::{
    entities::{Ingredient, ingredient, price_history},
    errors::Result,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{Condition, ConnectionTrait, prelude::*, sea_query::Expr};

/// Outcome of evaluating an ingredient's latest price change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertDecision {
    /// A qualifying spike outside the cooldown window; notify the owner.
    Fire {
        /// Per-base-unit price increase, 0-100+ scale
        increase_percent: f64,
    },
    /// A qualifying spike, but an alert already fired within the cooldown.
    Suppressed,
    /// No alertable change.
    NoChange,
}

/// Decides whether the change from `old` to `new` warrants a cost alert.
///
/// Unit prices are `price / quantity` of each history entry; entries with a
/// zero quantity cannot establish a rate and yield `NoChange`, as does a
/// non-positive old unit price. An increase above `threshold_percent` is a
/// candidate alert, gated by the cooldown against `last_alerted_at`.
///
/// The caller is responsible for claiming the alert slot (updating
/// `last_alerted_at`) atomically with the notification send; see
/// [`claim_alert_slot`].
#[must_use]
pub fn evaluate(
    old: &price_history::Model,
    new: &price_history::Model,
    threshold_percent: f64,
    cooldown: Duration,
    last_alerted_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> AlertDecision {
    if old.quantity <= 0.0 || new.quantity <= 0.0 {
        return AlertDecision::NoChange;
    }

    let old_unit_price = old.price / old.quantity;
    let new_unit_price = new.price / new.quantity;
    if old_unit_price <= 0.0 {
        return AlertDecision::NoChange;
    }

    let increase_percent = (new_unit_price / old_unit_price - 1.0) * 100.0;
    if increase_percent <= threshold_percent {
        return AlertDecision::NoChange;
    }

    match last_alerted_at {
        Some(last) if now - last < cooldown => AlertDecision::Suppressed,
        _ => AlertDecision::Fire { increase_percent },
    }
}

/// Atomically claims the right to alert for an ingredient.
///
/// Performs a single conditional update:
/// `UPDATE ingredients SET last_alerted_at = now WHERE id = ? AND
/// (last_alerted_at IS NULL OR last_alerted_at < now - cooldown)`.
/// Returns true if this caller won the slot. Two concurrent purchase
/// updates for the same ingredient can both observe a spike, but only one
/// claim succeeds per window.
pub async fn claim_alert_slot<C>(
    db: &C,
    ingredient_id: i64,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let cutoff = now - cooldown;

    let result = Ingredient::update_many()
        .col_expr(ingredient::Column::LastAlertedAt, Expr::value(now))
        .filter(ingredient::Column::Id.eq(ingredient_id))
        .filter(
            Condition::any()
                .add(ingredient::Column::LastAlertedAt.is_null())
                .add(ingredient::Column::LastAlertedAt.lt(cutoff)),
        )
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}
