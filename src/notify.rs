//! Notification collaborator - decides nothing, delivers everything.
//!
//! The core only decides *whether* a notification goes out; delivery itself
//! is behind the [`Notifier`] trait so the engine can be wired to e-mail,
//! SMS, or, in tests, a recorder. Dispatch is fire-and-forget off the
//! critical path: a delivery failure is logged and never rolls back the
//! purchase update that triggered it.

use crate::core::report::WeeklyReport;
use crate::core::units::Unit;
use crate::entities::user;
use crate::errors::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Payload handed to the notifier when a cost alert fires.
#[derive(Debug, Clone)]
pub struct CostAlert {
    /// Owner of the ingredient
    pub user: user::Model,
    /// Name of the ingredient whose price spiked
    pub ingredient_name: String,
    /// Package price of the previous purchase
    pub old_price: f64,
    /// Unit of the previous purchase
    pub old_unit: Unit,
    /// Package price of the latest purchase
    pub new_price: f64,
    /// Unit of the latest purchase
    pub new_unit: Unit,
    /// Per-base-unit price increase, percent
    pub increase_percent: f64,
}

/// Delivery collaborator for cost alerts and weekly reports.
pub trait Notifier: Send + Sync {
    /// Delivers a cost spike alert to the ingredient's owner.
    fn send_cost_alert(&self, alert: &CostAlert) -> Result<()>;

    /// Delivers the weekly performance summary to a user.
    fn send_weekly_report(&self, user: &user::Model, report: &WeeklyReport) -> Result<()>;
}

/// Notifier that writes deliveries to the log. Stands in for the e-mail
/// sender in environments without SMTP credentials.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_cost_alert(&self, alert: &CostAlert) -> Result<()> {
        info!(
            email = %alert.user.email,
            ingredient = %alert.ingredient_name,
            old_price = alert.old_price,
            new_price = alert.new_price,
            increase_percent = alert.increase_percent,
            "cost alert"
        );
        Ok(())
    }

    fn send_weekly_report(&self, user: &user::Model, report: &WeeklyReport) -> Result<()> {
        info!(
            email = %user.email,
            top_recipes = report.top_recipes.len(),
            top_movers = report.top_movers.len(),
            "weekly report"
        );
        Ok(())
    }
}

/// Dispatches a cost alert on a background task.
///
/// Runs after the purchase-update transaction has committed; a failed
/// delivery is logged, not retried, and cannot affect the caller.
pub fn dispatch_cost_alert(notifier: Arc<dyn Notifier>, alert: CostAlert) {
    let _detached = tokio::spawn(async move {
        if let Err(e) = notifier.send_cost_alert(&alert) {
            warn!(
                ingredient = %alert.ingredient_name,
                error = %e,
                "cost alert delivery failed"
            );
        }
    });
}
