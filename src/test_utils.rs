//! Shared test utilities for `Margem`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults, plus a recording
//! notifier for asserting on deliveries.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        ingredient,
        subscription::{self, Registration},
        units::Unit,
    },
    entities::{self, User, user},
    errors::Result,
    notify::{CostAlert, Notifier},
};
use chrono::Duration;
use sea_orm::{DatabaseConnection, prelude::*, sea_query::Expr};
use std::sync::{Arc, Mutex};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a trialing test user with a 7 day trial.
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
) -> Result<entities::user::Model> {
    subscription::start_trial(
        db,
        Registration {
            full_name: "Test Owner".to_string(),
            email: email.to_string(),
            business_name: "Test Bakery".to_string(),
            business_type: "Padaria".to_string(),
            phone: None,
        },
        Duration::days(7),
    )
    .await
}

/// Flips a user's subscription status to `active`, bypassing billing.
pub async fn activate_user(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    User::update_many()
        .col_expr(
            user::Column::SubscriptionStatus,
            Expr::value(subscription::STATUS_ACTIVE),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Creates a test ingredient with sensible defaults: 1 kg purchased for
/// R$10, so `base_price` is 0.01/g.
pub async fn create_test_ingredient(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
) -> Result<entities::ingredient::Model> {
    ingredient::create_ingredient(db, user_id, name.to_string(), 10.0, 1.0, Unit::Kg).await
}

/// Builds an in-memory ingredient model without persistence, for exercising
/// the pure cost arithmetic.
#[must_use]
pub fn test_ingredient_model(
    id: i64,
    name: &str,
    base_price: f64,
    base_unit: &str,
) -> entities::ingredient::Model {
    entities::ingredient::Model {
        id,
        name: name.to_string(),
        user_id: 1,
        package_price: 0.0,
        package_quantity: 1.0,
        package_unit: base_unit.to_string(),
        base_price,
        base_unit: base_unit.to_string(),
        last_alerted_at: None,
        created_at: chrono::Utc::now(),
    }
}

/// Sets up a test database with one trialing user.
pub async fn setup_with_user() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "test@example.com").await?;
    Ok((db, user))
}

/// Sets up a test database with a user and one default ingredient.
pub async fn setup_with_ingredient() -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::ingredient::Model,
)> {
    let (db, user) = setup_with_user().await?;
    let ingredient = create_test_ingredient(&db, user.id, "Farinha de trigo").await?;
    Ok((db, user, ingredient))
}

/// Notifier that records every delivery for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<CostAlert>>,
    reports: Mutex<Vec<(String, crate::core::report::WeeklyReport)>>,
}

impl Notifier for RecordingNotifier {
    fn send_cost_alert(&self, alert: &CostAlert) -> Result<()> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }

    fn send_weekly_report(
        &self,
        user: &entities::user::Model,
        report: &crate::core::report::WeeklyReport,
    ) -> Result<()> {
        self.reports
            .lock()
            .unwrap()
            .push((user.email.clone(), report.clone()));
        Ok(())
    }
}

/// Shareable handle around a [`RecordingNotifier`].
pub struct NotifierHandle {
    inner: Arc<RecordingNotifier>,
}

impl NotifierHandle {
    /// The notifier as the trait object the purchase pipeline expects.
    #[must_use]
    pub fn as_dyn(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.inner) as Arc<dyn Notifier>
    }

    /// Borrowed trait object for synchronous callers.
    #[must_use]
    pub fn inner(&self) -> &dyn Notifier {
        self.inner.as_ref()
    }

    /// Cost alerts recorded so far.
    #[must_use]
    pub fn alerts(&self) -> Vec<CostAlert> {
        self.inner.alerts.lock().unwrap().clone()
    }

    /// Weekly reports recorded so far, as (email, report) pairs.
    #[must_use]
    pub fn reports(&self) -> Vec<(String, crate::core::report::WeeklyReport)> {
        self.inner.reports.lock().unwrap().clone()
    }
}

/// Creates a fresh recording notifier handle.
#[must_use]
pub fn recording_notifier() -> NotifierHandle {
    NotifierHandle {
        inner: Arc::new(RecordingNotifier::default()),
    }
}
