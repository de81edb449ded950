//! Weekly performance report generation.
//!
//! Once a week, each active user gets a summary of their best-performing
//! recent recipes and the ingredients whose prices moved the most. The
//! selection logic is pure; the surrounding functions query the last seven
//! days of data and hand non-empty reports to the notifier. Users with
//! nothing to report get no e-mail.

use crate::{
    core::{ingredient, price_history},
    entities::{User, price_history as price_history_entity, recipe as recipe_entity, user},
    errors::Result,
    notify::Notifier,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{DatabaseConnection, QueryOrder, prelude::*};
use std::cmp::Ordering;
use tracing::{info, warn};

/// How many recipes and ingredients a report highlights.
const TOP_N: usize = 3;

/// A recipe and its profit over the reporting window.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeProfit {
    /// Recipe name
    pub recipe_name: String,
    /// `sale_price - total_cost`
    pub profit: f64,
}

/// An ingredient and its price movement over the reporting window.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceVariation {
    /// Ingredient name
    pub ingredient_name: String,
    /// First-to-last unit price change over the window, percent
    pub variation_percent: f64,
}

/// One user's weekly summary.
#[derive(Debug, Clone, Default)]
pub struct WeeklyReport {
    /// Up to three most profitable recipes created in the window
    pub top_recipes: Vec<RecipeProfit>,
    /// Up to three largest ingredient price variations in the window
    pub top_movers: Vec<PriceVariation>,
}

impl WeeklyReport {
    /// True when there is nothing worth sending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top_recipes.is_empty() && self.top_movers.is_empty()
    }
}

/// Picks the most profitable recipes, highest first.
#[must_use]
pub fn top_recipes_by_profit(recipes: &[recipe_entity::Model]) -> Vec<RecipeProfit> {
    let mut profits: Vec<RecipeProfit> = recipes
        .iter()
        .map(|r| RecipeProfit {
            recipe_name: r.name.clone(),
            profit: r.sale_price - r.total_cost,
        })
        .collect();
    profits.sort_by(|a, b| b.profit.partial_cmp(&a.profit).unwrap_or(Ordering::Equal));
    profits.truncate(TOP_N);
    profits
}

/// Unit price change, in percent, between the first and last entries of an
/// ingredient's windowed history. None when fewer than two entries exist or
/// a rate cannot be established.
#[must_use]
pub fn window_variation(entries: &[price_history_entity::Model]) -> Option<f64> {
    let (first, last) = match entries {
        [first, .., last] => (first, last),
        _ => return None,
    };
    if first.quantity <= 0.0 || last.quantity <= 0.0 {
        return None;
    }
    let old_unit_price = first.price / first.quantity;
    let new_unit_price = last.price / last.quantity;
    if old_unit_price <= 0.0 {
        return None;
    }
    Some((new_unit_price - old_unit_price) / old_unit_price * 100.0)
}

/// Picks the largest price variations, biggest increase first.
#[must_use]
pub fn top_price_movers(mut variations: Vec<PriceVariation>) -> Vec<PriceVariation> {
    variations.sort_by(|a, b| {
        b.variation_percent
            .partial_cmp(&a.variation_percent)
            .unwrap_or(Ordering::Equal)
    });
    variations.truncate(TOP_N);
    variations
}

/// Builds one user's report over the week ending at `now`.
pub async fn build_weekly_report(
    db: &DatabaseConnection,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<WeeklyReport> {
    let week_ago = now - Duration::days(7);

    let recent_recipes = crate::entities::Recipe::find()
        .filter(recipe_entity::Column::UserId.eq(user_id))
        .filter(recipe_entity::Column::CreatedAt.gte(week_ago))
        .order_by_asc(recipe_entity::Column::CreatedAt)
        .all(db)
        .await?;
    let top_recipes = top_recipes_by_profit(&recent_recipes);

    let mut variations = Vec::new();
    for ing in ingredient::get_ingredients_for_user(db, user_id).await? {
        let entries = price_history::history_since(db, ing.id, week_ago).await?;
        if let Some(variation_percent) = window_variation(&entries) {
            variations.push(PriceVariation {
                ingredient_name: ing.name,
                variation_percent,
            });
        }
    }
    let top_movers = top_price_movers(variations);

    Ok(WeeklyReport {
        top_recipes,
        top_movers,
    })
}

/// Generates and delivers weekly reports for every active user.
///
/// Delivery failures are logged per user and do not stop the run. Returns
/// the number of reports sent.
pub async fn run_weekly_reports(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
) -> Result<usize> {
    let now = Utc::now();
    let active_users = User::find()
        .filter(user::Column::SubscriptionStatus.eq(crate::core::subscription::STATUS_ACTIVE))
        .all(db)
        .await?;

    let mut sent = 0;
    for u in active_users {
        let report = build_weekly_report(db, u.id, now).await?;
        if report.is_empty() {
            continue;
        }
        match notifier.send_weekly_report(&u, &report) {
            Ok(()) => {
                info!(email = %u.email, "weekly report sent");
                sent += 1;
            }
            Err(e) => warn!(email = %u.email, error = %e, "weekly report delivery failed"),
        }
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::recipe::{self, RecipeInput};
    use crate::core::units::Unit;
    use crate::test_utils::*;

    fn history_entry(price: f64, quantity: f64, at: DateTime<Utc>) -> price_history_entity::Model {
        price_history_entity::Model {
            id: 0,
            ingredient_id: 1,
            price,
            quantity,
            unit: "kg".to_string(),
            recorded_at: at,
        }
    }

    #[test]
    fn test_window_variation_first_vs_last() {
        let now = Utc::now();
        let entries = vec![
            history_entry(10.0, 1.0, now - Duration::days(6)),
            history_entry(50.0, 1.0, now - Duration::days(3)),
            history_entry(12.0, 1.0, now - Duration::days(1)),
        ];

        // Only the endpoints matter; the mid-week spike is invisible.
        let variation = window_variation(&entries).unwrap();
        assert!((variation - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_variation_needs_two_entries() {
        let now = Utc::now();
        assert!(window_variation(&[]).is_none());
        assert!(window_variation(&[history_entry(10.0, 1.0, now)]).is_none());
    }

    #[test]
    fn test_window_variation_skips_zero_rates() {
        let now = Utc::now();
        let zero_qty = vec![
            history_entry(10.0, 0.0, now - Duration::days(2)),
            history_entry(12.0, 1.0, now),
        ];
        assert!(window_variation(&zero_qty).is_none());

        let zero_price = vec![
            history_entry(0.0, 1.0, now - Duration::days(2)),
            history_entry(12.0, 1.0, now),
        ];
        assert!(window_variation(&zero_price).is_none());
    }

    #[test]
    fn test_top_movers_ordering_and_truncation() {
        let variations = vec![
            PriceVariation {
                ingredient_name: "a".to_string(),
                variation_percent: 5.0,
            },
            PriceVariation {
                ingredient_name: "b".to_string(),
                variation_percent: 30.0,
            },
            PriceVariation {
                ingredient_name: "c".to_string(),
                variation_percent: -10.0,
            },
            PriceVariation {
                ingredient_name: "d".to_string(),
                variation_percent: 12.0,
            },
        ];

        let top = top_price_movers(variations);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].ingredient_name, "b");
        assert_eq!(top[1].ingredient_name, "d");
        assert_eq!(top[2].ingredient_name, "a");
    }

    #[tokio::test]
    async fn test_build_report_selects_top_recipes() -> Result<()> {
        let (db, user, ing) = setup_with_ingredient().await?;

        for (name, margin) in [("Low", 10.0), ("High", 200.0), ("Mid", 50.0), ("Tiny", 5.0)] {
            recipe::create_recipe(
                &db,
                user.id,
                RecipeInput {
                    name: name.to_string(),
                    yield_quantity: 1.0,
                    yield_unit: None,
                    loss_percentage: 0.0,
                    profit_margin: margin,
                    preparation_steps: None,
                    lines: vec![(ing.id, 100.0, Unit::G)],
                },
            )
            .await?;
        }

        let report = build_weekly_report(&db, user.id, Utc::now()).await?;
        assert_eq!(report.top_recipes.len(), 3);
        assert_eq!(report.top_recipes[0].recipe_name, "High");
        assert_eq!(report.top_recipes[1].recipe_name, "Mid");
        assert_eq!(report.top_recipes[2].recipe_name, "Low");

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_report_for_idle_user() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let report = build_weekly_report(&db, user.id, Utc::now()).await?;
        assert!(report.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_run_skips_inactive_users() -> Result<()> {
        let (db, _user, ing) = setup_with_ingredient().await?;
        // The fixture user is trialing, not active; no report goes out even
        // though there is price movement.
        price_history::record(&db, ing.id, 14.0, 1.0, Unit::Kg, Utc::now()).await?;

        let notifier = recording_notifier();
        let sent = run_weekly_reports(&db, notifier.inner()).await?;
        assert_eq!(sent, 0);
        assert!(notifier.reports().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_run_sends_to_active_user() -> Result<()> {
        let (db, user, ing) = setup_with_ingredient().await?;
        activate_user(&db, user.id).await?;
        price_history::record(&db, ing.id, 14.0, 1.0, Unit::Kg, Utc::now()).await?;

        let notifier = recording_notifier();
        let sent = run_weekly_reports(&db, notifier.inner()).await?;
        assert_eq!(sent, 1);

        let reports = notifier.reports();
        assert_eq!(reports.len(), 1);
        let (email, report) = &reports[0];
        assert_eq!(email, &user.email);
        assert_eq!(report.top_movers.len(), 1);
        assert!((report.top_movers[0].variation_percent - 40.0).abs() < 1e-9);

        Ok(())
    }
}
