//! Subscription state machine and access gating.
//!
//! Registration creates a user either `trialing` (with a fixed expiry) or
//! `pending` (paid signup awaiting checkout). Billing events drive every
//! other transition: a completed checkout promotes to `active`, and
//! provider status changes are mirrored verbatim with no local
//! reinterpretation. [`is_access_active`] is the single authority on
//! whether a user may reach protected functionality.

use crate::{
    config::settings::BillingSettings,
    entities::{User, user},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use std::fmt;
use std::str::FromStr;

/// Subscription status a registration starts in.
pub const STATUS_TRIALING: &str = "trialing";
/// Status of a paid signup awaiting checkout confirmation.
pub const STATUS_PENDING: &str = "pending";
/// Status granting unconditional access.
pub const STATUS_ACTIVE: &str = "active";

/// The plan a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanType {
    /// Time-boxed trial access
    Trial,
    /// Monthly paid plan
    Monthly,
    /// Annual paid plan
    Annual,
    /// No plan (pending signup or lapsed)
    None,
}

impl FromStr for PlanType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Trial" => Ok(Self::Trial),
            "Monthly" => Ok(Self::Monthly),
            "Annual" => Ok(Self::Annual),
            "None" => Ok(Self::None),
            other => Err(Error::Config {
                message: format!("Unknown plan type: {other}"),
            }),
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Trial => "Trial",
            Self::Monthly => "Monthly",
            Self::Annual => "Annual",
            Self::None => "None",
        };
        write!(f, "{s}")
    }
}

/// Typed allow/deny result for the route-gating collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Serve the protected functionality
    Allowed,
    /// Redirect to plan selection
    Denied,
}

/// A billing-provider event relevant to the state machine.
#[derive(Debug, Clone)]
pub enum BillingEvent {
    /// A checkout finished successfully for a customer.
    CheckoutCompleted {
        /// Provider customer reference
        customer_ref: String,
        /// Provider price identifier of the purchased tier
        price_tier_ref: String,
    },
    /// The provider reports a status change on an existing subscription.
    StatusChanged {
        /// Provider customer reference
        customer_ref: String,
        /// Provider status string, mirrored verbatim
        status: String,
    },
}

/// Whether a subscription state grants access right now.
///
/// Access is active iff the status is `active`, or the status is `trialing`
/// and the trial has not yet expired. This is the sole authority consulted
/// before protected operations; do not reimplement the check elsewhere.
#[must_use]
pub fn is_access_active(
    status: &str,
    trial_ends_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    if status == STATUS_ACTIVE {
        return true;
    }
    if status == STATUS_TRIALING {
        return trial_ends_at.is_some_and(|ends| now < ends);
    }
    false
}

/// Gate wrapper over [`is_access_active`] for a loaded user.
#[must_use]
pub fn check_access(user: &user::Model, now: DateTime<Utc>) -> AccessDecision {
    if is_access_active(&user.subscription_status, user.trial_ends_at, now) {
        AccessDecision::Allowed
    } else {
        AccessDecision::Denied
    }
}

/// Details captured at registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Full name of the owner
    pub full_name: String,
    /// E-mail address
    pub email: String,
    /// Business name
    pub business_name: String,
    /// Business type
    pub business_type: String,
    /// Optional phone contact
    pub phone: Option<String>,
}

/// Creates a user on a trial: `trialing` status expiring after the
/// configured trial length.
pub async fn start_trial(
    db: &DatabaseConnection,
    registration: Registration,
    trial_length: chrono::Duration,
) -> Result<user::Model> {
    let now = Utc::now();
    insert_user(
        db,
        registration,
        PlanType::Trial,
        STATUS_TRIALING,
        Some(now + trial_length),
        now,
    )
    .await
}

/// Creates a user on a paid signup awaiting checkout: `pending` status, no
/// plan, no trial expiry.
pub async fn start_pending(
    db: &DatabaseConnection,
    registration: Registration,
) -> Result<user::Model> {
    let now = Utc::now();
    insert_user(db, registration, PlanType::None, STATUS_PENDING, None, now).await
}

async fn insert_user(
    db: &DatabaseConnection,
    registration: Registration,
    plan: PlanType,
    status: &str,
    trial_ends_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<user::Model> {
    let model = user::ActiveModel {
        full_name: Set(registration.full_name),
        email: Set(registration.email),
        business_name: Set(registration.business_name),
        business_type: Set(registration.business_type),
        phone: Set(registration.phone),
        plan_type: Set(plan.to_string()),
        subscription_status: Set(status.to_string()),
        trial_ends_at: Set(trial_ends_at),
        billing_customer_id: Set(None),
        has_created_ingredient: Set(false),
        has_created_recipe: Set(false),
        created_at: Set(now),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    Ok(result)
}

/// Links a user to the billing provider's customer reference.
///
/// Called when checkout starts, before any event for that customer can
/// arrive.
pub async fn attach_billing_customer(
    db: &DatabaseConnection,
    user_id: i64,
    customer_ref: String,
) -> Result<user::Model> {
    let existing = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            reference: user_id.to_string(),
        })?;

    let mut active: user::ActiveModel = existing.into();
    active.billing_customer_id = Set(Some(customer_ref));
    active.update(db).await.map_err(Into::into)
}

/// Applies a billing event to the referenced user's subscription state.
///
/// Checkout completion maps the purchased price tier through the configured
/// tier map; an unmapped tier rejects the event rather than guessing a
/// plan. Events are idempotent under at-least-once delivery: a duplicate
/// checkout for an already-active user on the same plan is a no-op.
pub async fn apply_billing_event(
    db: &DatabaseConnection,
    billing: &BillingSettings,
    event: BillingEvent,
) -> Result<user::Model> {
    match event {
        BillingEvent::CheckoutCompleted {
            customer_ref,
            price_tier_ref,
        } => {
            // Resolve the tier before touching the user so unmapped tiers
            // reject cleanly.
            let plan_name =
                billing
                    .price_tiers
                    .get(&price_tier_ref)
                    .ok_or(Error::UnmappedPriceTier {
                        price_tier: price_tier_ref.clone(),
                    })?;
            let plan = PlanType::from_str(plan_name)?;

            let existing = find_by_customer_ref(db, &customer_ref).await?;
            if existing.subscription_status == STATUS_ACTIVE
                && existing.plan_type == plan.to_string()
            {
                return Ok(existing);
            }

            let mut active: user::ActiveModel = existing.into();
            active.subscription_status = Set(STATUS_ACTIVE.to_string());
            active.plan_type = Set(plan.to_string());
            active.trial_ends_at = Set(None);
            active.update(db).await.map_err(Into::into)
        }
        BillingEvent::StatusChanged {
            customer_ref,
            status,
        } => {
            let existing = find_by_customer_ref(db, &customer_ref).await?;
            if existing.subscription_status == status {
                return Ok(existing);
            }

            let mut active: user::ActiveModel = existing.into();
            active.subscription_status = Set(status);
            active.update(db).await.map_err(Into::into)
        }
    }
}

async fn find_by_customer_ref(db: &DatabaseConnection, customer_ref: &str) -> Result<user::Model> {
    User::find()
        .filter(user::Column::BillingCustomerId.eq(customer_ref))
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            reference: customer_ref.to_string(),
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;
    use std::collections::HashMap;

    fn registration(email: &str) -> Registration {
        Registration {
            full_name: "Maria Silva".to_string(),
            email: email.to_string(),
            business_name: "Doceria da Maria".to_string(),
            business_type: "Confeitaria".to_string(),
            phone: None,
        }
    }

    fn tier_map() -> BillingSettings {
        let mut price_tiers = HashMap::new();
        price_tiers.insert("price_monthly".to_string(), "Monthly".to_string());
        price_tiers.insert("price_annual".to_string(), "Annual".to_string());
        BillingSettings { price_tiers }
    }

    #[test]
    fn test_access_boundaries() {
        let now = Utc::now();

        // Expired trial, even by one second, denies access.
        assert!(!is_access_active(
            STATUS_TRIALING,
            Some(now - Duration::seconds(1)),
            now
        ));
        assert!(is_access_active(
            STATUS_TRIALING,
            Some(now + Duration::seconds(1)),
            now
        ));
        // Trialing with no expiry recorded denies access.
        assert!(!is_access_active(STATUS_TRIALING, None, now));
        // Active ignores the trial clock entirely.
        assert!(is_access_active(STATUS_ACTIVE, None, now));
        assert!(is_access_active(
            STATUS_ACTIVE,
            Some(now - Duration::days(30)),
            now
        ));
        // Anything else denies.
        assert!(!is_access_active(STATUS_PENDING, None, now));
        assert!(!is_access_active("canceled", None, now));
        assert!(!is_access_active("past_due", None, now));
    }

    #[tokio::test]
    async fn test_trial_signup_state() -> Result<()> {
        let db = setup_test_db().await?;

        let user = start_trial(&db, registration("maria@example.com"), Duration::days(7)).await?;

        assert_eq!(user.subscription_status, STATUS_TRIALING);
        assert_eq!(user.plan_type, "Trial");
        let ends = user.trial_ends_at.unwrap();
        assert!(ends > Utc::now() + Duration::days(6));
        assert_eq!(check_access(&user, Utc::now()), AccessDecision::Allowed);

        Ok(())
    }

    #[tokio::test]
    async fn test_pending_signup_state() -> Result<()> {
        let db = setup_test_db().await?;

        let user = start_pending(&db, registration("joao@example.com")).await?;

        assert_eq!(user.subscription_status, STATUS_PENDING);
        assert_eq!(user.plan_type, "None");
        assert!(user.trial_ends_at.is_none());
        assert_eq!(check_access(&user, Utc::now()), AccessDecision::Denied);

        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_promotes_to_active() -> Result<()> {
        let db = setup_test_db().await?;
        let user = start_trial(&db, registration("maria@example.com"), Duration::days(7)).await?;
        attach_billing_customer(&db, user.id, "cus_123".to_string()).await?;

        let updated = apply_billing_event(
            &db,
            &tier_map(),
            BillingEvent::CheckoutCompleted {
                customer_ref: "cus_123".to_string(),
                price_tier_ref: "price_monthly".to_string(),
            },
        )
        .await?;

        assert_eq!(updated.subscription_status, STATUS_ACTIVE);
        assert_eq!(updated.plan_type, "Monthly");
        assert!(updated.trial_ends_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_checkout_is_noop() -> Result<()> {
        let db = setup_test_db().await?;
        let user = start_pending(&db, registration("maria@example.com")).await?;
        attach_billing_customer(&db, user.id, "cus_123".to_string()).await?;

        let event = BillingEvent::CheckoutCompleted {
            customer_ref: "cus_123".to_string(),
            price_tier_ref: "price_annual".to_string(),
        };

        let first = apply_billing_event(&db, &tier_map(), event.clone()).await?;
        let second = apply_billing_event(&db, &tier_map(), event).await?;

        assert_eq!(first, second);
        assert_eq!(second.subscription_status, STATUS_ACTIVE);
        assert_eq!(second.plan_type, "Annual");

        Ok(())
    }

    #[tokio::test]
    async fn test_unmapped_price_tier_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let user = start_pending(&db, registration("maria@example.com")).await?;
        attach_billing_customer(&db, user.id, "cus_123".to_string()).await?;

        let result = apply_billing_event(
            &db,
            &tier_map(),
            BillingEvent::CheckoutCompleted {
                customer_ref: "cus_123".to_string(),
                price_tier_ref: "price_unknown".to_string(),
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::UnmappedPriceTier { .. }
        ));

        // The user is untouched.
        let untouched = User::find_by_id(user.id).one(&db).await?.unwrap();
        assert_eq!(untouched.subscription_status, STATUS_PENDING);

        Ok(())
    }

    #[tokio::test]
    async fn test_provider_status_mirrored_verbatim() -> Result<()> {
        let db = setup_test_db().await?;
        let user = start_pending(&db, registration("maria@example.com")).await?;
        attach_billing_customer(&db, user.id, "cus_123".to_string()).await?;
        apply_billing_event(
            &db,
            &tier_map(),
            BillingEvent::CheckoutCompleted {
                customer_ref: "cus_123".to_string(),
                price_tier_ref: "price_monthly".to_string(),
            },
        )
        .await?;

        let updated = apply_billing_event(
            &db,
            &tier_map(),
            BillingEvent::StatusChanged {
                customer_ref: "cus_123".to_string(),
                status: "past_due".to_string(),
            },
        )
        .await?;

        assert_eq!(updated.subscription_status, "past_due");
        assert_eq!(check_access(&updated, Utc::now()), AccessDecision::Denied);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_customer_rejected() -> Result<()> {
        let db = setup_test_db().await?;

        let result = apply_billing_event(
            &db,
            &tier_map(),
            BillingEvent::StatusChanged {
                customer_ref: "cus_ghost".to_string(),
                status: "canceled".to_string(),
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::UserNotFound { .. }));

        Ok(())
    }
}
