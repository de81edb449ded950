//! User entity - Account owner with subscription state.
//!
//! Besides identity and business details, the user row carries the
//! subscription fields consumed by the access state machine: `plan_type`,
//! `subscription_status` and `trial_ends_at`. Provider-reported statuses are
//! mirrored verbatim into `subscription_status`, so it is a plain string.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name of the account owner
    pub full_name: String,
    /// E-mail address, unique per account
    #[sea_orm(unique)]
    pub email: String,
    /// Name of the business (e.g., "Padaria Central")
    pub business_name: String,
    /// Kind of business (e.g., "Confeitaria", "Pizzaria")
    pub business_type: String,
    /// Phone / WhatsApp contact, if provided
    pub phone: Option<String>,
    /// Current plan: `"Trial"`, `"Monthly"`, `"Annual"` or `"None"`
    pub plan_type: String,
    /// Subscription status: `"trialing"`, `"pending"`, `"active"`, or a
    /// provider-defined status mirrored verbatim
    pub subscription_status: String,
    /// When the trial expires; None once a paid plan is active
    pub trial_ends_at: Option<DateTimeUtc>,
    /// Billing provider customer reference, set on checkout
    pub billing_customer_id: Option<String>,
    /// Whether the user has registered at least one ingredient
    pub has_created_ingredient: bool,
    /// Whether the user has saved at least one recipe
    pub has_created_recipe: bool,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many ingredients
    #[sea_orm(has_many = "super::ingredient::Entity")]
    Ingredients,
    /// One user owns many recipes
    #[sea_orm(has_many = "super::recipe::Entity")]
    Recipes,
}

impl Related<super::ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
