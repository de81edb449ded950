//! Recipe entity - A composition of ingredient lines with derived pricing.
//!
//! `total_cost`, `total_weight_g`, `cost_per_serving` and `sale_price` are
//! derived by the cost aggregator whenever the recipe is saved; they are never
//! edited directly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipe database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    /// Unique identifier for the recipe
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the recipe (e.g., "Bolo de cenoura")
    pub name: String,
    /// ID of the owning user
    pub user_id: i64,
    /// How many servings/units the recipe yields
    pub yield_quantity: f64,
    /// Unit of the yield (e.g., "fatias", "unidades")
    pub yield_unit: Option<String>,
    /// Percentage of the batch lost in preparation
    pub loss_percentage: f64,
    /// Desired profit margin on top of cost, 0-100 scale
    pub profit_margin: f64,
    /// Sum of all ingredient line costs
    pub total_cost: f64,
    /// Total mass of the recipe in grams (count-based lines contribute zero)
    pub total_weight_g: f64,
    /// `total_cost / yield_quantity`, or zero when the yield is zero
    pub cost_per_serving: f64,
    /// `total_cost * (1 + profit_margin / 100)`
    pub sale_price: f64,
    /// Free-form preparation instructions
    pub preparation_steps: Option<String>,
    /// When the recipe was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Recipe and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each recipe belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One recipe has many ingredient lines
    #[sea_orm(has_many = "super::recipe_ingredient::Entity")]
    IngredientLines,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::recipe_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IngredientLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
