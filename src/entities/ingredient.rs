//! Ingredient entity - A purchasable input with normalized pricing.
//!
//! Package purchase data (`package_price`, `package_quantity`, `package_unit`)
//! is what the user enters; `base_price`/`base_unit` are derived by the unit
//! normalizer so recipe costing always works in canonical units (`g`, `ml`,
//! `un`). Only purchase updates mutate this row; recipe operations never do.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ingredient database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingredients")]
pub struct Model {
    /// Unique identifier for the ingredient
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the ingredient (e.g., "Farinha de trigo")
    pub name: String,
    /// ID of the owning user
    pub user_id: i64,
    /// Price paid for the last purchased package
    pub package_price: f64,
    /// Quantity in the purchased package, in `package_unit`
    pub package_quantity: f64,
    /// Unit the package was purchased in: `"kg"`, `"g"`, `"l"`, `"ml"`, `"un"`
    pub package_unit: String,
    /// Derived price per base unit
    pub base_price: f64,
    /// Canonical unit for costing: `"g"`, `"ml"` or `"un"`
    pub base_unit: String,
    /// When a cost alert last fired for this ingredient, if ever
    pub last_alerted_at: Option<DateTimeUtc>,
    /// When the ingredient was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Ingredient and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ingredient belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One ingredient has many price history entries
    #[sea_orm(has_many = "super::price_history::Entity")]
    PriceHistory,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::price_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
