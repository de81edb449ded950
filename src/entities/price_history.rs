//! Price history entity - One immutable record per package purchase.
//!
//! Entries are append-only and ordered by `recorded_at`; the anomaly detector
//! compares the two most recent entries for an ingredient. Rows are only
//! removed when the owning ingredient is deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Price history database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_history")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the ingredient this purchase belongs to
    pub ingredient_id: i64,
    /// Price paid for the package
    pub price: f64,
    /// Quantity purchased, in `unit`
    pub quantity: f64,
    /// Unit of the purchase: `"kg"`, `"g"`, `"l"`, `"ml"`, `"un"`
    pub unit: String,
    /// When the purchase was recorded
    pub recorded_at: DateTimeUtc,
}

/// Defines relationships between `PriceHistory` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one ingredient
    #[sea_orm(
        belongs_to = "super::ingredient::Entity",
        from = "Column::IngredientId",
        to = "super::ingredient::Column::Id",
        on_delete = "Cascade"
    )]
    Ingredient,
}

impl Related<super::ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
