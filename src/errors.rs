//! Unified error types for the costing engine.
//!
//! Validation failures (`InvalidQuantity`, `IncompatibleUnit`, `EmptyName`,
//! `EmptyRecipe`, `UnmappedPriceTier`) are caller-visible: they reject the
//! save that triggered them and are never retried. Everything else wraps
//! infrastructure failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong
        message: String,
    },

    #[error("Invalid quantity: {quantity} (must be positive)")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: f64,
    },

    #[error("Incompatible unit: {used} cannot be converted to base unit {base}")]
    IncompatibleUnit {
        /// Unit supplied by the caller
        used: String,
        /// Base unit of the ingredient
        base: String,
    },

    #[error("Unknown unit: {value}")]
    UnknownUnit {
        /// The string that failed to parse
        value: String,
    },

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Recipe has no ingredient lines")]
    EmptyRecipe,

    #[error("Billing event references unknown price tier: {price_tier}")]
    UnmappedPriceTier {
        /// Provider price identifier that has no configured plan mapping
        price_tier: String,
    },

    #[error("Ingredient not found: {id}")]
    IngredientNotFound {
        /// Ingredient identifier used in the lookup
        id: i64,
    },

    #[error("Recipe not found: {id}")]
    RecipeNotFound {
        /// Recipe identifier used in the lookup
        id: i64,
    },

    #[error("User not found: {reference}")]
    UserNotFound {
        /// User id or billing customer reference used in the lookup
        reference: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
