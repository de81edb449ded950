//! Database configuration module for `Margem`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{Ingredient, PriceHistory, Recipe, RecipeIngredient, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/margem.sqlite".to_string());

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// Tables are created in dependency order: users first, then ingredients and
/// recipes, then the tables referencing them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let user_table = schema.create_table_from_entity(User);
    let ingredient_table = schema.create_table_from_entity(Ingredient);
    let recipe_table = schema.create_table_from_entity(Recipe);
    let price_history_table = schema.create_table_from_entity(PriceHistory);
    let recipe_ingredient_table = schema.create_table_from_entity(RecipeIngredient);

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&ingredient_table)).await?;
    db.execute(builder.build(&recipe_table)).await?;
    db.execute(builder.build(&price_history_table)).await?;
    db.execute(builder.build(&recipe_ingredient_table)).await?;

    Ok(())
}
