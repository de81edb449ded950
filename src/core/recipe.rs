//! Recipe business logic - cost aggregation and derived pricing.
//!
//! The aggregator sums per-line costs using each ingredient's stored base
//! price, converting the usage quantity into the ingredient's base unit. A
//! line whose unit does not reduce to the ingredient's base unit family is
//! invalid input: the whole recipe save is rejected, never a silent skip.
//! Persistence writes the recipe and all its lines in one transaction.

use crate::{
    core::units::{self, BaseUnit, Unit},
    entities::{Ingredient, Recipe, RecipeIngredient, User, ingredient, recipe, recipe_ingredient, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use std::str::FromStr;

/// Aggregate cost of a recipe's ingredient lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecipeCosting {
    /// Sum of all line costs
    pub total_cost: f64,
    /// Total mass in grams; count-based lines contribute zero
    pub total_weight_g: f64,
}

/// One ingredient usage within a recipe, already resolved and parsed.
#[derive(Debug, Clone)]
pub struct CostLine {
    /// The ingredient being used
    pub ingredient: ingredient::Model,
    /// Quantity used, in `unit_used`
    pub quantity: f64,
    /// Unit the quantity is expressed in
    pub unit_used: Unit,
}

/// Input for creating or updating a recipe.
#[derive(Debug, Clone)]
pub struct RecipeInput {
    /// Recipe name
    pub name: String,
    /// How many servings the recipe yields
    pub yield_quantity: f64,
    /// Unit of the yield, free-form
    pub yield_unit: Option<String>,
    /// Percentage of the batch lost in preparation
    pub loss_percentage: f64,
    /// Desired profit margin, 0-100 scale
    pub profit_margin: f64,
    /// Free-form preparation instructions
    pub preparation_steps: Option<String>,
    /// Ingredient usages: (ingredient id, quantity, unit)
    pub lines: Vec<(i64, f64, Unit)>,
}

/// Sums the cost and weight of a recipe's ingredient lines.
///
/// Each line contributes `base_price * quantity_in_base_units`. The sum is
/// order-independent; a zero or negative quantity fails with
/// `InvalidQuantity`, a cross-family unit with `IncompatibleUnit`, and an
/// empty line list with `EmptyRecipe`.
pub fn compute_recipe_cost(lines: &[CostLine]) -> Result<RecipeCosting> {
    if lines.is_empty() {
        return Err(Error::EmptyRecipe);
    }

    let mut total_cost = 0.0;
    let mut total_weight_g = 0.0;

    for line in lines {
        if line.quantity <= 0.0 {
            return Err(Error::InvalidQuantity {
                quantity: line.quantity,
            });
        }
        let base = BaseUnit::from_str(&line.ingredient.base_unit)?;
        let quantity_in_base = units::convert_to_base(line.quantity, line.unit_used, base)?;
        total_cost += line.ingredient.base_price * quantity_in_base;
        total_weight_g += units::weight_grams(line.quantity, line.unit_used);
    }

    Ok(RecipeCosting {
        total_cost,
        total_weight_g,
    })
}

/// Suggested sale price for a cost at the given profit margin (0-100 scale).
#[must_use]
pub fn sale_price(total_cost: f64, profit_margin: f64) -> f64 {
    total_cost * (1.0 + profit_margin / 100.0)
}

/// Cost per serving; zero when the yield is zero rather than a division error.
#[must_use]
pub fn cost_per_serving(total_cost: f64, yield_quantity: f64) -> f64 {
    if yield_quantity > 0.0 {
        total_cost / yield_quantity
    } else {
        0.0
    }
}

/// Resolves the input's ingredient references against the owner's
/// ingredients. A reference to a missing or foreign ingredient fails.
async fn resolve_lines<C>(db: &C, user_id: i64, input: &RecipeInput) -> Result<Vec<CostLine>>
where
    C: ConnectionTrait,
{
    let mut lines = Vec::with_capacity(input.lines.len());
    for &(ingredient_id, quantity, unit_used) in &input.lines {
        let ingredient = Ingredient::find_by_id(ingredient_id)
            .filter(ingredient::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(Error::IngredientNotFound { id: ingredient_id })?;
        lines.push(CostLine {
            ingredient,
            quantity,
            unit_used,
        });
    }
    Ok(lines)
}

/// Creates a recipe with its ingredient lines and derived cost fields.
///
/// Costing runs before anything is written; a single bad line rejects the
/// whole save and nothing persists.
pub async fn create_recipe(
    db: &DatabaseConnection,
    user_id: i64,
    input: RecipeInput,
) -> Result<recipe::Model> {
    if input.name.trim().is_empty() {
        return Err(Error::EmptyName);
    }

    let txn = db.begin().await?;

    let lines = resolve_lines(&txn, user_id, &input).await?;
    let costing = compute_recipe_cost(&lines)?;

    let model = recipe::ActiveModel {
        name: Set(input.name.trim().to_string()),
        user_id: Set(user_id),
        yield_quantity: Set(input.yield_quantity),
        yield_unit: Set(input.yield_unit.clone()),
        loss_percentage: Set(input.loss_percentage),
        profit_margin: Set(input.profit_margin),
        total_cost: Set(costing.total_cost),
        total_weight_g: Set(costing.total_weight_g),
        cost_per_serving: Set(cost_per_serving(costing.total_cost, input.yield_quantity)),
        sale_price: Set(sale_price(costing.total_cost, input.profit_margin)),
        preparation_steps: Set(input.preparation_steps.clone()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let result = model.insert(&txn).await?;

    insert_lines(&txn, result.id, &lines).await?;

    User::update_many()
        .col_expr(user::Column::HasCreatedRecipe, Expr::value(true))
        .filter(user::Column::Id.eq(user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(result)
}

/// Recomputes and rewrites an existing recipe with new input.
///
/// Old lines are replaced wholesale; the same all-or-nothing validation as
/// [`create_recipe`] applies.
pub async fn update_recipe(
    db: &DatabaseConnection,
    recipe_id: i64,
    input: RecipeInput,
) -> Result<recipe::Model> {
    if input.name.trim().is_empty() {
        return Err(Error::EmptyName);
    }

    let txn = db.begin().await?;

    let existing = Recipe::find_by_id(recipe_id)
        .one(&txn)
        .await?
        .ok_or(Error::RecipeNotFound { id: recipe_id })?;

    let lines = resolve_lines(&txn, existing.user_id, &input).await?;
    let costing = compute_recipe_cost(&lines)?;

    let mut active: recipe::ActiveModel = existing.into();
    active.name = Set(input.name.trim().to_string());
    active.yield_quantity = Set(input.yield_quantity);
    active.yield_unit = Set(input.yield_unit.clone());
    active.loss_percentage = Set(input.loss_percentage);
    active.profit_margin = Set(input.profit_margin);
    active.total_cost = Set(costing.total_cost);
    active.total_weight_g = Set(costing.total_weight_g);
    active.cost_per_serving = Set(cost_per_serving(costing.total_cost, input.yield_quantity));
    active.sale_price = Set(sale_price(costing.total_cost, input.profit_margin));
    active.preparation_steps = Set(input.preparation_steps.clone());
    let result = active.update(&txn).await?;

    RecipeIngredient::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(&txn)
        .await?;
    insert_lines(&txn, recipe_id, &lines).await?;

    txn.commit().await?;
    Ok(result)
}

async fn insert_lines<C>(db: &C, recipe_id: i64, lines: &[CostLine]) -> Result<()>
where
    C: ConnectionTrait,
{
    for line in lines {
        let model = recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(line.ingredient.id),
            quantity: Set(line.quantity),
            unit_used: Set(line.unit_used.to_string()),
            ..Default::default()
        };
        model.insert(db).await?;
    }
    Ok(())
}

/// Finds a recipe by its unique ID.
pub async fn get_recipe_by_id(
    db: &DatabaseConnection,
    recipe_id: i64,
) -> Result<Option<recipe::Model>> {
    Recipe::find_by_id(recipe_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all recipes owned by a user, ordered alphabetically by name.
pub async fn get_recipes_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<recipe::Model>> {
    Recipe::find()
        .filter(recipe::Column::UserId.eq(user_id))
        .order_by_asc(recipe::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the ingredient lines of a recipe.
pub async fn get_lines_for_recipe(
    db: &DatabaseConnection,
    recipe_id: i64,
) -> Result<Vec<recipe_ingredient::Model>> {
    RecipeIngredient::find()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a recipe and its ingredient lines.
pub async fn delete_recipe(db: &DatabaseConnection, recipe_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Recipe::find_by_id(recipe_id)
        .one(&txn)
        .await?
        .ok_or(Error::RecipeNotFound { id: recipe_id })?;

    RecipeIngredient::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}
