// Copyright 2023 Remi Bernotavicius

use derive_more::Display;
use diesel::associations::{Associations, Identifiable};
use diesel::deserialize::Queryable;
use diesel::expression::Selectable;
use diesel_derive_enum::DbEnum;
use diesel_derive_newtype::DieselNewType;
use strum::EnumIter;

#[derive(DieselNewType, Debug, Hash, PartialEq, Eq, Copy, Clone)]
pub struct UserId(i32);

impl UserId {
    pub fn new(value: i32) -> Self {
        Self(value)
    }
}

#[derive(Queryable, Selectable, Identifiable, Clone)]
#[diesel(primary_key(user_id))]
#[diesel(table_name = crate::database::schema::users)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: chrono::NaiveDateTime,
}

/// Where an ingredient is kept at home.
#[derive(Debug, Display, EnumIter, Hash, Copy, Clone, PartialEq, Eq, DbEnum)]
pub enum StorageType {
    #[display("fridge")]
    Fridge,
    #[display("freezer")]
    Freezer,
    #[display("pantry")]
    Pantry,
    #[display("counter")]
    Counter,
}

impl StorageType {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

#[derive(DieselNewType, Debug, Hash, PartialEq, Eq, Copy, Clone)]
pub struct IngredientId(i32);

impl IngredientId {
    pub fn new(value: i32) -> Self {
        Self(value)
    }
}

#[derive(Queryable, Selectable, Identifiable, Clone)]
#[diesel(primary_key(ingredient_id))]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct Ingredient {
    pub ingredient_id: IngredientId,
    pub name: String,
    pub category: String,
    pub unit: String,
    /// Typical shelf life in days, `None` when unknown.
    pub expiration_approx: Option<i32>,
    pub main_food: bool,
    pub storage_type: StorageType,
    pub emoji: Option<String>,
}

#[derive(DieselNewType, Debug, Hash, PartialEq, Eq, Copy, Clone)]
pub struct UserIngredientId(i32);

impl UserIngredientId {
    pub fn new(value: i32) -> Self {
        Self(value)
    }
}

/// A batch of one ingredient in one user's pantry.
#[derive(Associations, Queryable, Selectable, Identifiable, Clone)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(belongs_to(Ingredient, foreign_key = ingredient_id))]
#[diesel(primary_key(user_ingredient_id))]
#[diesel(table_name = crate::database::schema::user_ingredients)]
pub struct UserIngredient {
    pub user_ingredient_id: UserIngredientId,
    pub user_id: UserId,
    pub ingredient_id: IngredientId,
    pub quantity: f32,
    pub remaining_quantity: f32,
    pub added_date: chrono::NaiveDate,
    pub expiration_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Display, EnumIter, Hash, Copy, Clone, PartialEq, Eq, DbEnum)]
pub enum RecipeDifficulty {
    #[display("easy")]
    Easy,
    #[display("medium")]
    Medium,
    #[display("hard")]
    Hard,
}

impl RecipeDifficulty {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

#[derive(DieselNewType, Debug, Hash, PartialEq, Eq, Copy, Clone)]
pub struct RecipeId(i32);

impl RecipeId {
    pub fn new(value: i32) -> Self {
        Self(value)
    }
}

#[derive(Queryable, Selectable, Identifiable, Clone)]
#[diesel(primary_key(recipe_id))]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct Recipe {
    pub recipe_id: RecipeId,
    pub title: String,
    pub description: String,
    pub cuisine: String,
    pub prep_time: i32,
    pub cook_time: i32,
    pub difficulty: RecipeDifficulty,
}

#[derive(Queryable, Selectable, Identifiable, Clone)]
#[diesel(primary_key(recipe_id))]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct RecipeHandle {
    pub recipe_id: RecipeId,
    pub title: String,
}

#[derive(Associations, Queryable, Selectable, Identifiable, Clone)]
#[diesel(belongs_to(Recipe, foreign_key = recipe_id))]
#[diesel(belongs_to(Ingredient, foreign_key = ingredient_id))]
#[diesel(primary_key(recipe_id, ingredient_id))]
#[diesel(table_name = crate::database::schema::recipe_ingredients)]
pub struct RecipeIngredient {
    pub recipe_id: RecipeId,
    pub ingredient_id: IngredientId,
    pub quantity: f32,
}

#[derive(Associations, Queryable, Selectable, Identifiable, Clone)]
#[diesel(belongs_to(Recipe, foreign_key = recipe_id))]
#[diesel(primary_key(recipe_id, step_number))]
#[diesel(table_name = crate::database::schema::recipe_instruction)]
pub struct RecipeInstruction {
    pub recipe_id: RecipeId,
    pub step_number: i32,
    pub instruction: String,
}

#[derive(DieselNewType, Debug, Hash, PartialEq, Eq, Copy, Clone)]
pub struct UsageId(i32);

impl UsageId {
    pub fn new(value: i32) -> Self {
        Self(value)
    }
}

/// One draw against a pantry batch. `remaining_quantity_after_use` records
/// the batch level right after the draw, so a batch's history is
/// non-increasing over time.
#[derive(Associations, Queryable, Selectable, Identifiable, Clone)]
#[diesel(belongs_to(UserIngredient, foreign_key = user_ingredient_id))]
#[diesel(primary_key(usage_id))]
#[diesel(table_name = crate::database::schema::ingredients_usage)]
pub struct IngredientUsage {
    pub usage_id: UsageId,
    pub user_ingredient_id: UserIngredientId,
    pub used_quantity: f32,
    pub remaining_quantity_after_use: f32,
    pub usage_date: chrono::NaiveDateTime,
}

#[derive(DieselNewType, Debug, Hash, PartialEq, Eq, Copy, Clone)]
pub struct RestrictionId(i32);

impl RestrictionId {
    pub fn new(value: i32) -> Self {
        Self(value)
    }
}

/// A dietary tag, e.g. "vegan".
#[derive(Queryable, Selectable, Identifiable, Clone)]
#[diesel(primary_key(tag_id))]
#[diesel(table_name = crate::database::schema::restriction)]
pub struct Restriction {
    pub tag_id: RestrictionId,
    pub name: String,
}

#[derive(Associations, Queryable, Selectable, Identifiable, Clone)]
#[diesel(belongs_to(Recipe, foreign_key = recipe_id))]
#[diesel(belongs_to(Restriction, foreign_key = tag_id))]
#[diesel(primary_key(recipe_id, tag_id))]
#[diesel(table_name = crate::database::schema::recipe_restriction)]
pub struct RecipeRestriction {
    pub recipe_id: RecipeId,
    pub tag_id: RestrictionId,
}

/// Identified by owner and creation time; there is no surrogate id.
#[derive(Associations, Queryable, Selectable, Identifiable, Clone)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(primary_key(user_id, created_at))]
#[diesel(table_name = crate::database::schema::meal_plan)]
pub struct MealPlan {
    pub user_id: UserId,
    pub created_at: chrono::NaiveDateTime,
    pub servings: i32,
}

#[derive(Associations, Queryable, Selectable, Identifiable, Clone)]
#[diesel(belongs_to(Recipe, foreign_key = recipe_id))]
#[diesel(primary_key(user_id, created_at, recipe_id))]
#[diesel(table_name = crate::database::schema::meal_plan_recipes)]
pub struct MealPlanRecipe {
    pub user_id: UserId,
    pub created_at: chrono::NaiveDateTime,
    pub recipe_id: RecipeId,
    pub cooked: bool,
    pub cooked_on: Option<chrono::NaiveDate>,
}
