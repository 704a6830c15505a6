// Copyright 2023 Remi Bernotavicius

use crate::database;
use crate::database::models::{
    Ingredient, IngredientId, IngredientUsage, MealPlanRecipe, RecipeDifficulty, RecipeHandle,
    RecipeId, RecipeInstruction, RecipeIngredient, Restriction, RestrictionId, StorageType, UserId,
    UserIngredient, UserIngredientId,
};
use diesel::Connection as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::QueryResult;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;

pub fn add_user(
    conn: &mut database::Connection,
    new_username: &str,
    new_email: &str,
    new_password_hash: &str,
) -> QueryResult<UserId> {
    use database::schema::users::dsl::*;
    use diesel::insert_into;

    insert_into(users)
        .values((
            username.eq(new_username),
            email.eq(new_email),
            password_hash.eq(new_password_hash),
        ))
        .execute(conn)?;
    Ok(UserId::new(database::last_insert_rowid(conn)?))
}

#[allow(clippy::too_many_arguments)]
pub fn add_ingredient(
    conn: &mut database::Connection,
    new_name: &str,
    new_category: &str,
    new_unit: &str,
    new_expiration_approx: Option<i32>,
    new_main_food: bool,
    new_storage_type: StorageType,
    new_emoji: Option<&str>,
) -> QueryResult<IngredientId> {
    use database::schema::ingredients::dsl::*;
    use diesel::insert_into;

    insert_into(ingredients)
        .values((
            name.eq(new_name),
            category.eq(new_category),
            unit.eq(new_unit),
            expiration_approx.eq(new_expiration_approx),
            main_food.eq(new_main_food),
            storage_type.eq(new_storage_type),
            emoji.eq(new_emoji),
        ))
        .execute(conn)?;
    Ok(IngredientId::new(database::last_insert_rowid(conn)?))
}

/// Stocks a user's pantry with a fresh batch. The batch starts untouched,
/// so `remaining_quantity` equals `quantity`.
pub fn add_to_pantry(
    conn: &mut database::Connection,
    owner: UserId,
    new_ingredient_id: IngredientId,
    new_quantity: f32,
    new_added_date: chrono::NaiveDate,
    new_expiration_date: Option<chrono::NaiveDate>,
) -> QueryResult<UserIngredientId> {
    use database::schema::user_ingredients::dsl::*;
    use diesel::insert_into;

    insert_into(user_ingredients)
        .values((
            user_id.eq(owner),
            ingredient_id.eq(new_ingredient_id),
            quantity.eq(new_quantity),
            remaining_quantity.eq(new_quantity),
            added_date.eq(new_added_date),
            expiration_date.eq(new_expiration_date),
        ))
        .execute(conn)?;
    Ok(UserIngredientId::new(database::last_insert_rowid(conn)?))
}

/// Draws `amount` from a pantry batch and appends the matching usage
/// record, in one transaction. Overdrawing trips the batch's
/// `remaining_quantity >= 0` check and leaves both tables untouched.
/// Returns the quantity left after the draw.
pub fn use_ingredient(
    conn: &mut database::Connection,
    target: UserIngredientId,
    amount: f32,
    now: chrono::NaiveDateTime,
) -> QueryResult<f32> {
    conn.transaction(|conn| {
        let new_remaining: f32 = {
            use database::schema::user_ingredients::dsl::*;
            use diesel::update;

            update(user_ingredients.filter(user_ingredient_id.eq(target)))
                .set(remaining_quantity.eq(remaining_quantity - amount))
                .execute(conn)?;
            user_ingredients
                .filter(user_ingredient_id.eq(target))
                .select(remaining_quantity)
                .get_result(conn)?
        };

        {
            use database::schema::ingredients_usage::dsl::*;
            use diesel::insert_into;

            insert_into(ingredients_usage)
                .values((
                    user_ingredient_id.eq(target),
                    used_quantity.eq(amount),
                    remaining_quantity_after_use.eq(new_remaining),
                    usage_date.eq(now),
                ))
                .execute(conn)?;
        }

        log::debug!("used {amount} from batch {target:?}, {new_remaining} left");
        Ok(new_remaining)
    })
}

pub fn add_recipe(
    conn: &mut database::Connection,
    new_title: &str,
    new_description: &str,
    new_cuisine: &str,
    new_prep_time: i32,
    new_cook_time: i32,
    new_difficulty: RecipeDifficulty,
) -> QueryResult<RecipeId> {
    use database::schema::recipes::dsl::*;
    use diesel::insert_into;

    insert_into(recipes)
        .values((
            title.eq(new_title),
            description.eq(new_description),
            cuisine.eq(new_cuisine),
            prep_time.eq(new_prep_time),
            cook_time.eq(new_cook_time),
            difficulty.eq(new_difficulty),
        ))
        .execute(conn)?;
    Ok(RecipeId::new(database::last_insert_rowid(conn)?))
}

pub fn add_recipe_ingredient(
    conn: &mut database::Connection,
    new_recipe_id: RecipeId,
    new_ingredient_id: IngredientId,
    new_quantity: f32,
) -> QueryResult<()> {
    use database::schema::recipe_ingredients::dsl::*;
    use diesel::insert_into;

    insert_into(recipe_ingredients)
        .values((
            recipe_id.eq(new_recipe_id),
            ingredient_id.eq(new_ingredient_id),
            quantity.eq(new_quantity),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn add_recipe_step(
    conn: &mut database::Connection,
    new_recipe_id: RecipeId,
    new_step_number: i32,
    new_instruction: &str,
) -> QueryResult<()> {
    use database::schema::recipe_instruction::dsl::*;
    use diesel::insert_into;

    insert_into(recipe_instruction)
        .values((
            recipe_id.eq(new_recipe_id),
            step_number.eq(new_step_number),
            instruction.eq(new_instruction),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn add_restriction(
    conn: &mut database::Connection,
    new_name: &str,
) -> QueryResult<RestrictionId> {
    use database::schema::restriction::dsl::*;
    use diesel::insert_into;

    insert_into(restriction)
        .values(name.eq(new_name))
        .execute(conn)?;
    Ok(RestrictionId::new(database::last_insert_rowid(conn)?))
}

pub fn tag_recipe(
    conn: &mut database::Connection,
    target_recipe_id: RecipeId,
    target_tag_id: RestrictionId,
) -> QueryResult<()> {
    use database::schema::recipe_restriction::dsl::*;
    use diesel::insert_into;

    insert_into(recipe_restriction)
        .values((recipe_id.eq(target_recipe_id), tag_id.eq(target_tag_id)))
        .execute(conn)?;
    Ok(())
}

pub fn create_meal_plan(
    conn: &mut database::Connection,
    owner: UserId,
    plan_created_at: chrono::NaiveDateTime,
    new_servings: i32,
) -> QueryResult<()> {
    use database::schema::meal_plan::dsl::*;
    use diesel::insert_into;

    insert_into(meal_plan)
        .values((
            user_id.eq(owner),
            created_at.eq(plan_created_at),
            servings.eq(new_servings),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn add_meal_plan_recipe(
    conn: &mut database::Connection,
    owner: UserId,
    plan_created_at: chrono::NaiveDateTime,
    new_recipe_id: RecipeId,
) -> QueryResult<()> {
    use database::schema::meal_plan_recipes::dsl::*;
    use diesel::insert_into;

    insert_into(meal_plan_recipes)
        .values((
            user_id.eq(owner),
            created_at.eq(plan_created_at),
            recipe_id.eq(new_recipe_id),
        ))
        .execute(conn)?;
    Ok(())
}

/// Returns whether the planned recipe existed.
pub fn mark_cooked(
    conn: &mut database::Connection,
    owner: UserId,
    plan_created_at: chrono::NaiveDateTime,
    target_recipe_id: RecipeId,
    day: chrono::NaiveDate,
) -> QueryResult<bool> {
    use database::schema::meal_plan_recipes::dsl::*;
    use diesel::update;

    let updated = update(
        meal_plan_recipes
            .filter(user_id.eq(owner))
            .filter(created_at.eq(plan_created_at))
            .filter(recipe_id.eq(target_recipe_id)),
    )
    .set((cooked.eq(true), cooked_on.eq(day)))
    .execute(conn)?;
    Ok(updated > 0)
}

/// Everything a user currently holds, i.e. batches that aren't used up.
pub fn pantry(
    conn: &mut database::Connection,
    owner: UserId,
) -> QueryResult<Vec<(UserIngredient, Ingredient)>> {
    use database::schema::{ingredients, user_ingredients};

    user_ingredients::table
        .inner_join(ingredients::table)
        .filter(user_ingredients::user_id.eq(owner))
        .filter(user_ingredients::remaining_quantity.gt(0.0))
        .select((UserIngredient::as_select(), Ingredient::as_select()))
        .order(ingredients::name.asc())
        .load(conn)
}

pub fn recipe_ingredients(
    conn: &mut database::Connection,
    target_recipe_id: RecipeId,
) -> QueryResult<Vec<(RecipeIngredient, Ingredient)>> {
    use database::schema::{ingredients, recipe_ingredients};

    recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq(target_recipe_id))
        .select((RecipeIngredient::as_select(), Ingredient::as_select()))
        .load(conn)
}

pub fn recipe_steps(
    conn: &mut database::Connection,
    target_recipe_id: RecipeId,
) -> QueryResult<Vec<RecipeInstruction>> {
    use database::schema::recipe_instruction::dsl::*;

    recipe_instruction
        .filter(recipe_id.eq(target_recipe_id))
        .order(step_number.asc())
        .select(RecipeInstruction::as_select())
        .load(conn)
}

pub fn recipe_restrictions(
    conn: &mut database::Connection,
    target_recipe_id: RecipeId,
) -> QueryResult<Vec<Restriction>> {
    use database::schema::{recipe_restriction, restriction};

    recipe_restriction::table
        .inner_join(restriction::table)
        .filter(recipe_restriction::recipe_id.eq(target_recipe_id))
        .select(Restriction::as_select())
        .order(restriction::name.asc())
        .load(conn)
}

/// A batch's draws, oldest first.
pub fn usage_history(
    conn: &mut database::Connection,
    target: UserIngredientId,
) -> QueryResult<Vec<IngredientUsage>> {
    use database::schema::ingredients_usage::dsl::*;

    ingredients_usage
        .filter(user_ingredient_id.eq(target))
        .order((usage_date.asc(), usage_id.asc()))
        .select(IngredientUsage::as_select())
        .load(conn)
}

pub fn planned_recipes(
    conn: &mut database::Connection,
    owner: UserId,
    plan_created_at: chrono::NaiveDateTime,
) -> QueryResult<Vec<(MealPlanRecipe, RecipeHandle)>> {
    use database::schema::meal_plan_recipes::dsl::*;

    meal_plan_recipes
        .inner_join(database::schema::recipes::table)
        .filter(user_id.eq(owner))
        .filter(created_at.eq(plan_created_at))
        .select((MealPlanRecipe::as_select(), RecipeHandle::as_select()))
        .load(conn)
}

pub fn search_recipes(
    conn: &mut database::Connection,
    query: &str,
) -> QueryResult<Vec<RecipeHandle>> {
    use database::schema::recipes::dsl::*;
    use diesel::expression_methods::TextExpressionMethods as _;

    recipes
        .select(RecipeHandle::as_select())
        .filter(title.like(format!("%{query}%")))
        .load(conn)
}

#[cfg(test)]
fn date(year: i32, month: u32, day: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[cfg(test)]
fn datetime(year: i32, month: u32, day: u32) -> chrono::NaiveDateTime {
    date(year, month, day).and_hms_opt(12, 0, 0).unwrap()
}

#[cfg(test)]
fn test_user(conn: &mut database::Connection) -> UserId {
    add_user(conn, "remi", "remi@example.com", "not-a-real-hash").unwrap()
}

#[cfg(test)]
fn test_ingredient(
    conn: &mut database::Connection,
    ingredient_name: &str,
    shelf_life: Option<i32>,
) -> IngredientId {
    add_ingredient(
        conn,
        ingredient_name,
        "dairy",
        "liters",
        shelf_life,
        false,
        StorageType::Fridge,
        None,
    )
    .unwrap()
}

#[cfg(test)]
fn test_recipe(conn: &mut database::Connection, recipe_title: &str) -> RecipeId {
    add_recipe(
        conn,
        recipe_title,
        "",
        "french",
        10,
        25,
        RecipeDifficulty::Easy,
    )
    .unwrap()
}

#[test]
fn duplicate_email_rejected() {
    use diesel::result::{DatabaseErrorKind, Error};

    let mut conn = database::test_connection();
    test_user(&mut conn);

    let err = add_user(&mut conn, "other remi", "remi@example.com", "hash").unwrap_err();
    assert!(matches!(
        err,
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    ));
}

#[test]
fn recipe_ingredient_requires_existing_parents() {
    use diesel::result::{DatabaseErrorKind, Error};

    let mut conn = database::test_connection();

    let err =
        add_recipe_ingredient(&mut conn, RecipeId::new(77), IngredientId::new(88), 2.0)
            .unwrap_err();
    assert!(matches!(
        err,
        Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    ));

    let recipe = test_recipe(&mut conn, "omelette");
    let err = add_recipe_ingredient(&mut conn, recipe, IngredientId::new(88), 2.0).unwrap_err();
    assert!(matches!(
        err,
        Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    ));

    let eggs = test_ingredient(&mut conn, "eggs", Some(21));
    add_recipe_ingredient(&mut conn, recipe, eggs, 3.0).unwrap();
}

#[test]
fn duplicate_composite_keys_rejected() {
    use diesel::result::{DatabaseErrorKind, Error};

    let mut conn = database::test_connection();
    let user = test_user(&mut conn);
    let recipe = test_recipe(&mut conn, "ratatouille");
    let eggplant = test_ingredient(&mut conn, "eggplant", Some(7));

    add_recipe_ingredient(&mut conn, recipe, eggplant, 1.0).unwrap();
    let err = add_recipe_ingredient(&mut conn, recipe, eggplant, 2.0).unwrap_err();
    assert!(matches!(
        err,
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    ));

    add_recipe_step(&mut conn, recipe, 1, "slice the eggplant").unwrap();
    let err = add_recipe_step(&mut conn, recipe, 1, "dice the eggplant").unwrap_err();
    assert!(matches!(
        err,
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    ));

    let vegan = add_restriction(&mut conn, "vegan").unwrap();
    tag_recipe(&mut conn, recipe, vegan).unwrap();
    let err = tag_recipe(&mut conn, recipe, vegan).unwrap_err();
    assert!(matches!(
        err,
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    ));

    let created = datetime(2024, 3, 1);
    create_meal_plan(&mut conn, user, created, 4).unwrap();
    let err = create_meal_plan(&mut conn, user, created, 2).unwrap_err();
    assert!(matches!(
        err,
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    ));

    add_meal_plan_recipe(&mut conn, user, created, recipe).unwrap();
    let err = add_meal_plan_recipe(&mut conn, user, created, recipe).unwrap_err();
    assert!(matches!(
        err,
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    ));
}

#[test]
fn meal_plan_recipe_requires_existing_plan() {
    use diesel::result::{DatabaseErrorKind, Error};

    let mut conn = database::test_connection();
    let user = test_user(&mut conn);
    let recipe = test_recipe(&mut conn, "cassoulet");

    let err = add_meal_plan_recipe(&mut conn, user, datetime(2024, 3, 1), recipe).unwrap_err();
    assert!(matches!(
        err,
        Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    ));
}

#[test]
fn pantry_draws_record_history() {
    let mut conn = database::test_connection();
    let user = test_user(&mut conn);
    let milk = test_ingredient(&mut conn, "milk", Some(7));
    let batch = add_to_pantry(&mut conn, user, milk, 5.0, date(2024, 1, 1), None).unwrap();

    assert_eq!(
        use_ingredient(&mut conn, batch, 2.0, datetime(2024, 1, 2)).unwrap(),
        3.0
    );
    assert_eq!(
        use_ingredient(&mut conn, batch, 1.0, datetime(2024, 1, 3)).unwrap(),
        2.0
    );

    let history = usage_history(&mut conn, batch).unwrap();
    let levels: Vec<f32> = history
        .iter()
        .map(|u| u.remaining_quantity_after_use)
        .collect();
    assert_eq!(levels, vec![3.0, 2.0]);
    assert!(levels.windows(2).all(|w| w[1] <= w[0]));

    let held = pantry(&mut conn, user).unwrap();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].0.remaining_quantity, 2.0);
    assert_eq!(held[0].0.quantity, 5.0);
}

#[test]
fn overdrawing_pantry_rolls_back() {
    use diesel::result::Error;

    let mut conn = database::test_connection();
    let user = test_user(&mut conn);
    let milk = test_ingredient(&mut conn, "milk", Some(7));
    let batch = add_to_pantry(&mut conn, user, milk, 5.0, date(2024, 1, 1), None).unwrap();

    let err = use_ingredient(&mut conn, batch, 6.0, datetime(2024, 1, 2)).unwrap_err();
    assert!(matches!(err, Error::DatabaseError(..)));

    assert!(usage_history(&mut conn, batch).unwrap().is_empty());
    let held = pantry(&mut conn, user).unwrap();
    assert_eq!(held[0].0.remaining_quantity, 5.0);
}

#[test]
fn remaining_cannot_exceed_quantity() {
    use diesel::result::Error;

    let mut conn = database::test_connection();
    let user = test_user(&mut conn);
    let milk = test_ingredient(&mut conn, "milk", Some(7));

    let err = {
        use database::schema::user_ingredients::dsl::*;
        diesel::insert_into(user_ingredients)
            .values((
                user_id.eq(user),
                ingredient_id.eq(milk),
                quantity.eq(5.0f32),
                remaining_quantity.eq(6.0f32),
                added_date.eq(date(2024, 1, 1)),
            ))
            .execute(&mut conn)
            .unwrap_err()
    };
    assert!(matches!(err, Error::DatabaseError(..)));
}

#[test]
fn pantry_excludes_spent_batches() {
    use maplit::btreemap;

    let mut conn = database::test_connection();
    let user = test_user(&mut conn);
    let milk = test_ingredient(&mut conn, "milk", Some(7));
    let eggs = test_ingredient(&mut conn, "eggs", Some(21));

    let spent = add_to_pantry(&mut conn, user, milk, 1.0, date(2024, 1, 1), None).unwrap();
    use_ingredient(&mut conn, spent, 1.0, datetime(2024, 1, 2)).unwrap();
    add_to_pantry(&mut conn, user, eggs, 12.0, date(2024, 1, 1), None).unwrap();

    let held: std::collections::BTreeMap<String, f32> = pantry(&mut conn, user)
        .unwrap()
        .into_iter()
        .map(|(batch, ingredient)| (ingredient.name, batch.remaining_quantity))
        .collect();
    assert_eq!(held, btreemap! { "eggs".into() => 12.0 });
}

#[test]
fn recipe_steps_are_ordered() {
    let mut conn = database::test_connection();
    let recipe = test_recipe(&mut conn, "crepes");

    add_recipe_step(&mut conn, recipe, 2, "whisk in the flour").unwrap();
    add_recipe_step(&mut conn, recipe, 1, "beat the eggs").unwrap();
    add_recipe_step(&mut conn, recipe, 3, "rest the batter").unwrap();

    let steps = recipe_steps(&mut conn, recipe).unwrap();
    let numbers: Vec<i32> = steps.iter().map(|s| s.step_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(steps[0].instruction, "beat the eggs");
}

#[test]
fn restrictions_and_search() {
    let mut conn = database::test_connection();
    let soup = test_recipe(&mut conn, "chicken soup");
    let stew = test_recipe(&mut conn, "beef stew");

    let gluten_free = add_restriction(&mut conn, "gluten-free").unwrap();
    let dairy_free = add_restriction(&mut conn, "dairy-free").unwrap();
    tag_recipe(&mut conn, soup, gluten_free).unwrap();
    tag_recipe(&mut conn, soup, dairy_free).unwrap();

    let tags: Vec<String> = recipe_restrictions(&mut conn, soup)
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(tags, vec!["dairy-free", "gluten-free"]);
    assert!(recipe_restrictions(&mut conn, stew).unwrap().is_empty());

    let found = search_recipes(&mut conn, "soup").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "chicken soup");
}

#[test]
fn meal_plan_round_trip() {
    let mut conn = database::test_connection();
    let user = test_user(&mut conn);
    let soup = test_recipe(&mut conn, "chicken soup");
    let stew = test_recipe(&mut conn, "beef stew");

    let created = datetime(2024, 3, 1);
    create_meal_plan(&mut conn, user, created, 4).unwrap();
    add_meal_plan_recipe(&mut conn, user, created, soup).unwrap();
    add_meal_plan_recipe(&mut conn, user, created, stew).unwrap();

    assert!(mark_cooked(&mut conn, user, created, soup, date(2024, 3, 2)).unwrap());
    assert!(!mark_cooked(&mut conn, user, created, RecipeId::new(99), date(2024, 3, 2)).unwrap());

    let planned = planned_recipes(&mut conn, user, created).unwrap();
    assert_eq!(planned.len(), 2);
    for (entry, handle) in planned {
        if entry.recipe_id == soup {
            assert!(entry.cooked);
            assert_eq!(entry.cooked_on, Some(date(2024, 3, 2)));
            assert_eq!(handle.title, "chicken soup");
        } else {
            assert!(!entry.cooked);
            assert_eq!(entry.cooked_on, None);
        }
    }
}
