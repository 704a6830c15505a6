// Copyright 2023 Remi Bernotavicius

use crate::database;
use crate::database::models::{UserId, UserIngredientId};
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::QueryResult;
use diesel::RunQueryDsl as _;

/// One pantry batch that hasn't passed its estimated expiration yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiringIngredient {
    pub user_ingredient_id: UserIngredientId,
    pub name: String,
    /// Quantity still on hand, not the originally stocked amount.
    pub quantity: f32,
    pub added_date: chrono::NaiveDate,
    pub estimated_expiration: chrono::NaiveDate,
    pub days_until_expiration: i64,
}

impl ExpiringIngredient {
    fn new(
        user_ingredient_id: UserIngredientId,
        name: String,
        quantity: f32,
        added_date: chrono::NaiveDate,
        shelf_life_days: i32,
        today: chrono::NaiveDate,
    ) -> Option<Self> {
        let estimated_expiration = added_date + chrono::Duration::days(shelf_life_days.into());
        let days_until_expiration = (estimated_expiration - today).num_days();
        (days_until_expiration >= 0).then_some(Self {
            user_ingredient_id,
            name,
            quantity,
            added_date,
            estimated_expiration,
            days_until_expiration,
        })
    }
}

/// Estimates when each of a user's held batches goes bad, soonest first.
///
/// A batch's estimate is its `added_date` plus the ingredient's
/// `expiration_approx` days. Already-expired batches are omitted, and so
/// are batches whose ingredient has no `expiration_approx`: with no shelf
/// life there is no estimate to report.
pub fn expiring_ingredients(
    conn: &mut database::Connection,
    owner: UserId,
    today: chrono::NaiveDate,
) -> QueryResult<Vec<ExpiringIngredient>> {
    use database::schema::{ingredients, user_ingredients};

    let held: Vec<(
        UserIngredientId,
        String,
        f32,
        chrono::NaiveDate,
        Option<i32>,
    )> = user_ingredients::table
        .inner_join(ingredients::table)
        .filter(user_ingredients::user_id.eq(owner))
        .filter(user_ingredients::remaining_quantity.gt(0.0))
        .select((
            user_ingredients::user_ingredient_id,
            ingredients::name,
            user_ingredients::remaining_quantity,
            user_ingredients::added_date,
            ingredients::expiration_approx,
        ))
        .load(conn)?;

    let mut report: Vec<_> = held
        .into_iter()
        .filter_map(|(batch, name, quantity, added, shelf_life)| {
            ExpiringIngredient::new(batch, name, quantity, added, shelf_life?, today)
        })
        .collect();
    report.sort_by_key(|entry| entry.days_until_expiration);
    Ok(report)
}

#[cfg(test)]
use crate::database::models::{IngredientId, StorageType};
#[cfg(test)]
use crate::query;

#[cfg(test)]
fn date(year: i32, month: u32, day: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[cfg(test)]
fn stocked_ingredient(
    conn: &mut database::Connection,
    owner: UserId,
    name: &str,
    shelf_life: Option<i32>,
    quantity: f32,
    added: chrono::NaiveDate,
) -> (IngredientId, UserIngredientId) {
    let ingredient = query::add_ingredient(
        conn,
        name,
        "dairy",
        "liters",
        shelf_life,
        false,
        StorageType::Fridge,
        None,
    )
    .unwrap();
    let batch = query::add_to_pantry(conn, owner, ingredient, quantity, added, None).unwrap();
    (ingredient, batch)
}

#[test]
fn soonest_expiring_first() {
    let mut conn = database::test_connection();
    let user = query::add_user(&mut conn, "remi", "remi@example.com", "hash").unwrap();

    let (_, milk) = stocked_ingredient(&mut conn, user, "milk", Some(7), 5.0, date(2024, 1, 1));
    let (_, spinach) =
        stocked_ingredient(&mut conn, user, "spinach", Some(5), 1.0, date(2024, 1, 1));

    let report = expiring_ingredients(&mut conn, user, date(2024, 1, 5)).unwrap();
    assert_eq!(report.len(), 2);

    // spinach (1 day left) sorts before milk (3 days left)
    assert_eq!(report[0].user_ingredient_id, spinach);
    assert_eq!(report[0].estimated_expiration, date(2024, 1, 6));
    assert_eq!(report[0].days_until_expiration, 1);

    assert_eq!(report[1].user_ingredient_id, milk);
    assert_eq!(report[1].name, "milk");
    assert_eq!(report[1].quantity, 5.0);
    assert_eq!(report[1].added_date, date(2024, 1, 1));
    assert_eq!(report[1].estimated_expiration, date(2024, 1, 8));
    assert_eq!(report[1].days_until_expiration, 3);
}

#[test]
fn expiring_today_still_listed() {
    let mut conn = database::test_connection();
    let user = query::add_user(&mut conn, "remi", "remi@example.com", "hash").unwrap();
    stocked_ingredient(&mut conn, user, "yogurt", Some(4), 2.0, date(2024, 1, 1));

    let report = expiring_ingredients(&mut conn, user, date(2024, 1, 5)).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].days_until_expiration, 0);
}

#[test]
fn expired_batches_omitted() {
    let mut conn = database::test_connection();
    let user = query::add_user(&mut conn, "remi", "remi@example.com", "hash").unwrap();
    stocked_ingredient(&mut conn, user, "cream", Some(2), 1.0, date(2024, 1, 1));

    let report = expiring_ingredients(&mut conn, user, date(2024, 1, 5)).unwrap();
    assert!(report.is_empty());
}

#[test]
fn unknown_shelf_life_omitted() {
    let mut conn = database::test_connection();
    let user = query::add_user(&mut conn, "remi", "remi@example.com", "hash").unwrap();
    stocked_ingredient(&mut conn, user, "salt", None, 1.0, date(2024, 1, 1));
    stocked_ingredient(&mut conn, user, "milk", Some(7), 5.0, date(2024, 1, 1));

    let report = expiring_ingredients(&mut conn, user, date(2024, 1, 5)).unwrap();
    let names: Vec<&str> = report.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["milk"]);
}

#[test]
fn spent_batches_omitted() {
    let mut conn = database::test_connection();
    let user = query::add_user(&mut conn, "remi", "remi@example.com", "hash").unwrap();
    let (_, batch) = stocked_ingredient(&mut conn, user, "milk", Some(7), 2.0, date(2024, 1, 1));
    query::use_ingredient(
        &mut conn,
        batch,
        2.0,
        date(2024, 1, 2).and_hms_opt(9, 0, 0).unwrap(),
    )
    .unwrap();

    let report = expiring_ingredients(&mut conn, user, date(2024, 1, 3)).unwrap();
    assert!(report.is_empty());
}

#[test]
fn other_users_pantries_not_reported() {
    let mut conn = database::test_connection();
    let user = query::add_user(&mut conn, "remi", "remi@example.com", "hash").unwrap();
    let neighbor = query::add_user(&mut conn, "sam", "sam@example.com", "hash").unwrap();
    stocked_ingredient(&mut conn, user, "milk", Some(7), 5.0, date(2024, 1, 1));

    let report = expiring_ingredients(&mut conn, neighbor, date(2024, 1, 5)).unwrap();
    assert!(report.is_empty());
}
