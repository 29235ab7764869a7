use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::models::{NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant, RestaurantPizza};
use crate::schema::{pizzas, restaurant_pizzas, restaurants};
use crate::serializer::{self, serialize_pizza, serialize_restaurant, serialize_restaurant_pizza};
use crate::{MAX_PRICE, MIN_PRICE};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Restaurant not found")]
    RestaurantNotFound,
    #[error("Restaurant or Pizza not found")]
    RestaurantOrPizzaNotFound,
    #[error("Price must be between 1 and 30")]
    InvalidPrice,
    #[error("Price must be a whole number")]
    FractionalPrice,
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

fn restaurant_pizzas_with_pizza(
    conn: &mut SqliteConnection,
    restaurant: &Restaurant,
) -> QueryResult<Vec<(RestaurantPizza, Pizza)>> {
    RestaurantPizza::belonging_to(restaurant)
        .inner_join(pizzas::table)
        .select((RestaurantPizza::as_select(), Pizza::as_select()))
        .order(restaurant_pizzas::id)
        .load(conn)
}

fn find_restaurant(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Restaurant>> {
    restaurants::table
        .find(id)
        .select(Restaurant::as_select())
        .first(conn)
        .optional()
}

fn find_pizza(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Pizza>> {
    pizzas::table
        .find(id)
        .select(Pizza::as_select())
        .first(conn)
        .optional()
}

pub fn list_restaurants(
    conn: &mut SqliteConnection,
) -> Result<Vec<serializer::Restaurant>, ServiceError> {
    conn.transaction(|conn| {
        let results = restaurants::table
            .select(Restaurant::as_select())
            .order(restaurants::id)
            .load(conn)?;

        let restaurant_pizzas = RestaurantPizza::belonging_to(&results)
            .inner_join(pizzas::table)
            .select((RestaurantPizza::as_select(), Pizza::as_select()))
            .order(restaurant_pizzas::id)
            .load::<(RestaurantPizza, Pizza)>(conn)?
            .grouped_by(&results);

        Ok(results
            .iter()
            .zip(restaurant_pizzas)
            .map(|(r, rps)| serialize_restaurant(r, &rps))
            .collect())
    })
}

pub fn get_restaurant(
    conn: &mut SqliteConnection,
    id: i32,
) -> Result<serializer::Restaurant, ServiceError> {
    conn.transaction(|conn| {
        let restaurant = find_restaurant(conn, id)?.ok_or(ServiceError::RestaurantNotFound)?;
        let rps = restaurant_pizzas_with_pizza(conn, &restaurant)?;

        Ok(serialize_restaurant(&restaurant, &rps))
    })
}

/// Deletes a restaurant together with its associations, as one unit.
///
/// Returns the number of associations removed.
pub fn delete_restaurant(conn: &mut SqliteConnection, id: i32) -> Result<usize, ServiceError> {
    conn.transaction(|conn| {
        if find_restaurant(conn, id)?.is_none() {
            return Err(ServiceError::RestaurantNotFound);
        }

        let removed = diesel::delete(
            restaurant_pizzas::table.filter(restaurant_pizzas::restaurant_id.eq(id)),
        )
        .execute(conn)?;
        diesel::delete(restaurants::table.find(id)).execute(conn)?;

        Ok(removed)
    })
}

pub fn list_pizzas(conn: &mut SqliteConnection) -> Result<Vec<serializer::Pizza>, ServiceError> {
    let results = pizzas::table
        .select(Pizza::as_select())
        .order(pizzas::id)
        .load(conn)?;

    Ok(results.iter().map(serialize_pizza).collect())
}

/// Checks a requested price against the allowed range and whole-number rule.
pub fn validate_price(price: Option<f64>) -> Result<i32, ServiceError> {
    let price = price
        .filter(|p| (f64::from(MIN_PRICE)..=f64::from(MAX_PRICE)).contains(p))
        .ok_or(ServiceError::InvalidPrice)?;
    if price.fract() != 0.0 {
        return Err(ServiceError::FractionalPrice);
    }

    Ok(price as i32)
}

/// Links a pizza to a restaurant at the given price.
///
/// Unknown (or absent) ids are reported before the price is looked at.
pub fn create_restaurant_pizza(
    conn: &mut SqliteConnection,
    restaurant_id: Option<i32>,
    pizza_id: Option<i32>,
    price: Option<f64>,
) -> Result<serializer::RestaurantPizza, ServiceError> {
    conn.transaction(|conn| {
        let restaurant = match restaurant_id {
            Some(id) => find_restaurant(conn, id)?,
            None => None,
        };
        let pizza = match pizza_id {
            Some(id) => find_pizza(conn, id)?,
            None => None,
        };
        let (Some(restaurant), Some(pizza)) = (restaurant, pizza) else {
            return Err(ServiceError::RestaurantOrPizzaNotFound);
        };

        let price = validate_price(price)?;

        let created = diesel::insert_into(restaurant_pizzas::table)
            .values(&NewRestaurantPizza {
                price,
                restaurant_id: restaurant.id,
                pizza_id: pizza.id,
            })
            .returning(RestaurantPizza::as_returning())
            .get_result(conn)?;

        Ok(serialize_restaurant_pizza(&created, &restaurant, &pizza))
    })
}

pub fn create_restaurant(
    conn: &mut SqliteConnection,
    name: &str,
    address: &str,
) -> QueryResult<Restaurant> {
    diesel::insert_into(restaurants::table)
        .values(&NewRestaurant { name, address })
        .returning(Restaurant::as_returning())
        .get_result(conn)
}

pub fn create_pizza(
    conn: &mut SqliteConnection,
    name: &str,
    ingredients: &str,
) -> QueryResult<Pizza> {
    diesel::insert_into(pizzas::table)
        .values(&NewPizza { name, ingredients })
        .returning(Pizza::as_returning())
        .get_result(conn)
}
