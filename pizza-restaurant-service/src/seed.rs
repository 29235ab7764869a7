use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::info;

use crate::models::NewRestaurantPizza;
use crate::schema::{pizzas, restaurant_pizzas, restaurants};
use crate::service::{create_pizza, create_restaurant};

const RESTAURANTS: &[(&str, &str)] = &[
    ("Karen's Pizza Shack", "address1"),
    ("Sanjay's Pizza", "address2"),
    ("Kiki's Pizza", "address3"),
];

const PIZZAS: &[(&str, &str)] = &[
    ("Emma", "Dough, Tomato Sauce, Cheese"),
    ("Geri", "Dough, Tomato Sauce, Cheese, Pepperoni"),
    ("Melanie", "Dough, Sauce, Ricotta, Red peppers, Mustard"),
];

/// (restaurant index, pizza index, price)
const PRICES: &[(usize, usize, i32)] = &[(0, 0, 1), (1, 1, 4), (2, 2, 5)];

#[derive(Debug, Default, PartialEq)]
pub struct SeedSummary {
    pub restaurants: usize,
    pub pizzas: usize,
    pub restaurant_pizzas: usize,
}

/// Replaces the whole catalog with the sample data.
pub fn seed(conn: &mut SqliteConnection) -> QueryResult<SeedSummary> {
    conn.transaction(|conn| {
        diesel::delete(restaurant_pizzas::table).execute(conn)?;
        diesel::delete(restaurants::table).execute(conn)?;
        diesel::delete(pizzas::table).execute(conn)?;

        let created_restaurants = RESTAURANTS
            .iter()
            .map(|(name, address)| create_restaurant(conn, name, address))
            .collect::<QueryResult<Vec<_>>>()?;
        let created_pizzas = PIZZAS
            .iter()
            .map(|(name, ingredients)| create_pizza(conn, name, ingredients))
            .collect::<QueryResult<Vec<_>>>()?;

        let associations = PRICES
            .iter()
            .map(|&(r, p, price)| NewRestaurantPizza {
                price,
                restaurant_id: created_restaurants[r].id,
                pizza_id: created_pizzas[p].id,
            })
            .collect::<Vec<_>>();
        for association in &associations {
            diesel::insert_into(restaurant_pizzas::table)
                .values(association)
                .execute(conn)?;
        }

        let summary = SeedSummary {
            restaurants: created_restaurants.len(),
            pizzas: created_pizzas.len(),
            restaurant_pizzas: associations.len(),
        };
        info!(?summary, "seeded catalog");

        Ok(summary)
    })
}
