//! JSON representations of catalog rows.
//!
//! Each nesting level has its own type, so a restaurant's associations never
//! carry the restaurant again and an association's restaurant never carries
//! its associations.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models;

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct Pizza {
    pub id: i32,
    pub name: Option<String>,
    pub ingredients: Option<String>,
}

/// A restaurant without its associations.
#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct RestaurantSummary {
    pub id: i32,
    pub name: String,
    pub address: String,
}

/// An association as nested under its restaurant.
#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct RestaurantPizzaEntry {
    pub id: i32,
    pub price: i32,
    pub pizza_id: i32,
    pub restaurant_id: i32,
    pub pizza: Pizza,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub restaurant_pizzas: Vec<RestaurantPizzaEntry>,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct RestaurantPizza {
    pub id: i32,
    pub price: i32,
    pub pizza_id: i32,
    pub restaurant_id: i32,
    pub pizza: Pizza,
    pub restaurant: RestaurantSummary,
}

pub fn serialize_pizza(pizza: &models::Pizza) -> Pizza {
    Pizza {
        id: pizza.id,
        name: pizza.name.clone(),
        ingredients: pizza.ingredients.clone(),
    }
}

pub fn serialize_restaurant_summary(restaurant: &models::Restaurant) -> RestaurantSummary {
    RestaurantSummary {
        id: restaurant.id,
        name: restaurant.name.clone(),
        address: restaurant.address.clone(),
    }
}

pub fn serialize_restaurant(
    restaurant: &models::Restaurant,
    restaurant_pizzas: &[(models::RestaurantPizza, models::Pizza)],
) -> Restaurant {
    Restaurant {
        id: restaurant.id,
        name: restaurant.name.clone(),
        address: restaurant.address.clone(),
        restaurant_pizzas: restaurant_pizzas
            .iter()
            .map(|(rp, pizza)| RestaurantPizzaEntry {
                id: rp.id,
                price: rp.price,
                pizza_id: rp.pizza_id,
                restaurant_id: rp.restaurant_id,
                pizza: serialize_pizza(pizza),
            })
            .collect(),
    }
}

pub fn serialize_restaurant_pizza(
    restaurant_pizza: &models::RestaurantPizza,
    restaurant: &models::Restaurant,
    pizza: &models::Pizza,
) -> RestaurantPizza {
    RestaurantPizza {
        id: restaurant_pizza.id,
        price: restaurant_pizza.price,
        pizza_id: restaurant_pizza.pizza_id,
        restaurant_id: restaurant_pizza.restaurant_id,
        pizza: serialize_pizza(pizza),
        restaurant: serialize_restaurant_summary(restaurant),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn karens() -> models::Restaurant {
        models::Restaurant {
            id: 1,
            name: "Karen's Pizza Shack".to_string(),
            address: "address1".to_string(),
        }
    }

    fn emma() -> models::Pizza {
        models::Pizza {
            id: 2,
            name: Some("Emma".to_string()),
            ingredients: Some("Dough, Tomato Sauce, Cheese".to_string()),
        }
    }

    fn association() -> models::RestaurantPizza {
        models::RestaurantPizza {
            id: 3,
            price: 15,
            restaurant_id: 1,
            pizza_id: 2,
        }
    }

    #[test]
    fn test_restaurant_nests_pizza_but_not_itself() {
        let value =
            serde_json::to_value(serialize_restaurant(&karens(), &[(association(), emma())]))
                .unwrap();

        assert_eq!(
            value,
            json!({
                "id": 1,
                "name": "Karen's Pizza Shack",
                "address": "address1",
                "restaurant_pizzas": [{
                    "id": 3,
                    "price": 15,
                    "pizza_id": 2,
                    "restaurant_id": 1,
                    "pizza": {
                        "id": 2,
                        "name": "Emma",
                        "ingredients": "Dough, Tomato Sauce, Cheese",
                    },
                }],
            })
        );
    }

    #[test]
    fn test_restaurant_pizza_nests_restaurant_without_associations() {
        let value =
            serde_json::to_value(serialize_restaurant_pizza(&association(), &karens(), &emma()))
                .unwrap();

        assert_eq!(
            value["restaurant"],
            json!({ "id": 1, "name": "Karen's Pizza Shack", "address": "address1" })
        );
        assert_eq!(value["pizza"]["name"], "Emma");
        assert_eq!(value["price"], 15);
    }

    #[test]
    fn test_pizza_with_missing_fields() {
        let pizza = models::Pizza {
            id: 9,
            name: None,
            ingredients: None,
        };
        assert_eq!(
            serde_json::to_value(serialize_pizza(&pizza)).unwrap(),
            json!({ "id": 9, "name": null, "ingredients": null })
        );
    }
}
