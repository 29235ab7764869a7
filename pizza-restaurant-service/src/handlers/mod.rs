pub mod pizza;
pub mod restaurant;
pub mod restaurant_pizza;

pub use pizza::router as pizza_router;
pub use restaurant::router as restaurant_router;
pub use restaurant_pizza::router as restaurant_pizza_router;

use axum::{Router, routing::get};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::db::Database;

pub const WELCOME_MESSAGE: &str =
    "Welcome to the Pizza API! Go to /restaurants or /restaurants/<id> to view the data.";

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiValidationErrorResponse {
    /// Every validation failure found in the request
    pub errors: Vec<String>,
}

pub fn home_router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = String, content_type = "text/plain"),
    ),
    tag = "home"
)]
pub async fn home() -> &'static str {
    WELCOME_MESSAGE
}

#[derive(OpenApi)]
#[openapi(
    paths(
        home,
        restaurant::list_restaurants,
        restaurant::get_restaurant,
        restaurant::delete_restaurant,
        pizza::list_pizzas,
        restaurant_pizza::create_restaurant_pizza,
    ),
    components(
        schemas(
            crate::serializer::Restaurant,
            crate::serializer::RestaurantSummary,
            crate::serializer::RestaurantPizzaEntry,
            crate::serializer::RestaurantPizza,
            crate::serializer::Pizza,
            restaurant_pizza::CreateRestaurantPizzaRequest,
            ApiErrorResponse,
            ApiValidationErrorResponse,
        )
    ),
    tags(
        (name = "home", description = "Service information"),
        (name = "restaurants", description = "Restaurant endpoints"),
        (name = "pizzas", description = "Pizza endpoints"),
        (name = "restaurant_pizzas", description = "Restaurant pizza pricing endpoints")
    ),
    info(
        title = "Pizza Restaurant API",
        description = "Restaurants, pizzas, and the prices restaurants sell them at",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;
