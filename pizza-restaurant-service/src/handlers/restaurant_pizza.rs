use axum::{Router, extract::State, http::StatusCode, response::Json, routing::post};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::serializer::RestaurantPizza;
use crate::service;

use super::AppState;

/// Fields are kept as raw JSON so that a wrongly typed value is answered with
/// the same 404/400 as a wrong value, not with a body rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestaurantPizzaRequest {
    /// Pizza being priced
    #[schema(value_type = Option<i32>)]
    pub pizza_id: Option<Value>,
    /// Restaurant selling the pizza
    #[schema(value_type = Option<i32>)]
    pub restaurant_id: Option<Value>,
    /// Whole-number price, between 1 and 30 inclusive
    #[schema(value_type = Option<f64>)]
    pub price: Option<Value>,
}

/// Anything that is not an integer in row id range can't name a row.
fn row_id(value: Option<&Value>) -> Option<i32> {
    value
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/restaurant_pizzas", post(create_restaurant_pizza))
}

#[utoipa::path(
    post,
    path = "/restaurant_pizzas",
    request_body = CreateRestaurantPizzaRequest,
    responses(
        (status = 201, description = "Restaurant pizza created", body = RestaurantPizza),
        (status = 400, description = "Missing, out of range or fractional price", body = super::ApiValidationErrorResponse),
        (status = 404, description = "Restaurant or pizza not found", body = super::ApiErrorResponse),
    ),
    tag = "restaurant_pizzas"
)]
#[instrument(skip(state))]
pub async fn create_restaurant_pizza(
    State(state): State<AppState>,
    Json(payload): Json<CreateRestaurantPizzaRequest>,
) -> Result<(StatusCode, Json<RestaurantPizza>), ApiError> {
    let conn = &mut *state.db.connection();
    let created = service::create_restaurant_pizza(
        conn,
        row_id(payload.restaurant_id.as_ref()),
        row_id(payload.pizza_id.as_ref()),
        payload.price.as_ref().and_then(Value::as_f64),
    )?;

    Ok((StatusCode::CREATED, Json(created)))
}
