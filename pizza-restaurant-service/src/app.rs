use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::db::Database;
use crate::handlers::{
    ApiDoc, AppState, home_router, pizza_router, restaurant_pizza_router, restaurant_router,
};

pub fn router(db: Database) -> Router {
    let state = AppState { db };

    Router::new()
        .merge(home_router())
        .merge(restaurant_router())
        .merge(pizza_router())
        .merge(restaurant_pizza_router())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let db = Database::open(&config.database_url)?;
    info!(database_url = %config.database_url, "database ready");

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Pizza API listening on {}", listener.local_addr()?);

    axum::serve(listener, router(db)).await?;

    Ok(())
}
