use crate::handlers::common::success_response;
use crate::{errors::ServiceError, AppState};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Creates the router for the read-only catalog endpoints
pub fn product_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product))
}

/// List all catalog products
async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.catalog.list().await?;
    Ok(success_response(products))
}

/// Get a single product
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.catalog.get(id).await?;
    Ok(success_response(product))
}
