use crate::handlers::common::{no_content_response, success_response, validate_input};
use crate::{auth::Owner, errors::ServiceError, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for cart endpoints
pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(view_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/:product_id", put(update_item).delete(remove_item))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
}

/// Get the priced view of the caller's cart
async fn view_cart(
    State(state): State<Arc<AppState>>,
    owner: Owner,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state.services.cart.get_view(owner.as_str()).await?;
    Ok(success_response(view))
}

/// Add a quantity of a product to the cart, creating the line if needed
async fn add_item(
    State(state): State<Arc<AppState>>,
    owner: Owner,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let line = state
        .services
        .cart
        .add_or_update(owner.as_str(), payload.product_id, payload.quantity)
        .await?;

    Ok(success_response(line))
}

/// Overwrite the quantity of an existing cart line
async fn update_item(
    State(state): State<Arc<AppState>>,
    owner: Owner,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let line = state
        .services
        .cart
        .set_quantity(owner.as_str(), product_id, payload.quantity)
        .await?;

    Ok(success_response(line))
}

/// Remove a product from the cart
async fn remove_item(
    State(state): State<Arc<AppState>>,
    owner: Owner,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .cart
        .remove(owner.as_str(), product_id)
        .await?;

    Ok(no_content_response())
}

/// Empty the cart
async fn clear_cart(
    State(state): State<Arc<AppState>>,
    owner: Owner,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.cart.clear(owner.as_str()).await?;
    Ok(no_content_response())
}
