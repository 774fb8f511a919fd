use crate::handlers::common::{created_response, success_response};
use crate::{auth::Owner, errors::ServiceError, AppState};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Creates the router for order endpoints
pub fn order_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders))
        .route("/checkout", post(checkout))
        .route("/:id", get(get_order))
}

/// Convert the caller's cart into an order
async fn checkout(
    State(state): State<Arc<AppState>>,
    owner: Owner,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.checkout.checkout(owner.as_str()).await?;
    Ok(created_response(order))
}

/// List the caller's orders, most recent first
async fn list_orders(
    State(state): State<Arc<AppState>>,
    owner: Owner,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = state.services.orders.list_for_owner(owner.as_str()).await?;
    Ok(success_response(orders))
}

/// Get a single order; owners can only see their own
async fn get_order(
    State(state): State<Arc<AppState>>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.get(id).await?;
    if order.order.owner != owner.as_str() {
        return Err(ServiceError::NotFound(format!("order {}", id)));
    }
    Ok(success_response(order))
}
