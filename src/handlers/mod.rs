pub mod cart;
pub mod common;
pub mod health;
pub mod orders;
pub mod products;

use crate::{
    events::EventSender,
    services::{CartService, CatalogService, CheckoutService, OrderService},
    AppState,
};
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Service container shared by all handlers.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub cart: CartService,
    pub checkout: CheckoutService,
    pub orders: OrderService,
}

impl AppServices {
    pub fn build(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        let catalog = CatalogService::new(db.clone());
        let orders = OrderService::new(db.clone());
        let cart = CartService::new(db.clone(), catalog.clone(), event_sender.clone());
        let checkout =
            CheckoutService::new(db, catalog.clone(), orders.clone(), event_sender);
        Self {
            catalog,
            cart,
            checkout,
            orders,
        }
    }
}

/// All API routes, without middleware layers.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api/products", products::product_routes())
        .nest("/api/cart", cart::cart_routes())
        .nest("/api/orders", orders::order_routes())
        .merge(health::health_routes())
}
