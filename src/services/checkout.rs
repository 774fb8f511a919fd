use crate::{
    entities::{cart_line, CartLine},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        cart::CartService,
        catalog::CatalogService,
        orders::{NewOrder, NewOrderItem, OrderService, OrderWithItems},
    },
};
use dashmap::DashMap;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// Converts a cart into an immutable, price-frozen order.
///
/// This is the only component that writes to both the cart store and the
/// order store in one logical operation, and it owns the transactional
/// boundary for that pair of writes.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    catalog: CatalogService,
    orders: OrderService,
    event_sender: Arc<EventSender>,
    /// Per-owner checkout serialization. Checkouts for different owners
    /// never contend.
    checkout_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        catalog: CatalogService,
        orders: OrderService,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            catalog,
            orders,
            event_sender,
            checkout_locks: Arc::new(DashMap::new()),
        }
    }

    /// Snapshot the owner's cart into an order and empty the cart.
    ///
    /// Runs as one transaction: read lines, price every line against the
    /// current catalog, insert the order aggregate, delete the cart
    /// lines, commit. Any failure before the commit rolls the whole
    /// transition back, so no order exists without its items and no cart
    /// is cleared without its order.
    ///
    /// Two concurrent checkouts for the same owner serialize on a
    /// per-owner lock; the second one finds the cart empty and fails
    /// with `EmptyCart`.
    #[instrument(skip(self))]
    pub async fn checkout(&self, owner: &str) -> Result<OrderWithItems, ServiceError> {
        let lock = self
            .checkout_locks
            .entry(owner.to_string())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        let txn = self.db.begin().await?;

        let lines = CartService::lines(&txn, owner).await?;
        if lines.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        // Price at persist time. These lookups fix the name and unit
        // price snapshots; a missing product aborts the transaction
        // before anything was written.
        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = self.catalog.lookup(&txn, line.product_id).await?;
            items.push(NewOrderItem {
                product_id: product.id,
                product_name: product.name,
                unit_price: product.price,
                quantity: line.quantity,
            });
        }

        let saved = self
            .orders
            .save_with_items(
                &txn,
                NewOrder {
                    owner: owner.to_string(),
                    items,
                },
            )
            .await?;

        CartLine::delete_many()
            .filter(cart_line::Column::Owner.eq(owner))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderPlaced {
                order_id: saved.order.id,
                owner: owner.to_string(),
                total: saved.order.total,
            })
            .await;

        info!(
            order_id = %saved.order.id,
            %owner,
            total = %saved.order.total,
            items = saved.items.len(),
            "checkout completed"
        );
        Ok(saved)
    }
}
