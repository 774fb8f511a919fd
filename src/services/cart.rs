use crate::{
    entities::{cart_line, CartLine},
    errors::ServiceError,
    events::{Event, EventSender},
    services::catalog::CatalogService,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// One cart line joined with its current catalog entry. Computed on
/// read, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedCartLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

/// Priced projection of a user's cart against current catalog prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub lines: Vec<PricedCartLine>,
    pub total: Decimal,
}

/// Cart operations for a single owner.
///
/// All operations are scoped to the identity supplied by the caller;
/// lines are keyed by (owner, product_id), so uniqueness is enforced by
/// the store itself.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    catalog: CatalogService,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        catalog: CatalogService,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            catalog,
            event_sender,
        }
    }

    /// Current cart lines for an owner, in insertion order.
    pub(crate) async fn lines<C: sea_orm::ConnectionTrait>(
        conn: &C,
        owner: &str,
    ) -> Result<Vec<cart_line::Model>, ServiceError> {
        Ok(CartLine::find()
            .filter(cart_line::Column::Owner.eq(owner))
            .order_by_asc(cart_line::Column::CreatedAt)
            .order_by_asc(cart_line::Column::ProductId)
            .all(conn)
            .await?)
    }

    /// Priced view of the owner's cart.
    ///
    /// Read-only; a line whose product no longer exists fails the whole
    /// view with `ProductNotFound` rather than being dropped, since a
    /// partial view would show a wrong total.
    #[instrument(skip(self))]
    pub async fn get_view(&self, owner: &str) -> Result<CartView, ServiceError> {
        let lines = Self::lines(&*self.db, owner).await?;

        let mut priced = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;
        for line in &lines {
            let product = self.catalog.lookup(&*self.db, line.product_id).await?;
            let line_total = product.price * Decimal::from(line.quantity);
            total += line_total;
            priced.push(PricedCartLine {
                product_id: product.id,
                name: product.name,
                unit_price: product.price,
                quantity: line.quantity,
                line_total,
            });
        }

        Ok(CartView {
            lines: priced,
            total,
        })
    }

    /// Add `delta_qty` to the owner's line for a product, creating the
    /// line if it does not exist yet.
    #[instrument(skip(self))]
    pub async fn add_or_update(
        &self,
        owner: &str,
        product_id: Uuid,
        delta_qty: i32,
    ) -> Result<cart_line::Model, ServiceError> {
        if delta_qty < 1 {
            return Err(ServiceError::InvalidQuantity(delta_qty));
        }

        let txn = self.db.begin().await?;

        let existing = CartLine::find_by_id((owner.to_string(), product_id))
            .one(&txn)
            .await?;

        let (line, event) = match existing {
            Some(line) => {
                let quantity = line.quantity + delta_qty;
                let mut active: cart_line::ActiveModel = line.into();
                active.quantity = Set(quantity);
                active.updated_at = Set(Utc::now());
                let updated = active.update(&txn).await?;
                (
                    updated,
                    Event::CartLineUpdated {
                        owner: owner.to_string(),
                        product_id,
                        quantity,
                    },
                )
            }
            None => {
                let now = Utc::now();
                let inserted = cart_line::ActiveModel {
                    owner: Set(owner.to_string()),
                    product_id: Set(product_id),
                    quantity: Set(delta_qty),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?;
                (
                    inserted,
                    Event::CartLineAdded {
                        owner: owner.to_string(),
                        product_id,
                        quantity: delta_qty,
                    },
                )
            }
        };

        txn.commit().await?;
        self.event_sender.send_or_log(event).await;

        info!(%owner, %product_id, quantity = line.quantity, "cart line upserted");
        Ok(line)
    }

    /// Overwrite the quantity of an existing line. The line must exist.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        owner: &str,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<cart_line::Model, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::InvalidQuantity(quantity));
        }

        let line = CartLine::find_by_id((owner.to_string(), product_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("cart line for product {}", product_id))
            })?;

        let mut active: cart_line::ActiveModel = line.into();
        active.quantity = Set(quantity);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CartLineUpdated {
                owner: owner.to_string(),
                product_id,
                quantity,
            })
            .await;

        Ok(updated)
    }

    /// Delete the line if present; succeeds quietly when it is not.
    #[instrument(skip(self))]
    pub async fn remove(&self, owner: &str, product_id: Uuid) -> Result<(), ServiceError> {
        let result = CartLine::delete_by_id((owner.to_string(), product_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected > 0 {
            self.event_sender
                .send_or_log(Event::CartLineRemoved {
                    owner: owner.to_string(),
                    product_id,
                })
                .await;
        }
        Ok(())
    }

    /// Delete every line for the owner; no-op on an already empty cart.
    #[instrument(skip(self))]
    pub async fn clear(&self, owner: &str) -> Result<(), ServiceError> {
        let result = CartLine::delete_many()
            .filter(cart_line::Column::Owner.eq(owner))
            .exec(&*self.db)
            .await?;

        if result.rows_affected > 0 {
            self.event_sender
                .send_or_log(Event::CartCleared {
                    owner: owner.to_string(),
                })
                .await;
            info!(%owner, lines = result.rows_affected, "cart cleared");
        }
        Ok(())
    }
}
