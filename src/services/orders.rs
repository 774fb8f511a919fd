use crate::{
    entities::{order, order_item, Order, OrderItem},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// An order item to be persisted: quantity from the cart, name and unit
/// price snapshotted from the catalog.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

/// An order aggregate ready to persist.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub owner: String,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Exact decimal sum of the items' line totals. This becomes the
    /// persisted `total`, so it always reconciles with the items.
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum()
    }
}

/// A persisted order with its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

/// Append-only order history. Orders are written once, together with
/// their items, and never updated or deleted.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert an order and all of its items on the caller's connection,
    /// assigning id and creation time.
    ///
    /// Checkout passes its open transaction here, which keeps the header
    /// and items indivisible: either the whole aggregate commits or none
    /// of it does.
    pub async fn save_with_items<C: ConnectionTrait>(
        &self,
        conn: &C,
        new_order: NewOrder,
    ) -> Result<OrderWithItems, ServiceError> {
        let order_id = Uuid::new_v4();
        let created_at = Utc::now();

        let order = order::ActiveModel {
            id: Set(order_id),
            owner: Set(new_order.owner.clone()),
            total: Set(new_order.total()),
            created_at: Set(created_at),
        }
        .insert(conn)
        .await?;

        let mut items = Vec::with_capacity(new_order.items.len());
        for item in new_order.items {
            let saved = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                product_name: Set(item.product_name),
                unit_price: Set(item.unit_price),
                quantity: Set(item.quantity),
                created_at: Set(created_at),
            }
            .insert(conn)
            .await?;
            items.push(saved);
        }

        Ok(OrderWithItems { order, items })
    }

    /// All orders for an owner, most recent first, items attached.
    #[instrument(skip(self))]
    pub async fn list_for_owner(&self, owner: &str) -> Result<Vec<OrderWithItems>, ServiceError> {
        let rows = Order::find()
            .filter(order::Column::Owner.eq(owner))
            .order_by_desc(order::Column::CreatedAt)
            .find_with_related(OrderItem)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(order, items)| OrderWithItems { order, items })
            .collect())
    }

    pub async fn get(&self, order_id: Uuid) -> Result<OrderWithItems, ServiceError> {
        let order = Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {}", order_id)))?;
        let items = order.find_related(OrderItem).all(&*self.db).await?;
        Ok(OrderWithItems { order, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(price: Decimal, quantity: i32) -> NewOrderItem {
        NewOrderItem {
            product_id: Uuid::new_v4(),
            product_name: "test".to_string(),
            unit_price: price,
            quantity,
        }
    }

    #[test]
    fn total_is_exact_sum_of_line_totals() {
        let order = NewOrder {
            owner: "alice".to_string(),
            items: vec![item(dec!(11.20), 2), item(dec!(3.21), 5)],
        };
        assert_eq!(order.total(), dec!(38.45));
    }

    #[test]
    fn total_of_empty_item_list_is_zero() {
        let order = NewOrder {
            owner: "alice".to_string(),
            items: vec![],
        };
        assert_eq!(order.total(), Decimal::ZERO);
    }

    #[test]
    fn total_has_no_binary_float_drift() {
        // 0.1 + 0.2 style sums stay exact in decimal arithmetic.
        let order = NewOrder {
            owner: "bob".to_string(),
            items: vec![item(dec!(0.10), 1), item(dec!(0.20), 1)],
        };
        assert_eq!(order.total(), dec!(0.30));
    }
}
