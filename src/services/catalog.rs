use crate::{
    entities::{product, Product},
    errors::ServiceError,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Read-only access to the product catalog.
///
/// Cart views and checkout both resolve prices here; checkout passes its
/// own transaction so the lookups happen inside the transactional read
/// phase.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Resolve a product on the given connection.
    pub async fn lookup<C: ConnectionTrait>(
        &self,
        conn: &C,
        product_id: Uuid,
    ) -> Result<product::Model, ServiceError> {
        Product::find_by_id(product_id)
            .one(conn)
            .await?
            .ok_or(ServiceError::ProductNotFound(product_id))
    }

    pub async fn get(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        self.lookup(&*self.db, product_id).await
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<product::Model>, ServiceError> {
        Ok(Product::find()
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await?)
    }
}
