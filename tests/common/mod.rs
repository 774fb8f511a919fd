#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use shopcart_api::{
    auth::OWNER_HEADER,
    config::AppConfig,
    db,
    entities::product,
    events::{self, EventSender},
    AppState,
};

/// Helper harness for spinning up application state backed by an
/// in-memory SQLite database.
pub struct TestApp {
    pub state: Arc<AppState>,
    router: Router,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 18080);
        // A single pooled connection keeps the in-memory database alive
        // for the lifetime of the test.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::connect(&cfg).await.expect("failed to open test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = Arc::new(AppState::new(Arc::new(pool), cfg, event_sender));
        let router = shopcart_api::app(state.clone());

        Self {
            state,
            router,
            _event_task: event_task,
        }
    }

    /// Insert a catalog product and return its id.
    pub async fn seed_product(&self, name: &str, price: Decimal) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        product::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            description: Set(None),
            price: Set(price),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed product");
        id
    }

    /// Fire a request at the router and decode the JSON response.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        owner: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(owner) = owner {
            builder = builder.header(OWNER_HEADER, owner);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("failed to build request"),
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body was not valid JSON")
        };
        (status, json)
    }
}

/// Parse a JSON string field produced by Decimal serialization.
pub fn decimal_field(value: &serde_json::Value) -> Decimal {
    value
        .as_str()
        .expect("expected decimal as JSON string")
        .parse()
        .expect("expected parseable decimal")
}
