//! Shopcart API Library
//!
//! Per-user shopping carts and the checkout transition that freezes them
//! into immutable, price-snapshotted orders.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let services = handlers::AppServices::build(db.clone(), Arc::new(event_sender.clone()));
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// Assembles the HTTP application around the given state.
pub fn app(state: Arc<AppState>) -> Router {
    handlers::api_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
