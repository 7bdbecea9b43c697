//! HTTP API Layer
//!
//! REST API for the billing system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: request handlers for bills and health
//! - **DTOs**: request/response data transfer objects (camelCase wire form)
//! - **Error Handling**: consistent error responses preserving the
//!   validation / not-found / conflict / dependency taxonomy
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState { service, pool });
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_bill::BillService;

use crate::handlers::{bill, health};

/// Application state shared across handlers.
///
/// Constructed once at startup and handed to the router; there is no global
/// service handle.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BillService>,
    pub pool: PgPool,
}

/// Creates the main API router.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let bill_routes = Router::new()
        .route("/bills", post(bill::create_bill).get(bill::list_all_bills))
        .route("/bills/:bill_id", get(bill::get_bill))
        .route("/bills/:bill_id/items", post(bill::add_line_item))
        .route("/bills/:bill_id/close", post(bill::close_bill))
        .route("/customers/:customer_id/bills", get(bill::list_bills));

    Router::new()
        .merge(public_routes)
        .merge(bill_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
