//! HTTP surface for a turret node.
//!
//! Three routes carry the whole protocol: function upload, the publishing
//! endpoint peers consume during heal, and the heal request itself. Handlers
//! are thin adapters from the wire shapes to the protocol crates; every
//! error body is `{ message }` with the status code carrying the kind
//! (payment failures additionally carry the exact cost and this turret's
//! address so the client can retry with a corrected fee).

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use turret_core::TurretConfig;
use turret_heal::HealEngine;
use turret_store::TxFunctionStore;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    /// Function store serving uploads and the publishing endpoint.
    pub store: Arc<TxFunctionStore>,
    /// Rotation engine serving heal requests.
    pub engine: Arc<HealEngine>,
    /// Node configuration (for response fields such as the turret address).
    pub config: TurretConfig,
}

/// Build the complete router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/tx-functions", post(handlers::upload))
        .route("/tx-functions/:hash", get(handlers::tx_function_signer))
        .route("/heal", post(handlers::heal))
        .with_state(state)
}
