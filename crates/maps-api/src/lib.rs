//! maps-api - HTTP API layer for the maps gateway
//!
//! Exposes one `POST` route per entry of the operation table. Every route
//! shares the same handler, parameterized by its
//! [`OperationSpec`](maps_core::OperationSpec), which forwards the request
//! body through the [`Dispatcher`](maps_gateway::Dispatcher).
//!
//! # Usage
//!
//! ```ignore
//! use maps_api::{create_router, AppState};
//! use maps_gateway::Dispatcher;
//!
//! let dispatcher = Dispatcher::from_config(&config, api_key)?;
//! let router = create_router(AppState::new(dispatcher));
//! ```

pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;
pub mod testing;

pub use error::ApiError;
pub use extract::Params;
pub use state::AppState;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use maps_core::OPERATIONS;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router with routes mounted at the root
pub fn create_router(state: AppState) -> Router {
    create_router_with_prefix(state, "")
}

/// Create the API router with every route mounted under `prefix` (e.g. "/api")
pub fn create_router_with_prefix(state: AppState, prefix: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut routes = Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Operation discovery
        .route("/operations", get(handlers::operations::list_operations));

    // Forwarded operations
    for spec in OPERATIONS.iter() {
        routes = routes.route(
            &spec.route(),
            post(move |state: State<AppState>, params: Params| {
                handlers::forward::forward(spec, state, params)
            }),
        );
    }

    let prefix = prefix.trim_end_matches('/');
    let router = if prefix.is_empty() {
        routes
    } else if prefix.starts_with('/') {
        Router::new().nest(prefix, routes)
    } else {
        Router::new().nest(&format!("/{}", prefix), routes)
    };

    router
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
