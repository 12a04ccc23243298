//! # nesram HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /nes/read` - Decode catalogued addresses
//! - `POST /nes/write` - Encode and persist values
//! - `POST /nes/order` - Rearrange the party stat blocks
//! - `POST /nes/names/get` - Decode the four party names
//! - `POST /nes/bestiary/monsters` - Monsters at a location
//! - `POST /nes/bestiary/locations` - Locations of monsters
//! - `GET /nes/catalog` - List catalogued addresses
//!
//! ## CORS
//!
//! `cors_origins` in the config (or `NESRAM_CORS_ORIGINS`) restricts the
//! allowed origins. Left unset, any origin is allowed, since the usual client
//! is a local bot or browser tool pointed at a ramdisk on the same machine.

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `nesram::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    catalog_handler, health_handler, locations_handler, monsters_handler, names_handler,
    order_handler, read_handler, write_handler,
};
#[allow(unused_imports)]
pub use types::{
    ApiError, CatalogResponse, ErrorResponse, HealthResponse, LocationsRequest, LocationsResponse,
    MonstersRequest, MonstersResponse, OrderResponse, ReadRequest, ReadResponse, WriteResponse,
    api_error, json_body, order_slots, parse_body, write_values,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use nesram_core::{CodecError, RamService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (2 MB).
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state wrapping the codec service.
#[derive(Clone)]
pub struct AppState {
    /// The service owning paths and caches.
    pub service: Arc<RamService>,
}

impl AppState {
    /// Create new app state around a service.
    #[must_use]
    pub fn new(service: RamService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from the configured origins.
///
/// - `None`: any origin
/// - `Some(list)`: only the listed origins; invalid entries are skipped
pub fn build_cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = origins else {
        tracing::info!("CORS: Allowing any origin");
        return CorsLayer::permissive();
    };

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|s| match s.parse::<HeaderValue>() {
            Ok(hv) => {
                tracing::info!("CORS: Allowing origin: {}", s);
                Some(hv)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", s, e);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        tracing::warn!("CORS: No valid origins configured, cross-origin requests will be refused");
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints, allowing any origin.
pub fn create_router(state: AppState) -> Router {
    create_router_with_cors(state, build_cors_layer(None))
}

/// Create the axum router with an explicit CORS layer.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
pub fn create_router_with_cors(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/nes/read", post(handlers::read_handler))
        .route("/nes/write", post(handlers::write_handler))
        .route("/nes/order", post(handlers::order_handler))
        .route("/nes/names/get", post(handlers::names_handler))
        .route("/nes/bestiary/monsters", post(handlers::monsters_handler))
        .route("/nes/bestiary/locations", post(handlers::locations_handler))
        .route("/nes/catalog", get(handlers::catalog_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(
    addr: &str,
    service: RamService,
    cors_origins: Option<&[String]>,
) -> Result<(), CodecError> {
    let state = AppState::new(service);
    let router = create_router_with_cors(state, build_cors_layer(cors_origins));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CodecError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("nesram HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| CodecError::Io(format!("Server error: {}", e)))
}
