//! # API Endpoint Handlers
//!
//! Thin adapters from JSON bodies to `RamService` calls. Bodies are taken as
//! raw JSON, and extractor rejections are mapped too, so shape errors come
//! back as `{"error": ...}` with status 400 like every other caller error.

use super::{
    AppState,
    types::{
        ApiError, CatalogResponse, HealthResponse, LocationsRequest, LocationsResponse,
        MonstersRequest, MonstersResponse, OrderResponse, ReadRequest, ReadResponse, WriteResponse,
        api_error, json_body, order_slots, parse_body, write_values,
    },
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use nesram_core::{CharacterNames, CodecError, Permutation};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// READ / WRITE HANDLERS
// =============================================================================

/// Decode a list of addresses.
pub async fn read_handler(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ReadResponse>, ApiError> {
    let body = json_body(payload)?;
    let request: ReadRequest = parse_body(body).map_err(|e| api_error(&e))?;
    let addresses = state
        .service
        .read(&request.addresses)
        .map_err(|e| api_error(&e))?;
    Ok(Json(ReadResponse { addresses }))
}

/// Encode and persist a batch of values.
pub async fn write_handler(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<WriteResponse>, ApiError> {
    let body = json_body(payload)?;
    let values = write_values(&body).map_err(|e| api_error(&e))?;
    let receipt = state.service.write(&values).map_err(|e| api_error(&e))?;
    Ok(Json(WriteResponse {
        message: format!("Wrote {} addresses", receipt.written),
        written: receipt.written,
    }))
}

// =============================================================================
// PARTY HANDLERS
// =============================================================================

/// Rearrange the party stat blocks.
pub async fn order_handler(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let body = json_body(payload)?;
    let permutation = order_slots(&body)
        .and_then(|slots| Permutation::from_json(&slots))
        .map_err(|e| api_error(&e))?;

    state
        .service
        .reorder(&permutation)
        .map_err(|e| api_error(&e))?;

    let order = permutation.sources().to_vec();
    Ok(Json(OrderResponse {
        message: format!("Party reordered to {:?}", order),
        order,
    }))
}

/// Decode the four party member names.
pub async fn names_handler(
    State(state): State<AppState>,
) -> Result<Json<CharacterNames>, ApiError> {
    state
        .service
        .character_names()
        .map(Json)
        .map_err(|e| api_error(&e))
}

// =============================================================================
// BESTIARY HANDLERS
// =============================================================================

/// Monsters found at a location.
pub async fn monsters_handler(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<MonstersResponse>, ApiError> {
    let body = json_body(payload)?;
    let request: MonstersRequest = parse_body(body).map_err(|e| api_error(&e))?;
    let location = request.location.as_str().ok_or_else(|| {
        api_error(&CodecError::InvalidRequest(
            "location must be a string".to_string(),
        ))
    })?;

    let monsters = state
        .service
        .monsters_at(location)
        .map_err(|e| api_error(&e))?;
    Ok(Json(MonstersResponse { monsters }))
}

/// Locations where each named monster appears.
pub async fn locations_handler(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<LocationsResponse>, ApiError> {
    let body = json_body(payload)?;
    let request: LocationsRequest = parse_body(body).map_err(|e| api_error(&e))?;
    let locations = state
        .service
        .locations_of(&request.names())
        .map_err(|e| api_error(&e))?;
    Ok(Json(LocationsResponse { locations }))
}

// =============================================================================
// CATALOG HANDLER
// =============================================================================

/// List every catalogued address.
pub async fn catalog_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.catalog_entries() {
        Ok(entries) => (
            StatusCode::OK,
            Json(CatalogResponse {
                count: entries.len(),
                entries,
            }),
        )
            .into_response(),
        Err(e) => api_error(&e).into_response(),
    }
}
