//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API, and the
//! parsing of the looser request shapes the tool callers send.

use axum::{Json, extract::rejection::JsonRejection, http::StatusCode};
use nesram_core::{CodecError, DecodedValues, EntrySummary, WriteValue};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Failure response: 400 for caller errors, 500 for data integrity errors.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a codec error onto its HTTP status and error body.
pub fn api_error(err: &CodecError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!("{}", err);
    } else {
        tracing::debug!("Rejected request: {}", err);
    }
    (status, Json(ErrorResponse::new(err.to_string())))
}

/// Unwrap an extracted JSON body. A body that is not JSON, or not sent as
/// `application/json`, is a caller error like any other.
pub fn json_body(
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<serde_json::Value, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| api_error(&CodecError::InvalidRequest(rejection.body_text())))
}

/// Deserialize a request body, reporting shape errors as caller errors.
pub fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, CodecError> {
    serde_json::from_value(body).map_err(|e| CodecError::InvalidRequest(e.to_string()))
}

// =============================================================================
// READ
// =============================================================================

/// Decode request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadRequest {
    pub addresses: Vec<String>,
}

/// Decoded values keyed by address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResponse {
    pub addresses: DecodedValues,
}

// =============================================================================
// WRITE
// =============================================================================

/// Write acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteResponse {
    pub message: String,
    pub written: usize,
}

/// Extract `(address, value)` pairs from a write body.
///
/// Accepted shapes, with or without an `{"addresses": ...}` wrapper:
/// - an object: `{"0x006BE4": 50, "0x006102": "A"}`
/// - a list of single-entry objects: `[{"0x006BE4": 50}, {"0x006102": "A"}]`
pub fn write_values(body: &serde_json::Value) -> Result<Vec<(String, WriteValue)>, CodecError> {
    let payload = match body {
        serde_json::Value::Object(map) if map.contains_key("addresses") => &map["addresses"],
        other => other,
    };

    let pairs: Vec<(&String, &serde_json::Value)> = match payload {
        serde_json::Value::Object(map) => map.iter().collect(),
        serde_json::Value::Array(items) => {
            let mut pairs = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    serde_json::Value::Object(map) if map.len() == 1 => pairs.extend(map.iter()),
                    _ => {
                        return Err(CodecError::InvalidRequest(
                            "each write list item must be a single-entry object".to_string(),
                        ));
                    }
                }
            }
            pairs
        }
        _ => {
            return Err(CodecError::InvalidRequest(
                "addresses must be an object or a list of objects".to_string(),
            ));
        }
    };

    if pairs.is_empty() {
        return Err(CodecError::InvalidRequest("no addresses to write".to_string()));
    }

    let mut seen = BTreeSet::new();
    pairs
        .into_iter()
        .map(|(address, value)| {
            if !seen.insert(address.as_str()) {
                return Err(CodecError::InvalidRequest(format!(
                    "address {} appears more than once",
                    address
                )));
            }
            Ok((address.clone(), WriteValue::from_json(address, value)?))
        })
        .collect()
}

// =============================================================================
// ORDER
// =============================================================================

/// Extract the four slot values from an order body.
///
/// Accepts `{"slots": [a, b, c, d]}` or `{"slot1": a, ..., "slot4": d}`.
/// Values are passed through unvalidated for the permutation check.
pub fn order_slots(body: &serde_json::Value) -> Result<Vec<serde_json::Value>, CodecError> {
    if let Some(slots) = body.get("slots") {
        return match slots {
            serde_json::Value::Array(items) => Ok(items.clone()),
            _ => Err(CodecError::InvalidPermutation(
                "slots must be a list".to_string(),
            )),
        };
    }

    (1..=4)
        .map(|i| {
            body.get(format!("slot{}", i))
                .cloned()
                .ok_or_else(|| CodecError::InvalidPermutation(format!("slot{} is missing", i)))
        })
        .collect()
}

/// Reorder acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub message: String,
    pub order: Vec<usize>,
}

// =============================================================================
// BESTIARY
// =============================================================================

/// Monsters-by-location request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonstersRequest {
    pub location: serde_json::Value,
}

/// Monsters at one location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonstersResponse {
    pub monsters: Vec<String>,
}

/// Locations-by-monster request. `monsters` may be a list or a single value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationsRequest {
    pub monsters: serde_json::Value,
}

impl LocationsRequest {
    /// The queried names as a list.
    pub fn names(&self) -> Vec<serde_json::Value> {
        match &self.monsters {
            serde_json::Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        }
    }
}

/// Locations keyed by the requested names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationsResponse {
    pub locations: BTreeMap<String, Vec<String>>,
}

// =============================================================================
// CATALOG
// =============================================================================

/// Catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub count: usize,
    pub entries: Vec<EntrySummary>,
}
