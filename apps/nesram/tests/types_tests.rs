//! Unit tests for API types and request-shape parsing.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use nesram::api::{
    ErrorResponse, HealthResponse, LocationsRequest, OrderResponse, ReadRequest, ReadResponse,
    api_error, order_slots, parse_body, write_values,
};
use nesram_core::{AddressKey, CodecError, Permutation, RawByte, WriteValue};
use serde_json::json;

// =============================================================================
// HEALTH / ERROR RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_error_response_serialization() {
    let json = serde_json::to_string(&ErrorResponse::new("boom")).unwrap();
    assert_eq!(json, r#"{"error":"boom"}"#);
}

#[test]
fn test_api_error_status_split() {
    let (status, body) = api_error(&CodecError::UnknownAddress {
        missing: vec!["0x00ABCD".to_string()],
    });
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.error.contains("0x00ABCD"));

    let (status, _) = api_error(&CodecError::MalformedMemory {
        address: AddressKey::from_u16(0x6100),
        raw: "zz".to_string(),
    });
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = api_error(&CodecError::InvalidPermutation("dup".to_string()));
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// READ TYPES
// =============================================================================

#[test]
fn test_read_request_parse() {
    let request: ReadRequest = parse_body(json!({"addresses": ["0x006100"]})).unwrap();
    assert_eq!(request.addresses, vec!["0x006100"]);

    let err = parse_body::<ReadRequest>(json!({"addresses": [1, 2]})).unwrap_err();
    assert!(matches!(err, CodecError::InvalidRequest(_)));

    let err = parse_body::<ReadRequest>(json!({})).unwrap_err();
    assert!(matches!(err, CodecError::InvalidRequest(_)));
}

#[test]
fn test_read_response_keys_are_addresses() {
    let json = r#"{"addresses": {"0x006100": "12", "0x006BE4": "Imp"}}"#;
    let response: ReadResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.addresses[&AddressKey::from_u16(0x6BE4)], "Imp");

    let back = serde_json::to_value(&response).unwrap();
    assert_eq!(back["addresses"]["0x006100"], "12");
}

// =============================================================================
// WRITE SHAPES
// =============================================================================

#[test]
fn test_write_values_object_and_list() {
    let from_object = write_values(&json!({"addresses": {"0x006100": 5, "0x006101": "A"}})).unwrap();
    let from_list =
        write_values(&json!({"addresses": [{"0x006100": 5}, {"0x006101": "A"}]})).unwrap();
    let bare = write_values(&json!({"0x006100": 5, "0x006101": "A"})).unwrap();

    let expected = vec![
        ("0x006100".to_string(), WriteValue::Number(5)),
        ("0x006101".to_string(), WriteValue::Text("A".to_string())),
    ];
    assert_eq!(from_object, expected);
    assert_eq!(from_list, expected);
    assert_eq!(bare, expected);
}

#[test]
fn test_write_values_rejects_bad_shapes() {
    for body in [
        json!({"addresses": []}),
        json!({"addresses": 5}),
        json!({"addresses": [{"0x006100": 1, "0x006101": 2}]}),
        json!({"addresses": ["0x006100"]}),
        json!({"addresses": [{"0x006100": 1}, {"0x006100": 2}]}),
    ] {
        let err = write_values(&body).unwrap_err();
        assert!(matches!(err, CodecError::InvalidRequest(_)), "{body}");
    }
}

#[test]
fn test_write_values_rejects_floats() {
    let err = write_values(&json!({"addresses": {"0x006100": 1.5}})).unwrap_err();
    assert!(matches!(err, CodecError::InvalidValue { .. }));
}

// =============================================================================
// ORDER SHAPES
// =============================================================================

#[test]
fn test_order_slots_both_forms() {
    let list = order_slots(&json!({"slots": [2, 1, 3, 4]})).unwrap();
    let named = order_slots(&json!({"slot1": 2, "slot2": 1, "slot3": 3, "slot4": 4})).unwrap();
    assert_eq!(list, named);

    let perm = Permutation::from_json(&list).unwrap();
    assert_eq!(perm.sources(), [2, 1, 3, 4]);
}

#[test]
fn test_order_slots_missing() {
    let err = order_slots(&json!({"slot1": 1})).unwrap_err();
    assert!(matches!(err, CodecError::InvalidPermutation(_)));

    let err = order_slots(&json!({"slots": "1234"})).unwrap_err();
    assert!(matches!(err, CodecError::InvalidPermutation(_)));
}

#[test]
fn test_order_response_serialization() {
    let response = OrderResponse {
        message: "ok".to_string(),
        order: vec![4, 3, 2, 1],
    };
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["order"], json!([4, 3, 2, 1]));
}

// =============================================================================
// BESTIARY SHAPES
// =============================================================================

#[test]
fn test_locations_request_names() {
    let single: LocationsRequest = parse_body(json!({"monsters": "Goblins"})).unwrap();
    assert_eq!(single.names(), vec![json!("Goblins")]);

    let list: LocationsRequest = parse_body(json!({"monsters": ["Imp", 4]})).unwrap();
    assert_eq!(list.names(), vec![json!("Imp"), json!(4)]);
}

#[test]
fn test_raw_byte_display_is_canonical() {
    assert_eq!(RawByte(0x0a).to_string(), "0x0A");
}
