// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Full codec tests over the ledger fixture schema.

mod common;

use common::{ledger_toolkit, tx_json, TX_BASE64};
use xdrcodec::encoding::{decode_base64, frame_record};
use xdrcodec::{CodecError, XdrValue};

// ============================================================================
// JSON <-> XDR
// ============================================================================

#[test]
fn test_decode_transaction_to_json() {
    let toolkit = ledger_toolkit();
    assert_eq!(toolkit.decode("Transaction", TX_BASE64).unwrap(), tx_json());
}

#[test]
fn test_encode_transaction_from_json() {
    let toolkit = ledger_toolkit();
    assert_eq!(toolkit.encode("Transaction", &tx_json()).unwrap(), TX_BASE64);
}

#[test]
fn test_hyper_accepts_number_or_string() {
    let toolkit = ledger_toolkit();
    let mut json = tx_json();
    json["seqNum"] = serde_json::json!(7);
    assert_eq!(toolkit.encode("Transaction", &json).unwrap(), TX_BASE64);
}

#[test]
fn test_void_arm_projects_as_label() {
    let toolkit = ledger_toolkit();
    let encoded = toolkit
        .encode("Memo", &serde_json::json!("MEMO_NONE"))
        .unwrap();
    assert_eq!(encoded, "AAAAAA==");
    assert_eq!(
        toolkit.decode("Memo", &encoded).unwrap(),
        serde_json::json!("MEMO_NONE")
    );
}

// ============================================================================
// Wire errors
// ============================================================================

#[test]
fn test_trailing_data_rejected() {
    let toolkit = ledger_toolkit();
    let mut data = decode_base64(TX_BASE64).unwrap();
    data.extend_from_slice(&[0, 0, 0, 0]);
    assert_eq!(
        toolkit.decode_bytes("Transaction", &data).unwrap_err(),
        CodecError::TrailingData
    );
}

#[test]
fn test_truncated_input_rejected() {
    let toolkit = ledger_toolkit();
    let data = decode_base64(TX_BASE64).unwrap();
    let err = toolkit
        .decode_bytes("Transaction", &data[..data.len() - 4])
        .unwrap_err();
    assert!(matches!(err, CodecError::BufferTooShort { .. }));
}

#[test]
fn test_undeclared_enum_value_rejected() {
    let toolkit = ledger_toolkit();
    // MemoType 5 is not declared
    let err = toolkit.decode_bytes("Memo", &[0, 0, 0, 5]).unwrap_err();
    assert!(matches!(err, CodecError::Invalid { .. }));
}

#[test]
fn test_string_bound_checked_on_encode() {
    let toolkit = ledger_toolkit();
    let text = "x".repeat(29);
    let err = toolkit
        .encode("Memo", &serde_json::json!({ "MEMO_TEXT": text }))
        .unwrap_err();
    assert_eq!(err, CodecError::length_exceeds_max(29, 28));
}

#[test]
fn test_string_bound_checked_on_decode() {
    let toolkit = ledger_toolkit();
    // MEMO_TEXT with a length prefix of 29 and no data
    let err = toolkit
        .decode_bytes("Memo", &[0, 0, 0, 1, 0, 0, 0, 29])
        .unwrap_err();
    assert_eq!(err, CodecError::length_exceeds_max(29, 28));
}

// ============================================================================
// Defaults, schema, streams
// ============================================================================

#[test]
fn test_default_transaction() {
    let toolkit = ledger_toolkit();
    assert_eq!(
        toolkit.default_json("Transaction").unwrap(),
        serde_json::json!({
            "sourceAccount": { "KEY_TYPE_ED25519": "00000000" },
            "fee": 0,
            "seqNum": "0",
            "memo": "MEMO_NONE",
            "operations": []
        })
    );
}

#[test]
fn test_schema_document() {
    let toolkit = ledger_toolkit();
    let schema = toolkit.schema("Operation").unwrap();
    assert_eq!(schema["$schema"], "http://json-schema.org/draft-07/schema#");
    assert_eq!(schema["title"], "Operation");
    assert_eq!(schema["$ref"], "#/definitions/Operation");
    let definitions = schema["definitions"].as_object().unwrap();
    assert!(definitions.contains_key("PaymentOp"));
    assert!(definitions.contains_key("KeyId"));
    assert!(!definitions.contains_key("Transaction"));
    assert!(!definitions.contains_key("Memo"));
    assert_eq!(
        definitions["KeyId"]["description"],
        serde_json::json!("Truncated public key")
    );
}

#[test]
fn test_framed_stream() {
    let toolkit = ledger_toolkit();
    let tx = decode_base64(TX_BASE64).unwrap();
    let mut data = frame_record(&tx).unwrap();
    data.extend(frame_record(&tx).unwrap());

    let values: Vec<XdrValue> = toolkit
        .registry()
        .iter_framed("Transaction", &data)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0], values[1]);
    assert_eq!(values[0].field("fee"), Some(&XdrValue::UInt(100)));
}

#[test]
fn test_plain_stream() {
    let toolkit = ledger_toolkit();
    let memo = decode_base64(common::MEMO_ID_BASE64).unwrap();
    let data = [memo.as_slice(), &[0, 0, 0, 0], memo.as_slice()].concat();
    let cases: Vec<String> = toolkit
        .registry()
        .iter_stream("Memo", &data)
        .unwrap()
        .map(|v| v.unwrap().union_case().unwrap().to_string())
        .collect();
    assert_eq!(cases, vec!["MEMO_ID", "MEMO_NONE", "MEMO_ID"]);
}
