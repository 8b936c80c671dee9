// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use xdrcodec::schema::{load_schema_file, LoadOptions, LoadedSchema};
use xdrcodec::{GeneratorConfig, XdrToolkit};

// ============================================================================
// Fixtures
// ============================================================================

/// A transaction with a muxed payment and a sourced sequence bump.
pub const TX_BASE64: &str = "AAAAAAECAwQAAABkAAAAAAAAAAcAAAACAAAAAAAAACoAAAACAAAAAAAAAAEAAAEAAAAAAAAAAAkKCwwNAAAAAAAAAfQAAAABAAAAAAUGBwgAAAALAAAAAAAAAAg=";

/// `Memo` with case `MEMO_ID` and id 42.
pub const MEMO_ID_BASE64: &str = "AAAAAgAAAAAAAAAq";

/// Get the path to a test fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(manifest_dir)
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a fixture schema.
pub fn load_fixture(name: &str) -> LoadedSchema {
    load_schema_file(fixture_path(name), LoadOptions::default())
        .unwrap_or_else(|e| panic!("Failed to load {name}: {e}"))
}

/// Load the generator configuration fixture.
pub fn fixture_config() -> GeneratorConfig {
    GeneratorConfig::from_file(fixture_path("generator.toml"))
        .unwrap_or_else(|e| panic!("Failed to load generator.toml: {e}"))
}

/// Toolkit over the ledger schema with the fixture configuration.
pub fn ledger_toolkit() -> XdrToolkit {
    XdrToolkit::from_schema(load_fixture("ledger.json"), &fixture_config())
        .unwrap_or_else(|e| panic!("Failed to build toolkit: {e}"))
}

/// JSON projection of [`TX_BASE64`].
pub fn tx_json() -> serde_json::Value {
    serde_json::json!({
        "sourceAccount": { "KEY_TYPE_ED25519": "01020304" },
        "fee": 100,
        "seqNum": "7",
        "memo": { "MEMO_ID": "42" },
        "operations": [
            {
                "sourceAccount": null,
                "body": { "PAYMENT": {
                    "destination": { "KEY_TYPE_MUXED": { "id": "9", "ed25519": "0a0b0c0d" } },
                    "amount": "500"
                } }
            },
            {
                "sourceAccount": { "KEY_TYPE_ED25519": "05060708" },
                "body": { "BUMP_SEQUENCE": { "bumpTo": "8" } }
            }
        ]
    })
}
