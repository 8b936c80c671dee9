// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # xdrcodec
//!
//! Schema-driven XDR (RFC 4506) codec with sparse decoding.
//!
//! The library works on an already-parsed XDR type graph and provides:
//! - A full codec for every type in [`encoding::xdr`](crate::encoding::xdr)
//! - Sparse types, decode-only projections built from dotted paths, in [`sparse`](crate::sparse)
//! - A type registry with a guess engine in [`encoding::registry`](crate::encoding::registry)
//! - Cross-version type deduplication in [`dedup`](crate::dedup)
//! - JSON projection and JSON Schema output
//!
//! ## Architecture
//!
//! - `core/` - Errors, values, diagnostics, hook registry
//! - `schema/` - Type graph model, loader, JSON Schema
//! - `encoding/` - XDR wire format, JSON projection, defaults, registry
//! - `sparse/` - Path trees, descriptor synthesis, sparse decoder
//! - `dedup/` - Cross-version comparison
//!
//! ## Example: Sparse decoding
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use xdrcodec::{GeneratorConfig, XdrToolkit};
//! use xdrcodec::schema::{load_schema_file, LoadOptions};
//!
//! let loaded = load_schema_file("schema.json", LoadOptions::default())?;
//! let config = GeneratorConfig::from_toml(
//!     r#"
//!     [[sparse]]
//!     name = "TxSource"
//!     base = "Transaction"
//!     paths = ["sourceAccount"]
//!     "#,
//! )?;
//! let toolkit = XdrToolkit::from_schema(loaded, &config)?;
//! let value = toolkit.decode_sparse("TxSource", "AAAAAA...")?;
//! println!("{value}");
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use core::{CodecError, Diagnostic, DiagnosticKind, Result, XdrValue};

// Schema model and loading
pub mod schema;

// Encoding/decoding
pub mod encoding;

pub use encoding::{Limits, SkipMode, TypeRegistry, XdrCodec};

// Sparse types
pub mod sparse;

pub use sparse::{SparsePlan, SparseRequest};

// Cross-version deduplication
pub mod dedup;

pub use dedup::{deduplicate, ChangeReason, Decision, DedupResult};

// Generator configuration
pub mod config;

pub use config::GeneratorConfig;

// Facade
pub mod toolkit;

pub use toolkit::XdrToolkit;
