// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encoding and decoding over a type graph.
//!
//! This module provides:
//! - [`xdr`] - XDR wire format: cursor, writer, full codec and streams
//! - [`json`] - JSON projection of decoded values
//! - [`defaults`] - Default value construction
//! - [`registry`] - Registry of full and sparse types, and the guess engine

pub mod defaults;
pub mod json;
pub mod registry;
pub mod xdr;

pub use defaults::{DefaultBuilder, DefaultProvider};
pub use json::{value_to_json, JsonDecoder, JsonEncoder, StrRepr};
pub use registry::{
    decode_base64, encode_base64, Capabilities, RegistryEntry, TypeKind, TypeRegistry,
};
pub use xdr::{
    frame_record, FramedIter, Limits, SkipMode, StreamIter, XdrCodec, XdrCursor, XdrDecoder,
    XdrEncoder, XdrWriter, DEFAULT_DEPTH_LIMIT,
};
