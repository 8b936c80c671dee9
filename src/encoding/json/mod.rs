// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON projection of XDR values.
//!
//! | XDR               | JSON                                   |
//! |-------------------|----------------------------------------|
//! | bool              | boolean                                |
//! | int, unsigned int | number                                 |
//! | hyper, u. hyper   | decimal string (number also accepted)  |
//! | opaque            | lowercase hex string                   |
//! | string            | string                                 |
//! | enum              | member name                            |
//! | struct            | object in declaration order            |
//! | union, void arm   | case label                             |
//! | union, payload    | `{ "<label>": payload }`               |
//! | array             | array                                  |
//! | optional          | `null` or the value                    |
//!
//! Types with a registered [`StrRepr`] project to a single string instead.

pub mod decoder;
pub mod encoder;

pub use decoder::JsonDecoder;
pub use encoder::{value_to_json, JsonEncoder};

use crate::core::{Result, XdrValue};

/// Custom string representation of a type's values.
pub trait StrRepr: Send + Sync {
    /// Render a value as a string.
    fn to_str(&self, value: &XdrValue) -> Result<String>;

    /// Parse a value from its string form.
    fn from_str(&self, text: &str) -> Result<XdrValue>;
}
