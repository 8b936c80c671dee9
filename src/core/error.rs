// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for xdrcodec.
//!
//! Covers three phases:
//! - Schema loading (invalid, duplicate or unsupported definitions)
//! - Sparse-type generation (unresolved or ambiguous paths)
//! - Runtime encode/decode/skip (wire-format violations and limits)

use thiserror::Error;

/// Errors that can occur while loading schemas, generating sparse types, or
/// running the codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Malformed discriminant, unexpected tag, or structurally impossible data.
    #[error("xdr value invalid: {reason}")]
    Invalid {
        /// What was wrong
        reason: String,
    },

    /// Bounded container length prefix over its static bound.
    #[error("xdr value max length exceeded: length {length} > max {max}")]
    LengthExceedsMax {
        /// Length prefix that was read (or length being written)
        length: u64,
        /// Declared bound
        max: u32,
    },

    /// Recursion budget exhausted.
    #[error("depth limit exceeded")]
    DepthExceeded,

    /// Byte budget of the reader or writer exhausted.
    #[error("length limit exceeded")]
    LengthLimitExceeded,

    /// Decode succeeded but unconsumed bytes remained.
    #[error("trailing data after value")]
    TrailingData,

    /// Input ended before the value was complete.
    #[error("buffer too short: requested {requested} bytes at position {position}")]
    BufferTooShort {
        /// Requested bytes
        requested: u64,
        /// Reader position when the error occurred
        position: u64,
    },

    /// Padding after opaque or string data was not zero.
    #[error("xdr padding contains non-zero bytes")]
    NonZeroPadding,

    /// String data was not UTF-8.
    #[error("string is not valid utf-8")]
    Utf8,

    /// Hex text for an opaque value did not parse.
    #[error("hex invalid: {input}")]
    InvalidHex {
        /// Offending text (truncated)
        input: String,
    },

    /// Sparse path names a field or case absent from the target type.
    #[error("unresolved path '{path}' in '{type_name}': {reason}")]
    UnresolvedPath {
        /// Full dotted path
        path: String,
        /// Type the segment was looked up in
        type_name: String,
        /// Why resolution failed
        reason: String,
    },

    /// A path segment is both a leaf and an intermediate node.
    #[error("ambiguous path segment '{segment}': '{terminal}' ends there but '{intermediate}' continues through it")]
    AmbiguousPath {
        /// Conflicting segment prefix
        segment: String,
        /// Path that ends at the segment
        terminal: String,
        /// Path that continues through the segment
        intermediate: String,
    },

    /// Same type name defined twice.
    #[error("duplicate definition of '{name}'")]
    DuplicateDefinition {
        /// Type name
        name: String,
    },

    /// Schema feature that is deliberately not supported.
    #[error("unsupported feature: {feature}")]
    UnsupportedFeature {
        /// What is not supported
        feature: String,
    },

    /// Type not found in the graph or registry.
    #[error("type not found: '{type_name}'")]
    TypeNotFound {
        /// Type name that was not found
        type_name: String,
    },

    /// Operation that needs a complete value was attempted on a sparse type.
    #[error("operation '{operation}' is not supported for sparse type '{type_name}'")]
    SparseUnsupported {
        /// Operation name
        operation: String,
        /// Sparse type name
        type_name: String,
    },

    /// Invalid schema document.
    #[error("invalid schema '{schema_name}': {reason}")]
    InvalidSchema {
        /// Schema or definition name
        schema_name: String,
        /// Validation error message
        reason: String,
    },

    /// JSON projection error.
    #[error("json error: {message}")]
    Json {
        /// Error message
        message: String,
    },

    /// Base64 input did not decode.
    #[error("base64 error: {message}")]
    Base64 {
        /// Error message
        message: String,
    },

    /// Other I/O failure.
    #[error("io error: {message}")]
    Io {
        /// Error message
        message: String,
    },
}

impl CodecError {
    /// Create an invalid-data error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        CodecError::Invalid {
            reason: reason.into(),
        }
    }

    /// Create a length-exceeds-max error.
    pub fn length_exceeds_max(length: u64, max: u32) -> Self {
        CodecError::LengthExceedsMax { length, max }
    }

    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: u64, position: u64) -> Self {
        CodecError::BufferTooShort {
            requested,
            position,
        }
    }

    /// Create an invalid hex error; long input is truncated.
    pub fn invalid_hex(input: &str) -> Self {
        let input = if input.len() > 32 {
            let cut = (0..=32)
                .rev()
                .find(|i| input.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}...", &input[..cut])
        } else {
            input.to_string()
        };
        CodecError::InvalidHex { input }
    }

    /// Create an unresolved path error.
    pub fn unresolved_path(
        path: impl Into<String>,
        type_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CodecError::UnresolvedPath {
            path: path.into(),
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        CodecError::UnsupportedFeature {
            feature: feature.into(),
        }
    }

    /// Create a "type not found" error.
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        CodecError::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Create a sparse-unsupported error.
    pub fn sparse_unsupported(operation: impl Into<String>, type_name: impl Into<String>) -> Self {
        CodecError::SparseUnsupported {
            operation: operation.into(),
            type_name: type_name.into(),
        }
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(schema_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::InvalidSchema {
            schema_name: schema_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a JSON projection error.
    pub fn json(message: impl Into<String>) -> Self {
        CodecError::Json {
            message: message.into(),
        }
    }

    /// Whether this error came from the wire format rather than from schema
    /// or configuration problems.
    pub fn is_wire_error(&self) -> bool {
        matches!(
            self,
            CodecError::Invalid { .. }
                | CodecError::LengthExceedsMax { .. }
                | CodecError::DepthExceeded
                | CodecError::LengthLimitExceeded
                | CodecError::TrailingData
                | CodecError::BufferTooShort { .. }
                | CodecError::NonZeroPadding
                | CodecError::Utf8
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::Invalid { reason } => vec![("reason", reason.clone())],
            CodecError::LengthExceedsMax { length, max } => {
                vec![("length", length.to_string()), ("max", max.to_string())]
            }
            CodecError::BufferTooShort {
                requested,
                position,
            } => vec![
                ("requested", requested.to_string()),
                ("position", position.to_string()),
            ],
            CodecError::InvalidHex { input } => vec![("input", input.clone())],
            CodecError::UnresolvedPath {
                path,
                type_name,
                reason,
            } => vec![
                ("path", path.clone()),
                ("type", type_name.clone()),
                ("reason", reason.clone()),
            ],
            CodecError::AmbiguousPath {
                segment,
                terminal,
                intermediate,
            } => vec![
                ("segment", segment.clone()),
                ("terminal", terminal.clone()),
                ("intermediate", intermediate.clone()),
            ],
            CodecError::DuplicateDefinition { name } => vec![("type", name.clone())],
            CodecError::UnsupportedFeature { feature } => vec![("feature", feature.clone())],
            CodecError::TypeNotFound { type_name } => vec![("type", type_name.clone())],
            CodecError::SparseUnsupported {
                operation,
                type_name,
            } => vec![("operation", operation.clone()), ("type", type_name.clone())],
            CodecError::InvalidSchema {
                schema_name,
                reason,
            } => vec![("schema", schema_name.clone()), ("reason", reason.clone())],
            CodecError::Json { message }
            | CodecError::Base64 { message }
            | CodecError::Io { message } => vec![("message", message.clone())],
            CodecError::DepthExceeded
            | CodecError::LengthLimitExceeded
            | CodecError::TrailingData
            | CodecError::NonZeroPadding
            | CodecError::Utf8 => Vec::new(),
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json {
            message: err.to_string(),
        }
    }
}

impl From<base64::DecodeError> for CodecError {
    fn from(err: base64::DecodeError) -> Self {
        CodecError::Base64 {
            message: err.to_string(),
        }
    }
}

/// Result type for xdrcodec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
