// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout xdrcodec.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Comprehensive error handling
//! - [`XdrValue`] - Decoded value representation
//! - [`HookRegistry`] - Per-type custom hooks
//! - [`Diagnostic`] - Generation-time findings reported for human review

pub mod error;
pub mod registry;
pub mod value;

pub use error::{CodecError, Result};
pub use registry::HookRegistry;
pub use value::{StructFields, XdrValue};

use serde::Serialize;
use std::fmt;

/// Generation phase a diagnostic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Second definition of a type name was dropped
    DuplicateDefinition,
    /// Sparse path did not resolve; the branch is skipped
    UnresolvedPath,
    /// Sparse path tried to traverse into an enum
    EnumTraversal,
    /// Array field traversed without the `[]` marker
    ImplicitArrayTraversal,
    /// Sparse descriptor name reached with a different subtree
    RenamedDescriptor,
}

impl DiagnosticKind {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::DuplicateDefinition => "duplicate_definition",
            DiagnosticKind::UnresolvedPath => "unresolved_path",
            DiagnosticKind::EnumTraversal => "enum_traversal",
            DiagnosticKind::ImplicitArrayTraversal => "implicit_array_traversal",
            DiagnosticKind::RenamedDescriptor => "renamed_descriptor",
        }
    }
}

/// A degraded-but-recoverable finding from schema loading or sparse
/// generation.
///
/// Each one is also emitted through `tracing::warn!` at the point it is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// What happened
    pub kind: DiagnosticKind,
    /// Type, request, or path the finding is about
    pub subject: String,
    /// Human-readable detail
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.kind.as_str(), self.subject, self.message)
    }
}
