// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sparse types: decode-only projections of full types.
//!
//! This module provides:
//! - [`path_tree`] - Dotted extraction paths folded into a nested tree
//! - [`plan`] - Descriptors and the per-request [`SparsePlan`]
//! - [`synthesizer`] - Descriptor synthesis over the type graph
//! - [`decoder`] - Execution of a plan against encoded bytes
//!
//! A sparse decode reads exactly the bytes a full decode reads; it only
//! keeps less.

pub mod decoder;
pub mod path_tree;
pub mod plan;
pub mod synthesizer;

pub use decoder::SparseDecoder;
pub use path_tree::{PathNode, PathTree, ARRAY_MARKER};
pub use plan::{
    ArmAction, FieldAction, SparseArm, SparseField, SparsePlan, SparseShape,
    SparseTypeDescriptor, Traversal,
};
pub use synthesizer::synthesize;

use serde::{Deserialize, Serialize};

/// A named sparse-type request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SparseRequest {
    /// Name of the sparse type; prefix of every nested descriptor
    pub name: String,
    /// Full type to project
    pub base: String,
    /// Dotted paths to extract; `[]` after a segment traverses an array
    pub paths: Vec<String>,
}
