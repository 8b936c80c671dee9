// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type registry and guess engine.
//!
//! The registry enumerates every full type in graph order and every sparse
//! descriptor separately. Operations that need a complete value (default
//! construction, encode, stream iteration) fail fast on sparse names with
//! `SparseUnsupported`.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use xdrcodec::encoding::{Limits, TypeRegistry};
//! use xdrcodec::schema::{load_schema_file, LoadOptions};
//!
//! let loaded = load_schema_file("schema.json", LoadOptions::default())?;
//! let registry = TypeRegistry::new(loaded.graph, Limits::default());
//! let candidates = registry.guess(&[0, 0, 0, 7]);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;

use base64::Engine;
use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::core::{CodecError, Result, XdrValue};
use crate::schema::TypeGraph;
use crate::sparse::{SparseDecoder, SparsePlan};

use super::xdr::{FramedIter, Limits, StreamIter, XdrCodec};

/// Whether a registered name is a full type or a sparse projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Complete value representation
    Full,
    /// Decode-only projection
    Sparse,
}

impl TypeKind {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Full => "full",
            TypeKind::Sparse => "sparse",
        }
    }
}

/// Operations a registered type supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    /// Can be decoded
    pub decode: bool,
    /// Can be encoded and written
    pub encode: bool,
    /// Has a default value
    pub default: bool,
    /// Has a JSON Schema
    pub schema: bool,
    /// Default comes from a registered provider
    pub custom_default: bool,
    /// Projects to JSON through a registered string representation
    pub custom_str: bool,
}

impl Capabilities {
    /// Capabilities of a full type.
    pub fn full() -> Self {
        Self {
            decode: true,
            encode: true,
            default: true,
            schema: true,
            custom_default: false,
            custom_str: false,
        }
    }

    /// Capabilities of a sparse type.
    pub fn sparse() -> Self {
        Self {
            decode: true,
            ..Self::default()
        }
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.decode, "decode"),
            (self.encode, "encode"),
            (self.default, "default"),
            (self.schema, "schema"),
            (self.custom_default, "custom_default"),
            (self.custom_str, "custom_str"),
        ];
        let names: Vec<&str> = flags
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", names.join(","))
    }
}

/// One registered name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    /// Type or descriptor name
    pub name: String,
    /// Full or sparse
    pub kind: TypeKind,
    /// Supported operations
    pub capabilities: Capabilities,
}

/// Registry of every decodable name.
pub struct TypeRegistry {
    graph: TypeGraph,
    limits: Limits,
    plans: Vec<SparsePlan>,
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
    /// Sparse descriptor name -> owning plan
    sparse_owner: HashMap<String, usize>,
}

impl TypeRegistry {
    /// Register every type of `graph`.
    pub fn new(graph: TypeGraph, limits: Limits) -> Self {
        let entries: Vec<RegistryEntry> = graph
            .names()
            .map(|name| RegistryEntry {
                name: name.to_string(),
                kind: TypeKind::Full,
                capabilities: Capabilities::full(),
            })
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        Self {
            graph,
            limits,
            plans: Vec::new(),
            entries,
            index,
            sparse_owner: HashMap::new(),
        }
    }

    /// Register the descriptors of a sparse plan.
    ///
    /// # Errors
    ///
    /// `DuplicateDefinition` if a descriptor name is already registered.
    pub fn add_sparse(&mut self, plan: SparsePlan) -> Result<()> {
        if let Some(taken) = plan.names().find(|n| self.index.contains_key(*n)) {
            return Err(CodecError::DuplicateDefinition {
                name: taken.to_string(),
            });
        }
        let plan_index = self.plans.len();
        for name in plan.names() {
            self.index.insert(name.to_string(), self.entries.len());
            self.sparse_owner.insert(name.to_string(), plan_index);
            self.entries.push(RegistryEntry {
                name: name.to_string(),
                kind: TypeKind::Sparse,
                capabilities: Capabilities::sparse(),
            });
        }
        self.plans.push(plan);
        Ok(())
    }

    /// Mark a full type as taking its default from a provider.
    pub fn mark_custom_default(&mut self, name: &str) -> Result<()> {
        self.full_entry_mut("custom default", name)?
            .capabilities
            .custom_default = true;
        Ok(())
    }

    /// Mark a full type as having a custom string representation.
    pub fn mark_custom_str(&mut self, name: &str) -> Result<()> {
        self.full_entry_mut("custom string representation", name)?
            .capabilities
            .custom_str = true;
        Ok(())
    }

    fn full_entry_mut(&mut self, operation: &str, name: &str) -> Result<&mut RegistryEntry> {
        self.ensure_full(operation, name)?;
        let i = self.index[name];
        Ok(&mut self.entries[i])
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Get the type graph.
    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    /// Get the limits applied to every decode and encode.
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Full codec over the graph.
    pub fn codec(&self) -> XdrCodec<'_> {
        XdrCodec::new(&self.graph, self.limits)
    }

    /// Registered sparse plans.
    pub fn plans(&self) -> &[SparsePlan] {
        &self.plans
    }

    /// Every entry, full types first in graph order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Look up an entry.
    pub fn entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Full type names in graph order.
    pub fn types(&self) -> Vec<&str> {
        self.names_of(TypeKind::Full)
    }

    /// Sparse descriptor names in registration order.
    pub fn sparse_types(&self) -> Vec<&str> {
        self.names_of(TypeKind::Sparse)
    }

    fn names_of(&self, kind: TypeKind) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Check if `name` is a sparse descriptor.
    pub fn is_sparse(&self, name: &str) -> bool {
        self.sparse_owner.contains_key(name)
    }

    /// Succeed only for full types.
    ///
    /// # Errors
    ///
    /// - `SparseUnsupported` for sparse names
    /// - `TypeNotFound` for unknown names
    pub fn ensure_full(&self, operation: &str, name: &str) -> Result<()> {
        match self.entry(name) {
            Some(entry) if entry.kind == TypeKind::Full => Ok(()),
            Some(_) => Err(CodecError::sparse_unsupported(operation, name)),
            None => Err(CodecError::type_not_found(name)),
        }
    }

    /// Plan owning a sparse descriptor.
    pub fn plan_for(&self, name: &str) -> Result<&SparsePlan> {
        match self.sparse_owner.get(name) {
            Some(&i) => Ok(&self.plans[i]),
            None if self.graph.contains(name) => Err(CodecError::invalid_schema(
                name,
                "not a sparse type",
            )),
            None => Err(CodecError::type_not_found(name)),
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Decode a full or sparse type that must occupy the whole buffer.
    pub fn read_to_end(&self, name: &str, data: &[u8]) -> Result<XdrValue> {
        if self.is_sparse(name) {
            let plan = self.plan_for(name)?;
            SparseDecoder::new(&self.graph, plan).read_to_end(name, data, self.limits)
        } else {
            self.codec().read_to_end(name, data)
        }
    }

    /// Encode a value of a full type.
    pub fn write(&self, name: &str, value: &XdrValue) -> Result<Vec<u8>> {
        self.ensure_full("encode", name)?;
        self.codec().write(name, value)
    }

    /// Iterate over back-to-back values of a full type.
    pub fn iter_stream<'a>(&'a self, name: &str, data: &'a [u8]) -> Result<StreamIter<'a, 'a>> {
        self.ensure_full("stream iteration", name)?;
        Ok(self.codec().iter_stream(name, data))
    }

    /// Iterate over record-marked values of a full type.
    pub fn iter_framed<'a>(&'a self, name: &str, data: &'a [u8]) -> Result<FramedIter<'a, 'a>> {
        self.ensure_full("framed stream iteration", name)?;
        Ok(self.codec().iter_framed(name, data))
    }

    /// Every full type that decodes `data` completely, in graph order.
    ///
    /// All types are tried; several may match the same bytes.
    pub fn guess(&self, data: &[u8]) -> Vec<String> {
        let codec = self.codec();
        self.types()
            .into_par_iter()
            .filter(|name| match codec.read_to_end(name, data) {
                Ok(_) => true,
                Err(err) if err.is_wire_error() => false,
                Err(err) => {
                    warn!(
                        context = "guess",
                        type_name = %name,
                        error = %err,
                        fields = ?err.log_fields(),
                        "Type could not be tried"
                    );
                    false
                }
            })
            .map(|name| name.to_string())
            .collect()
    }

    /// [`guess`](Self::guess) on base64 input; ASCII whitespace is ignored.
    pub fn guess_base64(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.guess(&decode_base64(text)?))
    }
}

/// Decode standard base64, ignoring ASCII whitespace.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
}

/// Encode standard base64.
pub fn encode_base64(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}
