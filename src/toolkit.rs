// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Unified toolkit facade.
//!
//! [`XdrToolkit`] ties a loaded schema, its generator configuration, the
//! synthesized sparse types and the per-type hooks together behind
//! string-in, string-out entry points: JSON for values, base64 for bytes.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use xdrcodec::XdrToolkit;
//!
//! let toolkit = XdrToolkit::open("schema.json", Some("generator.toml"))?;
//! for name in toolkit.guess_base64("AAAAAQ==")? {
//!     println!("{name}: {}", toolkit.decode(&name, "AAAAAQ==")?);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::config::GeneratorConfig;
use crate::core::{Diagnostic, DiagnosticKind, HookRegistry, Result, XdrValue};
use crate::encoding::{
    decode_base64, encode_base64, value_to_json, DefaultBuilder, DefaultProvider, JsonDecoder,
    JsonEncoder, StrRepr, TypeRegistry,
};
use crate::schema::{json_schema, load_schema_file, LoadOptions, LoadedSchema, TypeGraph};
use crate::sparse::{synthesize, SparsePlan};

/// Schema-driven codec with sparse types and custom hooks.
pub struct XdrToolkit {
    registry: TypeRegistry,
    defaults: HookRegistry<dyn DefaultProvider>,
    string_reprs: HookRegistry<dyn StrRepr>,
    diagnostics: Vec<Diagnostic>,
}

impl XdrToolkit {
    /// Open a schema file and an optional generator configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read or parsed, or if the
    /// configuration cannot be applied (see [`XdrToolkit::from_schema`]).
    pub fn open(schema: impl AsRef<Path>, config: Option<impl AsRef<Path>>) -> Result<Self> {
        let loaded = load_schema_file(schema, LoadOptions::default())?;
        let config = match config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::default(),
        };
        Self::from_schema(loaded, &config)
    }

    /// Build from a graph with the default configuration.
    pub fn new(graph: TypeGraph) -> Result<Self> {
        Self::from_schema(
            LoadedSchema {
                graph,
                diagnostics: Vec::new(),
            },
            &GeneratorConfig::default(),
        )
    }

    /// Build from a loaded schema and a configuration.
    ///
    /// Sparse requests whose base type is missing, or whose names are
    /// already taken by a full type or an earlier request, are skipped with
    /// a diagnostic. Unresolved paths inside a request are diagnostics too.
    ///
    /// # Errors
    ///
    /// - `AmbiguousPath` or `InvalidSchema` for malformed sparse paths
    /// - `TypeNotFound` if a custom hook names an unknown type
    /// - `SparseUnsupported` if a custom hook names a sparse type
    pub fn from_schema(loaded: LoadedSchema, config: &GeneratorConfig) -> Result<Self> {
        let mut registry = TypeRegistry::new(loaded.graph, config.limits());
        let mut diagnostics = loaded.diagnostics;

        for request in &config.sparse {
            if !registry.graph().contains(&request.base) {
                warn!(
                    context = "sparse_synthesis",
                    request = %request.name,
                    base = %request.base,
                    "Sparse base type not found, request skipped"
                );
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnresolvedPath,
                    &request.name,
                    format!("base type '{}' not found, request skipped", request.base),
                ));
                continue;
            }
            let plan = synthesize(registry.graph(), request)?;
            if let Some(taken) = plan.names().find(|n| registry.entry(n).is_some()) {
                warn!(
                    context = "sparse_synthesis",
                    request = %request.name,
                    type_name = taken,
                    "Sparse type name already registered, request dropped"
                );
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::DuplicateDefinition,
                    &request.name,
                    format!(
                        "sparse request '{}' dropped, '{taken}' is already defined",
                        request.name
                    ),
                ));
                continue;
            }
            diagnostics.extend(plan.diagnostics.iter().cloned());
            registry.add_sparse(plan)?;
        }

        for name in &config.custom_default {
            registry.mark_custom_default(name)?;
        }
        for name in &config.custom_str {
            registry.mark_custom_str(name)?;
        }

        Ok(Self {
            registry,
            defaults: HookRegistry::new(),
            string_reprs: HookRegistry::new(),
            diagnostics,
        })
    }

    // ========================================================================
    // Hooks
    // ========================================================================

    /// Register the default provider of a full type.
    pub fn register_default(
        &mut self,
        name: &str,
        provider: Arc<dyn DefaultProvider>,
    ) -> Result<()> {
        self.registry.mark_custom_default(name)?;
        self.defaults.register(name, provider);
        Ok(())
    }

    /// Register the string representation of a full type.
    pub fn register_str_repr(&mut self, name: &str, repr: Arc<dyn StrRepr>) -> Result<()> {
        self.registry.mark_custom_str(name)?;
        self.string_reprs.register(name, repr);
        Ok(())
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Get the underlying registry.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Get the type graph.
    pub fn graph(&self) -> &TypeGraph {
        self.registry.graph()
    }

    /// Full type names in graph order.
    pub fn types(&self) -> Vec<&str> {
        self.registry.types()
    }

    /// Sparse type names, nested descriptors included.
    pub fn sparse_types(&self) -> Vec<&str> {
        self.registry.sparse_types()
    }

    /// Plan owning a sparse type.
    pub fn plan(&self, name: &str) -> Result<&SparsePlan> {
        self.registry.plan_for(name)
    }

    /// Findings from loading and sparse synthesis.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// JSON Schema (Draft 7) of a full type's projection.
    pub fn schema(&self, name: &str) -> Result<Value> {
        self.registry.ensure_full("schema", name)?;
        json_schema(self.graph(), name, |t| self.string_reprs.contains(t))
    }

    // ========================================================================
    // Codec
    // ========================================================================

    /// Full types that decode the base64 input completely.
    pub fn guess_base64(&self, input: &str) -> Result<Vec<String>> {
        self.registry.guess_base64(input)
    }

    /// Full types that decode the bytes completely.
    pub fn guess(&self, data: &[u8]) -> Vec<String> {
        self.registry.guess(data)
    }

    /// Decode base64 input as `name` and project it to JSON.
    ///
    /// Works for full and sparse types.
    pub fn decode(&self, name: &str, input: &str) -> Result<Value> {
        self.decode_bytes(name, &decode_base64(input)?)
    }

    /// Decode bytes as `name` and project them to JSON.
    pub fn decode_bytes(&self, name: &str, data: &[u8]) -> Result<Value> {
        if self.registry.is_sparse(name) {
            let value = self.registry.read_to_end(name, data)?;
            return Ok(value_to_json(&value));
        }
        let value = self.read(name, data)?;
        JsonEncoder::new(self.graph(), &self.string_reprs).named_to_json(name, &value)
    }

    /// Decode base64 input with a sparse type.
    ///
    /// # Errors
    ///
    /// `InvalidSchema` if `name` is a full type rather than a sparse one.
    pub fn decode_sparse(&self, name: &str, input: &str) -> Result<Value> {
        self.registry.plan_for(name)?;
        self.decode(name, input)
    }

    /// Parse JSON as a value of `name` and encode it to base64.
    pub fn encode(&self, name: &str, json: &Value) -> Result<String> {
        Ok(encode_base64(&self.encode_bytes(name, json)?))
    }

    /// Parse JSON as a value of `name` and encode it.
    pub fn encode_bytes(&self, name: &str, json: &Value) -> Result<Vec<u8>> {
        self.registry.ensure_full("encode", name)?;
        let value = JsonDecoder::new(self.graph(), &self.string_reprs).named_from_json(name, json)?;
        self.registry.write(name, &value)
    }

    /// Default value of a full type.
    pub fn default_value(&self, name: &str) -> Result<XdrValue> {
        self.registry.ensure_full("default", name)?;
        DefaultBuilder::new(self.graph(), &self.defaults)
            .with_limits(self.registry.limits())
            .default_named(name)
    }

    /// Default value of a full type, projected to JSON.
    pub fn default_json(&self, name: &str) -> Result<Value> {
        let value = self.default_value(name)?;
        JsonEncoder::new(self.graph(), &self.string_reprs).named_to_json(name, &value)
    }

    /// Decode a value of a full type without the JSON projection.
    pub fn read(&self, name: &str, data: &[u8]) -> Result<XdrValue> {
        self.registry.ensure_full("decode", name)?;
        self.registry.read_to_end(name, data)
    }
}
