// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! XDR type graph model.
//!
//! This module provides:
//! - [`ast`] - Resolved type definitions (structs, enums, unions, typedefs)
//! - [`graph`] - The validated, immutable [`TypeGraph`] with dependency queries
//! - [`loader`] - JSON/TOML schema document loading
//! - [`json_schema`] - JSON Schema (Draft 7) output for the JSON projection

pub mod ast;
pub mod graph;
pub mod json_schema;
pub mod loader;

pub use ast::{
    CaseLabel, EnumMember, Field, FieldType, PrimitiveType, TypeDefinition, TypeNode, UnionArm,
    UNBOUNDED,
};
pub use graph::{DiscriminantKind, TypeGraph};
pub use json_schema::json_schema;
pub use loader::{load_schema_file, load_schema_str, LoadOptions, LoadedSchema};

use std::path::Path;

/// Schema document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// JSON document
    Json,
    /// TOML document
    Toml,
}

impl SchemaFormat {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(SchemaFormat::Json),
            "toml" => Some(SchemaFormat::Toml),
            _ => None,
        }
    }

    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaFormat::Json => "json",
            SchemaFormat::Toml => "toml",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_format_parse() {
        assert_eq!(SchemaFormat::parse("json"), Some(SchemaFormat::Json));
        assert_eq!(SchemaFormat::parse("TOML"), Some(SchemaFormat::Toml));
        assert_eq!(SchemaFormat::parse("x"), None);
        assert_eq!(SchemaFormat::parse(""), None);
    }

    #[test]
    fn test_schema_format_from_path() {
        assert_eq!(
            SchemaFormat::from_path(Path::new("dir/types.json")),
            Some(SchemaFormat::Json)
        );
        assert_eq!(
            SchemaFormat::from_path(Path::new("types.toml")),
            Some(SchemaFormat::Toml)
        );
        assert_eq!(SchemaFormat::from_path(Path::new("types.x")), None);
        assert_eq!(SchemaFormat::from_path(Path::new("types")), None);
    }

    #[test]
    fn test_schema_format_as_str() {
        assert_eq!(SchemaFormat::Json.as_str(), "json");
        assert_eq!(SchemaFormat::Toml.as_str(), "toml");
    }
}
