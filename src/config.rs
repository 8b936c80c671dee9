// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Generator configuration.
//!
//! A TOML document naming the sparse types to build, the types with
//! custom hooks, and the limits applied to every decode and encode:
//!
//! ```toml
//! custom_default = ["Asset"]
//! custom_str = ["AccountId"]
//!
//! [limits]
//! depth = 100
//! len = 1048576
//!
//! [[sparse]]
//! name = "TxSourceOnly"
//! base = "Transaction"
//! paths = ["sourceAccount", "operations[].sourceAccount"]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::core::{CodecError, Result};
use crate::encoding::xdr::{Limits, DEFAULT_DEPTH_LIMIT};
use crate::sparse::SparseRequest;

/// Decode and encode budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum nesting depth
    pub depth: u32,
    /// Maximum bytes read or written; unlimited when absent
    pub len: Option<usize>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH_LIMIT,
            len: None,
        }
    }
}

impl From<LimitsConfig> for Limits {
    fn from(config: LimitsConfig) -> Self {
        Limits {
            depth: config.depth,
            len: config.len.unwrap_or(usize::MAX),
        }
    }
}

/// Generator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Decode and encode budgets
    pub limits: LimitsConfig,
    /// Sparse types to synthesize, in order
    pub sparse: Vec<SparseRequest>,
    /// Types whose default comes from a registered provider
    pub custom_default: Vec<String>,
    /// Types with a registered string representation
    pub custom_str: Vec<String>,
}

impl GeneratorConfig {
    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| CodecError::invalid_schema(path.display().to_string(), e.to_string()))
    }

    /// Parse from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CodecError::invalid_schema("<config>", e.to_string()))
    }

    /// Limits to apply.
    pub fn limits(&self) -> Limits {
        self.limits.into()
    }
}
