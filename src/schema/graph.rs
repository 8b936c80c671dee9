// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Immutable type graph.
//!
//! Definitions are kept in declaration order, which is also the registry
//! order used by `types` and `guess`. The graph validates every reference on
//! construction, so lookups during decode only fail for names a caller
//! supplies.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use super::ast::{CaseLabel, FieldType, PrimitiveType, TypeDefinition, TypeNode};
use crate::core::{CodecError, Result};

/// Underlying wire form of a union discriminant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscriminantKind {
    /// Signed 32-bit integer
    Int,
    /// Unsigned 32-bit integer
    UnsignedInt,
    /// Boolean
    Bool,
    /// Enum type (by name)
    Enum(String),
}

/// Immutable, validated set of named types.
#[derive(Debug, Clone)]
pub struct TypeGraph {
    definitions: Vec<TypeDefinition>,
    index: HashMap<String, usize>,
    dependencies: HashMap<String, BTreeSet<String>>,
}

impl TypeGraph {
    /// Build and validate a graph.
    ///
    /// Fails on duplicate names, unresolved references, typedef cycles,
    /// unsupported discriminants and repeated discriminant values.
    pub fn new(definitions: Vec<TypeDefinition>) -> Result<Self> {
        let mut index = HashMap::with_capacity(definitions.len());
        for (i, def) in definitions.iter().enumerate() {
            if index.insert(def.name.clone(), i).is_some() {
                return Err(CodecError::DuplicateDefinition {
                    name: def.name.clone(),
                });
            }
        }

        let dependencies = definitions
            .iter()
            .map(|def| (def.name.clone(), def.node.referenced_names()))
            .collect();

        let graph = Self {
            definitions,
            index,
            dependencies,
        };
        graph.validate()?;
        Ok(graph)
    }

    fn validate(&self) -> Result<()> {
        for def in &self.definitions {
            for dep in self.dependencies.get(&def.name).into_iter().flatten() {
                if !self.index.contains_key(dep) {
                    return Err(CodecError::type_not_found(dep.clone()));
                }
            }
            match &def.node {
                TypeNode::Typedef { underlying } => {
                    self.resolve(underlying)?;
                }
                TypeNode::Union { discriminant, arms } => {
                    let kind = self.discriminant_kind(discriminant)?;
                    let mut seen = HashSet::new();
                    for arm in arms {
                        if !seen.insert(arm.value) {
                            return Err(CodecError::invalid_schema(
                                &def.name,
                                format!("discriminant value {} used by more than one arm", arm.value),
                            ));
                        }
                        self.check_case(&def.name, &kind, &arm.case, arm.value)?;
                    }
                }
                TypeNode::Enum { members } => {
                    let mut seen = HashSet::new();
                    for member in members {
                        if !seen.insert(member.name.as_str()) {
                            return Err(CodecError::invalid_schema(
                                &def.name,
                                format!("enum member '{}' declared twice", member.name),
                            ));
                        }
                    }
                }
                TypeNode::Struct { .. } => {}
            }
        }
        Ok(())
    }

    fn check_case(
        &self,
        union_name: &str,
        kind: &DiscriminantKind,
        case: &CaseLabel,
        value: i64,
    ) -> Result<()> {
        let in_range = match kind {
            DiscriminantKind::Int => i32::try_from(value).is_ok(),
            DiscriminantKind::UnsignedInt => u32::try_from(value).is_ok(),
            DiscriminantKind::Bool => value == 0 || value == 1,
            DiscriminantKind::Enum(enum_name) => match self.node(enum_name)? {
                TypeNode::Enum { members } => members.iter().any(|m| {
                    i64::from(m.value) == value
                        && match case {
                            CaseLabel::Ident(ident) => &m.name == ident,
                            CaseLabel::Int(_) => true,
                        }
                }),
                _ => false,
            },
        };
        if in_range {
            Ok(())
        } else {
            Err(CodecError::invalid_schema(
                union_name,
                format!("case '{}' is not a valid discriminant value", case.label()),
            ))
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Get a definition by name.
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    /// Get a type node by name, failing with `TypeNotFound`.
    pub fn node(&self, name: &str) -> Result<&TypeNode> {
        self.get(name)
            .map(|def| &def.node)
            .ok_or_else(|| CodecError::type_not_found(name))
    }

    /// Check if a type is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All definitions in declaration order.
    pub fn definitions(&self) -> &[TypeDefinition] {
        &self.definitions
    }

    /// All type names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|def| def.name.as_str())
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Follow typedef chains until reaching a non-typedef field type.
    pub fn resolve<'a>(&'a self, field_type: &'a FieldType) -> Result<&'a FieldType> {
        let mut current = field_type;
        for _ in 0..=self.definitions.len() {
            match current {
                FieldType::Named(name) => match self.node(name)? {
                    TypeNode::Typedef { underlying } => current = underlying,
                    _ => return Ok(current),
                },
                _ => return Ok(current),
            }
        }
        Err(CodecError::invalid_schema(
            field_type.to_string(),
            "typedef chain refers back to itself",
        ))
    }

    /// Classify a discriminant type.
    pub fn discriminant_kind(&self, field_type: &FieldType) -> Result<DiscriminantKind> {
        match self.resolve(field_type)? {
            FieldType::Primitive(PrimitiveType::Int) => Ok(DiscriminantKind::Int),
            FieldType::Primitive(PrimitiveType::UnsignedInt) => Ok(DiscriminantKind::UnsignedInt),
            FieldType::Primitive(PrimitiveType::Bool) => Ok(DiscriminantKind::Bool),
            FieldType::Named(name) => match self.node(name)? {
                TypeNode::Enum { .. } => Ok(DiscriminantKind::Enum(name.clone())),
                other => Err(CodecError::unsupported(format!(
                    "union discriminant of {} type '{name}'",
                    other.kind_str()
                ))),
            },
            other => Err(CodecError::unsupported(format!(
                "union discriminant of type '{other}'"
            ))),
        }
    }

    // ========================================================================
    // Dependencies
    // ========================================================================

    /// Names directly referenced by a type.
    pub fn dependencies(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.dependencies.get(name)
    }

    /// Type names that directly reference `name`, in declaration order.
    pub fn dependents(&self, name: &str) -> Vec<&str> {
        self.definitions
            .iter()
            .filter(|def| {
                self.dependencies
                    .get(&def.name)
                    .is_some_and(|deps| deps.contains(name))
            })
            .map(|def| def.name.as_str())
            .collect()
    }

    /// Whether `from` can reach `target` through type references.
    pub fn is_cyclic(&self, from: &str, target: &str) -> bool {
        self.is_cyclic_inner(from, target, &mut HashSet::new())
    }

    fn is_cyclic_inner<'a>(&'a self, from: &'a str, target: &str, seen: &mut HashSet<&'a str>) -> bool {
        if !seen.insert(from) {
            return false;
        }
        if let Some(deps) = self.dependencies.get(from) {
            for dep in deps {
                if dep == target || self.is_cyclic_inner(dep, target, seen) {
                    return true;
                }
            }
        }
        false
    }

    /// Whether a type refers back to itself, directly or transitively.
    pub fn is_self_referential(&self, name: &str) -> bool {
        self.is_cyclic(name, name)
    }

    /// Members of `parent` that must be heap-indirected to keep it finite.
    ///
    /// Only single and optional references count; arrays already store their
    /// elements out of line.
    pub fn requires_indirection(&self, parent: &str) -> Vec<String> {
        let Some(def) = self.get(parent) else {
            return Vec::new();
        };
        let reaches_parent = |field_type: &FieldType| {
            let target = match field_type {
                FieldType::Named(name) => Some(name),
                FieldType::Optional(inner) => match inner.as_ref() {
                    FieldType::Named(name) => Some(name),
                    _ => None,
                },
                _ => None,
            };
            target.is_some_and(|t| t == parent || self.is_cyclic(t, parent))
        };
        match &def.node {
            TypeNode::Struct { fields } => fields
                .iter()
                .filter(|f| reaches_parent(&f.field_type))
                .map(|f| f.name.clone())
                .collect(),
            TypeNode::Union { arms, .. } => arms
                .iter()
                .filter(|a| a.payload.as_ref().is_some_and(reaches_parent))
                .map(|a| a.label())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Names reachable from `root` (inclusive), in declaration order.
    pub fn reachable_from(&self, root: &str) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        if let Some(def) = self.get(root) {
            seen.insert(def.name.as_str());
            queue.push_back(def.name.as_str());
        }
        while let Some(name) = queue.pop_front() {
            for dep in self.dependencies.get(name).into_iter().flatten() {
                if seen.insert(dep.as_str()) {
                    queue.push_back(dep.as_str());
                }
            }
        }
        self.names().filter(|n| seen.contains(n)).collect()
    }
}
