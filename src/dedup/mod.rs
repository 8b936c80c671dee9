// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Cross-version type deduplication.
//!
//! Compares a "current" and a "next" type graph of the same schema family
//! and decides, for every type of "next", whether it can be re-exported
//! from "current" or must be redefined. Shapes are compared structurally;
//! doc text does not count. A type that references a redefined type is
//! itself redefined, transitively, even if its own shape is unchanged.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::schema::TypeGraph;

/// Why a type has to be redefined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "dependency", rename_all = "snake_case")]
pub enum ChangeReason {
    /// Not present in "current"
    New,
    /// Shape differs from "current"
    Modified,
    /// References a redefined type
    DependsOn(String),
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeReason::New => write!(f, "new"),
            ChangeReason::Modified => write!(f, "modified"),
            ChangeReason::DependsOn(name) => write!(f, "depends on {name}"),
        }
    }
}

/// Decision for one type of "next".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Re-export the "current" definition
    Unchanged,
    /// Emit the "next" definition
    Changed {
        /// Why
        #[serde(flatten)]
        reason: ChangeReason,
    },
}

impl Decision {
    /// Check if the type must be redefined.
    pub fn is_changed(&self) -> bool {
        matches!(self, Decision::Changed { .. })
    }
}

/// A type name with its decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDecision {
    /// Type name
    pub name: String,
    /// Decision
    #[serde(flatten)]
    pub decision: Decision,
}

/// Outcome of comparing two graphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DedupResult {
    /// One decision per type of "next", in declaration order
    pub decisions: Vec<TypeDecision>,
    /// Every type of "next", always regenerated
    pub type_enum: Vec<String>,
    /// Types of "current" that "next" no longer has
    pub removed: Vec<String>,
}

impl DedupResult {
    /// Look up the decision for a type.
    pub fn decision(&self, name: &str) -> Option<&Decision> {
        self.decisions
            .iter()
            .find(|d| d.name == name)
            .map(|d| &d.decision)
    }

    /// Types re-exported from "current".
    pub fn unchanged(&self) -> Vec<&str> {
        self.decisions
            .iter()
            .filter(|d| !d.decision.is_changed())
            .map(|d| d.name.as_str())
            .collect()
    }

    /// Types to redefine, with their reasons.
    pub fn changed(&self) -> Vec<(&str, &ChangeReason)> {
        self.decisions
            .iter()
            .filter_map(|d| match &d.decision {
                Decision::Changed { reason } => Some((d.name.as_str(), reason)),
                Decision::Unchanged => None,
            })
            .collect()
    }
}

impl fmt::Display for DedupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unchanged = self.unchanged();
        let changed = self.changed();
        writeln!(f, "Re-exported unchanged ({}):", unchanged.len())?;
        for name in &unchanged {
            writeln!(f, "  {name}")?;
        }
        writeln!(f, "Redefined ({}):", changed.len())?;
        for (name, reason) in &changed {
            writeln!(f, "  {name} ({reason})")?;
        }
        if !self.removed.is_empty() {
            writeln!(f, "Removed ({}):", self.removed.len())?;
            for name in &self.removed {
                writeln!(f, "  {name}")?;
            }
        }
        writeln!(f, "Type enum ({}):", self.type_enum.len())?;
        for name in &self.type_enum {
            writeln!(f, "  {name}")?;
        }
        Ok(())
    }
}

/// Decide which types of `next` must be redefined relative to `curr`.
pub fn deduplicate(curr: &TypeGraph, next: &TypeGraph) -> DedupResult {
    let mut decisions: Vec<TypeDecision> = next
        .definitions()
        .iter()
        .map(|def| {
            let decision = match curr.get(&def.name) {
                None => Decision::Changed {
                    reason: ChangeReason::New,
                },
                Some(old) if !old.same_shape(def) => Decision::Changed {
                    reason: ChangeReason::Modified,
                },
                Some(_) => Decision::Unchanged,
            };
            TypeDecision {
                name: def.name.clone(),
                decision,
            }
        })
        .collect();

    // Positions match next.definitions().
    let mut queue: VecDeque<String> = decisions
        .iter()
        .filter(|d| d.decision.is_changed())
        .map(|d| d.name.clone())
        .collect();
    let position: HashMap<&str, usize> = next
        .definitions()
        .iter()
        .enumerate()
        .map(|(i, d)| (d.name.as_str(), i))
        .collect();

    while let Some(changed) = queue.pop_front() {
        for dependent in next.dependents(&changed) {
            let Some(&i) = position.get(dependent) else {
                continue;
            };
            if decisions[i].decision.is_changed() {
                continue;
            }
            debug!(
                context = "dedup",
                type_name = dependent,
                dependency = %changed,
                "Unchanged type redefined through a dependency"
            );
            decisions[i].decision = Decision::Changed {
                reason: ChangeReason::DependsOn(changed.clone()),
            };
            queue.push_back(dependent.to_string());
        }
    }

    let removed = curr
        .names()
        .filter(|name| !next.contains(name))
        .map(str::to_string)
        .collect();
    let type_enum = next.names().map(str::to_string).collect();

    DedupResult {
        decisions,
        type_enum,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, FieldType, PrimitiveType, TypeDefinition, TypeNode};

    fn int() -> FieldType {
        FieldType::Primitive(PrimitiveType::Int)
    }

    fn strukt(name: &str, fields: Vec<(&str, FieldType)>) -> TypeDefinition {
        TypeDefinition::new(
            name,
            TypeNode::Struct {
                fields: fields
                    .into_iter()
                    .map(|(n, t)| Field::new(n, t))
                    .collect(),
            },
        )
    }

    fn curr() -> TypeGraph {
        TypeGraph::new(vec![
            strukt("X", vec![("a", int())]),
            strukt("Y", vec![("x", FieldType::named("X"))]),
            strukt("Z", vec![("y", FieldType::named("Y"))]),
            strukt("W", vec![("b", int())]),
        ])
        .unwrap()
    }

    #[test]
    fn test_identical_graphs() {
        let result = deduplicate(&curr(), &curr());
        assert!(result.changed().is_empty());
        assert_eq!(result.unchanged(), vec!["X", "Y", "Z", "W"]);
        assert_eq!(result.type_enum, vec!["X", "Y", "Z", "W"]);
    }

    #[test]
    fn test_change_propagates_to_dependents() {
        let next = TypeGraph::new(vec![
            strukt("X", vec![("a", int()), ("c", int())]),
            strukt("Y", vec![("x", FieldType::named("X"))]),
            strukt("Z", vec![("y", FieldType::named("Y"))]),
            strukt("W", vec![("b", int())]),
        ])
        .unwrap();
        let result = deduplicate(&curr(), &next);
        assert_eq!(
            result.decision("X"),
            Some(&Decision::Changed {
                reason: ChangeReason::Modified
            })
        );
        assert_eq!(
            result.decision("Y"),
            Some(&Decision::Changed {
                reason: ChangeReason::DependsOn("X".into())
            })
        );
        assert_eq!(
            result.decision("Z"),
            Some(&Decision::Changed {
                reason: ChangeReason::DependsOn("Y".into())
            })
        );
        assert_eq!(result.unchanged(), vec!["W"]);
    }

    #[test]
    fn test_leaf_change_is_minimal() {
        let next = TypeGraph::new(vec![
            strukt("X", vec![("a", int())]),
            strukt("Y", vec![("x", FieldType::named("X"))]),
            strukt("Z", vec![("y", FieldType::named("Y"))]),
            strukt("W", vec![("b", FieldType::Primitive(PrimitiveType::Hyper))]),
        ])
        .unwrap();
        let result = deduplicate(&curr(), &next);
        assert_eq!(result.changed().len(), 1);
        assert_eq!(result.changed()[0].0, "W");
    }

    #[test]
    fn test_doc_only_change_is_unchanged() {
        let mut defs = curr().definitions().to_vec();
        defs[0].doc = Some("Reworded".into());
        let result = deduplicate(&curr(), &TypeGraph::new(defs).unwrap());
        assert!(result.changed().is_empty());
    }

    #[test]
    fn test_new_and_removed() {
        let next = TypeGraph::new(vec![
            strukt("X", vec![("a", int())]),
            strukt("V", vec![("x", FieldType::named("X"))]),
        ])
        .unwrap();
        let result = deduplicate(&curr(), &next);
        assert_eq!(
            result.decision("V"),
            Some(&Decision::Changed {
                reason: ChangeReason::New
            })
        );
        assert_eq!(result.removed, vec!["Y", "Z", "W"]);
        assert_eq!(result.type_enum, vec!["X", "V"]);
    }

    #[test]
    fn test_report_and_json() {
        let next = TypeGraph::new(vec![
            strukt("X", vec![("a", FieldType::Primitive(PrimitiveType::Bool))]),
            strukt("Y", vec![("x", FieldType::named("X"))]),
            strukt("Z", vec![("y", FieldType::named("Y"))]),
            strukt("W", vec![("b", int())]),
        ])
        .unwrap();
        let result = deduplicate(&curr(), &next);
        let text = result.to_string();
        assert!(text.contains("Re-exported unchanged (1):\n  W\n"));
        assert!(text.contains("  Y (depends on X)\n"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["decisions"][0]["decision"], "changed");
        assert_eq!(json["decisions"][0]["reason"], "modified");
        assert_eq!(json["decisions"][1]["reason"], "depends_on");
        assert_eq!(json["decisions"][1]["dependency"], "X");
        assert_eq!(json["decisions"][3]["decision"], "unchanged");
    }
}
