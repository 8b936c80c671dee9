// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sparse descriptor synthesis.
//!
//! Walks the type graph guided by a [`PathTree`] and produces one descriptor
//! per visited type. Every original field and arm keeps its place so the
//! decoder consumes exactly the bytes the full decoder would.
//!
//! Nested descriptors are named `{request}_{Origin}_{Field}` for struct
//! fields and `{request}_{Case}` for union arms. Names are memoized per
//! request: reaching a name again with the same origin and subtree shares
//! the descriptor, reaching it with a different one appends a numeric
//! suffix.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::path_tree::{PathNode, PathTree};
use super::plan::{
    ArmAction, FieldAction, SparseArm, SparseField, SparsePlan, SparseShape, SparseTypeDescriptor,
    Traversal,
};
use super::SparseRequest;
use crate::core::{CodecError, Diagnostic, DiagnosticKind, Result};
use crate::schema::{FieldType, TypeGraph, TypeNode};

/// Where a field's wire type leads once typedefs are followed.
enum Reach<'g> {
    /// A struct or union, through `traversal`
    Composite {
        type_name: &'g str,
        traversal: Traversal,
    },
    /// An enum; it has no members to select
    Enum { type_name: &'g str },
    /// Primitive, opaque or string
    Scalar,
}

/// Synthesize the descriptors of one sparse-type request.
///
/// # Errors
///
/// - `TypeNotFound` if the base type is not in the graph
/// - `AmbiguousPath` if the paths do not form a tree
///
/// Paths that do not resolve are not errors: the branch is skipped, a
/// warning is logged and a [`Diagnostic`] is added to the plan.
pub fn synthesize(graph: &TypeGraph, request: &SparseRequest) -> Result<SparsePlan> {
    if !graph.contains(&request.base) {
        return Err(CodecError::type_not_found(&request.base));
    }
    let tree = PathTree::build(&request.paths)?;
    let mut synthesizer = Synthesizer {
        graph,
        plan: SparsePlan::new(&request.name, &request.base),
        memo: HashMap::new(),
    };
    synthesizer.descriptor_for(request.name.clone(), &request.base, &tree, "")?;
    debug!(
        context = "sparse_synthesis",
        request = %request.name,
        descriptors = synthesizer.plan.len(),
        diagnostics = synthesizer.plan.diagnostics.len(),
        "Sparse type synthesized"
    );
    Ok(synthesizer.plan)
}

struct Synthesizer<'g> {
    graph: &'g TypeGraph,
    plan: SparsePlan,
    /// Descriptor name -> (origin, subtree) it was built for
    memo: HashMap<String, (String, PathTree)>,
}

impl<'g> Synthesizer<'g> {
    /// Return the descriptor name for `type_name` projected by `tree`,
    /// synthesizing it unless an identical one exists.
    fn descriptor_for(
        &mut self,
        name: String,
        type_name: &'g str,
        tree: &PathTree,
        trail: &str,
    ) -> Result<String> {
        let origin = self.unwrap_aliases(type_name)?;

        let mut candidate = name.clone();
        let mut suffix = 1;
        loop {
            match self.memo.get(&candidate) {
                Some((seen_origin, seen_tree)) if seen_origin == origin && seen_tree == tree => {
                    return Ok(candidate);
                }
                Some(_) => {
                    suffix += 1;
                    candidate = format!("{name}{suffix}");
                }
                None => break,
            }
        }
        if candidate != name {
            warn!(
                context = "sparse_synthesis",
                request = %self.plan.name,
                descriptor = %name,
                renamed = %candidate,
                "Descriptor name reached with a different projection, renamed"
            );
            self.plan.diagnostics.push(Diagnostic::new(
                DiagnosticKind::RenamedDescriptor,
                &name,
                format!("projection of '{origin}' at '{trail}' renamed to '{candidate}'"),
            ));
        }
        self.memo
            .insert(candidate.clone(), (origin.to_string(), tree.clone()));

        let shape = match self.graph.node(origin)? {
            TypeNode::Struct { fields } => {
                let mut sparse_fields = Vec::with_capacity(fields.len());
                for field in fields {
                    let action = match tree.get(&field.name) {
                        None => FieldAction::Skip,
                        Some(node) => {
                            let nested = format!(
                                "{}_{origin}_{}",
                                self.plan.name,
                                camelize(&field.name)
                            );
                            self.member_action(
                                nested,
                                &field.field_type,
                                node,
                                &join(trail, &field.name),
                                origin,
                            )?
                        }
                    };
                    sparse_fields.push(SparseField {
                        name: field.name.clone(),
                        field_type: field.field_type.clone(),
                        action,
                    });
                }
                self.report_unknown(tree, trail, origin, |key| {
                    fields.iter().any(|f| f.name == key)
                });
                SparseShape::Struct {
                    fields: sparse_fields,
                }
            }
            TypeNode::Union { discriminant, arms } => {
                let mut sparse_arms = Vec::with_capacity(arms.len());
                for arm in arms {
                    let label = arm.label();
                    let path = join(trail, &label);
                    let action = match (tree.get(&label), &arm.payload) {
                        (None, Some(_)) => ArmAction::Skip,
                        (None, None) | (Some(PathNode::Leaf { .. }), None) => ArmAction::Void,
                        (Some(PathNode::Branch { .. }), None) => {
                            self.unresolved(&path, origin, format!("case '{label}' is void"));
                            ArmAction::Void
                        }
                        (Some(node), Some(payload)) => {
                            let nested = format!("{}_{label}", self.plan.name);
                            match self.member_action(nested, payload, node, &path, origin)? {
                                FieldAction::Extract => ArmAction::Extract,
                                FieldAction::Recurse { target, traversal } => {
                                    ArmAction::Recurse { target, traversal }
                                }
                                FieldAction::Skip => ArmAction::Skip,
                            }
                        }
                    };
                    sparse_arms.push(SparseArm {
                        arm: arm.clone(),
                        action,
                    });
                }
                self.report_unknown(tree, trail, origin, |key| {
                    arms.iter().any(|a| a.label() == key)
                });
                SparseShape::Union {
                    discriminant: discriminant.clone(),
                    arms: sparse_arms,
                }
            }
            TypeNode::Enum { .. } => {
                self.enum_traversal(trail, origin);
                SparseShape::Alias {
                    underlying: FieldType::named(origin),
                    action: FieldAction::Extract,
                }
            }
            TypeNode::Typedef { underlying } => {
                // Typedef of an array, optional or scalar.
                let action = match self.reach(underlying)? {
                    Reach::Composite {
                        type_name,
                        traversal,
                    } => {
                        if traversal.is_array() {
                            self.implicit_array(trail, origin);
                        }
                        let nested = format!("{}_{origin}_{type_name}", self.plan.name);
                        let target = self.descriptor_for(nested, type_name, tree, trail)?;
                        FieldAction::Recurse { target, traversal }
                    }
                    Reach::Enum { .. } => {
                        if !tree.is_empty() {
                            self.enum_traversal(trail, origin);
                        }
                        FieldAction::Extract
                    }
                    Reach::Scalar => {
                        self.report_unknown(tree, trail, origin, |_| false);
                        FieldAction::Extract
                    }
                };
                SparseShape::Alias {
                    underlying: underlying.clone(),
                    action,
                }
            }
        };

        self.plan.add(SparseTypeDescriptor {
            name: candidate.clone(),
            origin: origin.to_string(),
            shape,
        })?;
        Ok(candidate)
    }

    /// Decide the action for a field or arm payload named in the tree.
    fn member_action(
        &mut self,
        nested: String,
        field_type: &'g FieldType,
        node: &PathNode,
        path: &str,
        owner: &str,
    ) -> Result<FieldAction> {
        let children = match node {
            PathNode::Leaf { .. } => return Ok(FieldAction::Extract),
            PathNode::Branch { children, .. } => children,
        };
        match self.reach(field_type)? {
            Reach::Composite {
                type_name,
                traversal,
            } => {
                if traversal.is_array() && !node.array_traversal() {
                    self.implicit_array(path, owner);
                } else if !traversal.is_array() && node.array_traversal() {
                    debug!(
                        context = "sparse_synthesis",
                        path = %path,
                        "Array marker on a non-array member ignored"
                    );
                }
                let target = self.descriptor_for(nested, type_name, children, path)?;
                Ok(FieldAction::Recurse { target, traversal })
            }
            Reach::Enum { type_name } => {
                self.enum_traversal(path, type_name);
                Ok(FieldAction::Extract)
            }
            Reach::Scalar => {
                self.unresolved(
                    path,
                    owner,
                    format!("member of type '{field_type}' has no nested fields"),
                );
                Ok(FieldAction::Skip)
            }
        }
    }

    /// Follow typedefs and container wrappers down to a named type.
    fn reach(&self, field_type: &'g FieldType) -> Result<Reach<'g>> {
        Ok(match self.graph.resolve(field_type)? {
            FieldType::Named(name) => match self.graph.node(name)? {
                TypeNode::Enum { .. } => Reach::Enum { type_name: name },
                _ => Reach::Composite {
                    type_name: name,
                    traversal: Traversal::Direct,
                },
            },
            FieldType::Optional(inner) => self.wrap(inner, |t| Traversal::Optional(Box::new(t)))?,
            FieldType::Array { element, size } => self.wrap(element, |t| Traversal::FixedArray {
                size: *size,
                element: Box::new(t),
            })?,
            FieldType::VarArray { element, max } => self.wrap(element, |t| Traversal::VarArray {
                max: *max,
                element: Box::new(t),
            })?,
            _ => Reach::Scalar,
        })
    }

    fn wrap(
        &self,
        inner: &'g FieldType,
        wrap: impl FnOnce(Traversal) -> Traversal,
    ) -> Result<Reach<'g>> {
        Ok(match self.reach(inner)? {
            Reach::Composite {
                type_name,
                traversal,
            } => Reach::Composite {
                type_name,
                traversal: wrap(traversal),
            },
            other => other,
        })
    }

    /// Follow typedefs whose underlying type is a plain name.
    fn unwrap_aliases(&self, type_name: &'g str) -> Result<&'g str> {
        let mut current = type_name;
        for _ in 0..=self.graph.len() {
            match self.graph.node(current)? {
                TypeNode::Typedef {
                    underlying: FieldType::Named(next),
                } => current = next,
                _ => return Ok(current),
            }
        }
        Err(CodecError::invalid_schema(
            type_name,
            "typedef chain refers back to itself",
        ))
    }

    fn report_unknown(
        &mut self,
        tree: &PathTree,
        trail: &str,
        origin: &str,
        known: impl Fn(&str) -> bool,
    ) {
        let unknown: Vec<String> = tree
            .iter()
            .filter(|&(key, _)| !known(key))
            .map(|(key, _)| key.to_string())
            .collect();
        for key in unknown {
            self.unresolved(
                &join(trail, &key),
                origin,
                format!("'{key}' is not a member of '{origin}'"),
            );
        }
    }

    fn unresolved(&mut self, path: &str, type_name: &str, reason: String) {
        let error = CodecError::unresolved_path(path, type_name, reason);
        warn!(
            context = "sparse_synthesis",
            request = %self.plan.name,
            error = %error,
            "Sparse path does not resolve, branch skipped"
        );
        self.plan.diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnresolvedPath,
            format!("{}: {path}", self.plan.name),
            error.to_string(),
        ));
    }

    fn enum_traversal(&mut self, path: &str, enum_name: &str) {
        warn!(
            context = "sparse_synthesis",
            request = %self.plan.name,
            path = %path,
            type_name = %enum_name,
            "Sparse path leads into an enum, extracting the whole value"
        );
        self.plan.diagnostics.push(Diagnostic::new(
            DiagnosticKind::EnumTraversal,
            format!("{}: {path}", self.plan.name),
            format!("'{enum_name}' is an enum; extracting the whole value"),
        ));
    }

    fn implicit_array(&mut self, path: &str, owner: &str) {
        warn!(
            context = "sparse_synthesis",
            request = %self.plan.name,
            path = %path,
            type_name = %owner,
            "Array traversed without the [] marker"
        );
        self.plan.diagnostics.push(Diagnostic::new(
            DiagnosticKind::ImplicitArrayTraversal,
            format!("{}: {path}", self.plan.name),
            "array traversed without the [] marker",
        ));
    }
}

fn join(trail: &str, segment: &str) -> String {
    if trail.is_empty() {
        segment.to_string()
    } else {
        format!("{trail}.{segment}")
    }
}

/// `tx_processing` -> `TxProcessing`.
fn camelize(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{load_schema_str, LoadOptions, SchemaFormat};

    fn graph() -> TypeGraph {
        load_schema_str(
            r#"{ "types": [
                { "kind": "enum", "name": "Kind",
                  "members": [ { "name": "PAY", "value": 0 }, { "name": "NOTE", "value": 1 } ] },
                { "kind": "struct", "name": "Payment",
                  "fields": [
                    { "name": "amount", "type": "hyper" },
                    { "name": "memo", "type": { "string": { "max": 28 } } }
                  ] },
                { "kind": "union", "name": "Body", "discriminant": { "ref": "Kind" },
                  "arms": [
                    { "cases": ["PAY"], "type": { "ref": "Payment" } },
                    { "cases": ["NOTE"] }
                  ] },
                { "kind": "struct", "name": "Op",
                  "fields": [
                    { "name": "source", "type": { "optional": { "opaque_fixed": 32 } } },
                    { "name": "body", "type": { "ref": "Body" } },
                    { "name": "kind", "type": { "ref": "Kind" } }
                  ] },
                { "kind": "typedef", "name": "Ops", "type": { "var_array": { "element": { "ref": "Op" }, "max": 100 } } },
                { "kind": "struct", "name": "Tx",
                  "fields": [
                    { "name": "fee", "type": "unsigned_int" },
                    { "name": "op_list", "type": { "ref": "Ops" } },
                    { "name": "first_op", "type": { "ref": "Op" } },
                    { "name": "last_op", "type": { "optional": { "ref": "Op" } } }
                  ] },
                { "kind": "typedef", "name": "TxAlias", "type": { "ref": "Tx" } }
            ] }"#,
            SchemaFormat::Json,
            LoadOptions::default(),
        )
        .unwrap()
        .graph
    }

    fn request(base: &str, paths: &[&str]) -> SparseRequest {
        SparseRequest {
            name: "S".into(),
            base: base.into(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn field_action<'p>(plan: &'p SparsePlan, descriptor: &str, field: &str) -> &'p FieldAction {
        match &plan.get(descriptor).unwrap().shape {
            SparseShape::Struct { fields } => {
                &fields.iter().find(|f| f.name == field).unwrap().action
            }
            other => panic!("not a struct: {other:?}"),
        }
    }

    #[test]
    fn test_struct_fields_keep_order_and_actions() {
        let graph = graph();
        let plan = synthesize(&graph, &request("Tx", &["fee", "op_list[].body.PAY.amount"])).unwrap();
        let root = plan.root().unwrap();
        assert_eq!(root.origin, "Tx");
        let SparseShape::Struct { fields } = &root.shape else {
            panic!("root is not a struct");
        };
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["fee", "op_list", "first_op", "last_op"]);
        assert_eq!(fields[0].action, FieldAction::Extract);
        assert_eq!(fields[2].action, FieldAction::Skip);
        assert_eq!(
            fields[1].action,
            FieldAction::Recurse {
                target: "S_Tx_OpList".into(),
                traversal: Traversal::VarArray {
                    max: 100,
                    element: Box::new(Traversal::Direct),
                },
            }
        );
        assert!(plan.diagnostics.is_empty());
    }

    #[test]
    fn test_union_arms() {
        let graph = graph();
        let plan = synthesize(&graph, &request("Op", &["body.PAY.amount"])).unwrap();
        let SparseShape::Union { arms, .. } = &plan.get("S_Op_Body").unwrap().shape else {
            panic!("body is not a union");
        };
        assert_eq!(
            arms[0].action,
            ArmAction::Recurse {
                target: "S_PAY".into(),
                traversal: Traversal::Direct,
            }
        );
        assert_eq!(arms[1].action, ArmAction::Void);
        assert_eq!(field_action(&plan, "S_PAY", "memo"), &FieldAction::Skip);
    }

    #[test]
    fn test_leaf_union_case_extracts_payload() {
        let graph = graph();
        let plan = synthesize(&graph, &request("Body", &["PAY"])).unwrap();
        let SparseShape::Union { arms, .. } = &plan.root().unwrap().shape else {
            panic!("root is not a union");
        };
        assert_eq!(arms[0].action, ArmAction::Extract);
    }

    #[test]
    fn test_unresolved_path_is_skipped_and_reported() {
        let graph = graph();
        let plan = synthesize(&graph, &request("Tx", &["fee", "nope.x", "first_op.source.y"])).unwrap();
        assert_eq!(field_action(&plan, "S", "fee"), &FieldAction::Extract);
        assert_eq!(field_action(&plan, "S_Tx_FirstOp", "source"), &FieldAction::Skip);
        let kinds: Vec<DiagnosticKind> = plan.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::UnresolvedPath, DiagnosticKind::UnresolvedPath]
        );
    }

    #[test]
    fn test_enum_traversal_falls_back_to_extract() {
        let graph = graph();
        let plan = synthesize(&graph, &request("Op", &["kind.PAY"])).unwrap();
        assert_eq!(field_action(&plan, "S", "kind"), &FieldAction::Extract);
        assert_eq!(plan.diagnostics[0].kind, DiagnosticKind::EnumTraversal);
    }

    #[test]
    fn test_implicit_array_traversal_reported() {
        let graph = graph();
        let plan = synthesize(&graph, &request("Tx", &["op_list.kind"])).unwrap();
        assert!(matches!(
            field_action(&plan, "S", "op_list"),
            FieldAction::Recurse { .. }
        ));
        assert_eq!(
            plan.diagnostics[0].kind,
            DiagnosticKind::ImplicitArrayTraversal
        );
    }

    #[test]
    fn test_shared_descriptor_and_rename() {
        let graph = graph();
        // first_op and last_op land on different names, both projecting Op.
        let plan = synthesize(&graph, &request("Tx", &["first_op.kind", "last_op.kind"])).unwrap();
        assert!(plan.get("S_Tx_FirstOp").is_some());
        assert!(plan.get("S_Tx_LastOp").is_some());

        // Different subtrees under the same names get numbered.
        let plan = synthesize(
            &graph,
            &request(
                "Tx",
                &["first_op.body.PAY.amount", "last_op.body.PAY.memo"],
            ),
        )
        .unwrap();
        assert!(plan.get("S_PAY").is_some());
        assert!(plan.get("S_PAY2").is_some());
        assert_eq!(
            plan.diagnostics[0].kind,
            DiagnosticKind::RenamedDescriptor
        );

        // Same subtree through both routes: one descriptor.
        let plan = synthesize(
            &graph,
            &request(
                "Tx",
                &["first_op.body.PAY.amount", "last_op.body.PAY.amount"],
            ),
        )
        .unwrap();
        assert!(plan.get("S_PAY").is_some());
        assert!(plan.get("S_PAY2").is_none());
        assert!(plan.diagnostics.is_empty());
    }

    #[test]
    fn test_typedef_base_is_transparent() {
        let graph = graph();
        let plan = synthesize(&graph, &request("TxAlias", &["fee"])).unwrap();
        assert_eq!(plan.root().unwrap().origin, "Tx");
        assert_eq!(field_action(&plan, "S", "fee"), &FieldAction::Extract);
    }

    #[test]
    fn test_typedef_of_array_base_is_alias() {
        let graph = graph();
        let plan = synthesize(&graph, &request("Ops", &["kind"])).unwrap();
        let SparseShape::Alias { action, .. } = &plan.root().unwrap().shape else {
            panic!("root is not an alias");
        };
        assert!(matches!(action, FieldAction::Recurse { .. }));
    }

    #[test]
    fn test_missing_base_and_ambiguous_paths() {
        let graph = graph();
        assert!(matches!(
            synthesize(&graph, &request("Nope", &["a"])).unwrap_err(),
            CodecError::TypeNotFound { .. }
        ));
        assert!(matches!(
            synthesize(&graph, &request("Tx", &["first_op.kind", "first_op"])).unwrap_err(),
            CodecError::AmbiguousPath { .. }
        ));
    }

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("tx_processing"), "TxProcessing");
        assert_eq!(camelize("fee"), "Fee");
        assert_eq!(camelize("a__b"), "AB");
    }
}
