// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Nested inclusion tree built from dotted extraction paths.
//!
//! `"tx.operations[].body"` becomes `tx -> operations[] -> body`, where the
//! trailing `[]` marks `operations` as an array to traverse element-wise.
//! Paths sharing a prefix share nodes; the array marker is OR'd onto a
//! shared node.

use std::collections::{BTreeMap, HashMap};

use crate::core::{CodecError, Result};

/// Suffix marking a segment as an array traversal.
pub const ARRAY_MARKER: &str = "[]";

/// One segment's entry in a [`PathTree`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathNode {
    /// Last segment of at least one path: extract the whole value.
    Leaf {
        /// Segment carried the array marker
        array: bool,
    },
    /// Intermediate segment: recurse with the nested tree.
    Branch {
        /// Segment carried the array marker in at least one path
        array: bool,
        /// Nested segments
        children: PathTree,
    },
}

impl PathNode {
    /// Check if this node ends a path.
    pub fn is_leaf(&self) -> bool {
        matches!(self, PathNode::Leaf { .. })
    }

    /// Check if the segment is marked as an array traversal.
    pub fn array_traversal(&self) -> bool {
        match self {
            PathNode::Leaf { array } | PathNode::Branch { array, .. } => *array,
        }
    }

    /// Nested tree of an intermediate node.
    pub fn children(&self) -> Option<&PathTree> {
        match self {
            PathNode::Leaf { .. } => None,
            PathNode::Branch { children, .. } => Some(children),
        }
    }
}

/// Mapping from field or case name to its [`PathNode`].
///
/// Equality is structural, so two requests that reach the same type along
/// different routes compare equal when they extract the same members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathTree {
    nodes: BTreeMap<String, PathNode>,
}

/// Which path first made a prefix a leaf or an intermediate node.
#[derive(Default)]
struct Origins<'p> {
    terminal: HashMap<String, &'p str>,
    intermediate: HashMap<String, &'p str>,
}

impl PathTree {
    /// Build a tree from dotted paths.
    ///
    /// # Errors
    ///
    /// - `AmbiguousPath` when a segment is the last segment of one path and
    ///   an intermediate segment of another (`["a.b", "a"]`)
    /// - `InvalidSchema` when a path has an empty segment
    pub fn build<S: AsRef<str>>(paths: &[S]) -> Result<Self> {
        let mut tree = PathTree::default();
        let mut origins = Origins::default();
        for path in paths {
            tree.insert(path.as_ref(), &mut origins)?;
        }
        Ok(tree)
    }

    fn insert<'p>(&mut self, path: &'p str, origins: &mut Origins<'p>) -> Result<()> {
        let segments = path
            .split('.')
            .map(|raw| parse_segment(path, raw))
            .collect::<Result<Vec<_>>>()?;
        let Some((last, parents)) = segments.split_last() else {
            return Ok(());
        };

        let mut prefix = String::new();
        let mut current = self;
        for &(name, array) in parents {
            push_segment(&mut prefix, name);
            if let Some(terminal) = origins.terminal.get(&prefix) {
                return Err(ambiguous(&prefix, terminal, path));
            }
            origins.intermediate.entry(prefix.clone()).or_insert(path);
            let node = current
                .nodes
                .entry(name.to_string())
                .or_insert_with(|| PathNode::Branch {
                    array: false,
                    children: PathTree::default(),
                });
            current = match node {
                PathNode::Branch {
                    array: flagged,
                    children,
                } => {
                    *flagged |= array;
                    children
                }
                PathNode::Leaf { .. } => return Err(ambiguous(&prefix, path, path)),
            };
        }

        let (name, array) = *last;
        push_segment(&mut prefix, name);
        if let Some(intermediate) = origins.intermediate.get(&prefix) {
            return Err(ambiguous(&prefix, path, intermediate));
        }
        origins.terminal.entry(prefix).or_insert(path);
        match current
            .nodes
            .entry(name.to_string())
            .or_insert(PathNode::Leaf { array: false })
        {
            PathNode::Leaf { array: flagged } => *flagged |= array,
            PathNode::Branch { .. } => {}
        }
        Ok(())
    }

    /// Look up a segment.
    pub fn get(&self, name: &str) -> Option<&PathNode> {
        self.nodes.get(name)
    }

    /// Check if a segment is present.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Iterate over segments in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PathNode)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of segments at this level.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn parse_segment<'p>(path: &str, raw: &'p str) -> Result<(&'p str, bool)> {
    let (name, array) = match raw.strip_suffix(ARRAY_MARKER) {
        Some(name) => (name, true),
        None => (raw, false),
    };
    if name.is_empty() {
        return Err(CodecError::invalid_schema(
            path,
            "path has an empty segment",
        ));
    }
    Ok((name, array))
}

fn push_segment(prefix: &mut String, name: &str) {
    if !prefix.is_empty() {
        prefix.push('.');
    }
    prefix.push_str(name);
}

fn ambiguous(segment: &str, terminal: &str, intermediate: &str) -> CodecError {
    CodecError::AmbiguousPath {
        segment: segment.to_string(),
        terminal: terminal.to_string(),
        intermediate: intermediate.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_nested() {
        let tree = PathTree::build(&["Tx.tx.operations", "TxV0.tx.fee"]).unwrap();
        assert_eq!(tree.len(), 2);
        let tx = tree.get("Tx").unwrap().children().unwrap();
        let inner = tx.get("tx").unwrap().children().unwrap();
        assert!(inner.get("operations").unwrap().is_leaf());
        assert!(!tree.get("Tx").unwrap().is_leaf());
    }

    #[test]
    fn test_shared_prefix_merges() {
        let tree = PathTree::build(&["a.b", "a.c"]).unwrap();
        let a = tree.get("a").unwrap().children().unwrap();
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_array_marker_is_ored() {
        let tree = PathTree::build(&["items.id", "items[].name"]).unwrap();
        assert!(tree.get("items").unwrap().array_traversal());

        let tree = PathTree::build(&["items[].name", "items.id"]).unwrap();
        assert!(tree.get("items").unwrap().array_traversal());
    }

    #[test]
    fn test_leaf_array_marker() {
        let tree = PathTree::build(&["tags[]"]).unwrap();
        let node = tree.get("tags").unwrap();
        assert!(node.is_leaf());
        assert!(node.array_traversal());
    }

    #[test]
    fn test_ambiguous_rejected_either_order() {
        let err = PathTree::build(&["a.b", "a"]).unwrap_err();
        assert_eq!(
            err,
            CodecError::AmbiguousPath {
                segment: "a".into(),
                terminal: "a".into(),
                intermediate: "a.b".into(),
            }
        );

        let err = PathTree::build(&["a", "a.b"]).unwrap_err();
        assert!(matches!(err, CodecError::AmbiguousPath { .. }));
    }

    #[test]
    fn test_ambiguous_deeper_segment() {
        let err = PathTree::build(&["x.y.z", "x.y"]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::AmbiguousPath { ref segment, .. } if segment == "x.y"
        ));
    }

    #[test]
    fn test_repeated_leaf_is_fine() {
        let tree = PathTree::build(&["a", "a"]).unwrap();
        assert!(tree.get("a").unwrap().is_leaf());
    }

    #[test]
    fn test_empty_segment() {
        assert!(matches!(
            PathTree::build(&["a..b"]).unwrap_err(),
            CodecError::InvalidSchema { .. }
        ));
        assert!(matches!(
            PathTree::build(&["[]"]).unwrap_err(),
            CodecError::InvalidSchema { .. }
        ));
    }

    #[test]
    fn test_structural_equality() {
        let a = PathTree::build(&["x.v"]).unwrap();
        let b = PathTree::build(&["x.v"]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, PathTree::build(&["x.w"]).unwrap());
    }
}
