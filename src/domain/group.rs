//! Domain Layer - Group Tree Entities
//!
//! The nested group node (the authoritative structure) and its derived
//! flattened row form used for linear rendering and drag geometry.

use serde::{Deserialize, Serialize};

/// Child knowledge for a node.
///
/// `Unloaded` means "never fetched" and is distinct from `Loaded(vec![])`,
/// which means "fetched, no children". Collapsing the two breaks the
/// loading-spinner vs empty-state distinction, so the difference is kept
/// in the type instead of an optional field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Children {
    /// Not yet fetched from the server; actual children unknown.
    Unloaded,
    /// Fetched; possibly empty.
    Loaded(Vec<GroupTreeNode>),
}

impl Default for Children {
    fn default() -> Self {
        Children::Unloaded
    }
}

impl Children {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Children::Loaded(_))
    }

    /// Loaded children as a slice, or `None` when unfetched.
    pub fn as_slice(&self) -> Option<&[GroupTreeNode]> {
        match self {
            Children::Loaded(nodes) => Some(nodes),
            Children::Unloaded => None,
        }
    }

    pub fn as_mut_vec(&mut self) -> Option<&mut Vec<GroupTreeNode>> {
        match self {
            Children::Loaded(nodes) => Some(nodes),
            Children::Unloaded => None,
        }
    }
}

/// A node in the group tree (matches the directory service entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTreeNode {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Redundant with nested position; the `children` field is the source
    /// of truth for structure.
    pub parent_id: Option<String>,
    /// Server-side ordering hint; client reordering is positional.
    #[serde(default)]
    pub sort_order: i32,
    /// Server-reported; with `children` this distinguishes "leaf" from
    /// "not yet loaded".
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub children: Children,
}

impl GroupTreeNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            parent_id: None,
            sort_order: 0,
            has_children: false,
            children: Children::Unloaded,
        }
    }

    /// Loaded children, or an empty slice when unfetched.
    pub fn loaded_children(&self) -> &[GroupTreeNode] {
        self.children.as_slice().unwrap_or(&[])
    }
}

/// A node decorated for linear rendering: derived and disposable, always
/// recomputed from the forest plus the expansion set. Never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedGroupNode {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    /// Root = 0.
    pub depth: usize,
    /// Position among the siblings it was flattened from.
    pub index: usize,
    pub has_children: bool,
    /// Whether the source node's children are fetched.
    pub loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unloaded_and_empty_are_distinct() {
        let unloaded = GroupTreeNode::new("g1", "One");
        let mut empty = GroupTreeNode::new("g2", "Two");
        empty.children = Children::Loaded(Vec::new());

        assert!(!unloaded.children.is_loaded());
        assert!(empty.children.is_loaded());
        assert_eq!(unloaded.loaded_children(), empty.loaded_children());
    }

    #[test]
    fn children_deserialize_missing_as_unloaded() {
        let node: GroupTreeNode =
            serde_json::from_str(r#"{"id":"g1","name":"One","description":null,"parent_id":null,"has_children":true}"#)
                .unwrap();
        assert_eq!(node.children, Children::Unloaded);
        assert!(node.has_children);
    }

    #[test]
    fn children_deserialize_array_as_loaded() {
        let node: GroupTreeNode = serde_json::from_str(
            r#"{"id":"g1","name":"One","description":null,"parent_id":null,"has_children":false,"children":[]}"#,
        )
        .unwrap();
        assert_eq!(node.children, Children::Loaded(Vec::new()));
    }
}
