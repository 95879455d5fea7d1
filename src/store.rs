//! Group Tree Store
//!
//! Owns the client-held forest plus the expansion and loading sets, behind
//! a narrow mutation API. Internal nodes are never handed out mutably;
//! every change goes through the copy-on-write tree operations and either
//! applies completely or not at all.

use std::collections::HashSet;

use crate::domain::{Children, FlattenedGroupNode, GroupTreeNode};
use crate::flatten::{flatten_tree, remove_children_of};
use crate::tree;

/// Client-side cache of the group tree.
///
/// The root list starts empty, is populated by the first root fetch,
/// extended by child fetches on expand, and rewritten wholesale on
/// reconciliation.
#[derive(Debug, Default, Clone)]
pub struct TreeStore {
    roots: Vec<GroupTreeNode>,
    expanded: HashSet<String>,
    loading: HashSet<String>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[GroupTreeNode] {
        &self.roots
    }

    /// Replace the whole root list (initial load, filter refresh, resync).
    /// Loading markers are cleared; the expansion set is kept so a resync
    /// can re-fetch still-expanded nodes.
    pub fn set_roots(&mut self, roots: Vec<GroupTreeNode>) {
        self.roots = roots;
        self.loading.clear();
    }

    pub fn find(&self, id: &str) -> Option<&GroupTreeNode> {
        tree::find_node(&self.roots, id)
    }

    /// Ancestor chain from root to the node; used to auto-expand breadcrumbs
    pub fn path_to(&self, id: &str) -> Option<Vec<&GroupTreeNode>> {
        tree::find_path(&self.roots, id)
    }

    pub fn update<F>(&mut self, id: &str, f: F)
    where
        F: FnOnce(GroupTreeNode) -> GroupTreeNode,
    {
        self.roots = tree::update_node(&self.roots, id, f);
    }

    /// Detach a subtree; `None` when the id is absent (silent no-op)
    pub fn remove(&mut self, id: &str) -> Option<GroupTreeNode> {
        let (removed, rest) = tree::remove_node(&self.roots, id);
        if removed.is_some() {
            self.roots = rest;
        }
        removed
    }

    pub fn insert(&mut self, parent_id: Option<&str>, node: GroupTreeNode, index: usize) {
        self.roots = tree::insert_node(&self.roots, parent_id, node, index);
    }

    pub fn reorder(&mut self, parent_id: Option<&str>, ordered_ids: &[String]) {
        self.roots = tree::reorder_children(&self.roots, parent_id, ordered_ids);
    }

    // ----- expansion / loading state -----

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn set_expanded(&mut self, id: &str, expanded: bool) {
        if expanded {
            self.expanded.insert(id.to_string());
        } else {
            self.expanded.remove(id);
        }
    }

    pub fn expanded_ids(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(|s| s.as_str())
    }

    pub fn is_loading(&self, id: &str) -> bool {
        self.loading.contains(id)
    }

    /// Mark an in-flight child fetch; returns false when one is already
    /// pending (the caller must not issue a second fetch).
    pub fn begin_loading(&mut self, id: &str) -> bool {
        self.loading.insert(id.to_string())
    }

    pub fn end_loading(&mut self, id: &str) {
        self.loading.remove(id);
    }

    // ----- derived views -----

    /// Rows currently visible given the expansion set: a node's children
    /// show only while it is expanded, transitively.
    pub fn visible_rows(&self) -> Vec<FlattenedGroupNode> {
        let rows = flatten_tree(&self.roots);
        let collapsed = self.collapsed_ids(&rows);
        remove_children_of(&rows, &collapsed)
    }

    /// Visible rows for an active drag: the dragged row stays (it renders
    /// as the moving row) but its whole subtree is hidden, which also
    /// keeps it out of the droppable set.
    pub fn drag_rows(&self, active_id: &str) -> Vec<FlattenedGroupNode> {
        let rows = flatten_tree(&self.roots);
        let mut collapsed = self.collapsed_ids(&rows);
        collapsed.insert(active_id.to_string());
        remove_children_of(&rows, &collapsed)
    }

    /// Visible rows minus the dragged row and its whole subtree, so a node
    /// can never be dropped on itself or a descendant.
    pub fn droppable_rows(&self, active_id: &str) -> Vec<FlattenedGroupNode> {
        self.drag_rows(active_id)
            .into_iter()
            .filter(|r| r.id != active_id)
            .collect()
    }

    fn collapsed_ids(&self, rows: &[FlattenedGroupNode]) -> HashSet<String> {
        rows.iter()
            .filter(|r| !self.expanded.contains(&r.id))
            .map(|r| r.id.clone())
            .collect()
    }

    /// Visible sibling ids under `parent_id`, in display order
    pub fn sibling_ids(&self, parent_id: Option<&str>) -> Vec<String> {
        match parent_id {
            None => self.roots.iter().map(|n| n.id.clone()).collect(),
            Some(pid) => self
                .find(pid)
                .map(|p| p.loaded_children().iter().map(|n| n.id.clone()).collect())
                .unwrap_or_default(),
        }
    }

    /// Whether the node's children are fetched
    pub fn is_loaded(&self, id: &str) -> bool {
        self.find(id).map(|n| n.children.is_loaded()).unwrap_or(false)
    }

    /// Drop the whole cache (unrecoverable sync error path)
    pub fn clear(&mut self) {
        self.roots.clear();
        self.expanded.clear();
        self.loading.clear();
    }
}

/// Convenience used by tests and fetch merges: attach fetched children to a
/// node, recomputing `has_children` from the reported total.
pub fn merge_children(
    store: &mut TreeStore,
    parent_id: &str,
    children: Vec<GroupTreeNode>,
    total: u64,
) {
    let parent_owned = parent_id.to_string();
    store.update(parent_id, move |mut parent| {
        let children = children
            .into_iter()
            .map(|mut c| {
                c.parent_id = Some(parent_owned.clone());
                c
            })
            .collect::<Vec<_>>();
        parent.has_children = total > 0 || !children.is_empty();
        parent.children = Children::Loaded(children);
        parent
    });
}
