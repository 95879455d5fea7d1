//! Tree Utilities
//!
//! Pure operations over the group forest. Every operation takes a forest
//! slice and returns a fresh forest; inputs are never mutated, and a
//! mutation either applies completely or returns the forest unchanged.

use crate::domain::{Children, GroupTreeNode};

/// Depth-first search for a node by id
pub fn find_node<'a>(forest: &'a [GroupTreeNode], id: &str) -> Option<&'a GroupTreeNode> {
    for node in forest {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(node.loaded_children(), id) {
            return Some(found);
        }
    }
    None
}

/// Ancestor chain from root down to the node (inclusive)
pub fn find_path<'a>(forest: &'a [GroupTreeNode], id: &str) -> Option<Vec<&'a GroupTreeNode>> {
    for node in forest {
        if node.id == id {
            return Some(vec![node]);
        }
        if let Some(mut path) = find_path(node.loaded_children(), id) {
            path.insert(0, node);
            return Some(path);
        }
    }
    None
}

/// Replace one node via a transform function; the rest of the forest is
/// carried over unchanged. Absent ids leave the forest as-is.
pub fn update_node<F>(forest: &[GroupTreeNode], id: &str, update: F) -> Vec<GroupTreeNode>
where
    F: FnOnce(GroupTreeNode) -> GroupTreeNode,
{
    let mut out = forest.to_vec();
    update_in_place(&mut out, id, update);
    out
}

fn update_in_place<F>(nodes: &mut Vec<GroupTreeNode>, id: &str, update: F) -> bool
where
    F: FnOnce(GroupTreeNode) -> GroupTreeNode,
{
    let mut update = Some(update);
    update_recursive(nodes, id, &mut update)
}

fn update_recursive<F>(nodes: &mut Vec<GroupTreeNode>, id: &str, update: &mut Option<F>) -> bool
where
    F: FnOnce(GroupTreeNode) -> GroupTreeNode,
{
    for i in 0..nodes.len() {
        if nodes[i].id == id {
            if let Some(f) = update.take() {
                let node = nodes.remove(i);
                nodes.insert(i, f(node));
            }
            return true;
        }
        if let Some(children) = nodes[i].children.as_mut_vec() {
            if update_recursive(children, id, update) {
                return true;
            }
        }
    }
    false
}

/// Detach the subtree rooted at `id`. Returns the detached node (if found)
/// and the remaining forest. An absent id is a silent no-op: callers can
/// race with a concurrent removal and must check the node.
pub fn remove_node(forest: &[GroupTreeNode], id: &str) -> (Option<GroupTreeNode>, Vec<GroupTreeNode>) {
    let mut out = forest.to_vec();
    let removed = remove_in_place(&mut out, id);
    (removed, out)
}

fn remove_in_place(nodes: &mut Vec<GroupTreeNode>, id: &str) -> Option<GroupTreeNode> {
    for i in 0..nodes.len() {
        if nodes[i].id == id {
            return Some(nodes.remove(i));
        }
        if let Some(children) = nodes[i].children.as_mut_vec() {
            if let Some(removed) = remove_in_place(children, id) {
                return Some(removed);
            }
        }
    }
    None
}

/// Insert `node` as a child of `parent_id` (or as a root when `None`) at
/// `index`, clamped to `[0, len]`.
///
/// Inserting under a parent whose children are `Unloaded` promotes them to
/// `Loaded([node])` and sets `has_children`. Callers are expected to invoke
/// this only on loaded or root-level parents; promoting anything else
/// fabricates a "complete" view that holds only until the next
/// collapse/expand cycle.
pub fn insert_node(
    forest: &[GroupTreeNode],
    parent_id: Option<&str>,
    node: GroupTreeNode,
    index: usize,
) -> Vec<GroupTreeNode> {
    match parent_id {
        None => {
            let mut out = forest.to_vec();
            let mut inserted = node;
            inserted.parent_id = None;
            let at = index.min(out.len());
            out.insert(at, inserted);
            out
        }
        Some(pid) => {
            let pid_owned = pid.to_string();
            update_node(forest, pid, move |mut parent| {
                let mut inserted = node;
                inserted.parent_id = Some(pid_owned);
                let mut children = match parent.children {
                    Children::Loaded(c) => c,
                    Children::Unloaded => Vec::new(),
                };
                let at = index.min(children.len());
                children.insert(at, inserted);
                parent.has_children = true;
                parent.children = Children::Loaded(children);
                parent
            })
        }
    }
}

/// Re-sort the children of `parent_id` to match `ordered_ids`; ids not
/// currently children are ignored, children not named keep their relative
/// order after the named ones.
pub fn reorder_children(
    forest: &[GroupTreeNode],
    parent_id: Option<&str>,
    ordered_ids: &[String],
) -> Vec<GroupTreeNode> {
    match parent_id {
        None => reorder_list(forest.to_vec(), ordered_ids),
        Some(pid) => update_node(forest, pid, |mut parent| {
            if let Children::Loaded(children) = parent.children {
                parent.children = Children::Loaded(reorder_list(children, ordered_ids));
            }
            parent
        }),
    }
}

fn reorder_list(mut nodes: Vec<GroupTreeNode>, ordered_ids: &[String]) -> Vec<GroupTreeNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for id in ordered_ids {
        if let Some(pos) = nodes.iter().position(|n| &n.id == id) {
            out.push(nodes.remove(pos));
        }
    }
    out.extend(nodes);
    out
}

/// All ids in the subtree rooted at `node`, the node itself included
pub fn subtree_ids(node: &GroupTreeNode) -> Vec<String> {
    let mut ids = vec![node.id.clone()];
    for child in node.loaded_children() {
        ids.extend(subtree_ids(child));
    }
    ids
}
