//! Flattening / Projection Engine
//!
//! Converts the nested forest into a linear, depth-annotated row list for
//! rendering and drag geometry. Rows are derived and disposable; only the
//! forest is ever mutated, then re-flattened.

use std::collections::HashSet;

use crate::domain::{FlattenedGroupNode, GroupTreeNode};

/// Pre-order flatten of the whole loaded forest, expansion state ignored.
/// Sibling order in the output matches array order in the source.
pub fn flatten_tree(forest: &[GroupTreeNode]) -> Vec<FlattenedGroupNode> {
    let mut rows = Vec::new();
    collect(forest, None, 0, &mut rows);
    rows
}

fn collect(
    nodes: &[GroupTreeNode],
    parent_id: Option<&str>,
    depth: usize,
    rows: &mut Vec<FlattenedGroupNode>,
) {
    for (index, node) in nodes.iter().enumerate() {
        rows.push(FlattenedGroupNode {
            id: node.id.clone(),
            name: node.name.clone(),
            parent_id: parent_id.map(|p| p.to_string()),
            depth,
            index,
            has_children: node.has_children,
            loaded: node.children.is_loaded(),
        });
        collect(node.loaded_children(), Some(&node.id), depth + 1, rows);
    }
}

/// Hide every row whose ancestor chain intersects `collapsed_ids`.
///
/// Tracks a rolling excluded id set: a row hidden because its parent is
/// excluded becomes excluded itself, so grandchildren under a collapsed
/// grandparent are hidden even though their direct parent is not in
/// `collapsed_ids`. Rows whose own id is in the set stay visible; only
/// their descendants disappear.
pub fn remove_children_of(
    rows: &[FlattenedGroupNode],
    collapsed_ids: &HashSet<String>,
) -> Vec<FlattenedGroupNode> {
    let mut excluded: HashSet<&str> = collapsed_ids.iter().map(|s| s.as_str()).collect();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let hidden = row
            .parent_id
            .as_deref()
            .map(|p| excluded.contains(p))
            .unwrap_or(false);
        if hidden {
            excluded.insert(row.id.as_str());
        } else {
            out.push(row.clone());
        }
    }
    out
}

/// Would-be placement of the dragged row if dropped at `over_id`'s position.
#[derive(Debug, Clone, PartialEq)]
pub struct DropProjection {
    pub depth: usize,
    pub parent_id: Option<String>,
}

/// Compute the depth and parent the dragged item would take if released at
/// `over_id`'s position, from the horizontal pointer offset.
///
/// `rows` is the visible list with the dragged subtree already removed but
/// the dragged row itself present. The projected depth is the active row's
/// depth shifted by `dx / indent_width`, clamped between the depth of the
/// row that would follow the drop position (minimum) and one below the row
/// that would precede it (maximum). The parent is then resolved by walking
/// back from the drop position.
pub fn drop_projection(
    rows: &[FlattenedGroupNode],
    active_id: &str,
    over_id: &str,
    dx: i32,
    indent_width: i32,
) -> Option<DropProjection> {
    let active_index = rows.iter().position(|r| r.id == active_id)?;
    let over_index = rows.iter().position(|r| r.id == over_id)?;
    let active_depth = rows[active_index].depth as i32;

    // Order as it would be after the move
    let mut reordered: Vec<&FlattenedGroupNode> = rows.iter().collect();
    let active = reordered.remove(active_index);
    reordered.insert(over_index, active);

    let previous = if over_index > 0 { Some(reordered[over_index - 1]) } else { None };
    let next = reordered.get(over_index + 1).copied();

    let drag_depth = if indent_width > 0 { (dx as f64 / indent_width as f64).round() as i32 } else { 0 };
    let projected = active_depth + drag_depth;
    let max_depth = previous.map(|r| r.depth as i32 + 1).unwrap_or(0);
    let min_depth = next.map(|r| r.depth as i32).unwrap_or(0);
    let depth = projected.min(max_depth).max(min_depth) as usize;

    let parent_id = if depth == 0 {
        None
    } else {
        match previous {
            None => None,
            Some(prev) if prev.depth == depth => prev.parent_id.clone(),
            Some(prev) if prev.depth + 1 == depth => Some(prev.id.clone()),
            // Outdented below a deeper chain: the parent is whatever owns
            // the nearest preceding row at the projected depth.
            Some(_) => reordered[..over_index]
                .iter()
                .rev()
                .find(|r| r.depth == depth)
                .and_then(|r| r.parent_id.clone()),
        }
    };

    Some(DropProjection { depth, parent_id })
}
