//! Drag-Drop Controller
//!
//! Owns the pointer-drag lifecycle over the visible row list, classifies
//! drops from row geometry, applies the move locally before the network
//! confirms it, and resynchronizes from the server when the move call
//! fails. Rollback is never attempted in memory; the server is ground
//! truth and a failed move simply reloads.

use log::{debug, warn};
use row_dnd::{classify_drop, DragState, DropBand, Rect, Release};

use crate::api::{GroupDirectory, ListQuery, MoveGroupRequest};
use crate::domain::{Children, DomainResult, FlattenedGroupNode};
use crate::flatten::drop_projection;
use crate::loader::load_roots;
use crate::store::{merge_children, TreeStore};
use crate::tree;

/// Horizontal pixels per tree depth level, used for indent/outdent
/// projection during a drag
pub const INDENT_WIDTH_PX: i32 = 24;

/// A classified drop, ready to apply locally and send remotely
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePlan {
    /// On-node drop: append as the last child of the hovered node
    Reparent { group_id: String, new_parent_id: String },
    /// Between-siblings drop at `index` under `parent_id`; the relative
    /// hint (`before_id` or `after_id`) is what goes over the wire
    Reorder {
        group_id: String,
        parent_id: Option<String>,
        index: usize,
        before_id: Option<String>,
        after_id: Option<String>,
    },
}

impl MovePlan {
    pub fn group_id(&self) -> &str {
        match self {
            MovePlan::Reparent { group_id, .. } => group_id,
            MovePlan::Reorder { group_id, .. } => group_id,
        }
    }

    /// Wire form of the plan
    pub fn request(&self) -> MoveGroupRequest {
        match self {
            MovePlan::Reparent { new_parent_id, .. } => MoveGroupRequest {
                parent_id: Some(new_parent_id.clone()),
                before_id: None,
                after_id: None,
            },
            MovePlan::Reorder {
                parent_id,
                before_id,
                after_id,
                ..
            } => MoveGroupRequest {
                parent_id: parent_id.clone(),
                before_id: before_id.clone(),
                after_id: after_id.clone(),
            },
        }
    }
}

/// Classify a drop from geometry into a [`MovePlan`].
///
/// `rows` is the drag-time row list (active subtree hidden, active row
/// present); `dragged` and `over` are the current rects of the dragged row
/// and the hovered row; `dx` is the horizontal offset from the drag start.
/// Returns `None` for self-drops, descendant drops, and unknown ids.
pub fn plan_drop(
    store: &TreeStore,
    rows: &[FlattenedGroupNode],
    active_id: &str,
    over_id: &str,
    dragged: &Rect,
    over: &Rect,
    dx: i32,
) -> Option<MovePlan> {
    if active_id == over_id {
        return None;
    }
    let active_node = store.find(active_id)?;
    if tree::subtree_ids(active_node).iter().any(|id| id == over_id) {
        return None;
    }
    store.find(over_id)?;

    match classify_drop(dragged, over) {
        DropBand::OnRow => {
            debug!("[dnd] drop on node: {} -> child of {}", active_id, over_id);
            Some(MovePlan::Reparent {
                group_id: active_id.to_string(),
                new_parent_id: over_id.to_string(),
            })
        }
        band => {
            let projection = drop_projection(rows, active_id, over_id, dx, INDENT_WIDTH_PX)?;
            let parent_id = projection.parent_id;
            let siblings: Vec<String> = store
                .sibling_ids(parent_id.as_deref())
                .into_iter()
                .filter(|id| id != active_id)
                .collect();

            let index = match siblings.iter().position(|id| id == over_id) {
                Some(pos) if band == DropBand::Above => pos,
                Some(pos) => pos + 1,
                // Hovered row lives under a different parent after depth
                // projection (outdent past the end of a branch): append.
                None => siblings.len(),
            };
            let before_id = siblings.get(index).cloned();
            let after_id = if before_id.is_none() {
                siblings.last().cloned()
            } else {
                None
            };
            debug!(
                "[dnd] drop between siblings: {} -> parent {:?} index {}",
                active_id, parent_id, index
            );
            Some(MovePlan::Reorder {
                group_id: active_id.to_string(),
                parent_id,
                index,
                before_id,
                after_id,
            })
        }
    }
}

/// Apply a plan to the local tree (the optimistic mutation). Returns false
/// when the dragged node or the target parent vanished, which leaves the
/// tree untouched.
pub fn apply_plan(store: &mut TreeStore, plan: &MovePlan) -> bool {
    match plan {
        MovePlan::Reparent { group_id, new_parent_id } => {
            let append_at = store
                .find(new_parent_id)
                .and_then(|p| p.children.as_slice().map(|c| c.len()))
                .unwrap_or(0);
            move_local(store, group_id, Some(new_parent_id), append_at)
        }
        MovePlan::Reorder { group_id, parent_id, index, .. } => {
            move_local(store, group_id, parent_id.as_deref(), *index)
        }
    }
}

/// Remove-then-insert move; never copies, so ids stay unique by
/// construction. Keeps `has_children` truthful on the old parent when its
/// loaded child list empties out. An unfetched former parent is left
/// untouched: its true child count is unknown to the client.
fn move_local(store: &mut TreeStore, group_id: &str, new_parent: Option<&str>, index: usize) -> bool {
    // The target parent is checked before the remove so the mutation stays
    // all-or-nothing: a plan applied after an interleaved resync or filter
    // refresh may name a parent the cache no longer holds, and detaching
    // first would drop the subtree on the floor.
    if let Some(pid) = new_parent {
        if store.find(pid).is_none() {
            return false;
        }
    }
    let Some(node) = store.remove(group_id) else {
        return false;
    };
    if let Some(old_pid) = node.parent_id.clone() {
        store.update(&old_pid, |mut old_parent| {
            if let Children::Loaded(children) = &old_parent.children {
                if children.is_empty() {
                    old_parent.has_children = false;
                }
            }
            old_parent
        });
    }
    store.insert(new_parent, node, index);
    true
}

/// After a rejected move: reload the root list and re-fetch children for
/// nodes still marked expanded, top-down. Discards the optimistic state
/// entirely instead of undoing it, so stale bases can never be re-applied.
pub async fn resync(
    store: &mut TreeStore,
    dir: &dyn GroupDirectory,
    tenant: &str,
    query: &ListQuery,
) -> DomainResult<()> {
    load_roots(store, dir, tenant, query).await?;
    let child_query = ListQuery::default();
    loop {
        let pending: Vec<String> = store
            .expanded_ids()
            .filter(|id| store.find(id).map(|n| !n.children.is_loaded()).unwrap_or(false))
            .map(|id| id.to_string())
            .collect();
        if pending.is_empty() {
            break;
        }
        for id in pending {
            match dir.fetch_group_children(tenant, &id, &child_query).await {
                Ok(page) => merge_children(store, &id, page.data, page.meta.total),
                Err(e) => {
                    // Best effort: leave the node collapsed and retryable.
                    warn!("[dnd] resync child fetch failed for {}: {}", id, e);
                    store.set_expanded(&id, false);
                }
            }
        }
    }
    Ok(())
}

/// Apply optimistically, then commit remotely. On rejection the error is
/// returned after a resync; last-reconciliation-wins across overlapping
/// moves is accepted behavior.
pub async fn perform_move(
    store: &mut TreeStore,
    dir: &dyn GroupDirectory,
    tenant: &str,
    plan: &MovePlan,
    query: &ListQuery,
) -> DomainResult<()> {
    if !apply_plan(store, plan) {
        // Raced with a concurrent removal or reload; nothing to send.
        return Ok(());
    }
    match dir.move_group(tenant, plan.group_id(), &plan.request()).await {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!("[dnd] move rejected for {}: {}", plan.group_id(), e);
            if let Err(sync_err) = resync(store, dir, tenant, query).await {
                warn!("[dnd] resync after failed move also failed: {}", sync_err);
            }
            Err(e)
        }
    }
}

/// Pointer-drag lifecycle over the group tree rows.
///
/// `Idle -> Dragging(active) -> Idle` on end or cancel; the press/threshold
/// handling lives in [`row_dnd::DragState`].
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState<String>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, id: &str, x: i32, y: i32) {
        self.state.press(id.to_string(), x, y);
    }

    /// Returns the active id when this motion crosses the drag threshold
    pub fn motion(&mut self, x: i32, y: i32) -> Option<String> {
        self.state.motion(x, y)
    }

    pub fn hover(&mut self, id: &str) {
        self.state.hover(id.to_string());
    }

    pub fn leave(&mut self) {
        self.state.leave();
    }

    /// Drag aborted without a valid drop target: no mutation
    pub fn cancel(&mut self) {
        self.state.cancel();
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.state.active().map(|s| s.as_str())
    }

    /// Label for the drag overlay: the name of whatever is being moved
    pub fn overlay_label(&self, store: &TreeStore) -> Option<String> {
        let id = self.state.active()?;
        store.find(id).map(|n| n.name.clone())
    }

    /// Rows to render while dragging: the active subtree is hidden, which
    /// keeps descendant drops impossible structurally.
    pub fn drag_rows(&self, store: &TreeStore) -> Vec<FlattenedGroupNode> {
        match self.state.active() {
            Some(active) => store.drag_rows(active),
            None => store.visible_rows(),
        }
    }

    /// Release the pointer and, if this was a drag over a row, classify it
    pub fn release(
        &mut self,
        store: &TreeStore,
        dragged_rect: &Rect,
        over_rect: &Rect,
        dx: i32,
    ) -> Option<MovePlan> {
        match self.state.release() {
            Release::Drop { active, over } => {
                let rows = store.drag_rows(&active);
                plan_drop(store, &rows, &active, &over, dragged_rect, over_rect, dx)
            }
            Release::Click(_) | Release::NoTarget(_) | Release::Idle => None,
        }
    }
}
