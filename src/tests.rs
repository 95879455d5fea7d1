//! End-to-End Scenarios
//!
//! Full expand/drag/reconcile flows against an in-memory mock directory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{GroupDirectory, GroupPage, ListQuery, MoveGroupRequest, PageMeta};
use crate::dnd::{perform_move, plan_drop, MovePlan};
use crate::domain::{DomainError, DomainResult, GroupTreeNode};
use crate::loader::{expand, load_roots, ExpandOutcome};
use crate::store::TreeStore;
use row_dnd::Rect;

/// In-memory directory with scriptable failures. Holds server truth
/// that never changes on a rejected move, exactly like the real one.
#[derive(Default)]
struct MockDirectory {
    roots: Mutex<Vec<GroupTreeNode>>,
    children: Mutex<HashMap<String, Vec<GroupTreeNode>>>,
    fail_moves: AtomicBool,
    fail_child_fetch: AtomicBool,
    move_calls: Mutex<Vec<(String, MoveGroupRequest)>>,
}

impl MockDirectory {
    fn with_roots(roots: Vec<GroupTreeNode>) -> Self {
        Self {
            roots: Mutex::new(roots),
            ..Default::default()
        }
    }

    fn set_children(&self, parent_id: &str, children: Vec<GroupTreeNode>) {
        self.children
            .lock()
            .unwrap()
            .insert(parent_id.to_string(), children);
    }
}

#[async_trait]
impl GroupDirectory for MockDirectory {
    async fn fetch_group_roots(&self, _tenant: &str, _query: &ListQuery) -> DomainResult<GroupPage> {
        let data = self.roots.lock().unwrap().clone();
        let total = data.len() as u64;
        Ok(GroupPage { data, meta: PageMeta { total } })
    }

    async fn fetch_group_children(
        &self,
        _tenant: &str,
        parent_id: &str,
        _query: &ListQuery,
    ) -> DomainResult<GroupPage> {
        if self.fail_child_fetch.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("child fetch unavailable".to_string()));
        }
        let data = self
            .children
            .lock()
            .unwrap()
            .get(parent_id)
            .cloned()
            .unwrap_or_default();
        let total = data.len() as u64;
        Ok(GroupPage { data, meta: PageMeta { total } })
    }

    async fn move_group(
        &self,
        _tenant: &str,
        group_id: &str,
        request: &MoveGroupRequest,
    ) -> DomainResult<()> {
        self.move_calls
            .lock()
            .unwrap()
            .push((group_id.to_string(), request.clone()));
        if self.fail_moves.load(Ordering::SeqCst) {
            return Err(DomainError::Conflict("move rejected".to_string()));
        }
        Ok(())
    }
}

fn group(id: &str, has_children: bool) -> GroupTreeNode {
    let mut n = GroupTreeNode::new(id, format!("Group {}", id.to_uppercase()));
    n.has_children = has_children;
    n
}

fn row_rect(position: usize) -> Rect {
    Rect::new(0.0, position as f64 * 32.0, 240.0, 32.0)
}

fn root_ids(store: &TreeStore) -> Vec<String> {
    store.roots().iter().map(|n| n.id.clone()).collect()
}

async fn setup_a_b() -> (TreeStore, MockDirectory) {
    let dir = MockDirectory::with_roots(vec![group("a", true), group("b", false)]);
    dir.set_children("a", vec![group("a1", false), group("a2", false)]);
    let mut store = TreeStore::new();
    load_roots(&mut store, &dir, "acme", &ListQuery::default())
        .await
        .expect("root load");
    (store, dir)
}

#[tokio::test]
async fn test_expand_fetches_and_merges() {
    let (mut store, dir) = setup_a_b().await;

    let outcome = expand(&mut store, &dir, "acme", "a", &ListQuery::default())
        .await
        .expect("expand");
    assert_eq!(outcome, ExpandOutcome::FetchStarted);
    assert!(store.is_expanded("a"));
    assert!(!store.is_loading("a"));

    let ids: Vec<String> = store.visible_rows().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["a", "a1", "a2", "b"]);
}

#[tokio::test]
async fn test_expand_failure_leaves_node_retryable() {
    let (mut store, dir) = setup_a_b().await;
    dir.fail_child_fetch.store(true, Ordering::SeqCst);

    let err = expand(&mut store, &dir, "acme", "a", &ListQuery::default()).await;
    assert!(err.is_err());
    assert!(!store.is_expanded("a"));
    assert!(!store.is_loading("a"));

    dir.fail_child_fetch.store(false, Ordering::SeqCst);
    let outcome = expand(&mut store, &dir, "acme", "a", &ListQuery::default())
        .await
        .expect("retry");
    assert_eq!(outcome, ExpandOutcome::FetchStarted);
    assert_eq!(store.find("a").unwrap().loaded_children().len(), 2);
}

#[tokio::test]
async fn test_on_node_drop_commits_optimistically() {
    let (mut store, dir) = setup_a_b().await;
    expand(&mut store, &dir, "acme", "a", &ListQuery::default())
        .await
        .expect("expand");

    // Drag b over a's middle band.
    let rows = store.drag_rows("b");
    let plan = plan_drop(&store, &rows, "b", "a", &row_rect(0), &row_rect(0), 0).expect("plan");
    perform_move(&mut store, &dir, "acme", &plan, &ListQuery::default())
        .await
        .expect("move");

    assert_eq!(root_ids(&store), vec!["a"]);
    let a_ids: Vec<&str> = store
        .find("a")
        .unwrap()
        .loaded_children()
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(a_ids, vec!["a1", "a2", "b"]);

    let calls = dir.move_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "b");
    assert_eq!(calls[0].1.parent_id.as_deref(), Some("a"));
}

#[tokio::test]
async fn test_rejected_move_reconciles_from_server() {
    let (mut store, dir) = setup_a_b().await;
    expand(&mut store, &dir, "acme", "a", &ListQuery::default())
        .await
        .expect("expand");
    dir.fail_moves.store(true, Ordering::SeqCst);

    let rows = store.drag_rows("b");
    let plan = plan_drop(&store, &rows, "b", "a", &row_rect(0), &row_rect(0), 0).expect("plan");
    let result = perform_move(&mut store, &dir, "acme", &plan, &ListQuery::default()).await;
    assert!(result.is_err());

    // The optimistic mutation is discarded; server truth restored.
    assert_eq!(root_ids(&store), vec!["a", "b"]);
    // Still-expanded nodes were re-fetched during the resync.
    assert!(store.is_expanded("a"));
    let a_ids: Vec<&str> = store
        .find("a")
        .unwrap()
        .loaded_children()
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(a_ids, vec!["a1", "a2"]);
}

#[tokio::test]
async fn test_sibling_reorder_sends_before_hint() {
    let dir = MockDirectory::with_roots(vec![group("x", false), group("y", false), group("z", false)]);
    let mut store = TreeStore::new();
    load_roots(&mut store, &dir, "acme", &ListQuery::default())
        .await
        .expect("root load");

    // Drag z onto the top edge of y: lands between x and y.
    let rows = store.drag_rows("z");
    let dragged = Rect::new(0.0, 12.0, 240.0, 32.0);
    let plan = plan_drop(&store, &rows, "z", "y", &dragged, &row_rect(1), 0).expect("plan");
    assert!(matches!(plan, MovePlan::Reorder { .. }));

    perform_move(&mut store, &dir, "acme", &plan, &ListQuery::default())
        .await
        .expect("move");
    assert_eq!(root_ids(&store), vec!["x", "z", "y"]);

    let calls = dir.move_calls.lock().unwrap();
    assert_eq!(calls[0].1.before_id.as_deref(), Some("y"));
    assert!(calls[0].1.after_id.is_none());
}

#[tokio::test]
async fn test_stale_plan_after_refresh_sends_nothing() {
    let (mut store, dir) = setup_a_b().await;
    expand(&mut store, &dir, "acme", "a", &ListQuery::default())
        .await
        .expect("expand");

    // Plan a reparent onto a, then lose a to a server-side filter refresh
    // before the plan is applied.
    let rows = store.drag_rows("b");
    let plan = plan_drop(&store, &rows, "b", "a", &row_rect(0), &row_rect(0), 0).expect("plan");
    *dir.roots.lock().unwrap() = vec![group("b", false)];
    load_roots(&mut store, &dir, "acme", &ListQuery::with_filter("b"))
        .await
        .expect("filtered load");

    perform_move(&mut store, &dir, "acme", &plan, &ListQuery::default())
        .await
        .expect("stale move");

    // The subtree survives locally and no remote call was made.
    assert_eq!(root_ids(&store), vec!["b"]);
    assert!(dir.move_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_root_filter_refresh_replaces_list() {
    let dir = MockDirectory::with_roots(vec![group("ops", false), group("eng", false)]);
    let mut store = TreeStore::new();
    load_roots(&mut store, &dir, "acme", &ListQuery::default())
        .await
        .expect("root load");
    assert_eq!(root_ids(&store), vec!["ops", "eng"]);

    // Server-side filter narrows the list; the client just replaces.
    *dir.roots.lock().unwrap() = vec![group("eng", false)];
    load_roots(&mut store, &dir, "acme", &ListQuery::with_filter("eng"))
        .await
        .expect("filtered load");
    assert_eq!(root_ids(&store), vec!["eng"]);
}
