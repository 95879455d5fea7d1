//! Lazy Loader
//!
//! Expand/collapse with on-demand child fetching. Pure state steps
//! (`toggle_expand`, `apply_children`, `fail_children`) carry the whole
//! decision logic; the async drivers only wire them to a directory, so
//! every path is testable without a network.

use log::{debug, warn};

use crate::api::{GroupDirectory, ListQuery};
use crate::domain::{DomainResult, GroupTreeNode};
use crate::store::{merge_children, TreeStore};

/// Result of a pure expand/collapse step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// Was expanded; now collapsed. Cached children are kept.
    Collapsed,
    /// Children already fetched; only the expansion set flipped.
    Expanded,
    /// Children unknown; a fetch was registered and must be issued.
    FetchStarted,
    /// A fetch for this node is already in flight; ignored outright.
    AlreadyLoading,
    /// Nothing to do: leaf node, or id not in the tree.
    NoOp,
}

/// One toggle step. Collapse never touches the network; expand fetches at
/// most once per node at a time.
pub fn toggle_expand(store: &mut TreeStore, id: &str) -> ExpandOutcome {
    if store.is_expanded(id) {
        // Covers collapse-while-loading too: the node leaves the expanded
        // set and the in-flight result merges without re-expanding it.
        store.set_expanded(id, false);
        return ExpandOutcome::Collapsed;
    }
    if store.is_loading(id) {
        debug!("[tree] expand ignored, fetch already in flight: {}", id);
        return ExpandOutcome::AlreadyLoading;
    }
    let Some(node) = store.find(id) else {
        return ExpandOutcome::NoOp;
    };
    if node.children.is_loaded() {
        store.set_expanded(id, true);
        return ExpandOutcome::Expanded;
    }
    if !node.has_children {
        return ExpandOutcome::NoOp;
    }
    // Expanded-but-loading: the node shows as expanded with a spinner, not
    // an empty list, until the fetch resolves.
    store.set_expanded(id, true);
    store.begin_loading(id);
    debug!("[tree] fetching children of {}", id);
    ExpandOutcome::FetchStarted
}

/// Fetch success: merge children into the cache. Expansion state is left
/// as-is, so a collapse issued while the fetch was pending stays collapsed.
pub fn apply_children(store: &mut TreeStore, id: &str, children: Vec<GroupTreeNode>, total: u64) {
    store.end_loading(id);
    debug!("[tree] merged {} children under {}", children.len(), id);
    merge_children(store, id, children, total);
}

/// Fetch failure: node reverts to collapsed and unfetched so a re-toggle
/// retries.
pub fn fail_children(store: &mut TreeStore, id: &str) {
    store.end_loading(id);
    store.set_expanded(id, false);
    warn!("[tree] child fetch failed for {}", id);
}

/// Toggle with network: drives `toggle_expand` and resolves a started
/// fetch against the directory.
pub async fn expand(
    store: &mut TreeStore,
    dir: &dyn GroupDirectory,
    tenant: &str,
    id: &str,
    query: &ListQuery,
) -> DomainResult<ExpandOutcome> {
    let outcome = toggle_expand(store, id);
    if outcome != ExpandOutcome::FetchStarted {
        return Ok(outcome);
    }
    match dir.fetch_group_children(tenant, id, query).await {
        Ok(page) => {
            apply_children(store, id, page.data, page.meta.total);
            Ok(ExpandOutcome::FetchStarted)
        }
        Err(e) => {
            fail_children(store, id);
            Err(e)
        }
    }
}

/// (Re)load the root list; also serves search/filter refresh.
pub async fn load_roots(
    store: &mut TreeStore,
    dir: &dyn GroupDirectory,
    tenant: &str,
    query: &ListQuery,
) -> DomainResult<()> {
    let page = dir.fetch_group_roots(tenant, query).await?;
    debug!("[tree] loaded {} roots (total {})", page.data.len(), page.meta.total);
    store.set_roots(page.data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Children;

    fn unloaded(id: &str, has_children: bool) -> GroupTreeNode {
        let mut n = GroupTreeNode::new(id, format!("Group {}", id));
        n.has_children = has_children;
        n
    }

    fn store_with_root() -> TreeStore {
        let mut store = TreeStore::new();
        store.set_roots(vec![unloaded("a", true), unloaded("leaf", false)]);
        store
    }

    #[test]
    fn test_expand_unloaded_starts_fetch_once() {
        let mut store = store_with_root();
        assert_eq!(toggle_expand(&mut store, "a"), ExpandOutcome::FetchStarted);
        assert!(store.is_loading("a"));
        assert!(store.is_expanded("a"));
    }

    #[test]
    fn test_double_toggle_while_loading() {
        let mut store = store_with_root();
        toggle_expand(&mut store, "a");
        // Second toggle while loading collapses (no second fetch)...
        assert_eq!(toggle_expand(&mut store, "a"), ExpandOutcome::Collapsed);
        // ...and a third is ignored outright while the fetch is pending.
        assert_eq!(toggle_expand(&mut store, "a"), ExpandOutcome::AlreadyLoading);
        assert!(store.is_loading("a"));
    }

    #[test]
    fn test_leaf_toggle_is_noop() {
        let mut store = store_with_root();
        assert_eq!(toggle_expand(&mut store, "leaf"), ExpandOutcome::NoOp);
        assert_eq!(toggle_expand(&mut store, "missing"), ExpandOutcome::NoOp);
    }

    #[test]
    fn test_apply_children_merges_and_keeps_expansion() {
        let mut store = store_with_root();
        toggle_expand(&mut store, "a");
        apply_children(&mut store, "a", vec![unloaded("a1", false)], 1);
        assert!(!store.is_loading("a"));
        assert!(store.is_expanded("a"));
        let a = store.find("a").unwrap();
        assert_eq!(a.loaded_children().len(), 1);
        assert!(a.has_children);
    }

    #[test]
    fn test_collapse_during_pending_fetch_stays_collapsed() {
        let mut store = store_with_root();
        toggle_expand(&mut store, "a");
        toggle_expand(&mut store, "a"); // collapse while loading
        apply_children(&mut store, "a", vec![unloaded("a1", false)], 1);
        // Result is cached but the node stays collapsed.
        assert!(!store.is_expanded("a"));
        assert!(store.find("a").unwrap().children.is_loaded());
    }

    #[test]
    fn test_failed_fetch_is_retryable() {
        let mut store = store_with_root();
        toggle_expand(&mut store, "a");
        fail_children(&mut store, "a");
        assert!(!store.is_expanded("a"));
        assert!(!store.is_loading("a"));
        assert_eq!(store.find("a").unwrap().children, Children::Unloaded);
        // Retry issues a fresh fetch.
        assert_eq!(toggle_expand(&mut store, "a"), ExpandOutcome::FetchStarted);
    }

    #[test]
    fn test_expand_loaded_flips_set_without_fetch() {
        let mut store = store_with_root();
        toggle_expand(&mut store, "a");
        apply_children(&mut store, "a", vec![unloaded("a1", false)], 1);
        toggle_expand(&mut store, "a"); // collapse
        assert_eq!(toggle_expand(&mut store, "a"), ExpandOutcome::Expanded);
        assert!(!store.is_loading("a"));
    }
}
