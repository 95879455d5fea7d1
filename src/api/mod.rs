//! Remote Directory Contract
//!
//! The narrow fetch/move surface the tree manager consumes. The tree store
//! is the local cache; the directory service behind this trait is ground
//! truth, consulted on expand and on completed drags.

mod http;

pub use http::HttpGroupDirectory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainResult, GroupTreeNode};

/// Listing parameters for root and child fetches
#[derive(Debug, Clone, Serialize)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort_by: String,
    pub sort_dir: String,
    /// Root-list filter; ignored for child fetches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 100,
            sort_by: "sort_order".to_string(),
            sort_dir: "asc".to_string(),
            q: None,
        }
    }
}

impl ListQuery {
    pub fn with_filter(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
}

/// One page of groups plus the server-reported total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPage {
    pub data: Vec<GroupTreeNode>,
    pub meta: PageMeta,
}

/// Move request; ordering is relative (`before_id`/`after_id`), never an
/// absolute sort order, so it stays valid over a partially loaded sibling
/// set. A reparent-append carries only `parent_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveGroupRequest {
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    #[serde(rename = "beforeId", skip_serializing_if = "Option::is_none")]
    pub before_id: Option<String>,
    #[serde(rename = "afterId", skip_serializing_if = "Option::is_none")]
    pub after_id: Option<String>,
}

/// Trait for the group directory service
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// Fetch the (possibly filtered) root group list
    async fn fetch_group_roots(&self, tenant: &str, query: &ListQuery) -> DomainResult<GroupPage>;

    /// Fetch direct children of a group
    async fn fetch_group_children(
        &self,
        tenant: &str,
        parent_id: &str,
        query: &ListQuery,
    ) -> DomainResult<GroupPage>;

    /// Commit a reparent/reorder
    async fn move_group(
        &self,
        tenant: &str,
        group_id: &str,
        request: &MoveGroupRequest,
    ) -> DomainResult<()>;
}
