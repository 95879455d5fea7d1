//! HTTP Group Directory
//!
//! reqwest-backed implementation of the directory contract, speaking JSON
//! against the admin service.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::domain::{DomainError, DomainResult};

use super::{GroupDirectory, GroupPage, ListQuery, MoveGroupRequest};

/// Directory client for a single service endpoint
#[derive(Debug, Clone)]
pub struct HttpGroupDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGroupDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn status_error(status: StatusCode, context: &str) -> DomainError {
    match status {
        StatusCode::NOT_FOUND => DomainError::NotFound(context.to_string()),
        StatusCode::CONFLICT => DomainError::Conflict(context.to_string()),
        StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
            DomainError::InvalidInput(context.to_string())
        }
        _ => DomainError::Internal(format!("{}: HTTP {}", context, status)),
    }
}

#[async_trait]
impl GroupDirectory for HttpGroupDirectory {
    async fn fetch_group_roots(&self, tenant: &str, query: &ListQuery) -> DomainResult<GroupPage> {
        let url = self.url(&format!("/tenants/{}/groups", tenant));
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(status_error(resp.status(), "fetch group roots"));
        }
        resp.json::<GroupPage>()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn fetch_group_children(
        &self,
        tenant: &str,
        parent_id: &str,
        query: &ListQuery,
    ) -> DomainResult<GroupPage> {
        let url = self.url(&format!("/tenants/{}/groups/{}/children", tenant, parent_id));
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(status_error(resp.status(), "fetch group children"));
        }
        resp.json::<GroupPage>()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn move_group(
        &self,
        tenant: &str,
        group_id: &str,
        request: &MoveGroupRequest,
    ) -> DomainResult<()> {
        let url = self.url(&format!("/tenants/{}/groups/{}/move", tenant, group_id));
        let resp = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(status_error(resp.status(), "move group"));
        }
        Ok(())
    }
}
