//! Page definitions and the route table.

pub mod account;
pub mod role;

use admin_shell::column::Cell;
use admin_shell::router::{PermissionRouter, RouteEntry, RouterError};
use admin_shell::table::{FetchError, FetchResult, Pagination, TableRequest};
use admin_shell::value::{Filters, Record, filters_to_json};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::backend::Backend;

/// Every page the console can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Accounts,
    Roles,
    Issues,
    IssueAdd,
}

/// Routes gated by the menu, plus the always-available issue pages.
pub fn router() -> Result<PermissionRouter<Page>, RouterError> {
    PermissionRouter::new(vec![
        RouteEntry::new("/index", Page::Dashboard),
        RouteEntry::new("/permis/account", Page::Accounts),
        RouteEntry::new("/permis/role", Page::Roles),
    ])?
    .with_public(RouteEntry::new("/issues", Page::Issues))?
    .with_public(RouteEntry::new("/issues/add", Page::IssueAdd))
}

/// Table data source for one collection of the backend's paged API.
pub struct CollectionRequest {
    backend: Backend,
    collection: &'static str,
}

impl CollectionRequest {
    pub fn new(backend: Backend, collection: &'static str) -> Self {
        Self {
            backend,
            collection,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    result: PageBody,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    records: Vec<Record>,
    total: u64,
}

#[async_trait]
impl TableRequest for CollectionRequest {
    async fn request(
        &self,
        params: &Filters,
        pagination: Pagination,
    ) -> Result<FetchResult, FetchError> {
        let body = json!({
            "params": filters_to_json(params),
            "pageIndex": pagination.current,
            "pageSize": pagination.page_size,
        });
        let response = self
            .backend
            .post(&format!("/api/{}/page", self.collection), body)
            .await
            .map_err(|e| FetchError::new(e.to_string()))?;
        let page: PageResponse = serde_json::from_value(response)?;
        Ok(FetchResult::new(page.result.records, page.result.total))
    }
}

/// Row operation buttons shared by the CRUD pages.
pub(crate) fn row_actions() -> Cell {
    Cell::Actions(vec![
        "Edit".to_string(),
        "Authorize".to_string(),
        "Delete".to_string(),
    ])
}

/// Status column rendered as a switch that is on for enabled rows.
pub(crate) fn status_switch(raw: &Value) -> Cell {
    let on = match raw {
        Value::String(s) => s == "1",
        other => other.as_i64() == Some(1),
    };
    Cell::Switch(on)
}
