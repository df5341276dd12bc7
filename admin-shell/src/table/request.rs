//! The fetch contract between a table and its data source.

use std::future::Future;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::query::Pagination;
use crate::value::{Filters, Record};

/// One page of rows plus the total row count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Rows of the requested page.
    pub list: Vec<Record>,
    /// Total rows matching the filters, across all pages.
    pub total: u64,
}

impl FetchResult {
    pub fn new(list: Vec<Record>, total: u64) -> Self {
        Self { list, total }
    }
}

/// A failed fetch. The message is passed through untouched.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for FetchError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for FetchError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Data source of a table.
///
/// The table calls this whenever its query changes and on mount. It makes no
/// assumption about transport.
#[async_trait]
pub trait TableRequest: Send + Sync {
    async fn request(
        &self,
        params: &Filters,
        pagination: Pagination,
    ) -> Result<FetchResult, FetchError>;
}

/// [`TableRequest`] backed by a closure.
pub struct FnRequest<F>(F);

/// Wrap a closure `(filters, pagination) -> future` as a [`TableRequest`].
///
/// # Example
///
/// ```
/// use admin_shell::table::{request_fn, FetchError, FetchResult};
///
/// let request = request_fn(|_filters, _pagination| async {
///     Ok::<_, FetchError>(FetchResult::new(Vec::new(), 0))
/// });
/// # let _ = request;
/// ```
pub fn request_fn<F, Fut>(f: F) -> FnRequest<F>
where
    F: Fn(Filters, Pagination) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<FetchResult, FetchError>> + Send + 'static,
{
    FnRequest(f)
}

#[async_trait]
impl<F, Fut> TableRequest for FnRequest<F>
where
    F: Fn(Filters, Pagination) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<FetchResult, FetchError>> + Send + 'static,
{
    async fn request(
        &self,
        params: &Filters,
        pagination: Pagination,
    ) -> Result<FetchResult, FetchError> {
        (self.0)(params.clone(), pagination).await
    }
}
