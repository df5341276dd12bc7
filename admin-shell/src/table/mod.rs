//! Metadata-driven data table.
//!
//! [`ProTable`] owns a query (page, page size, filters), a search form derived
//! from its columns, and the rows of the last applied fetch. The data source
//! is any [`TableRequest`].

mod engine;
mod layout;
mod query;
mod request;

pub use engine::{FetchOutcome, ProTable, TableBuilder, TableError};
pub use layout::{GridColumn, PaginationSummary, RenderedRow, TableLayout, ToolbarSlot};
pub use query::{Pagination, QueryState, page_count};
pub use request::{FetchError, FetchResult, FnRequest, TableRequest, request_fn};
