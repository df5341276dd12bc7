//! The table engine.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use super::layout::{GridColumn, PaginationSummary, RenderedRow, TableLayout, ToolbarSlot};
use super::query::{QueryState, page_count};
use super::request::{FetchError, FetchResult, TableRequest};
use crate::column::{ColumnDescriptor, ColumnError, grid_order, validate_columns};
use crate::config::{LoadingConfig, TableConfig};
use crate::loading::DelayedLoading;
use crate::search::{SearchError, SearchForm};
use crate::state::State;
use crate::value::{FieldValue, Record};

/// Errors returned by table operations.
#[derive(Debug, Clone, Error)]
pub enum TableError {
    /// The data source failed. Displayed rows are unchanged.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("page must be at least 1")]
    InvalidPage,
    #[error("page size must be at least 1")]
    InvalidPageSize,
}

/// What happened to the response of a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was the latest and is now displayed.
    Applied,
    /// A newer fetch was issued before this one resolved; the response was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy)]
enum FetchReason {
    Mount,
    Search,
    Reset,
    Page,
    PageSize,
    Reload,
}

impl fmt::Display for FetchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchReason::Mount => "mount",
            FetchReason::Search => "search",
            FetchReason::Reset => "reset",
            FetchReason::Page => "page",
            FetchReason::PageSize => "page size",
            FetchReason::Reload => "reload",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default)]
struct TableData {
    rows: Vec<Record>,
    /// `None` until the first fetch is applied.
    total: Option<u64>,
    /// Sequence number of the applied fetch.
    applied: u64,
}

struct TableInner {
    columns: Vec<ColumnDescriptor>,
    config: TableConfig,
    header_title: Option<String>,
    toolbar: Vec<ToolbarSlot>,
    request: Arc<dyn TableRequest>,
    query: State<QueryState>,
    search: State<SearchForm>,
    data: State<TableData>,
    loading: DelayedLoading,
    /// Sequence number of the most recently issued fetch.
    issued: AtomicU64,
}

/// Builder for [`ProTable`].
pub struct TableBuilder {
    columns: Vec<ColumnDescriptor>,
    request: Arc<dyn TableRequest>,
    config: TableConfig,
    loading: LoadingConfig,
    header_title: Option<String>,
    toolbar: Vec<ToolbarSlot>,
}

impl TableBuilder {
    /// Use table defaults from the shell configuration.
    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Loading indicator behavior.
    pub fn loading(mut self, loading: LoadingConfig) -> Self {
        self.loading = loading;
        self
    }

    /// Title shown above the grid.
    pub fn header_title(mut self, title: impl Into<String>) -> Self {
        self.header_title = Some(title.into());
        self
    }

    /// Append a toolbar slot.
    pub fn toolbar(mut self, slot: ToolbarSlot) -> Self {
        self.toolbar.push(slot);
        self
    }

    /// Field used as the row key.
    pub fn row_key(mut self, key: impl Into<String>) -> Self {
        self.config.row_key = key.into();
        self
    }

    /// Validate the columns and build the table. No fetch is issued until
    /// [`ProTable::mount`].
    pub fn build(self) -> Result<ProTable, ColumnError> {
        validate_columns(&self.columns)?;
        let search = SearchForm::derive(&self.columns);
        let query = QueryState::new(self.config.default_page_size);
        Ok(ProTable {
            inner: Arc::new(TableInner {
                columns: self.columns,
                config: self.config,
                header_title: self.header_title,
                toolbar: self.toolbar,
                request: self.request,
                query: State::new(query),
                search: State::new(search),
                data: State::default(),
                loading: DelayedLoading::from_config(&self.loading),
                issued: AtomicU64::new(0),
            }),
        })
    }
}

/// Metadata-driven table: search form, grid and pagination from a column list
/// and a data source.
///
/// Every query change issues a fresh request. Requests may overlap; only the
/// response of the most recently issued one is ever displayed. Cheap to
/// clone; clones drive the same table.
///
/// # Example
///
/// ```
/// use admin_shell::column::ColumnDescriptor;
/// use admin_shell::table::{request_fn, FetchError, FetchResult, ProTable};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let table = ProTable::builder(
///     vec![ColumnDescriptor::new("name", "Name")],
///     request_fn(|_filters, _page| async {
///         let row = json!({ "id": 1, "name": "ann" }).as_object().cloned().unwrap();
///         Ok::<_, FetchError>(FetchResult::new(vec![row], 1))
///     }),
/// )
/// .build()
/// .unwrap();
///
/// table.mount().await.unwrap();
/// assert_eq!(table.rows().len(), 1);
/// # }
/// ```
#[derive(Clone)]
pub struct ProTable {
    inner: Arc<TableInner>,
}

impl ProTable {
    /// Start building a table over `columns` backed by `request`.
    pub fn builder(
        columns: Vec<ColumnDescriptor>,
        request: impl TableRequest + 'static,
    ) -> TableBuilder {
        TableBuilder {
            columns,
            request: Arc::new(request),
            config: TableConfig::default(),
            loading: LoadingConfig::default(),
            header_title: None,
            toolbar: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Query lifecycle
    // -------------------------------------------------------------------------

    /// First fetch with the default query.
    pub async fn mount(&self) -> Result<FetchOutcome, TableError> {
        self.fetch(FetchReason::Mount, |_| {}).await
    }

    /// Refetch with the current query.
    pub async fn reload(&self) -> Result<FetchOutcome, TableError> {
        self.fetch(FetchReason::Reload, |_| {}).await
    }

    /// Submit the search form: non-empty values become the filters and the
    /// table returns to page 1.
    pub async fn submit_search(&self) -> Result<FetchOutcome, TableError> {
        let filters = self.inner.search.with(SearchForm::submit);
        self.fetch(FetchReason::Search, move |q| q.apply_filters(filters))
            .await
    }

    /// Clear the search form and query page 1 without filters.
    pub async fn reset_search(&self) -> Result<FetchOutcome, TableError> {
        let filters = self.inner.search.update(SearchForm::reset);
        self.fetch(FetchReason::Reset, move |q| q.apply_filters(filters))
            .await
    }

    /// Go to `page`, keeping filters.
    pub async fn set_page(&self, page: u32) -> Result<FetchOutcome, TableError> {
        if page == 0 {
            return Err(TableError::InvalidPage);
        }
        self.fetch(FetchReason::Page, move |q| q.set_page(page)).await
    }

    /// Change the page size and return to page 1, keeping filters.
    pub async fn set_page_size(&self, page_size: u32) -> Result<FetchOutcome, TableError> {
        if page_size == 0 {
            return Err(TableError::InvalidPageSize);
        }
        self.fetch(FetchReason::PageSize, move |q| q.set_page_size(page_size))
            .await
    }

    /// Pagination control change: a new size resets to page 1, otherwise the
    /// page moves.
    pub async fn change_pagination(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<FetchOutcome, TableError> {
        let current_size = self.inner.query.with(|q| q.page_size);
        if page_size != current_size {
            self.set_page_size(page_size).await
        } else {
            self.set_page(page).await
        }
    }

    /// Apply `mutate` to the query, tag a new fetch and run it.
    async fn fetch(
        &self,
        reason: FetchReason,
        mutate: impl FnOnce(&mut QueryState),
    ) -> Result<FetchOutcome, TableError> {
        let known_total = self.inner.data.with(|d| d.total);
        let issued = &self.inner.issued;
        let (query, seq) = self
            .inner
            .query
            .update(|q| {
                mutate(q);
                if let Some(total) = known_total
                    && q.clamp_to(total)
                {
                    log::debug!("Table page clamped to {} (total {})", q.page, total);
                }
                let seq = issued.fetch_add(1, Ordering::SeqCst) + 1;
                (q.clone(), seq)
            });

        self.inner.loading.set_true();
        log::debug!(
            "Table fetch #{} issued ({}): page {} size {} filters {:?}",
            seq,
            reason,
            query.page,
            query.page_size,
            query.filters.keys().collect::<Vec<_>>()
        );

        let result = self
            .inner
            .request
            .request(&query.filters, query.pagination())
            .await;

        self.apply(seq, query.page_size, result)
    }

    fn apply(
        &self,
        seq: u64,
        page_size: u32,
        result: Result<FetchResult, FetchError>,
    ) -> Result<FetchOutcome, TableError> {
        let issued = &self.inner.issued;
        let loading = &self.inner.loading;

        self.inner
            .data
            .update(|data| {
                if seq != issued.load(Ordering::SeqCst) || seq <= data.applied {
                    log::debug!("Table fetch #{} resolved after a newer one; dropped", seq);
                    return Ok(FetchOutcome::Stale);
                }
                loading.set_false();

                let mut page = match result {
                    Ok(page) => page,
                    Err(e) => {
                        log::debug!("Table fetch #{} failed: {}", seq, e);
                        return Err(TableError::Fetch(e));
                    }
                };

                let limit = usize::try_from(page_size).unwrap_or(usize::MAX);
                if page.list.len() > limit {
                    log::warn!(
                        "Fetch returned {} rows for page size {}; truncating",
                        page.list.len(),
                        page_size
                    );
                    page.list.truncate(limit);
                }
                if (page.total as usize) < page.list.len() {
                    log::debug!(
                        "Fetch total {} below row count {}; treating as estimate",
                        page.total,
                        page.list.len()
                    );
                }

                log::debug!(
                    "Table fetch #{} applied: {} rows, total {}",
                    seq,
                    page.list.len(),
                    page.total
                );
                data.rows = page.list;
                data.total = Some(page.total);
                data.applied = seq;
                Ok(FetchOutcome::Applied)
            })
    }

    // -------------------------------------------------------------------------
    // Search form
    // -------------------------------------------------------------------------

    /// Set a search field value. Takes effect on the next `submit_search`.
    pub fn set_search_value(&self, key: &str, value: FieldValue) -> Result<(), SearchError> {
        self.inner.search.update(|form| form.set_value(key, value))
    }

    /// Clear a single search field.
    pub fn clear_search_value(&self, key: &str) {
        self.inner.search.update(|form| form.clear_value(key));
    }

    /// Snapshot of the search form.
    pub fn search_form(&self) -> SearchForm {
        self.inner.search.get()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.inner.columns
    }

    /// Current query.
    pub fn query(&self) -> QueryState {
        self.inner.query.get()
    }

    /// Rows of the last applied fetch.
    pub fn rows(&self) -> Vec<Record> {
        self.inner.data.with(|d| d.rows.clone())
    }

    /// Total of the last applied fetch.
    pub fn total(&self) -> Option<u64> {
        self.inner.data.with(|d| d.total)
    }

    /// Number of pages for the last known total.
    pub fn page_count(&self) -> u32 {
        let page_size = self.inner.query.with(|q| q.page_size);
        self.total().map_or(0, |t| page_count(t, page_size))
    }

    pub fn is_loading(&self) -> bool {
        self.inner.loading.get()
    }

    /// The table's loading indicator.
    pub fn loading(&self) -> &DelayedLoading {
        &self.inner.loading
    }

    /// Rows rendered through the column descriptors, in grid column order.
    pub fn rendered_rows(&self) -> Vec<RenderedRow> {
        let columns = grid_order(&self.inner.columns);
        let row_key = self.inner.config.row_key.as_str();
        self.inner.data.with(|d| {
            d.rows
                .iter()
                .map(|row| RenderedRow::render(row, &columns, row_key))
                .collect()
        })
    }

    /// Everything a renderer needs in one snapshot.
    pub fn layout(&self) -> TableLayout {
        let query = self.query();
        let total = self.total();
        TableLayout {
            header_title: self.inner.header_title.clone(),
            toolbar: self.inner.toolbar.clone(),
            search_fields: self.inner.search.with(|f| f.fields().to_vec()),
            columns: grid_order(&self.inner.columns)
                .into_iter()
                .map(GridColumn::from)
                .collect(),
            rows: self.rendered_rows(),
            pagination: PaginationSummary {
                page: query.page,
                page_size: query.page_size,
                total,
                page_count: total.map_or(0, |t| page_count(t, query.page_size)),
                page_size_options: self.inner.config.page_size_options.clone(),
            },
            loading: self.is_loading(),
        }
    }

    /// Whether anything visible changed since the last `clear_dirty`.
    pub fn is_dirty(&self) -> bool {
        self.inner.query.is_dirty()
            || self.inner.data.is_dirty()
            || self.inner.search.is_dirty()
            || self.inner.loading.is_dirty()
    }

    pub fn clear_dirty(&self) {
        self.inner.query.clear_dirty();
        self.inner.data.clear_dirty();
        self.inner.search.clear_dirty();
        self.inner.loading.clear_dirty();
    }
}

impl fmt::Debug for ProTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProTable")
            .field("header_title", &self.inner.header_title)
            .field("columns", &self.inner.columns.len())
            .field("query", &self.query())
            .field("total", &self.total())
            .finish()
    }
}
