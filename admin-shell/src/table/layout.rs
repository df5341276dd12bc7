//! Snapshot of everything a renderer needs to draw a table.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::column::{Cell, ColumnDescriptor, Fixed};
use crate::search::SearchField;
use crate::value::Record;

/// Opaque toolbar content supplied by the embedding page.
///
/// The table never looks inside; it only keeps slots in order and hands them
/// back in [`TableLayout::toolbar`].
#[derive(Clone)]
pub struct ToolbarSlot {
    pub key: String,
    content: Arc<dyn Any + Send + Sync>,
}

impl ToolbarSlot {
    pub fn new<T: Any + Send + Sync>(key: impl Into<String>, content: T) -> Self {
        Self {
            key: key.into(),
            content: Arc::new(content),
        }
    }

    /// Borrow the content as the type the page put in.
    pub fn content<T: Any>(&self) -> Option<&T> {
        self.content.downcast_ref::<T>()
    }
}

impl fmt::Debug for ToolbarSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolbarSlot").field("key", &self.key).finish()
    }
}

/// Header of a grid column.
#[derive(Debug, Clone, PartialEq)]
pub struct GridColumn {
    pub key: String,
    pub label: String,
    pub fixed: Fixed,
    pub width: Option<u16>,
}

impl From<&ColumnDescriptor> for GridColumn {
    fn from(c: &ColumnDescriptor) -> Self {
        Self {
            key: c.key.clone(),
            label: c.label.clone(),
            fixed: c.fixed,
            width: c.width,
        }
    }
}

/// A row with its cells rendered in grid column order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    /// Value of the row key field, if the row has one.
    pub key: Option<String>,
    pub cells: Vec<Cell>,
}

impl RenderedRow {
    pub(crate) fn render(row: &Record, columns: &[&ColumnDescriptor], row_key: &str) -> Self {
        let key = match row.get(row_key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(v) => Some(v.to_string()),
        };
        Self {
            key,
            cells: columns.iter().map(|c| c.cell(row)).collect(),
        }
    }
}

/// Pagination control state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSummary {
    pub page: u32,
    pub page_size: u32,
    /// Total from the last applied fetch, `None` before the first one.
    pub total: Option<u64>,
    pub page_count: u32,
    pub page_size_options: Vec<u32>,
}

/// Full table snapshot.
#[derive(Debug, Clone)]
pub struct TableLayout {
    pub header_title: Option<String>,
    pub toolbar: Vec<ToolbarSlot>,
    pub search_fields: Vec<SearchField>,
    pub columns: Vec<GridColumn>,
    pub rows: Vec<RenderedRow>,
    pub pagination: PaginationSummary,
    pub loading: bool,
}
