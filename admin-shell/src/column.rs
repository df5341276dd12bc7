//! Column descriptors: the metadata a page declares for each table column.
//!
//! A descriptor list drives three things at once: the search form (which
//! columns are searchable and with which widget), the grid (labels, order,
//! fixed side, width) and cell rendering.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::value::Record;

static NULL: Value = Value::Null;

/// Renderer for a column's cells: receives the raw field value and the row.
pub type Renderer = Arc<dyn Fn(&Value, &Record) -> Cell + Send + Sync>;

/// A rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Plain text.
    Text(String),
    /// A colored label.
    Tag {
        text: String,
        color: Option<String>,
    },
    /// An on/off indicator.
    Switch(bool),
    /// Row operation buttons, by label.
    Actions(Vec<String>),
    /// The raw field value, shown verbatim.
    Raw(Value),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Tag { text, .. } => write!(f, "[{text}]"),
            Cell::Switch(on) => f.write_str(if *on { "on" } else { "off" }),
            Cell::Actions(labels) => write!(f, "{}", labels.join(" | ")),
            Cell::Raw(Value::Null) => Ok(()),
            Cell::Raw(Value::String(s)) => f.write_str(s),
            Cell::Raw(v) => write!(f, "{v}"),
        }
    }
}

/// Search widget kind for a searchable column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// Text input (default).
    #[default]
    Text,
    /// Single select from the column's options.
    Select,
    /// Start/end date picker.
    DateRange,
    /// Single date picker.
    Date,
    /// Number input.
    Number,
}

/// One choice of a select column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: Value,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Side a column is pinned to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Fixed {
    #[default]
    None,
    Left,
    Right,
}

/// Errors in a descriptor list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    #[error("column key must not be empty")]
    EmptyKey,
    #[error("duplicate column key '{0}'")]
    DuplicateKey(String),
    #[error("select column '{0}' has no options")]
    MissingOptions(String),
    #[error("column '{0}' has options but is not a select")]
    UnexpectedOptions(String),
}

/// Metadata for one table column.
///
/// # Example
///
/// ```
/// use admin_shell::column::{Cell, ColumnDescriptor, Fixed, SelectOption};
///
/// let columns = vec![
///     ColumnDescriptor::new("name", "Name"),
///     ColumnDescriptor::new("status", "Status").select(vec![
///         SelectOption::new("Enabled", 1),
///         SelectOption::new("Disabled", 0),
///     ]),
///     ColumnDescriptor::new("action", "Actions")
///         .render(|_, _| Cell::Actions(vec!["Edit".into()]))
///         .hide_in_search()
///         .fixed(Fixed::Right)
///         .width(100),
/// ];
/// assert!(admin_shell::column::validate_columns(&columns).is_ok());
/// ```
#[derive(Clone)]
pub struct ColumnDescriptor {
    /// Field key, unique within a table.
    pub key: String,
    /// Header label.
    pub label: String,
    /// Whether the column appears in the search form.
    pub searchable: bool,
    /// Search widget kind; `None` means a text input.
    pub field_type: Option<FieldType>,
    /// Choices, present iff `field_type` is `Select`.
    pub options: Option<Vec<SelectOption>>,
    /// Pinned side.
    pub fixed: Fixed,
    /// Width hint.
    pub width: Option<u16>,
    render: Option<Renderer>,
}

impl ColumnDescriptor {
    /// Create a searchable text column.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            searchable: true,
            field_type: None,
            options: None,
            fixed: Fixed::None,
            width: None,
            render: None,
        }
    }

    /// Set a cell renderer.
    pub fn render<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Record) -> Cell + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(f));
        self
    }

    /// Leave this column out of the search form.
    pub fn hide_in_search(mut self) -> Self {
        self.searchable = false;
        self
    }

    /// Set the search widget kind. Use [`select`](Self::select) for selects.
    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Make this a select column with the given options.
    pub fn select(mut self, options: Vec<SelectOption>) -> Self {
        self.field_type = Some(FieldType::Select);
        self.options = Some(options);
        self
    }

    /// Pin the column.
    pub fn fixed(mut self, fixed: Fixed) -> Self {
        self.fixed = fixed;
        self
    }

    /// Set the width hint.
    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Whether a renderer is set.
    pub fn has_renderer(&self) -> bool {
        self.render.is_some()
    }

    /// The raw value of this column in `row`, `null` when absent.
    pub fn raw_value<'a>(&self, row: &'a Record) -> &'a Value {
        row.get(&self.key).unwrap_or(&NULL)
    }

    /// Render this column's cell for `row`.
    pub fn cell(&self, row: &Record) -> Cell {
        let raw = self.raw_value(row);
        match &self.render {
            Some(render) => render(raw, row),
            None => Cell::Raw(raw.clone()),
        }
    }

    /// The search widget kind this column maps to.
    pub fn effective_field_type(&self) -> FieldType {
        self.field_type.unwrap_or_default()
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("searchable", &self.searchable)
            .field("field_type", &self.field_type)
            .field("options", &self.options)
            .field("fixed", &self.fixed)
            .field("width", &self.width)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Check the descriptor list invariants: non-empty unique keys, and options
/// present exactly on select columns.
pub fn validate_columns(columns: &[ColumnDescriptor]) -> Result<(), ColumnError> {
    let mut seen = HashSet::new();
    for column in columns {
        if column.key.is_empty() {
            return Err(ColumnError::EmptyKey);
        }
        if !seen.insert(column.key.as_str()) {
            return Err(ColumnError::DuplicateKey(column.key.clone()));
        }
        let is_select = column.field_type == Some(FieldType::Select);
        match (&column.options, is_select) {
            (None, true) => return Err(ColumnError::MissingOptions(column.key.clone())),
            (Some(_), false) => return Err(ColumnError::UnexpectedOptions(column.key.clone())),
            _ => {}
        }
    }
    Ok(())
}

/// Grid order: left-pinned, unpinned, right-pinned, each in declaration order.
pub fn grid_order(columns: &[ColumnDescriptor]) -> Vec<&ColumnDescriptor> {
    let side = |fixed: Fixed| columns.iter().filter(move |c| c.fixed == fixed);
    side(Fixed::Left)
        .chain(side(Fixed::None))
        .chain(side(Fixed::Right))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_raw_value_shown_verbatim() {
        let column = ColumnDescriptor::new("phone", "Phone");
        let r = row(json!({ "phone": "555-0100" }));
        assert_eq!(column.cell(&r), Cell::Raw(json!("555-0100")));
    }

    #[test]
    fn test_missing_field_is_null() {
        let column = ColumnDescriptor::new("action", "Actions");
        let r = row(json!({ "id": 1 }));
        assert_eq!(column.cell(&r), Cell::Raw(Value::Null));
        assert_eq!(column.cell(&r).to_string(), "");
    }

    #[test]
    fn test_renderer_sees_value_and_row() {
        let column = ColumnDescriptor::new("status", "Status")
            .render(|v, row| Cell::Text(format!("{}:{}", v, row["id"])));
        let r = row(json!({ "id": 7, "status": 1 }));
        assert_eq!(column.cell(&r), Cell::Text("1:7".into()));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let columns = vec![
            ColumnDescriptor::new("name", "Name"),
            ColumnDescriptor::new("name", "Again"),
        ];
        assert_eq!(
            validate_columns(&columns),
            Err(ColumnError::DuplicateKey("name".into()))
        );
    }

    #[test]
    fn test_options_iff_select() {
        let missing = vec![ColumnDescriptor::new("s", "S").field_type(FieldType::Select)];
        assert_eq!(
            validate_columns(&missing),
            Err(ColumnError::MissingOptions("s".into()))
        );

        let mut stray = ColumnDescriptor::new("t", "T");
        stray.options = Some(vec![SelectOption::new("a", 1)]);
        assert_eq!(
            validate_columns(&[stray]),
            Err(ColumnError::UnexpectedOptions("t".into()))
        );
    }

    #[test]
    fn test_grid_order() {
        let columns = vec![
            ColumnDescriptor::new("a", "A").fixed(Fixed::Right),
            ColumnDescriptor::new("b", "B"),
            ColumnDescriptor::new("c", "C").fixed(Fixed::Left),
            ColumnDescriptor::new("d", "D"),
        ];
        let keys: Vec<&str> = grid_order(&columns).iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["c", "b", "d", "a"]);
    }
}
