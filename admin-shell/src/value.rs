//! Record and field value types shared by tables and forms.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single row as returned by a fetch: a JSON object.
pub type Record = serde_json::Map<String, Value>;

/// Filter mapping from field key to value, ordered by key.
pub type Filters = BTreeMap<String, FieldValue>;

/// A typed value held by a search or form field.
///
/// Serializes untagged, so a filter mapping turns into the flat JSON object a
/// transport expects (`{"name": "ann", "created": ["2024-01-01", "2024-01-31"]}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free text.
    Text(String),
    /// A number.
    Number(f64),
    /// The value of a chosen select option.
    Select(Value),
    /// A single calendar date.
    Date(NaiveDate),
    /// An inclusive date range.
    DateRange(NaiveDate, NaiveDate),
}

impl FieldValue {
    /// Create a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Create a select value.
    pub fn select(v: impl Into<Value>) -> Self {
        Self::Select(v.into())
    }

    /// Whether this value counts as "not filled in".
    ///
    /// Blank text and a null or empty-string selection are empty; numbers
    /// and dates never are.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Select(Value::Null) => true,
            Self::Select(Value::String(s)) => s.is_empty(),
            Self::Select(_) | Self::Number(_) | Self::Date(_) | Self::DateRange(..) => false,
        }
    }

    /// The JSON representation sent to transports.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Convert a filter mapping to a JSON object.
pub fn filters_to_json(filters: &Filters) -> Record {
    filters
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect()
}
