//! Search form derived from column descriptors.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::column::{ColumnDescriptor, FieldType, SelectOption};
use crate::value::{FieldValue, Filters};

/// Input widget of a search field.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchWidget {
    TextInput,
    Select(Vec<SelectOption>),
    DateRangePicker,
    DatePicker,
    NumberInput,
}

impl SearchWidget {
    /// The widget a descriptor maps to.
    pub fn for_column(column: &ColumnDescriptor) -> Self {
        match column.effective_field_type() {
            FieldType::Text => Self::TextInput,
            FieldType::Select => Self::Select(column.options.clone().unwrap_or_default()),
            FieldType::DateRange => Self::DateRangePicker,
            FieldType::Date => Self::DatePicker,
            FieldType::Number => Self::NumberInput,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::TextInput => "text",
            Self::Select(_) => "select",
            Self::DateRangePicker => "date range",
            Self::DatePicker => "date",
            Self::NumberInput => "number",
        }
    }
}

/// One field of a derived search form.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchField {
    pub key: String,
    pub label: String,
    pub widget: SearchWidget,
}

/// Rejected search input. Local to the form; never a query error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("no search field '{0}'")]
    UnknownField(String),
    #[error("field '{field}' expects a {expected} value")]
    WrongKind {
        field: String,
        expected: &'static str,
    },
    #[error("'{value}' is not an option of field '{field}'")]
    UnknownOption { field: String, value: String },
    #[error("date range of field '{0}' ends before it starts")]
    InvertedRange(String),
}

/// Filter form built from the searchable columns, in column order.
///
/// # Example
///
/// ```
/// use admin_shell::column::ColumnDescriptor;
/// use admin_shell::search::SearchForm;
/// use admin_shell::value::FieldValue;
///
/// let columns = vec![
///     ColumnDescriptor::new("name", "Name"),
///     ColumnDescriptor::new("note", "Note").hide_in_search(),
/// ];
/// let mut form = SearchForm::derive(&columns);
/// assert_eq!(form.fields().len(), 1);
///
/// form.set_value("name", FieldValue::text("ann")).unwrap();
/// assert_eq!(form.submit().len(), 1);
/// assert!(form.reset().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    fields: Vec<SearchField>,
    values: BTreeMap<String, FieldValue>,
}

impl SearchForm {
    /// Build the form from a descriptor list.
    pub fn derive(columns: &[ColumnDescriptor]) -> Self {
        let fields = columns
            .iter()
            .filter(|c| c.searchable)
            .map(|c| SearchField {
                key: c.key.clone(),
                label: c.label.clone(),
                widget: SearchWidget::for_column(c),
            })
            .collect();
        Self {
            fields,
            values: BTreeMap::new(),
        }
    }

    /// The form's fields in display order.
    pub fn fields(&self) -> &[SearchField] {
        &self.fields
    }

    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<&SearchField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Current value of a field.
    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    /// Set a field's value after checking it fits the field's widget.
    pub fn set_value(&mut self, key: &str, value: FieldValue) -> Result<(), SearchError> {
        let field = self
            .field(key)
            .ok_or_else(|| SearchError::UnknownField(key.to_string()))?;
        check_value(field, &value)?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Clear a single field.
    pub fn clear_value(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Collect the non-empty values into a filter mapping.
    pub fn submit(&self) -> Filters {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Clear every field; the resulting filter mapping is empty.
    pub fn reset(&mut self) -> Filters {
        self.values.clear();
        Filters::new()
    }
}

fn check_value(field: &SearchField, value: &FieldValue) -> Result<(), SearchError> {
    let wrong_kind = || SearchError::WrongKind {
        field: field.key.clone(),
        expected: field.widget.kind(),
    };

    match (&field.widget, value) {
        (SearchWidget::TextInput, FieldValue::Text(_))
        | (SearchWidget::DatePicker, FieldValue::Date(_)) => Ok(()),
        (SearchWidget::NumberInput, FieldValue::Number(n)) if n.is_finite() => Ok(()),
        (SearchWidget::Select(_), v) if v.is_empty() => Ok(()),
        (SearchWidget::Select(options), FieldValue::Select(v)) => {
            if options.iter().any(|o| &o.value == v) {
                Ok(())
            } else {
                Err(SearchError::UnknownOption {
                    field: field.key.clone(),
                    value: v.to_string(),
                })
            }
        }
        (SearchWidget::DateRangePicker, FieldValue::DateRange(start, end)) => {
            if start <= end {
                Ok(())
            } else {
                Err(SearchError::InvertedRange(field.key.clone()))
            }
        }
        _ => Err(wrong_kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("name", "Name"),
            ColumnDescriptor::new("gender", "Gender").select(vec![
                SelectOption::new("Male", 1),
                SelectOption::new("Female", 2),
            ]),
            ColumnDescriptor::new("created", "Created").field_type(FieldType::DateRange),
            ColumnDescriptor::new("action", "Actions").hide_in_search(),
        ]
    }

    #[test]
    fn test_widget_mapping() {
        let form = SearchForm::derive(&columns());
        let widgets: Vec<&SearchWidget> = form.fields().iter().map(|f| &f.widget).collect();
        assert_eq!(widgets[0], &SearchWidget::TextInput);
        assert!(matches!(widgets[1], SearchWidget::Select(opts) if opts.len() == 2));
        assert_eq!(widgets[2], &SearchWidget::DateRangePicker);
        assert!(form.field("action").is_none());
    }

    #[test]
    fn test_submit_drops_empty_values() {
        let mut form = SearchForm::derive(&columns());
        form.set_value("name", FieldValue::text("  ")).unwrap();
        form.set_value("gender", FieldValue::select(2)).unwrap();

        let filters = form.submit();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters["gender"], FieldValue::select(2));
    }

    #[test]
    fn test_rejects_unknown_option() {
        let mut form = SearchForm::derive(&columns());
        let err = form.set_value("gender", FieldValue::select(3)).unwrap_err();
        assert!(matches!(err, SearchError::UnknownOption { .. }));
        assert!(form.set_value("gender", FieldValue::Select(Value::Null)).is_ok());
    }

    #[test]
    fn test_rejects_wrong_kind_and_unknown_field() {
        let mut form = SearchForm::derive(&columns());
        assert!(matches!(
            form.set_value("created", FieldValue::text("yesterday")),
            Err(SearchError::WrongKind { .. })
        ));
        assert_eq!(
            form.set_value("action", FieldValue::text("x")),
            Err(SearchError::UnknownField("action".into()))
        );
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut form = SearchForm::derive(&columns());
        let a = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(
            form.set_value("created", FieldValue::DateRange(a, b)),
            Err(SearchError::InvertedRange("created".into()))
        );
        assert!(form.set_value("created", FieldValue::DateRange(b, a)).is_ok());
    }

    #[test]
    fn test_reset_clears_values() {
        let mut form = SearchForm::derive(&columns());
        form.set_value("name", FieldValue::text("ann")).unwrap();
        assert!(form.reset().is_empty());
        assert!(form.value("name").is_none());
        assert!(form.submit().is_empty());
    }
}
