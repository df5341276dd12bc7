use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::result::{FieldError, ValidationResult};
use super::rules::FieldRules;
use crate::state::State;
use crate::value::Record;

struct FormInner {
    initial: Record,
    values: State<Record>,
    errors: State<BTreeMap<String, String>>,
    rules: RwLock<Vec<Arc<FieldRules>>>,
}

/// Field values, rules and errors of one form.
///
/// Shared by the drawer that hosts it and by the page that embeds the
/// drawer; clones operate on the same form.
///
/// # Example
///
/// ```
/// use admin_shell::form::{FieldRules, FormInstance};
/// use serde_json::json;
///
/// let form = FormInstance::new(json!({ "status": 1 }).as_object().cloned().unwrap());
/// form.add_rules(FieldRules::new("name").required("Name is required"));
///
/// assert!(form.validate().is_invalid());
/// assert_eq!(form.field_error("name").as_deref(), Some("Name is required"));
///
/// form.set_field_value("name", json!("ann"));
/// assert!(form.validate().is_valid());
///
/// form.reset_fields();
/// assert_eq!(form.get_field_value("name"), None);
/// assert_eq!(form.get_field_value("status"), Some(json!(1)));
/// ```
#[derive(Clone)]
pub struct FormInstance {
    inner: Arc<FormInner>,
}

impl FormInstance {
    /// Create a form starting from `initial` values.
    pub fn new(initial: Record) -> Self {
        Self {
            inner: Arc::new(FormInner {
                values: State::new(initial.clone()),
                initial,
                errors: State::default(),
                rules: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Register rules for a field, replacing earlier rules for the same field.
    pub fn add_rules(&self, rules: FieldRules) {
        let mut guard = self.inner.rules.write().unwrap_or_else(|e| e.into_inner());
        guard.retain(|r| r.name() != rules.name());
        guard.push(Arc::new(rules));
    }

    /// The values the form resets to.
    pub fn initial_values(&self) -> &Record {
        &self.inner.initial
    }

    pub fn get_field_value(&self, name: &str) -> Option<Value> {
        self.inner.values.with(|v| v.get(name).cloned())
    }

    /// Snapshot of all values.
    pub fn get_fields_value(&self) -> Record {
        self.inner.values.get()
    }

    /// Set one value. Clears that field's error.
    pub fn set_field_value(&self, name: &str, value: Value) {
        self.inner.values.update(|v| v.insert(name.to_string(), value));
        self.inner.errors.update(|e| e.remove(name));
    }

    /// Merge several values into the form.
    pub fn set_fields_value(&self, values: Record) {
        self.inner.errors.update(|e| {
            for key in values.keys() {
                e.remove(key);
            }
        });
        self.inner.values.update(|v| v.extend(values));
    }

    /// Restore the initial values and clear every error.
    pub fn reset_fields(&self) {
        self.inner.values.set(self.inner.initial.clone());
        self.inner.errors.set(BTreeMap::new());
    }

    /// Current error of a field.
    pub fn field_error(&self, name: &str) -> Option<String> {
        self.inner.errors.with(|e| e.get(name).cloned())
    }

    /// All current field errors.
    pub fn errors(&self) -> BTreeMap<String, String> {
        self.inner.errors.get()
    }

    /// Run the synchronous rules and record the errors on the form.
    pub fn validate(&self) -> ValidationResult {
        let values = self.get_fields_value();
        let errors = self
            .rules()
            .iter()
            .filter_map(|rules| {
                let value = values.get(rules.name()).cloned().unwrap_or(Value::Null);
                rules
                    .check(&value)
                    .map(|message| FieldError::new(rules.name(), message))
            })
            .collect();
        self.record(errors)
    }

    /// Run all rules, including async ones, and record the errors on the form.
    pub async fn validate_async(&self) -> ValidationResult {
        let values = self.get_fields_value();
        let mut errors = Vec::new();
        for rules in self.rules() {
            let value = values.get(rules.name()).cloned().unwrap_or(Value::Null);
            let name = rules.name().to_string();
            if let Some(message) = rules.check_async(value).await {
                errors.push(FieldError::new(name, message));
            }
        }
        self.record(errors)
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.values.is_dirty() || self.inner.errors.is_dirty()
    }

    pub fn clear_dirty(&self) {
        self.inner.values.clear_dirty();
        self.inner.errors.clear_dirty();
    }

    fn rules(&self) -> Vec<Arc<FieldRules>> {
        self.inner
            .rules
            .read()
            .map(|g| g.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    fn record(&self, errors: Vec<FieldError>) -> ValidationResult {
        let result = ValidationResult::from_errors(errors);
        self.inner.errors.set(result.messages());
        result
    }
}

impl std::fmt::Debug for FormInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormInstance")
            .field("values", &self.get_fields_value())
            .field("errors", &self.errors())
            .finish()
    }
}
