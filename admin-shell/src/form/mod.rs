//! Form state and validation.
//!
//! A [`FormInstance`] holds field values as JSON, the initial values it
//! resets to, per-field [`FieldRules`] and the errors of the last
//! validation run.

mod instance;
mod result;
mod rules;

pub use instance::FormInstance;
pub use result::{FieldError, ValidationResult};
pub use rules::FieldRules;
