//! Declarative per-field validation rules.

use std::future::Future;
use std::sync::Arc;

use email_address::EmailAddress;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

type Predicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;
type AsyncPredicate = Box<dyn Fn(Value) -> BoxFuture<'static, bool> + Send + Sync>;

/// One registered check and the message shown when it fails.
struct Check<P> {
    passes: P,
    message: String,
}

/// Validation rules for one form field.
///
/// Rules run in the order added; sync rules before async ones. Only the
/// first failure is reported.
///
/// # Example
///
/// ```
/// use admin_shell::form::FieldRules;
/// use serde_json::json;
///
/// let rules = FieldRules::new("account")
///     .required("Account is required")
///     .min_length(3, "At least 3 characters");
///
/// assert_eq!(rules.check(&json!("ab")), Some("At least 3 characters".to_string()));
/// assert_eq!(rules.check(&json!(null)), Some("Account is required".to_string()));
/// assert_eq!(rules.check(&json!("abc")), None);
/// ```
pub struct FieldRules {
    name: String,
    checks: Vec<Check<Predicate>>,
    remote: Vec<Check<AsyncPredicate>>,
}

impl FieldRules {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checks: Vec::new(),
            remote: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fail with `msg` whenever `passes` returns false.
    pub fn rule<F>(mut self, passes: F, msg: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Check {
            passes: Box::new(passes),
            message: msg.into(),
        });
        self
    }

    /// Like [`rule`](Self::rule) but awaited, e.g. a uniqueness lookup.
    /// Runs only once every synchronous rule has passed.
    pub fn rule_async<F, Fut>(mut self, passes: F, msg: impl Into<String>) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.remote.push(Check {
            passes: Box::new(move |v| passes(v).boxed()),
            message: msg.into(),
        });
        self
    }

    /// Require a value: not null, not blank text, not an empty list.
    pub fn required(self, msg: impl Into<String>) -> Self {
        self.rule(|v| !is_blank(v), msg)
    }

    /// Text length in characters, at least `min`.
    pub fn min_length(self, min: usize, msg: impl Into<String>) -> Self {
        self.rule(move |v| text_or_pass(v, |s| s.chars().count() >= min), msg)
    }

    /// Text length in characters, at most `max`.
    pub fn max_length(self, max: usize, msg: impl Into<String>) -> Self {
        self.rule(move |v| text_or_pass(v, |s| s.chars().count() <= max), msg)
    }

    /// Text must match `pattern`. Fails if the pattern does not compile.
    pub fn pattern(self, pattern: &str, msg: impl Into<String>) -> Result<Self, regex::Error> {
        let re = regex::Regex::new(pattern)?;
        Ok(self.rule(move |v| text_or_pass(v, |s| re.is_match(s)), msg))
    }

    /// Text must parse as an email address.
    pub fn email(self, msg: impl Into<String>) -> Self {
        self.rule(|v| text_or_pass(v, EmailAddress::is_valid), msg)
    }

    /// First failing synchronous rule, if any.
    pub fn check(&self, value: &Value) -> Option<String> {
        self.checks
            .iter()
            .find(|c| !(c.passes)(value))
            .map(|c| c.message.clone())
    }

    /// First failing rule of either kind.
    pub fn check_async(self: Arc<Self>, value: Value) -> BoxFuture<'static, Option<String>> {
        Box::pin(async move {
            if let Some(msg) = self.check(&value) {
                return Some(msg);
            }
            for check in &self.remote {
                if !(check.passes)(value.clone()).await {
                    return Some(check.message.clone());
                }
            }
            None
        })
    }
}

impl std::fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRules")
            .field("name", &self.name)
            .field("checks", &self.checks.len())
            .field("remote", &self.remote.len())
            .finish()
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// Apply `f` to non-empty text; anything else passes (use `required`).
fn text_or_pass(v: &Value, f: impl Fn(&str) -> bool) -> bool {
    match v {
        Value::String(s) if !s.is_empty() => f(s),
        _ => true,
    }
}
