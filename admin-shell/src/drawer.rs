//! Drawer hosting a form, driven through an imperative handle.
//!
//! The drawer is `Closed`, `Open` or `Submitting`. Submitting runs the form's
//! validation, then hands the values to the page's `on_finish` callback. The
//! callback either finishes on the spot ([`Finish::Done`]) or returns a
//! future ([`Finish::Pending`]); only the second shows the loading indicator
//! on the confirm button and closes the drawer when it succeeds.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures::future::BoxFuture;
use thiserror::Error;

use crate::config::LoadingConfig;
use crate::form::{FormInstance, ValidationResult};
use crate::loading::DelayedLoading;
use crate::state::State;
use crate::value::Record;

/// Lifecycle state of a drawer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DrawerState {
    #[default]
    Closed,
    Open,
    /// Values were handed to `on_finish`. Stays here after a failed
    /// deferred completion so the user can retry.
    Submitting,
}

/// Failure reported by a deferred `on_finish`. Passed through uninterpreted.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SubmitError {
    pub message: String,
}

impl SubmitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for SubmitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for SubmitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// What `on_finish` returns.
pub enum Finish {
    /// Finished synchronously. The drawer does not close by itself.
    Done,
    /// Finishes later. The drawer shows loading and closes on success.
    Pending(BoxFuture<'static, Result<(), SubmitError>>),
}

impl Finish {
    /// Wrap a future as a deferred completion.
    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = Result<(), SubmitError>> + Send + 'static,
    {
        Self::Pending(Box::pin(fut))
    }
}

impl fmt::Debug for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finish::Done => f.write_str("Done"),
            Finish::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Errors from [`DrawerForm::submit`].
#[derive(Debug, Clone, Error)]
pub enum DrawerError {
    #[error("drawer is not open")]
    NotOpen,
    #[error("a submission is already in progress")]
    Busy,
    /// The deferred completion failed. The drawer stays open.
    #[error("submission failed: {0}")]
    Submission(#[from] SubmitError),
}

/// Successful result of [`DrawerForm::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; errors are also recorded on the form.
    Invalid(ValidationResult),
    /// `on_finish` completed synchronously; the drawer is still open.
    Completed,
    /// The deferred completion succeeded and the drawer closed.
    Closed,
    /// The deferred completion succeeded after the drawer had been closed
    /// by other means.
    Detached,
}

/// Footer configuration.
#[derive(Clone, Default)]
pub enum Footer {
    /// Cancel and Confirm buttons.
    #[default]
    Default,
    /// Page-supplied content, never interpreted.
    Custom(Arc<dyn Any + Send + Sync>),
    /// No footer at all.
    Hidden,
}

impl fmt::Debug for Footer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Footer::Default => f.write_str("Default"),
            Footer::Custom(_) => f.write_str("Custom(..)"),
            Footer::Hidden => f.write_str("Hidden"),
        }
    }
}

/// A footer button as the renderer should draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterButton {
    pub label: String,
    pub loading: bool,
}

/// Footer as the renderer should draw it.
#[derive(Clone)]
pub enum FooterView {
    Buttons {
        cancel: FooterButton,
        confirm: FooterButton,
    },
    Custom(Arc<dyn Any + Send + Sync>),
    Hidden,
}

/// Snapshot of a drawer's transient UI state.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalFormHandle {
    pub is_open: bool,
    pub form_values: Record,
    pub loading: bool,
}

type OnFinish = Arc<dyn Fn(Record) -> Finish + Send + Sync>;

/// Builder for [`DrawerForm`].
pub struct DrawerBuilder {
    title: Option<String>,
    width: Option<u16>,
    submit_text: String,
    cancel_text: String,
    initial_values: Record,
    footer: Footer,
    loading: LoadingConfig,
    on_finish: Option<OnFinish>,
}

impl Default for DrawerBuilder {
    fn default() -> Self {
        Self {
            title: None,
            width: None,
            submit_text: "Confirm".to_string(),
            cancel_text: "Cancel".to_string(),
            initial_values: Record::new(),
            footer: Footer::Default,
            loading: LoadingConfig::default(),
            on_finish: None,
        }
    }
}

impl DrawerBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Confirm button label.
    pub fn submit_text(mut self, text: impl Into<String>) -> Self {
        self.submit_text = text.into();
        self
    }

    /// Cancel button label.
    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = text.into();
        self
    }

    /// Values the form starts with and resets to.
    pub fn initial_values(mut self, values: Record) -> Self {
        self.initial_values = values;
        self
    }

    pub fn footer(mut self, footer: Footer) -> Self {
        self.footer = footer;
        self
    }

    pub fn loading(mut self, loading: LoadingConfig) -> Self {
        self.loading = loading;
        self
    }

    /// Callback receiving the validated values.
    pub fn on_finish<F>(mut self, f: F) -> Self
    where
        F: Fn(Record) -> Finish + Send + Sync + 'static,
    {
        self.on_finish = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> DrawerForm {
        DrawerForm {
            inner: Arc::new(DrawerInner {
                form: FormInstance::new(self.initial_values),
                title: self.title,
                width: self.width,
                submit_text: self.submit_text,
                cancel_text: self.cancel_text,
                footer: self.footer,
                on_finish: self.on_finish,
                state: State::default(),
                loading: DelayedLoading::from_config(&self.loading),
                session: AtomicU64::new(0),
                submission: AtomicU64::new(0),
                in_flight: AtomicBool::new(false),
            }),
        }
    }
}

struct DrawerInner {
    form: FormInstance,
    title: Option<String>,
    width: Option<u16>,
    submit_text: String,
    cancel_text: String,
    footer: Footer,
    on_finish: Option<OnFinish>,
    state: State<DrawerState>,
    loading: DelayedLoading,
    /// Bumped on every open; a deferred completion only closes its own session.
    session: AtomicU64,
    /// Bumped on every deferred submission; only the latest clears loading.
    submission: AtomicU64,
    in_flight: AtomicBool,
}

/// Imperative handle over a drawer form.
///
/// Cheap to clone; the page keeps one clone to call `open`/`close`/`submit`
/// while the renderer reads state from another.
///
/// # Example
///
/// ```
/// use admin_shell::drawer::{DrawerForm, DrawerState, Finish, SubmitOutcome};
/// use admin_shell::form::FieldRules;
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let drawer = DrawerForm::builder()
///     .title("New role")
///     .on_finish(|_values| Finish::pending(async { Ok(()) }))
///     .build();
/// drawer.form().add_rules(FieldRules::new("roleName").required("Required"));
///
/// drawer.open();
/// let outcome = drawer.submit().await.unwrap();
/// assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
/// assert_eq!(drawer.state(), DrawerState::Open);
///
/// drawer.form().set_field_value("roleName", json!("auditor"));
/// assert_eq!(drawer.submit().await.unwrap(), SubmitOutcome::Closed);
/// assert_eq!(drawer.state(), DrawerState::Closed);
/// # }
/// ```
#[derive(Clone)]
pub struct DrawerForm {
    inner: Arc<DrawerInner>,
}

impl DrawerForm {
    pub fn builder() -> DrawerBuilder {
        DrawerBuilder::default()
    }

    pub fn open(&self) {
        let opened = self
            .inner
            .state
            .update(|s| {
                if *s == DrawerState::Closed {
                    *s = DrawerState::Open;
                    true
                } else {
                    false
                }
            });
        if opened {
            let session = self.inner.session.fetch_add(1, Ordering::SeqCst) + 1;
            log::debug!("Drawer {:?} opened (session {})", self.inner.title, session);
        }
    }

    /// Close without submitting. Field values are kept; call [`reset`](Self::reset)
    /// to clear them.
    pub fn close(&self) {
        self.inner.state.set(DrawerState::Closed);
        self.inner.in_flight.store(false, Ordering::SeqCst);
        log::debug!("Drawer {:?} closed", self.inner.title);
    }

    /// Restore the form's initial values.
    pub fn reset(&self) {
        self.inner.form.reset_fields();
    }

    /// The hosted form.
    pub fn form(&self) -> &FormInstance {
        &self.inner.form
    }

    /// Validate and hand the values to `on_finish`.
    pub async fn submit(&self) -> Result<SubmitOutcome, DrawerError> {
        let session = self.inner.session.load(Ordering::SeqCst);
        self.ensure_submittable()?;

        let validation = self.inner.form.validate_async().await;
        if validation.is_invalid() {
            log::debug!(
                "Drawer {:?} validation failed on {} field(s)",
                self.inner.title,
                validation.errors().len()
            );
            return Ok(SubmitOutcome::Invalid(validation));
        }

        if self.inner.session.load(Ordering::SeqCst) != session {
            return Err(DrawerError::NotOpen);
        }
        // Re-check: the drawer may have closed or another submit started
        // while async rules ran.
        self.ensure_submittable()?;

        self.inner.state.set(DrawerState::Submitting);
        let values = self.inner.form.get_fields_value();
        let finish = match &self.inner.on_finish {
            Some(on_finish) => on_finish(values),
            None => Finish::Done,
        };

        match finish {
            Finish::Done => {
                self.set_state_if_session(session, DrawerState::Submitting, DrawerState::Open);
                Ok(SubmitOutcome::Completed)
            }
            Finish::Pending(fut) => self.await_completion(session, fut).await,
        }
    }

    async fn await_completion(
        &self,
        session: u64,
        fut: BoxFuture<'static, Result<(), SubmitError>>,
    ) -> Result<SubmitOutcome, DrawerError> {
        let submission = self.inner.submission.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.in_flight.store(true, Ordering::SeqCst);
        self.inner.loading.set_true();

        let result = fut.await;

        if self.inner.submission.load(Ordering::SeqCst) == submission {
            self.inner.in_flight.store(false, Ordering::SeqCst);
            self.inner.loading.set_false();
        }

        match result {
            Ok(()) => {
                if self.set_state_if_session(session, DrawerState::Submitting, DrawerState::Closed) {
                    log::debug!("Drawer {:?} submission succeeded; closed", self.inner.title);
                    Ok(SubmitOutcome::Closed)
                } else {
                    Ok(SubmitOutcome::Detached)
                }
            }
            Err(e) => {
                log::debug!("Drawer {:?} submission failed: {}", self.inner.title, e);
                Err(DrawerError::Submission(e))
            }
        }
    }

    fn ensure_submittable(&self) -> Result<(), DrawerError> {
        if self.inner.state.get() == DrawerState::Closed {
            return Err(DrawerError::NotOpen);
        }
        if self.inner.in_flight.load(Ordering::SeqCst) {
            return Err(DrawerError::Busy);
        }
        Ok(())
    }

    /// Move `from -> to` only while the drawer is still in `session`.
    fn set_state_if_session(&self, session: u64, from: DrawerState, to: DrawerState) -> bool {
        let session_now = &self.inner.session;
        self.inner
            .state
            .update(|s| {
                if *s == from && session_now.load(Ordering::SeqCst) == session {
                    *s = to;
                    true
                } else {
                    false
                }
            })
    }

    /// Cancel button.
    pub fn press_cancel(&self) {
        self.close();
    }

    /// Confirm button.
    pub async fn press_confirm(&self) -> Result<SubmitOutcome, DrawerError> {
        self.submit().await
    }

    pub fn state(&self) -> DrawerState {
        self.inner.state.get()
    }

    pub fn is_open(&self) -> bool {
        self.state() != DrawerState::Closed
    }

    pub fn is_loading(&self) -> bool {
        self.inner.loading.get()
    }

    /// The confirm button's loading indicator.
    pub fn loading(&self) -> &DelayedLoading {
        &self.inner.loading
    }

    pub fn title(&self) -> Option<&str> {
        self.inner.title.as_deref()
    }

    pub fn width(&self) -> Option<u16> {
        self.inner.width
    }

    pub fn footer(&self) -> FooterView {
        match &self.inner.footer {
            Footer::Default => FooterView::Buttons {
                cancel: FooterButton {
                    label: self.inner.cancel_text.clone(),
                    loading: false,
                },
                confirm: FooterButton {
                    label: self.inner.submit_text.clone(),
                    loading: self.is_loading(),
                },
            },
            Footer::Custom(content) => FooterView::Custom(Arc::clone(content)),
            Footer::Hidden => FooterView::Hidden,
        }
    }

    /// Snapshot of open state, values and loading.
    pub fn handle(&self) -> ModalFormHandle {
        ModalFormHandle {
            is_open: self.is_open(),
            form_values: self.inner.form.get_fields_value(),
            loading: self.is_loading(),
        }
    }
}

impl fmt::Debug for DrawerForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawerForm")
            .field("title", &self.inner.title)
            .field("state", &self.state())
            .field("loading", &self.is_loading())
            .finish()
    }
}
