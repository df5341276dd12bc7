//! Tests for the drawer form's open/submit lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use admin_shell::drawer::{
    DrawerError, DrawerForm, DrawerState, Finish, Footer, FooterView, SubmitError, SubmitOutcome,
};
use admin_shell::form::FieldRules;
use serde_json::json;

fn account_drawer(finish: impl Fn() -> Finish + Send + Sync + 'static) -> DrawerForm {
    let drawer = DrawerForm::builder()
        .title("New account")
        .initial_values(json!({ "status": 1 }).as_object().cloned().unwrap())
        .on_finish(move |_values| finish())
        .build();
    drawer
        .form()
        .add_rules(FieldRules::new("account").required("Account is required"));
    drawer
}

fn delayed(ms: u64, result: Result<(), SubmitError>) -> Finish {
    Finish::pending(async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        result
    })
}

#[tokio::test]
async fn test_invalid_submit_stays_open() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let drawer = account_drawer(move || {
        seen.fetch_add(1, Ordering::SeqCst);
        Finish::Done
    });

    drawer.open();
    let outcome = drawer.submit().await.unwrap();
    let SubmitOutcome::Invalid(result) = &outcome else {
        panic!("expected validation failure, got {outcome:?}");
    };
    assert_eq!(result.error_for("account"), Some("Account is required"));
    assert_eq!(
        drawer.form().field_error("account").as_deref(),
        Some("Account is required")
    );
    assert_eq!(drawer.state(), DrawerState::Open);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sync_finish_does_not_close() {
    let drawer = account_drawer(|| Finish::Done);
    drawer.open();
    drawer.form().set_field_value("account", json!("ann"));

    assert_eq!(drawer.submit().await.unwrap(), SubmitOutcome::Completed);
    assert_eq!(drawer.state(), DrawerState::Open);
    assert!(!drawer.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_resolving_finish_closes_and_clears_loading() {
    let drawer = account_drawer(|| delayed(1000, Ok(())));
    drawer.open();
    drawer.form().set_field_value("account", json!("ann"));

    let task = tokio::spawn({
        let drawer = drawer.clone();
        async move { drawer.submit().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(drawer.state(), DrawerState::Submitting);
    assert!(drawer.is_loading());

    assert_eq!(task.await.unwrap().unwrap(), SubmitOutcome::Closed);
    assert_eq!(drawer.state(), DrawerState::Closed);
    assert!(!drawer.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_rejecting_finish_stays_open_and_allows_retry() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let drawer = account_drawer(move || {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            delayed(500, Err(SubmitError::new("account exists")))
        } else {
            delayed(500, Ok(()))
        }
    });
    drawer.open();
    drawer.form().set_field_value("account", json!("ann"));

    let err = drawer.submit().await.unwrap_err();
    assert!(matches!(err, DrawerError::Submission(ref e) if e.message == "account exists"));
    assert!(drawer.is_open());
    assert_eq!(drawer.state(), DrawerState::Submitting);
    assert!(!drawer.is_loading());

    assert_eq!(drawer.submit().await.unwrap(), SubmitOutcome::Closed);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_second_submit_while_in_flight_is_busy() {
    let drawer = account_drawer(|| delayed(1000, Ok(())));
    drawer.open();
    drawer.form().set_field_value("account", json!("ann"));

    let task = tokio::spawn({
        let drawer = drawer.clone();
        async move { drawer.submit().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(matches!(drawer.submit().await, Err(DrawerError::Busy)));
    assert_eq!(task.await.unwrap().unwrap(), SubmitOutcome::Closed);
}

#[tokio::test]
async fn test_submit_while_closed_is_refused() {
    let drawer = account_drawer(|| Finish::Done);
    assert!(matches!(drawer.submit().await, Err(DrawerError::NotOpen)));
}

#[tokio::test(start_paused = true)]
async fn test_late_completion_does_not_close_new_session() {
    let drawer = account_drawer(|| delayed(1000, Ok(())));
    drawer.open();
    drawer.form().set_field_value("account", json!("ann"));

    let task = tokio::spawn({
        let drawer = drawer.clone();
        async move { drawer.submit().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    drawer.close();
    drawer.open();
    assert_eq!(task.await.unwrap().unwrap(), SubmitOutcome::Detached);
    assert_eq!(drawer.state(), DrawerState::Open);
}

#[tokio::test]
async fn test_close_keeps_values_until_reset() {
    let drawer = account_drawer(|| Finish::Done);
    drawer.open();
    drawer.form().set_field_value("account", json!("ann"));
    drawer.press_cancel();
    assert!(!drawer.is_open());

    drawer.open();
    assert_eq!(drawer.form().get_field_value("account"), Some(json!("ann")));

    drawer.reset();
    assert_eq!(drawer.form().get_field_value("account"), None);
    assert_eq!(drawer.handle().form_values["status"], json!(1));
}

#[test]
fn test_footer_variants() {
    let drawer = DrawerForm::builder().submit_text("Save").build();
    let FooterView::Buttons { cancel, confirm } = drawer.footer() else {
        panic!("expected default footer");
    };
    assert_eq!(cancel.label, "Cancel");
    assert_eq!(confirm.label, "Save");
    assert!(!confirm.loading);

    let hidden = DrawerForm::builder().footer(Footer::Hidden).build();
    assert!(matches!(hidden.footer(), FooterView::Hidden));

    let custom = DrawerForm::builder()
        .footer(Footer::Custom(Arc::new("Close only")))
        .build();
    let FooterView::Custom(content) = custom.footer() else {
        panic!("expected custom footer");
    };
    assert_eq!(content.downcast_ref::<&str>(), Some(&"Close only"));
}
