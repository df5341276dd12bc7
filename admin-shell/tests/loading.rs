//! Tests for the minimum-duration loading flag.

use std::time::Duration;

use admin_shell::config::LoadingConfig;
use admin_shell::loading::DelayedLoading;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_stays_true_until_minimum_elapsed() {
    let loading = DelayedLoading::new(Duration::from_millis(300));
    loading.set_true();
    sleep(Duration::from_millis(100)).await;
    loading.set_false();
    assert!(loading.get());

    sleep(Duration::from_millis(150)).await;
    assert!(loading.get());

    sleep(Duration::from_millis(60)).await;
    assert!(!loading.get());
}

#[tokio::test(start_paused = true)]
async fn test_clears_at_once_after_minimum() {
    let loading = DelayedLoading::default();
    loading.set_true();
    sleep(Duration::from_millis(400)).await;
    loading.set_false();
    assert!(!loading.get());
}

#[tokio::test(start_paused = true)]
async fn test_set_true_cancels_pending_clear() {
    let loading = DelayedLoading::new(Duration::from_millis(300));
    loading.set_true();
    loading.set_false();

    sleep(Duration::from_millis(200)).await;
    loading.set_true();

    // The first clear would have fired at 300ms.
    sleep(Duration::from_millis(200)).await;
    assert!(loading.get());

    loading.set_false();
    sleep(Duration::from_millis(110)).await;
    assert!(!loading.get());
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_changes() {
    let config = LoadingConfig::default().with_min_duration(Duration::from_millis(50));
    let loading = DelayedLoading::from_config(&config);
    let mut rx = loading.subscribe();

    loading.set_true();
    rx.changed().await.unwrap();
    assert!(*rx.borrow_and_update());

    loading.set_false();
    rx.changed().await.unwrap();
    assert!(!*rx.borrow());
    assert!(loading.is_dirty());
}
