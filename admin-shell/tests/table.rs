//! Tests for the table engine's query lifecycle.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use admin_shell::column::{Cell, ColumnDescriptor, Fixed, SelectOption};
use admin_shell::table::{
    FetchError, FetchOutcome, FetchResult, Pagination, ProTable, TableError, ToolbarSlot,
    request_fn,
};
use admin_shell::value::{FieldValue, Filters, Record};
use serde_json::{Value, json};

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("name", "Name"),
        ColumnDescriptor::new("status", "Status").select(vec![
            SelectOption::new("Enabled", 1),
            SelectOption::new("Disabled", 0),
        ]),
        ColumnDescriptor::new("action", "Actions")
            .render(|_, row| Cell::Actions(vec![format!("Edit {}", row["name"])]))
            .hide_in_search()
            .fixed(Fixed::Right),
        ColumnDescriptor::new("id", "ID").fixed(Fixed::Left).hide_in_search(),
    ]
}

type Calls = Arc<Mutex<Vec<(Filters, Pagination)>>>;

/// A table over `total` rows that records every request it receives.
fn recording_table(total: Arc<AtomicU64>) -> (ProTable, Calls) {
    let calls: Calls = Arc::default();
    let log = Arc::clone(&calls);
    let table = ProTable::builder(
        columns(),
        request_fn(move |filters: Filters, page: Pagination| {
            log.lock().unwrap().push((filters, page));
            let total = total.load(Ordering::SeqCst);
            async move {
                let start = u64::from(page.current - 1) * u64::from(page.page_size);
                let end = (start + u64::from(page.page_size)).min(total);
                let list = (start..end)
                    .map(|i| record(json!({ "id": i, "name": format!("user{i}") })))
                    .collect();
                Ok::<_, FetchError>(FetchResult::new(list, total))
            }
        }),
    )
    .build()
    .unwrap();
    (table, calls)
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() {
    let table = ProTable::builder(
        columns(),
        request_fn(|filters: Filters, _page: Pagination| async move {
            let tag = match filters.get("name") {
                Some(FieldValue::Text(t)) => t.clone(),
                _ => String::new(),
            };
            let delay = if tag == "A" { 500 } else { 50 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok::<_, FetchError>(FetchResult::new(
                vec![record(json!({ "id": 1, "name": tag }))],
                1,
            ))
        }),
    )
    .build()
    .unwrap();

    table.set_search_value("name", FieldValue::text("A")).unwrap();
    let slow = tokio::spawn({
        let table = table.clone();
        async move { table.submit_search().await }
    });
    // Let A get issued before B.
    tokio::task::yield_now().await;

    table.set_search_value("name", FieldValue::text("B")).unwrap();
    assert_eq!(table.submit_search().await.unwrap(), FetchOutcome::Applied);
    assert_eq!(table.rows()[0]["name"], json!("B"));

    assert_eq!(slow.await.unwrap().unwrap(), FetchOutcome::Stale);
    assert_eq!(table.rows()[0]["name"], json!("B"));
}

#[tokio::test(start_paused = true)]
async fn test_stale_failure_is_discarded() {
    let table = ProTable::builder(
        columns(),
        request_fn(|filters: Filters, _page: Pagination| async move {
            if filters.contains_key("name") {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Err(FetchError::new("boom"))
            } else {
                Ok(FetchResult::new(vec![record(json!({ "id": 7 }))], 1))
            }
        }),
    )
    .build()
    .unwrap();

    table.set_search_value("name", FieldValue::text("x")).unwrap();
    let failing = tokio::spawn({
        let table = table.clone();
        async move { table.submit_search().await }
    });
    tokio::task::yield_now().await;

    table.reset_search().await.unwrap();
    assert_eq!(failing.await.unwrap().unwrap(), FetchOutcome::Stale);
    assert_eq!(table.rows().len(), 1);
}

#[tokio::test]
async fn test_mount_uses_defaults() {
    let (table, calls) = recording_table(Arc::new(AtomicU64::new(35)));
    table.mount().await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.is_empty());
    assert_eq!(calls[0].1, Pagination { current: 1, page_size: 10 });
    assert_eq!(table.rows().len(), 10);
    assert_eq!(table.total(), Some(35));
    assert_eq!(table.page_count(), 4);
}

#[tokio::test]
async fn test_search_and_paging_rules() {
    let (table, calls) = recording_table(Arc::new(AtomicU64::new(100)));
    table.mount().await.unwrap();

    table.set_page(3).await.unwrap();
    table.set_search_value("status", FieldValue::select(1)).unwrap();
    table.set_search_value("name", FieldValue::text("   ")).unwrap();
    table.submit_search().await.unwrap();
    assert_eq!(table.query().page, 1);
    // Blank text never reaches the filters.
    assert_eq!(table.query().filters.len(), 1);

    table.set_page(4).await.unwrap();
    assert_eq!(table.query().filters.len(), 1, "page change keeps filters");

    table.set_page_size(20).await.unwrap();
    assert_eq!(table.query().page, 1);
    assert_eq!(table.query().page_size, 20);
    assert_eq!(table.query().filters.len(), 1, "page size change keeps filters");

    table.set_page(2).await.unwrap();
    table.reset_search().await.unwrap();
    assert_eq!(table.query().page, 1);
    assert!(table.query().filters.is_empty());
    assert!(table.search_form().value("status").is_none());

    let last = calls.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.1, Pagination { current: 1, page_size: 20 });
}

#[tokio::test]
async fn test_change_pagination_prefers_size_change() {
    let (table, _) = recording_table(Arc::new(AtomicU64::new(100)));
    table.mount().await.unwrap();
    table.change_pagination(5, 10).await.unwrap();
    assert_eq!(table.query().page, 5);
    table.change_pagination(5, 50).await.unwrap();
    assert_eq!(table.query().page, 1);
    assert_eq!(table.query().page_size, 50);
}

#[tokio::test]
async fn test_out_of_range_page_is_clamped_on_next_fetch() {
    let total = Arc::new(AtomicU64::new(100));
    let (table, calls) = recording_table(Arc::clone(&total));
    table.mount().await.unwrap();
    table.set_page(10).await.unwrap();

    total.store(15, Ordering::SeqCst);
    table.reload().await.unwrap();
    assert_eq!(table.rows().len(), 0);

    table.reload().await.unwrap();
    assert_eq!(table.query().page, 2);
    assert_eq!(calls.lock().unwrap().last().unwrap().1.current, 2);
    assert_eq!(table.rows().len(), 5);
}

#[tokio::test]
async fn test_invalid_page_input_is_rejected() {
    let (table, calls) = recording_table(Arc::new(AtomicU64::new(10)));
    assert!(matches!(table.set_page(0).await, Err(TableError::InvalidPage)));
    assert!(matches!(
        table.set_page_size(0).await,
        Err(TableError::InvalidPageSize)
    ));
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failure_keeps_rows_and_clears_loading() {
    let fail = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&fail);
    let table = ProTable::builder(
        columns(),
        request_fn(move |_filters: Filters, _page: Pagination| {
            let fail = flag.load(Ordering::SeqCst);
            async move {
                if fail {
                    Err(FetchError::new("service unavailable"))
                } else {
                    Ok(FetchResult::new(vec![record(json!({ "id": 1, "name": "ann" }))], 1))
                }
            }
        }),
    )
    .build()
    .unwrap();

    table.mount().await.unwrap();
    fail.store(true, Ordering::SeqCst);

    let err = table.reload().await.unwrap_err();
    assert_eq!(err.to_string(), "fetch failed: service unavailable");
    assert_eq!(table.rows()[0]["name"], json!("ann"));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!table.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_loading_stays_visible_for_minimum_duration() {
    let table = ProTable::builder(
        columns(),
        request_fn(|_filters: Filters, _page: Pagination| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, FetchError>(FetchResult::new(Vec::new(), 0))
        }),
    )
    .build()
    .unwrap();

    table.mount().await.unwrap();
    assert!(table.is_loading());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(table.is_loading());
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!table.is_loading());
}

#[tokio::test]
async fn test_oversized_result_is_truncated() {
    let table = ProTable::builder(
        columns(),
        request_fn(|_filters: Filters, _page: Pagination| async {
            let list = (0..15).map(|i| record(json!({ "id": i }))).collect();
            Ok::<_, FetchError>(FetchResult::new(list, 15))
        }),
    )
    .build()
    .unwrap();

    table.mount().await.unwrap();
    assert_eq!(table.rows().len(), 10);
}

#[tokio::test]
async fn test_layout_orders_columns_and_renders_cells() {
    let table = ProTable::builder(
        columns(),
        request_fn(|_filters: Filters, _page: Pagination| async {
            Ok::<_, FetchError>(FetchResult::new(
                vec![record(json!({ "id": 9, "name": "ann", "status": 1 }))],
                1,
            ))
        }),
    )
    .header_title("Accounts")
    .toolbar(ToolbarSlot::new("create", "New account"))
    .build()
    .unwrap();
    table.mount().await.unwrap();

    let layout = table.layout();
    assert_eq!(layout.header_title.as_deref(), Some("Accounts"));
    assert_eq!(layout.toolbar[0].content::<&str>(), Some(&"New account"));

    let keys: Vec<&str> = layout.columns.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, ["id", "name", "status", "action"]);

    let search: Vec<&str> = layout.search_fields.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(search, ["name", "status"]);

    let row = &layout.rows[0];
    assert_eq!(row.key.as_deref(), Some("9"));
    assert_eq!(row.cells[1], Cell::Raw(json!("ann")));
    assert_eq!(row.cells[3], Cell::Actions(vec!["Edit \"ann\"".to_string()]));

    assert_eq!(layout.pagination.total, Some(1));
    assert_eq!(layout.pagination.page_count, 1);
    assert_eq!(layout.pagination.page_size_options, vec![10, 20, 50, 100]);
}
