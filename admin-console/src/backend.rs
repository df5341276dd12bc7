//! In-process stand-in for the console's HTTP API.
//!
//! Speaks the same JSON shapes as the real service: paged queries take
//! `{params, pageIndex, pageSize}` and answer `{result: {records, total}}`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use admin_shell::value::Record;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("no such endpoint: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::BadRequest(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageRequest {
    #[serde(default)]
    params: Record,
    page_index: u32,
    page_size: u32,
}

/// Simulated service with in-memory collections.
#[derive(Debug, Clone)]
pub struct Backend {
    collections: Arc<RwLock<HashMap<String, Vec<Record>>>>,
    latency: Duration,
}

impl Backend {
    pub fn new(latency: Duration) -> Self {
        Self {
            collections: Arc::default(),
            latency,
        }
    }

    /// Backend preloaded with a few accounts and roles.
    pub fn seeded(latency: Duration) -> Self {
        let backend = Self::new(latency);
        if let Ok(mut collections) = backend.collections.try_write() {
            collections.insert("account".to_string(), seed_accounts());
            collections.insert("role".to_string(), seed_roles());
        }
        backend
    }

    /// POST `body` to `path`.
    pub async fn post(&self, path: &str, body: Value) -> Result<Value, BackendError> {
        tokio::time::sleep(self.latency).await;
        log::debug!("POST {} {}", path, body);

        let mut segments = path.trim_start_matches('/').split('/');
        match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some("api"), Some(collection), Some("page"), None) => {
                self.page(collection, serde_json::from_value(body)?).await
            }
            (Some("api"), Some(collection), Some("add"), None) => {
                self.add(collection, body).await
            }
            _ => Err(BackendError::NotFound(path.to_string())),
        }
    }

    async fn page(&self, collection: &str, req: PageRequest) -> Result<Value, BackendError> {
        let collections = self.collections.read().await;
        let rows = collections
            .get(collection)
            .ok_or_else(|| BackendError::NotFound(collection.to_string()))?;

        let matching: Vec<&Record> = rows.iter().filter(|r| matches(r, &req.params)).collect();
        let size = req.page_size.max(1) as usize;
        let start = (req.page_index.max(1) as usize - 1) * size;
        let records: Vec<&Record> = matching.iter().skip(start).take(size).copied().collect();

        Ok(json!({
            "result": {
                "records": records,
                "total": matching.len(),
            }
        }))
    }

    async fn add(&self, collection: &str, body: Value) -> Result<Value, BackendError> {
        let Value::Object(mut record) = body else {
            return Err(BackendError::BadRequest("expected an object".to_string()));
        };
        let mut collections = self.collections.write().await;
        let rows = collections.entry(collection.to_string()).or_default();

        if collection == "account" {
            let account = record.get("account").cloned();
            if rows.iter().any(|r| r.get("account") == account.as_ref()) {
                return Err(BackendError::Conflict(format!(
                    "account {} already exists",
                    account.unwrap_or(Value::Null)
                )));
            }
        }

        let id = rows
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_u64))
            .max()
            .unwrap_or(0)
            + 1;
        record.insert("id".to_string(), json!(id));
        rows.push(record);
        Ok(json!({ "result": { "id": id } }))
    }
}

/// Text params match by substring, everything else by equality.
fn matches(row: &Record, params: &Record) -> bool {
    params.iter().all(|(key, want)| match (row.get(key), want) {
        (Some(Value::String(have)), Value::String(want)) => have.contains(want.as_str()),
        // Select options may be strings while stored values are numbers.
        (Some(have), Value::String(want)) => have.to_string() == *want,
        (Some(have), want) => have == want,
        (None, _) => false,
    })
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

fn seed_accounts() -> Vec<Record> {
    let names = [
        ("Ann Lee", "ann", 2),
        ("Bo Chen", "bo", 1),
        ("Cai Wen", "cai", 2),
        ("Dan Ho", "dan", 1),
        ("Eli Park", "eli", 1),
        ("Fay Lin", "fay", 2),
        ("Gus Ma", "gus", 1),
        ("Hua Xu", "hua", 2),
        ("Ivy Qin", "ivy", 2),
        ("Jon Wu", "jon", 1),
        ("Kai Sun", "kai", 1),
        ("Lia Zhou", "lia", 2),
    ];
    names
        .iter()
        .enumerate()
        .map(|(i, (name, account, gender))| {
            record(json!({
                "id": i + 1,
                "name": name,
                "account": account,
                "gender": gender,
                "phone": format!("1380000{:04}", i + 1),
                "email": format!("{account}@example.com"),
                "status": if i % 4 == 3 { 0 } else { 1 },
            }))
        })
        .collect()
}

fn seed_roles() -> Vec<Record> {
    [
        ("admin", "Full access"),
        ("auditor", "Read-only access to logs"),
        ("operator", "Day-to-day operations"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, description))| {
        record(json!({
            "id": i + 1,
            "roleName": name,
            "description": description,
            "status": if i == 1 { "0" } else { "1" },
        }))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_page_filters_and_slices() {
        let backend = Backend::seeded(Duration::ZERO);
        let body = json!({ "params": { "gender": 2 }, "pageIndex": 2, "pageSize": 4 });
        let response = backend.post("/api/account/page", body).await.unwrap();
        assert_eq!(response["result"]["total"], json!(6));
        assert_eq!(response["result"]["records"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_text_params_match_substrings() {
        let backend = Backend::seeded(Duration::ZERO);
        let body = json!({ "params": { "name": "Wu" }, "pageIndex": 1, "pageSize": 10 });
        let response = backend.post("/api/account/page", body).await.unwrap();
        assert_eq!(response["result"]["total"], json!(1));
    }

    #[tokio::test]
    async fn test_duplicate_account_conflicts() {
        let backend = Backend::seeded(Duration::ZERO);
        let err = backend
            .post("/api/account/add", json!({ "account": "ann" }))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Conflict(_)));

        let ok = backend
            .post("/api/account/add", json!({ "account": "zed" }))
            .await
            .unwrap();
        assert_eq!(ok["result"]["id"], json!(13));
    }

    #[tokio::test]
    async fn test_unknown_endpoint() {
        let backend = Backend::new(Duration::ZERO);
        assert!(matches!(
            backend.post("/api/nothing", json!({})).await,
            Err(BackendError::NotFound(_))
        ));
    }
}
