//! Menu source backed by the permission service's JSON payload.

use std::time::Duration;

use admin_shell::menu::{MenuError, MenuNode, MenuSource};
use async_trait::async_trait;

/// Menu the simulated permission service hands to a signed-in administrator.
/// The role page is left out so it resolves to 401.
const ADMIN_MENU: &str = r#"[
    { "path": "/index", "name": "Dashboard" },
    {
        "path": "/permis",
        "name": "Permissions",
        "children": [
            { "path": "/permis/account", "name": "Accounts" }
        ]
    }
]"#;

/// Menu served from a JSON document after a fixed delay.
pub struct JsonMenuSource {
    json: String,
    latency: Duration,
}

impl JsonMenuSource {
    pub fn new(json: impl Into<String>, latency: Duration) -> Self {
        Self {
            json: json.into(),
            latency,
        }
    }

    pub fn admin(latency: Duration) -> Self {
        Self::new(ADMIN_MENU, latency)
    }
}

#[async_trait]
impl MenuSource for JsonMenuSource {
    async fn fetch_menu(&self) -> Result<Vec<MenuNode>, MenuError> {
        tokio::time::sleep(self.latency).await;
        Ok(serde_json::from_str(&self.json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_shell::menu::flatten;

    #[tokio::test]
    async fn test_admin_menu_parses() {
        let tree = JsonMenuSource::admin(Duration::ZERO).fetch_menu().await.unwrap();
        let set = flatten(&tree);
        assert!(set.is_authorized("/permis/account"));
        assert!(!set.is_authorized("/permis/role"));
    }
}
