//! Role management page.

use admin_shell::column::{ColumnDescriptor, ColumnError, Fixed, SelectOption};
use admin_shell::config::ShellConfig;
use admin_shell::table::{ProTable, ToolbarSlot};

use super::{CollectionRequest, row_actions, status_switch};
use crate::backend::Backend;

pub fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("roleName", "Role name"),
        ColumnDescriptor::new("description", "Description").hide_in_search(),
        // Role status values are strings on the wire.
        ColumnDescriptor::new("status", "Status")
            .select(vec![
                SelectOption::new("Enabled", "1"),
                SelectOption::new("Disabled", "0"),
            ])
            .render(|raw, _| status_switch(raw)),
        ColumnDescriptor::new("action", "Actions")
            .render(|_, _| row_actions())
            .width(100)
            .fixed(Fixed::Right)
            .hide_in_search(),
    ]
}

pub fn table(backend: Backend, config: &ShellConfig) -> Result<ProTable, ColumnError> {
    ProTable::builder(columns(), CollectionRequest::new(backend, "role"))
        .config(config.table.clone())
        .loading(config.loading.clone())
        .header_title("Roles")
        .toolbar(ToolbarSlot::new("add", "New"))
        .build()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use admin_shell::column::Cell;
    use admin_shell::value::FieldValue;

    #[tokio::test]
    async fn test_status_filter_uses_string_values() {
        let table = table(Backend::seeded(Duration::ZERO), &ShellConfig::default()).unwrap();
        assert!(table.set_search_value("status", FieldValue::select(0)).is_err());

        table.set_search_value("status", FieldValue::select("0")).unwrap();
        table.submit_search().await.unwrap();
        assert_eq!(table.total(), Some(1));
        assert_eq!(table.rendered_rows()[0].cells[2], Cell::Switch(false));
    }

    #[test]
    fn test_description_not_searchable() {
        let table = table(Backend::new(Duration::ZERO), &ShellConfig::default()).unwrap();
        assert!(table.search_form().field("description").is_none());
    }
}
