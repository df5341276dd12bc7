//! Account management page: the account table and the "new account" drawer.

use admin_shell::column::{Cell, ColumnDescriptor, ColumnError, Fixed, SelectOption};
use admin_shell::config::ShellConfig;
use admin_shell::drawer::{DrawerForm, Finish, SubmitError, SubmitOutcome};
use admin_shell::form::FieldRules;
use admin_shell::table::{ProTable, ToolbarSlot};
use admin_shell::value::Record;
use serde_json::{Value, json};

use super::{CollectionRequest, row_actions, status_switch};
use crate::backend::Backend;
use crate::error::ConsoleError;

pub fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("name", "Real name"),
        ColumnDescriptor::new("account", "Account"),
        ColumnDescriptor::new("gender", "Gender")
            .select(vec![
                SelectOption::new("Male", 1),
                SelectOption::new("Female", 2),
            ])
            .render(|raw, _| match raw.as_i64() {
                Some(1) => Cell::Tag {
                    text: "Male".to_string(),
                    color: Some("#2db7f5".to_string()),
                },
                Some(2) => Cell::Tag {
                    text: "Female".to_string(),
                    color: Some("magenta".to_string()),
                },
                _ => Cell::Raw(raw.clone()),
            }),
        ColumnDescriptor::new("phone", "Phone"),
        ColumnDescriptor::new("email", "Email"),
        ColumnDescriptor::new("status", "Status")
            .select(vec![
                SelectOption::new("Enabled", 1),
                SelectOption::new("Disabled", 0),
            ])
            .render(|raw, _| status_switch(raw)),
        ColumnDescriptor::new("action", "Actions")
            .render(|_, _| row_actions())
            .width(100)
            .fixed(Fixed::Right)
            .hide_in_search(),
    ]
}

/// The account list with its create drawer.
#[derive(Debug, Clone)]
pub struct AccountPage {
    pub table: ProTable,
    pub create: DrawerForm,
}

impl AccountPage {
    pub fn new(backend: Backend, config: &ShellConfig) -> Result<Self, ColumnError> {
        let table = ProTable::builder(columns(), CollectionRequest::new(backend.clone(), "account"))
            .config(config.table.clone())
            .loading(config.loading.clone())
            .header_title("Users")
            .toolbar(ToolbarSlot::new("create", "New"))
            .build()?;

        let create = DrawerForm::builder()
            .title("New account")
            .width(520)
            .loading(config.loading.clone())
            .initial_values(initial_values())
            .on_finish(move |values| {
                let backend = backend.clone();
                Finish::pending(async move {
                    backend
                        .post("/api/account/add", Value::Object(values))
                        .await
                        .map(|_| ())
                        .map_err(|e| SubmitError::new(e.to_string()))
                })
            })
            .build();

        let form = create.form();
        form.add_rules(FieldRules::new("name").required("Enter the real name"));
        form.add_rules(
            FieldRules::new("account")
                .required("Enter an account")
                .min_length(3, "Accounts are at least 3 characters")
                .max_length(20, "Accounts are at most 20 characters"),
        );
        form.add_rules(FieldRules::new("email").email("Enter a valid email"));
        match FieldRules::new("phone").pattern(r"^\d{11}$", "Phone numbers have 11 digits") {
            Ok(rules) => form.add_rules(rules),
            Err(e) => log::error!("Phone rule disabled: {}", e),
        }

        Ok(Self { table, create })
    }

    /// Fill the create drawer with `values` and submit it. A successful
    /// creation closes the drawer, resets it and reloads the table.
    pub async fn create_account(&self, values: Record) -> Result<SubmitOutcome, ConsoleError> {
        self.create.open();
        self.create.form().set_fields_value(values);
        let outcome = self.create.press_confirm().await?;
        if outcome == SubmitOutcome::Closed {
            self.create.reset();
            self.table.reload().await?;
        }
        Ok(outcome)
    }
}

fn initial_values() -> Record {
    match json!({ "gender": 1, "status": 1 }) {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}
