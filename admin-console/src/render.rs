//! Plain-text rendering of the shell's view snapshots.

use std::fmt::Write;

use admin_shell::drawer::{DrawerForm, FooterView};
use admin_shell::router::Resolution;
use admin_shell::search::SearchWidget;
use admin_shell::table::TableLayout;

use crate::pages::Page;

/// One line describing what the router decided for `path`.
pub fn resolution(path: &str, resolution: &Resolution<'_, Page>) -> String {
    match resolution {
        Resolution::Loading => format!("{path}: loading..."),
        Resolution::Render {
            route,
            component,
            params,
        } if params.is_empty() => format!("{path}: {component:?} (route {route})"),
        Resolution::Render {
            route,
            component,
            params,
        } => format!("{path}: {component:?} (route {route}, params {params:?})"),
        Resolution::Unauthorized { route } => format!("{path}: 401 not authorized for {route}"),
        Resolution::Redirect(to) => format!("{path}: redirect to {to}"),
        Resolution::NotFound => format!("{path}: 404 not found"),
    }
}

/// Title, search fields, grid and pagination as text.
pub fn table(layout: &TableLayout) -> String {
    let mut out = String::new();
    let title = layout.header_title.as_deref().unwrap_or("");
    let toolbar: Vec<&str> = layout
        .toolbar
        .iter()
        .map(|slot| slot.content::<&str>().copied().unwrap_or(slot.key.as_str()))
        .collect();
    let _ = writeln!(out, "== {} == [{}]", title, toolbar.join("] ["));

    let search: Vec<String> = layout
        .search_fields
        .iter()
        .map(|f| {
            let widget = match &f.widget {
                SearchWidget::TextInput => "text".to_string(),
                SearchWidget::Select(options) => {
                    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
                    labels.join("/")
                }
                SearchWidget::DateRangePicker => "from..to".to_string(),
                SearchWidget::DatePicker => "date".to_string(),
                SearchWidget::NumberInput => "number".to_string(),
            };
            format!("{}<{}>", f.label, widget)
        })
        .collect();
    let _ = writeln!(out, "search: {}", search.join("  "));

    let widths: Vec<usize> = layout
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let cells = layout
                .rows
                .iter()
                .filter_map(|r| r.cells.get(i))
                .map(|cell| cell.to_string().chars().count());
            cells
                .chain(std::iter::once(c.label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = layout
        .columns
        .iter()
        .zip(widths.iter().copied())
        .map(|(c, w)| format!("{:<w$}", c.label, w = w))
        .collect();
    let _ = writeln!(out, "{}", header.join(" | "));
    for row in &layout.rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, w)| format!("{:<w$}", cell.to_string(), w = w))
            .collect();
        let _ = writeln!(out, "{}", cells.join(" | "));
    }

    let p = &layout.pagination;
    let _ = write!(
        out,
        "page {}/{} ({} per page, {} total){}",
        p.page,
        p.page_count,
        p.page_size,
        p.total.map_or_else(|| "?".to_string(), |t| t.to_string()),
        if layout.loading { " loading" } else { "" }
    );
    out
}

/// Drawer title, state, values and footer as text.
pub fn drawer(drawer: &DrawerForm) -> String {
    let handle = drawer.handle();
    let footer = match drawer.footer() {
        FooterView::Buttons { cancel, confirm } => format!(
            "[{}] [{}{}]",
            cancel.label,
            confirm.label,
            if confirm.loading { "..." } else { "" }
        ),
        FooterView::Custom(_) => "[custom]".to_string(),
        FooterView::Hidden => String::new(),
    };
    let errors: Vec<String> = drawer
        .form()
        .errors()
        .into_iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect();
    format!(
        "{} ({:?}) values {} errors [{}] {}",
        drawer.title().unwrap_or("drawer"),
        drawer.state(),
        serde_json::Value::Object(handle.form_values),
        errors.join(", "),
        footer
    )
}
