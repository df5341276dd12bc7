mod backend;
mod error;
mod menu;
mod pages;
mod paths;
mod render;
mod settings;

use std::fs::File;
use std::time::Duration;

use admin_shell::config::ShellConfig;
use admin_shell::menu::{MenuContext, MenuNode};
use admin_shell::router::{PermissionRouter, Resolution};
use admin_shell::table::FetchOutcome;
use admin_shell::value::{FieldValue, Record};
use serde_json::{Value, json};
use simplelog::{Config, WriteLogger};

use crate::backend::Backend;
use crate::error::ConsoleError;
use crate::menu::JsonMenuSource;
use crate::pages::account::AccountPage;
use crate::pages::{Page, role};
use crate::settings::ConsoleSettings;

const BACKEND_LATENCY: Duration = Duration::from_millis(120);
const MENU_LATENCY: Duration = Duration::from_millis(80);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(settings: &ConsoleSettings) -> Result<(), ConsoleError> {
    let log_file = File::create(paths::prepare_log_file())?;
    WriteLogger::init(settings.level(), Config::default(), log_file)?;
    Ok(())
}

async fn run() -> Result<(), ConsoleError> {
    let settings = ConsoleSettings::load_default()?;
    init_logging(&settings)?;
    log::info!("admin-console starting");

    let config = settings.shell;
    let backend = Backend::seeded(BACKEND_LATENCY);
    let router = pages::router()?.with_config(config.router.clone());
    let ctx = MenuContext::new();

    // Nothing resolves before a session has its menu.
    navigate(&router, &ctx, "/permis/account");

    ctx.begin_session();
    navigate(&router, &ctx, "/");
    ctx.load(&JsonMenuSource::admin(MENU_LATENCY)).await?;

    for path in ["/", "/index", "/permis/role", "/issues", "/issues/add", "/nope"] {
        navigate(&router, &ctx, path);
    }

    if navigate(&router, &ctx, "/permis/account/") == Some(Page::Accounts) {
        accounts(&backend, &config).await?;
    }

    // A second session whose menu grants the role page.
    ctx.end_session();
    navigate(&router, &ctx, "/index");
    ctx.begin_session();
    ctx.install(&[
        MenuNode::new("/index"),
        MenuNode::new("/permis").child(MenuNode::new("/permis/role")),
    ]);
    navigate(&router, &ctx, "/permis/account");
    if navigate(&router, &ctx, "/permis/role") == Some(Page::Roles) {
        roles(&backend, &config).await?;
    }

    ctx.end_session();
    log::info!("admin-console finished");
    Ok(())
}

/// Resolve `path`, print the decision and return the page to render.
fn navigate(router: &PermissionRouter<Page>, ctx: &MenuContext, path: &str) -> Option<Page> {
    let resolution = router.resolve(path, ctx);
    println!("{}", render::resolution(path, &resolution));
    match resolution {
        Resolution::Render { component, .. } => Some(*component),
        Resolution::Redirect(to) => navigate(router, ctx, &to),
        _ => None,
    }
}

async fn accounts(backend: &Backend, config: &ShellConfig) -> Result<(), ConsoleError> {
    let page = AccountPage::new(backend.clone(), config)?;
    page.table.mount().await?;
    println!("{}\n", render::table(&page.table.layout()));

    page.table.set_search_value("gender", FieldValue::select(2))?;
    page.table.submit_search().await?;
    println!("{}\n", render::table(&page.table.layout()));

    // Two page changes in flight: only the later one is displayed.
    let first = tokio::spawn({
        let table = page.table.clone();
        async move { table.set_page(2).await }
    });
    tokio::task::yield_now().await;
    page.table.set_page_size(20).await?;
    if let Ok(Ok(FetchOutcome::Stale)) = first.await {
        println!("page 2 response arrived late and was dropped");
    }
    println!("{}\n", render::table(&page.table.layout()));

    page.table.reset_search().await?;

    let invalid = page
        .create_account(record(json!({ "name": "Mo Tan", "account": "mo", "phone": "555" })))
        .await?;
    println!("{:?}", invalid);
    println!("{}", render::drawer(&page.create));
    page.create.press_cancel();
    page.create.reset();

    let created = page
        .create_account(record(json!({
            "name": "Mo Tan",
            "account": "motan",
            "email": "motan@example.com",
            "phone": "13800000013",
        })))
        .await?;
    println!("{:?}", created);
    println!("{}\n", render::table(&page.table.layout()));

    match page
        .create_account(record(json!({ "name": "Ann Again", "account": "ann" })))
        .await
    {
        Ok(outcome) => println!("{:?}", outcome),
        Err(e) => {
            log::error!("Create account failed: {}", e);
            println!("create failed: {}", e);
        }
    }
    println!("{}", render::drawer(&page.create));
    page.create.press_cancel();
    Ok(())
}

async fn roles(backend: &Backend, config: &ShellConfig) -> Result<(), ConsoleError> {
    let table = role::table(backend.clone(), config)?;
    table.mount().await?;
    println!("{}\n", render::table(&table.layout()));

    table.set_search_value("status", FieldValue::select("1"))?;
    table.submit_search().await?;
    println!("{}", render::table(&table.layout()));
    Ok(())
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}
