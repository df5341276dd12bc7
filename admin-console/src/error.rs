use admin_shell::column::ColumnError;
use admin_shell::config::ConfigError;
use admin_shell::drawer::DrawerError;
use admin_shell::menu::MenuError;
use admin_shell::router::RouterError;
use admin_shell::search::SearchError;
use admin_shell::table::TableError;
use thiserror::Error;

/// Top-level console failure.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("logger: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("log file: {0}")]
    LogFile(#[from] std::io::Error),
    #[error("columns: {0}")]
    Columns(#[from] ColumnError),
    #[error("routes: {0}")]
    Routes(#[from] RouterError),
    #[error("menu: {0}")]
    Menu(#[from] MenuError),
    #[error("search: {0}")]
    Search(#[from] SearchError),
    #[error("table: {0}")]
    Table(#[from] TableError),
    #[error("drawer: {0}")]
    Drawer(#[from] DrawerError),
}
