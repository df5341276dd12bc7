pub mod column;
pub mod config;
pub mod drawer;
pub mod form;
pub mod loading;
pub mod menu;
pub mod router;
pub mod search;
pub mod state;
pub mod table;
pub mod value;

pub mod prelude {
    pub use crate::column::{Cell, ColumnDescriptor, ColumnError, FieldType, Fixed, SelectOption};
    pub use crate::config::{ConfigError, LoadingConfig, RouterConfig, ShellConfig, TableConfig};
    pub use crate::drawer::{
        DrawerError, DrawerForm, DrawerState, Finish, Footer, FooterView, SubmitError,
        SubmitOutcome,
    };
    pub use crate::form::{FieldError, FieldRules, FormInstance, ValidationResult};
    pub use crate::loading::DelayedLoading;
    pub use crate::menu::{FlattenedMenuSet, MenuContext, MenuError, MenuNode, MenuSource};
    pub use crate::router::{PermissionRouter, Resolution, RouteEntry, RouterError};
    pub use crate::search::{SearchError, SearchField, SearchForm, SearchWidget};
    pub use crate::state::State;
    pub use crate::table::{
        FetchError, FetchOutcome, FetchResult, Pagination, ProTable, TableError, TableLayout,
        TableRequest, ToolbarSlot, request_fn,
    };
    pub use crate::value::{FieldValue, Filters, Record};
}
