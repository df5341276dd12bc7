//! Menu tree, its flattened path set and the per-session menu context.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::state::State;

/// One node of the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            children: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn child(mut self, child: MenuNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Every path reachable in a menu tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedMenuSet {
    paths: HashSet<String>,
}

impl FlattenedMenuSet {
    pub fn is_authorized(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

/// Collect the path of every node at any depth.
pub fn flatten(tree: &[MenuNode]) -> FlattenedMenuSet {
    let mut paths = HashSet::new();
    let mut stack: Vec<&MenuNode> = tree.iter().rev().collect();
    while let Some(node) = stack.pop() {
        paths.insert(node.path.clone());
        stack.extend(node.children.iter().rev());
    }
    FlattenedMenuSet { paths }
}

/// Errors from loading a menu.
#[derive(Debug, Clone, Error)]
pub enum MenuError {
    #[error("menu source failed: {0}")]
    Source(String),
    #[error("invalid menu data: {0}")]
    Invalid(String),
    #[error("no active session")]
    NoSession,
}

impl From<serde_json::Error> for MenuError {
    fn from(e: serde_json::Error) -> Self {
        MenuError::Invalid(e.to_string())
    }
}

/// Provider of the signed-in user's menu tree.
#[async_trait]
pub trait MenuSource: Send + Sync {
    async fn fetch_menu(&self) -> Result<Vec<MenuNode>, MenuError>;
}

/// Where the menu of the current session stands.
#[derive(Debug, Clone, Default)]
pub enum MenuState {
    /// No session yet, or the previous one ended.
    #[default]
    SignedOut,
    /// A session started and its menu has not been installed.
    Loading { session: Uuid },
    Ready {
        session: Uuid,
        menu: Arc<FlattenedMenuSet>,
    },
}

/// Menu and authorization state of one console session.
///
/// Passed explicitly to the router; cloning shares the state.
///
/// # Example
///
/// ```
/// use admin_shell::menu::{MenuContext, MenuNode};
///
/// let ctx = MenuContext::new();
/// ctx.begin_session();
/// assert!(!ctx.is_ready());
///
/// ctx.install(&[MenuNode::new("/permis").child(MenuNode::new("/permis/account"))]);
/// assert!(ctx.is_authorized("/permis/account"));
/// assert!(!ctx.is_authorized("/permis/role"));
///
/// ctx.end_session();
/// assert!(!ctx.is_authorized("/permis/account"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MenuContext {
    state: State<MenuState>,
}

impl MenuContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session. Any previous menu is dropped.
    pub fn begin_session(&self) -> Uuid {
        let session = Uuid::new_v4();
        self.state.set(MenuState::Loading { session });
        log::debug!("Menu session {} started", session);
        session
    }

    /// Install a menu tree into the current session, starting one if needed.
    pub fn install(&self, tree: &[MenuNode]) {
        let menu = Arc::new(flatten(tree));
        let count = menu.len();
        self.state.update(|s| {
            let session = match s {
                MenuState::Loading { session } | MenuState::Ready { session, .. } => *session,
                MenuState::SignedOut => Uuid::new_v4(),
            };
            log::debug!("Menu installed for session {} ({} paths)", session, count);
            *s = MenuState::Ready { session, menu };
        });
    }

    /// Fetch the tree from `source` and install it.
    ///
    /// On failure the context stays loading. A result that arrives after the
    /// session ended or was replaced is dropped.
    pub async fn load(&self, source: &dyn MenuSource) -> Result<(), MenuError> {
        let session = match self.session() {
            Some(session) => session,
            None => self.begin_session(),
        };
        let tree = source.fetch_menu().await?;
        if self.session() != Some(session) {
            log::debug!("Menu for session {} arrived after the session ended", session);
            return Err(MenuError::NoSession);
        }
        self.install(&tree);
        Ok(())
    }

    /// End the session and drop the menu.
    pub fn end_session(&self) {
        self.state.set(MenuState::SignedOut);
        log::debug!("Menu session ended");
    }

    pub fn session(&self) -> Option<Uuid> {
        match self.state.get() {
            MenuState::SignedOut => None,
            MenuState::Loading { session } | MenuState::Ready { session, .. } => Some(session),
        }
    }

    pub fn state(&self) -> MenuState {
        self.state.get()
    }

    pub fn is_ready(&self) -> bool {
        self.state.with(|s| matches!(s, MenuState::Ready { .. }))
    }

    /// The installed path set, if the menu is ready.
    pub fn menu(&self) -> Option<Arc<FlattenedMenuSet>> {
        self.state.with(|s| match s {
            MenuState::Ready { menu, .. } => Some(Arc::clone(menu)),
            _ => None,
        })
    }

    pub fn is_authorized(&self, path: &str) -> bool {
        self.state.with(|s| match s {
            MenuState::Ready { menu, .. } => menu.is_authorized(path),
            _ => false,
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    pub fn clear_dirty(&self) {
        self.state.clear_dirty();
    }
}
