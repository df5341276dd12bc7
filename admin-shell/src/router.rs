//! Permission-gated route resolution.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::config::RouterConfig;
use crate::menu::MenuContext;

/// A route pattern and the component it renders.
///
/// Patterns are absolute paths whose segments are literal, a `:name`
/// parameter, or a final `*` that captures the rest of the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry<C> {
    pub path: String,
    pub component: C,
}

impl<C> RouteEntry<C> {
    pub fn new(path: impl Into<String>, component: C) -> Self {
        Self {
            path: path.into(),
            component,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("route path {0:?} must start with '/'")]
    NotAbsolute(String),
    #[error("route path {0:?} has '*' before its last segment")]
    MisplacedWildcard(String),
    #[error("route path {0:?} has an unnamed parameter")]
    UnnamedParam(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

#[derive(Debug, Clone)]
struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    fn parse(path: &str) -> Result<Self, RouterError> {
        if !path.starts_with('/') {
            return Err(RouterError::NotAbsolute(path.to_string()));
        }
        let parts: Vec<&str> = split(normalize(path)).collect();
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = if *part == "*" {
                if i + 1 != parts.len() {
                    return Err(RouterError::MisplacedWildcard(path.to_string()));
                }
                Segment::Wildcard
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(RouterError::UnnamedParam(path.to_string()));
                }
                Segment::Param(name.to_string())
            } else {
                Segment::Literal(part.to_string())
            };
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = split(path).collect();
        let mut params = BTreeMap::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Wildcard => {
                    let rest = parts.get(i..).map(|rest| rest.join("/")).unwrap_or_default();
                    params.insert("*".to_string(), rest);
                    return Some(params);
                }
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let part = parts.get(i)?;
                    params.insert(name.clone(), (*part).to_string());
                }
            }
        }
        (parts.len() == self.segments.len()).then_some(params)
    }
}

/// Drop a trailing slash, except on the root.
fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// What to show for a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a, C> {
    /// The menu has not loaded; show a placeholder.
    Loading,
    Render {
        /// The matched route's declared pattern.
        route: &'a str,
        component: &'a C,
        params: BTreeMap<String, String>,
    },
    /// A route matched but its pattern is not in the menu (401).
    Unauthorized { route: &'a str },
    Redirect(String),
    /// Nothing matched (404).
    NotFound,
}

#[derive(Debug, Clone)]
struct CompiledRoute<C> {
    entry: RouteEntry<C>,
    pattern: Pattern,
}

impl<C> CompiledRoute<C> {
    fn compile(entry: RouteEntry<C>) -> Result<Self, RouterError> {
        let pattern = Pattern::parse(&entry.path)?;
        Ok(Self { entry, pattern })
    }
}

/// Resolves request paths against a route table and the session's menu.
///
/// # Example
///
/// ```
/// use admin_shell::menu::{MenuContext, MenuNode};
/// use admin_shell::router::{PermissionRouter, Resolution, RouteEntry};
///
/// let router = PermissionRouter::new(vec![
///     RouteEntry::new("/a/b", "B"),
///     RouteEntry::new("/c", "C"),
/// ])
/// .unwrap();
/// let ctx = MenuContext::new();
/// ctx.install(&[MenuNode::new("/a").child(MenuNode::new("/a/b"))]);
///
/// assert!(matches!(router.resolve("/a/b", &ctx), Resolution::Render { component: &"B", .. }));
/// assert!(matches!(router.resolve("/c", &ctx), Resolution::Unauthorized { .. }));
/// assert_eq!(router.resolve("/nope", &ctx), Resolution::NotFound);
/// assert_eq!(router.resolve("/", &ctx), Resolution::Redirect("/index".into()));
/// ```
#[derive(Debug, Clone)]
pub struct PermissionRouter<C> {
    routes: Vec<CompiledRoute<C>>,
    public: Vec<CompiledRoute<C>>,
    config: RouterConfig,
}

impl<C> PermissionRouter<C> {
    /// Router over menu-gated `routes`, in priority order.
    pub fn new(routes: Vec<RouteEntry<C>>) -> Result<Self, RouterError> {
        Ok(Self {
            routes: routes
                .into_iter()
                .map(CompiledRoute::compile)
                .collect::<Result<_, _>>()?,
            public: Vec::new(),
            config: RouterConfig::default(),
        })
    }

    /// Add a route that renders without a menu entry.
    pub fn with_public(mut self, entry: RouteEntry<C>) -> Result<Self, RouterError> {
        self.public.push(CompiledRoute::compile(entry)?);
        Ok(self)
    }

    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteEntry<C>> {
        self.routes.iter().map(|r| &r.entry)
    }

    /// Decide what `path` shows for the session in `menu`.
    pub fn resolve<'a>(&'a self, path: &str, menu: &MenuContext) -> Resolution<'a, C> {
        if !menu.is_ready() {
            return Resolution::Loading;
        }
        let path = normalize(path);

        if let Some((route, params)) = find(&self.routes, path) {
            let pattern = route.entry.path.as_str();
            if menu.is_authorized(pattern) {
                return Resolution::Render {
                    route: pattern,
                    component: &route.entry.component,
                    params,
                };
            }
            log::debug!("Route {} matched {} but is not in the menu", pattern, path);
            return Resolution::Unauthorized { route: pattern };
        }

        if let Some((route, params)) = find(&self.public, path) {
            return Resolution::Render {
                route: route.entry.path.as_str(),
                component: &route.entry.component,
                params,
            };
        }

        if path == "/" {
            return Resolution::Redirect(self.config.default_landing.clone());
        }

        log::debug!("No route for {}", path);
        Resolution::NotFound
    }
}

fn find<'a, C>(
    routes: &'a [CompiledRoute<C>],
    path: &str,
) -> Option<(&'a CompiledRoute<C>, BTreeMap<String, String>)> {
    routes
        .iter()
        .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
}
