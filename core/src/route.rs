//! Declarative route tree: rules, prefix composites and host routes.
//!
//! These are plain data. Nothing is compiled or validated until the tree is
//! handed to [`Router::add`](crate::Router::add), which consumes it.

use std::collections::BTreeMap;

/// A leaf route: template plus handler identifier.
///
/// # Example
///
/// ```
/// use ruta::Rule;
///
/// let rule = Rule::new("/page/<n:int>", "PageHandler")
///     .named("page")
///     .methods(["get", "HEAD"])
///     .with_default("n", "1");
/// assert_eq!(rule.methods, vec!["GET".to_string(), "HEAD".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Path template (see [`RoutePattern`](crate::RoutePattern)).
    pub template: String,
    /// Handler identifier returned on match.
    pub handler: String,
    /// Name used to build URLs. Unnamed rules can match but not be built.
    pub name: Option<String>,
    /// Allowed methods, uppercased. Empty allows any method.
    pub methods: Vec<String>,
    /// Values merged into kwargs on match and used as build fallbacks.
    pub defaults: BTreeMap<String, String>,
}

impl Rule {
    /// Create an unnamed rule that accepts any method.
    #[must_use]
    pub fn new(template: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            handler: handler.into(),
            name: None,
            methods: Vec::new(),
            defaults: BTreeMap::new(),
        }
    }

    /// Set the route name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict the rule to the given methods (case-insensitive).
    #[must_use]
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = methods
            .into_iter()
            .map(|m| m.as_ref().to_ascii_uppercase())
            .collect();
        self
    }

    /// Add a default value.
    #[must_use]
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }
}

/// What a [`CompositeRule`] prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixKind {
    /// Prepended to descendant templates. Must start with `/` and not end with `/`.
    Path,
    /// Prepended to descendant names.
    Name,
    /// Prepended to descendant handler identifiers.
    Handler,
}

impl PrefixKind {
    /// Short lowercase label, as used in config and traces.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path_prefix",
            Self::Name => "name_prefix",
            Self::Handler => "handler_prefix",
        }
    }
}

/// A group of routes sharing a path, name or handler prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRule {
    /// Which effective value the prefix applies to.
    pub kind: PrefixKind,
    /// The prefix.
    pub prefix: String,
    /// Children, tried in order.
    pub routes: Vec<Route>,
}

impl CompositeRule {
    /// Create a composite.
    #[must_use]
    pub fn new(
        kind: PrefixKind,
        prefix: impl Into<String>,
        routes: impl IntoIterator<Item = Route>,
    ) -> Self {
        Self {
            kind,
            prefix: prefix.into(),
            routes: routes.into_iter().collect(),
        }
    }
}

/// A group of routes matched against the request host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRule {
    /// Host template, e.g. `<subdomain>.example.com`.
    pub template: String,
    /// Children, tried in order against the unmodified path.
    pub routes: Vec<Route>,
}

impl HostRule {
    /// Create a host route.
    #[must_use]
    pub fn new(template: impl Into<String>, routes: impl IntoIterator<Item = Route>) -> Self {
        Self {
            template: template.into(),
            routes: routes.into_iter().collect(),
        }
    }
}

/// Any route that can be added to a [`Router`](crate::Router).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A leaf rule.
    Rule(Rule),
    /// A prefix composite.
    Composite(CompositeRule),
    /// A host route.
    Host(HostRule),
}

impl Route {
    /// Shorthand for a [`PrefixKind::Path`] composite.
    #[must_use]
    pub fn path_prefix(prefix: impl Into<String>, routes: impl IntoIterator<Item = Route>) -> Self {
        Self::Composite(CompositeRule::new(PrefixKind::Path, prefix, routes))
    }

    /// Shorthand for a [`PrefixKind::Name`] composite.
    #[must_use]
    pub fn name_prefix(prefix: impl Into<String>, routes: impl IntoIterator<Item = Route>) -> Self {
        Self::Composite(CompositeRule::new(PrefixKind::Name, prefix, routes))
    }

    /// Shorthand for a [`PrefixKind::Handler`] composite.
    #[must_use]
    pub fn handler_prefix(
        prefix: impl Into<String>,
        routes: impl IntoIterator<Item = Route>,
    ) -> Self {
        Self::Composite(CompositeRule::new(PrefixKind::Handler, prefix, routes))
    }

    /// Shorthand for a [`HostRule`].
    #[must_use]
    pub fn host(template: impl Into<String>, routes: impl IntoIterator<Item = Route>) -> Self {
        Self::Host(HostRule::new(template, routes))
    }

    /// Nesting depth: 1 for a rule, 1 + deepest child for groups.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Rule(_) => 1,
            Self::Composite(CompositeRule { routes, .. }) | Self::Host(HostRule { routes, .. }) => {
                1 + routes.iter().map(Route::depth).max().unwrap_or(0)
            }
        }
    }
}

impl From<Rule> for Route {
    fn from(rule: Rule) -> Self {
        Self::Rule(rule)
    }
}

impl From<CompositeRule> for Route {
    fn from(composite: CompositeRule) -> Self {
        Self::Composite(composite)
    }
}

impl From<HostRule> for Route {
    fn from(host: HostRule) -> Self {
        Self::Host(host)
    }
}
