//! Compiled route tree.
//!
//! [`Route`] trees are compiled into [`Node`] trees once, at registration.
//! All prefix composition happens here: every [`CompiledRule`] carries its
//! effective template, name and handler, so matching and building never
//! look at ancestors again.

use crate::pattern::{PatternCompiler, PatternKind, RoutePattern};
use crate::request::strip_port;
use crate::route::{CompositeRule, HostRule, PrefixKind, Route, Rule};
use crate::trace::{StepKind, TraceStep};
use crate::{BuildArgs, BuildError, PatternError, Request, RouteMatch, RouterError};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A rule with every prefix applied.
///
/// Shared between the compiled tree and the router's name index.
pub struct CompiledRule {
    name: Option<String>,
    handler: String,
    pattern: Arc<RoutePattern>,
    host: Option<Arc<RoutePattern>>,
    methods: Vec<String>,
    defaults: BTreeMap<String, String>,
}

impl CompiledRule {
    /// Effective name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Effective handler identifier.
    #[must_use]
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Effective path template.
    #[must_use]
    pub fn template(&self) -> &str {
        self.pattern.template()
    }

    /// Compiled effective path pattern.
    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Host template of the enclosing host route, if any.
    #[must_use]
    pub fn host_template(&self) -> Option<&str> {
        self.host.as_deref().map(RoutePattern::template)
    }

    /// Allowed methods. Empty allows any.
    #[must_use]
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Default values.
    #[must_use]
    pub fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    /// Returns `true` if the rule accepts `method`.
    #[must_use]
    pub fn allows(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m == method)
    }

    fn matches(&self, method: &str, path: &str) -> Option<RouteMatch> {
        if !self.allows(method) {
            return None;
        }
        let caps = self.pattern.captures(path)?;
        let mut kwargs = self.defaults.clone();
        kwargs.extend(caps.named);
        Some(RouteMatch {
            handler: self.handler.clone(),
            name: self.name.clone(),
            args: caps.positional,
            kwargs,
            host_match: None,
        })
    }

    /// Build a URL for this rule.
    ///
    /// Produces a path, or `scheme://netloc/path` when the rule sits under a
    /// host route or `args` asks for an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] on missing or nonconforming values, or when
    /// an absolute URL has no usable netloc.
    pub fn build(&self, request: Option<&Request>, args: &BuildArgs) -> Result<String, BuildError> {
        let mut url = self.pattern.expand(&args.args, &args.kwargs, &self.defaults)?;

        let mut query = url::form_urlencoded::Serializer::new(String::new());
        let mut has_query = false;
        for (key, value) in &args.kwargs {
            if self.pattern.has_variable(key) || self.defaults.get(key) == Some(value) {
                continue;
            }
            query.append_pair(key, value);
            has_query = true;
        }
        if has_query {
            url.push('?');
            url.push_str(&query.finish());
        }

        if let Some(fragment) = &args.fragment {
            url.push('#');
            url.push_str(&urlencoding::encode(fragment));
        }

        if self.host.is_none() && !args.wants_absolute() {
            return Ok(url);
        }

        let netloc = self.netloc(request, args)?;
        let scheme = args
            .scheme
            .as_deref()
            .or_else(|| request.and_then(Request::scheme))
            .unwrap_or("http");
        Ok(format!("{scheme}://{netloc}{url}"))
    }

    fn netloc<'a>(
        &self,
        request: Option<&'a Request>,
        args: &'a BuildArgs,
    ) -> Result<&'a str, BuildError> {
        let missing = || BuildError::MissingNetloc {
            name: self.name.clone().unwrap_or_else(|| self.template().to_owned()),
        };

        let Some(host) = &self.host else {
            return args
                .netloc
                .as_deref()
                .or_else(|| request.and_then(Request::host))
                .ok_or_else(missing);
        };

        // Host routes always name their netloc explicitly.
        let netloc = args.netloc.as_deref().ok_or_else(missing)?;
        if host.is_match(strip_port(netloc)) {
            Ok(netloc)
        } else {
            Err(BuildError::InvalidNetloc {
                netloc: netloc.to_owned(),
                template: host.template().to_owned(),
            })
        }
    }
}

impl fmt::Debug for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRule")
            .field("name", &self.name)
            .field("handler", &self.handler)
            .field("template", &self.template())
            .field("host", &self.host_template())
            .field("methods", &self.methods)
            .finish()
    }
}

/// What a match is evaluated against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub hostname: Option<&'a str>,
}

/// A compiled route.
#[derive(Debug)]
pub(crate) enum Node {
    Leaf(Arc<CompiledRule>),
    /// Quick-reject on the accumulated prefix, then children.
    PathPrefix {
        pattern: Arc<RoutePattern>,
        children: Vec<Node>,
    },
    /// Name or handler prefix; already folded into descendants.
    Group {
        kind: PrefixKind,
        prefix: String,
        children: Vec<Node>,
    },
    Host {
        pattern: Arc<RoutePattern>,
        children: Vec<Node>,
    },
}

impl Node {
    /// First match in this subtree.
    pub(crate) fn find(&self, target: Target<'_>, host_match: Option<&[String]>) -> Option<RouteMatch> {
        match self {
            Self::Leaf(rule) => rule.matches(target.method, target.path).map(|mut m| {
                m.host_match = host_match.map(<[String]>::to_vec);
                m
            }),
            Self::PathPrefix { pattern, children } => {
                if !pattern.is_prefix_of(target.path) {
                    return None;
                }
                children.iter().find_map(|c| c.find(target, host_match))
            }
            Self::Group { children, .. } => children.iter().find_map(|c| c.find(target, host_match)),
            Self::Host { pattern, children } => {
                let captures = pattern.ordered_captures(target.hostname?)?;
                children.iter().find_map(|c| c.find(target, Some(&captures)))
            }
        }
    }

    /// Same as [`find`](Self::find), recording every node visited.
    pub(crate) fn find_traced(
        &self,
        index: usize,
        target: Target<'_>,
        host_match: Option<&[String]>,
    ) -> (Option<RouteMatch>, TraceStep) {
        let (kind, template) = self.describe();
        let mut step = TraceStep {
            index,
            kind,
            template,
            matched: false,
            children: Vec::new(),
        };

        let (children, captures) = match self {
            Self::Leaf(_) => {
                let result = self.find(target, host_match);
                step.matched = result.is_some();
                return (result, step);
            }
            Self::PathPrefix { pattern, children } => {
                if !pattern.is_prefix_of(target.path) {
                    return (None, step);
                }
                (children, None)
            }
            Self::Group { children, .. } => (children, None),
            Self::Host { pattern, children } => {
                match target.hostname.and_then(|h| pattern.ordered_captures(h)) {
                    Some(captures) => (children, Some(captures)),
                    None => return (None, step),
                }
            }
        };

        let host_match = captures.as_deref().or(host_match);
        for (i, child) in children.iter().enumerate() {
            let (result, child_step) = child.find_traced(i, target, host_match);
            step.children.push(child_step);
            if result.is_some() {
                step.matched = true;
                return (result, step);
            }
        }
        (None, step)
    }

    /// Rules whose path (and host) match, ignoring method.
    pub(crate) fn collect_path_matches<'a>(&'a self, target: Target<'_>, out: &mut Vec<&'a CompiledRule>) {
        match self {
            Self::Leaf(rule) => {
                if rule.pattern.is_match(target.path) {
                    out.push(rule);
                }
            }
            Self::PathPrefix { pattern, children } => {
                if pattern.is_prefix_of(target.path) {
                    children.iter().for_each(|c| c.collect_path_matches(target, out));
                }
            }
            Self::Group { children, .. } => {
                children.iter().for_each(|c| c.collect_path_matches(target, out));
            }
            Self::Host { pattern, children } => {
                if target.hostname.is_some_and(|h| pattern.is_match(h)) {
                    children.iter().for_each(|c| c.collect_path_matches(target, out));
                }
            }
        }
    }

    fn describe(&self) -> (StepKind, String) {
        match self {
            Self::Leaf(rule) => (StepKind::Rule, rule.template().to_owned()),
            Self::PathPrefix { pattern, .. } => (StepKind::PathPrefix, pattern.template().to_owned()),
            Self::Group { kind, prefix, .. } => {
                let kind = match kind {
                    PrefixKind::Path => StepKind::PathPrefix,
                    PrefixKind::Name => StepKind::NamePrefix,
                    PrefixKind::Handler => StepKind::HandlerPrefix,
                };
                (kind, prefix.clone())
            }
            Self::Host { pattern, .. } => (StepKind::Host, pattern.template().to_owned()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Compilation
// ═══════════════════════════════════════════════════════════════════════════════

/// Prefixes accumulated from ancestors.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    path_prefix: String,
    name_prefix: String,
    handler_prefix: String,
    host: Option<Arc<RoutePattern>>,
}

/// Compile a route tree under `scope`, appending every leaf to `rules`.
pub(crate) fn compile(
    route: Route,
    scope: &Scope,
    compiler: &mut PatternCompiler,
    rules: &mut Vec<Arc<CompiledRule>>,
) -> Result<Node, RouterError> {
    match route {
        Route::Rule(rule) => {
            let compiled = Arc::new(compile_rule(rule, scope, compiler)?);
            rules.push(Arc::clone(&compiled));
            Ok(Node::Leaf(compiled))
        }
        Route::Composite(CompositeRule {
            kind,
            prefix,
            routes,
        }) => {
            let mut inner = scope.clone();
            match kind {
                PrefixKind::Path => {
                    if !prefix.starts_with('/') || prefix.ends_with('/') {
                        return Err(PatternError::InvalidPrefix { prefix }.into());
                    }
                    inner.path_prefix.push_str(&prefix);
                    let pattern = compiler.compile(PatternKind::Path, &inner.path_prefix)?;
                    let children = compile_all(routes, &inner, compiler, rules)?;
                    return Ok(Node::PathPrefix { pattern, children });
                }
                PrefixKind::Name => inner.name_prefix.push_str(&prefix),
                PrefixKind::Handler => inner.handler_prefix.push_str(&prefix),
            }
            let children = compile_all(routes, &inner, compiler, rules)?;
            Ok(Node::Group {
                kind,
                prefix,
                children,
            })
        }
        Route::Host(HostRule { template, routes }) => {
            if scope.host.is_some() {
                return Err(RouterError::NestedHost { template });
            }
            let pattern = compiler.compile(PatternKind::Host, &template)?;
            let inner = Scope {
                host: Some(Arc::clone(&pattern)),
                ..scope.clone()
            };
            let children = compile_all(routes, &inner, compiler, rules)?;
            Ok(Node::Host { pattern, children })
        }
    }
}

fn compile_all(
    routes: Vec<Route>,
    scope: &Scope,
    compiler: &mut PatternCompiler,
    rules: &mut Vec<Arc<CompiledRule>>,
) -> Result<Vec<Node>, RouterError> {
    routes
        .into_iter()
        .map(|route| compile(route, scope, compiler, rules))
        .collect()
}

fn compile_rule(
    rule: Rule,
    scope: &Scope,
    compiler: &mut PatternCompiler,
) -> Result<CompiledRule, RouterError> {
    let template = format!("{}{}", scope.path_prefix, rule.template);
    let pattern = compiler.compile(PatternKind::Path, &template)?;
    Ok(CompiledRule {
        name: rule.name.map(|name| format!("{}{name}", scope.name_prefix)),
        handler: format!("{}{}", scope.handler_prefix, rule.handler),
        pattern,
        host: scope.host.clone(),
        methods: rule.methods,
        defaults: rule.defaults,
    })
}
