//! `Router`: ordered routes, first-match-wins matching, build-by-name.

use crate::node::{self, CompiledRule, Node, Scope, Target};
use crate::pattern::PatternCompiler;
use crate::trace::MatchTrace;
use crate::{BuildArgs, BuildError, Request, Route, RouteMatch, RouterError, MAX_DEPTH};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Request router.
///
/// Routes are tried in registration order; the first match wins. Named
/// rules can be built back into URLs.
///
/// Registration takes `&mut self`. Matching and building take `&self`,
/// allocate only their results and are safe to call from many threads.
///
/// # Example
///
/// ```
/// use ruta::prelude::*;
///
/// let mut router = Router::new();
/// router.add(Rule::new("/", "Home").named("home")).unwrap();
/// router.add(Rule::new("/posts/<:int>", "Post").named("post")).unwrap();
///
/// let m = router.match_request(&Request::blank("/posts/7").unwrap()).unwrap();
/// assert_eq!(m.handler, "Post");
/// assert_eq!(m.args, vec!["7".to_string()]);
///
/// let url = router.build("post", None, &BuildArgs::new().with_arg(8)).unwrap();
/// assert_eq!(url, "/posts/8");
/// ```
#[derive(Default)]
pub struct Router {
    routes: Vec<Node>,
    rules: Vec<Arc<CompiledRule>>,
    index: HashMap<String, Arc<CompiledRule>>,
    compiler: PatternCompiler,
}

impl Router {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and append a top-level route.
    ///
    /// # Errors
    ///
    /// Returns a [`RouterError`] if a template is malformed, an effective
    /// name is already taken, or nesting exceeds [`MAX_DEPTH`]. On error the
    /// router is unchanged.
    pub fn add(&mut self, route: impl Into<Route>) -> Result<(), RouterError> {
        let route = route.into();

        let depth = route.depth();
        if depth > MAX_DEPTH {
            return Err(RouterError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }

        let mut rules = Vec::new();
        let node = node::compile(route, &Scope::default(), &mut self.compiler, &mut rules)?;

        let mut seen = HashSet::new();
        for name in rules.iter().filter_map(|r| r.name()) {
            if self.index.contains_key(name) || !seen.insert(name) {
                return Err(RouterError::DuplicateName {
                    name: name.to_owned(),
                });
            }
        }

        for rule in &rules {
            if let Some(name) = rule.name() {
                self.index.insert(name.to_owned(), Arc::clone(rule));
            }
        }
        tracing::debug!(
            rules = rules.len(),
            names = ?rules.iter().filter_map(|r| r.name()).collect::<Vec<_>>(),
            "route added"
        );
        self.rules.extend(rules);
        self.routes.push(node);
        Ok(())
    }

    /// Add every route, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first [`RouterError`]. Routes before it stay registered.
    pub fn extend<I, R>(&mut self, routes: I) -> Result<(), RouterError>
    where
        I: IntoIterator<Item = R>,
        R: Into<Route>,
    {
        routes.into_iter().try_for_each(|route| self.add(route))
    }

    /// Find the first route matching `request`.
    ///
    /// The path is percent-decoded before matching.
    #[must_use]
    pub fn match_request(&self, request: &Request) -> Option<RouteMatch> {
        let path = decode_path(request.path());
        let target = target(request, &path);
        let result = self.routes.iter().find_map(|node| node.find(target, None));
        tracing::trace!(
            method = request.method(),
            path = %path,
            handler = result.as_ref().map(|m| m.handler.as_str()),
            "match"
        );
        result
    }

    /// Like [`match_request`](Self::match_request), also recording every
    /// route tried.
    #[must_use]
    pub fn match_with_trace(&self, request: &Request) -> MatchTrace {
        let path = decode_path(request.path());
        let target = target(request, &path);
        let mut steps = Vec::new();
        for (i, node) in self.routes.iter().enumerate() {
            let (result, step) = node.find_traced(i, target, None);
            steps.push(step);
            if result.is_some() {
                return MatchTrace { result, steps };
            }
        }
        MatchTrace {
            result: None,
            steps,
        }
    }

    /// Methods accepted by the rules whose path (and host) match `request`.
    ///
    /// Use it to tell 404 from 405 when [`match_request`](Self::match_request)
    /// returns `None`: an empty list means no path matched. Unrestricted
    /// rules contribute nothing, since they would have matched.
    #[must_use]
    pub fn allowed_methods(&self, request: &Request) -> Vec<String> {
        let path = decode_path(request.path());
        let target = target(request, &path);
        let mut rules = Vec::new();
        for node in &self.routes {
            node.collect_path_matches(target, &mut rules);
        }
        rules
            .into_iter()
            .flat_map(|r| r.methods().iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Build a URL for the rule named `name`.
    ///
    /// `request` supplies the scheme and host for absolute URLs when `args`
    /// does not override them.
    ///
    /// # Errors
    ///
    /// [`BuildError::UnknownName`] if no rule has this effective name, or any
    /// error from [`CompiledRule::build`].
    pub fn build(
        &self,
        name: &str,
        request: Option<&Request>,
        args: &BuildArgs,
    ) -> Result<String, BuildError> {
        let result = match self.index.get(name) {
            Some(rule) => rule.build(request, args),
            None => Err(BuildError::UnknownName {
                name: name.to_owned(),
            }),
        };
        if let Err(e) = &result {
            tracing::debug!(name, error = %e, "build failed");
        }
        result
    }

    /// The rule registered under an effective name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CompiledRule> {
        self.index.get(name).map(Arc::as_ref)
    }

    /// Effective names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().filter_map(|r| r.name())
    }

    /// Every compiled rule, in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter().map(Arc::as_ref)
    }

    /// Number of top-level routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.len())
            .field("rules", &self.rules)
            .finish()
    }
}

fn decode_path(path: &str) -> Cow<'_, str> {
    urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
}

fn target<'a>(request: &'a Request, path: &'a str) -> Target<'a> {
    Target {
        method: request.method(),
        path,
        hostname: request.hostname(),
    }
}
