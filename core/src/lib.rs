//! ruta - request router with reverse URL building
//!
//! Matches requests (path, method, host) against an ordered set of routes and
//! extracts typed template variables. The same compiled templates run in
//! reverse to build URLs from a route name and values.
//!
//! # Architecture
//!
//! Routes are declared as a plain tree and compiled once, when they are added
//! to a [`Router`]:
//!
//! - [`Rule`]: Leaf: template + handler identifier + optional name
//! - [`CompositeRule`]: Groups child routes under a path, name or handler prefix
//! - [`HostRule`]: Groups child routes under a host template
//! - [`Route`]: Closed set of the three above
//! - [`RoutePattern`]: Compiled template: anchored matcher + builder
//! - [`Router`]: First-match-wins matching, build-by-name
//!
//! # Key Design Insights
//!
//! 1. **Effective values are precomputed**: prefix composition (path, name,
//!    handler) is resolved at registration into an immutable compiled tree.
//!    The declared routes are consumed, never mutated.
//!
//! 2. **One template, two directions**: the pattern that matches a path is
//!    the pattern that builds it, so every built URL is matchable.
//!
//! 3. **No ambient state**: matching and building take the request
//!    explicitly. A built [`Router`] is `Send + Sync` and lock-free.
//!
//! # Example
//!
//! ```
//! use ruta::prelude::*;
//!
//! let mut router = Router::new();
//! router
//!     .add(Route::path_prefix(
//!         "/user/<username:word>",
//!         [
//!             Rule::new("/", "UserOverviewHandler").named("user-overview").into(),
//!             Rule::new("/profile", "UserProfileHandler").named("user-profile").into(),
//!         ],
//!     ))
//!     .unwrap();
//!
//! let request = Request::blank("/user/calvin/profile").unwrap();
//! let matched = router.match_request(&request).unwrap();
//! assert_eq!(matched.handler, "UserProfileHandler");
//! assert_eq!(matched.kwargs["username"], "calvin");
//!
//! let url = router
//!     .build("user-overview", None, &BuildArgs::new().with_kwarg("username", "calvin"))
//!     .unwrap();
//! assert_eq!(url, "/user/calvin/");
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod build_args;
mod node;
mod pattern;
mod request;
mod route;
mod route_match;
mod router;
mod trace;

#[cfg(feature = "config")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use build_args::BuildArgs;
pub use node::CompiledRule;
pub use pattern::{Captures, PatternCompiler, PatternKind, RoutePattern, Segment, TypeClass, Variable};
pub use request::{Request, RequestBuilder};
pub use route::{CompositeRule, HostRule, PrefixKind, Route, Rule};
pub use route_match::RouteMatch;
pub use router::Router;
pub use trace::{MatchTrace, StepKind, TraceStep};

#[cfg(feature = "config")]
pub use config::{RouteConfig, RouterConfig};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use ruta::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BuildError,
        // Core types
        BuildArgs,
        CompositeRule,
        HostRule,
        PatternError,
        PrefixKind,
        Request,
        RequestError,
        Route,
        RouteMatch,
        Router,
        RouterError,
        Rule,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum nesting depth of composite and host routes.
///
/// Checked when a route tree is added to a [`Router`].
pub const MAX_DEPTH: usize = 32;

/// Maximum length of a single template, after prefix composition.
///
/// Templates compile to regexes; the limit bounds compile cost at startup.
pub const MAX_TEMPLATE_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// A route template could not be compiled.
///
/// Raised at registration time. Fix the template and register again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A `<` was never closed by a `>`.
    UnterminatedVariable {
        /// The template being compiled.
        template: String,
        /// Byte offset of the opening `<`.
        position: usize,
    },
    /// A variable name is not an identifier.
    InvalidVariableName {
        /// The template being compiled.
        template: String,
        /// The offending name.
        name: String,
    },
    /// A constraint looks like a type class name but is not one.
    UnknownTypeClass {
        /// The template being compiled.
        template: String,
        /// The unrecognised class name.
        class: String,
    },
    /// An embedded regex failed to compile.
    InvalidRegex {
        /// The template being compiled.
        template: String,
        /// The regex source.
        regex: String,
        /// The underlying error message.
        source: String,
    },
    /// The same variable name appears twice in one effective template.
    DuplicateVariable {
        /// The template being compiled.
        template: String,
        /// The repeated name.
        name: String,
    },
    /// A path prefix does not start with `/` or ends with `/`.
    InvalidPrefix {
        /// The rejected prefix.
        prefix: String,
    },
    /// The template exceeds [`MAX_TEMPLATE_LENGTH`].
    TemplateTooLong {
        /// Actual length of the template.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnterminatedVariable { template, position } => {
                write!(
                    f,
                    "unterminated variable at byte {position} in template \"{template}\" \
                     - close it with '>'"
                )
            }
            Self::InvalidVariableName { template, name } => {
                write!(
                    f,
                    "invalid variable name \"{name}\" in template \"{template}\" \
                     - names must start with a letter or '_'"
                )
            }
            Self::UnknownTypeClass { template, class } => {
                write!(
                    f,
                    "unknown type class \"{class}\" in template \"{template}\" \
                     - expected one of string, word, int, number, unicode, label, \
                     or wrap a literal regex in (?:...)"
                )
            }
            Self::InvalidRegex {
                template,
                regex,
                source,
            } => {
                write!(
                    f,
                    "invalid regex \"{regex}\" in template \"{template}\": {source}"
                )
            }
            Self::DuplicateVariable { template, name } => {
                write!(f, "variable \"{name}\" appears twice in template \"{template}\"")
            }
            Self::InvalidPrefix { prefix } => {
                write!(
                    f,
                    "invalid path prefix \"{prefix}\" - prefixes must start with '/' \
                     and must not end with '/'"
                )
            }
            Self::TemplateTooLong { len, max } => {
                write!(f, "template length is {len}, but maximum allowed is {max}")
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// A route tree could not be added to a [`Router`].
///
/// A failed `add` leaves the router unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A template in the tree failed to compile.
    Pattern(PatternError),
    /// Two rules share the same effective name.
    DuplicateName {
        /// The effective (fully prefixed) name.
        name: String,
    },
    /// Route nesting exceeds [`MAX_DEPTH`].
    DepthExceeded {
        /// Actual depth of the route tree.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
    /// A host route contains another host route.
    NestedHost {
        /// Template of the inner host route.
        template: String,
    },
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pattern(e) => write!(f, "{e}"),
            Self::DuplicateName { name } => {
                write!(f, "route name \"{name}\" is already registered")
            }
            Self::DepthExceeded { depth, max } => {
                write!(
                    f,
                    "route nesting depth is {depth}, but maximum allowed is {max} \
                     - flatten your route tree"
                )
            }
            Self::NestedHost { template } => {
                write!(
                    f,
                    "host route \"{template}\" is nested inside another host route"
                )
            }
        }
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pattern(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PatternError> for RouterError {
    fn from(e: PatternError) -> Self {
        Self::Pattern(e)
    }
}

/// A URL could not be built.
///
/// Building never guesses: any inconsistency between the route and the
/// supplied values is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No rule is registered under this effective name.
    UnknownName {
        /// The requested name.
        name: String,
    },
    /// A named variable has no value and no default.
    MissingValue {
        /// The variable name.
        name: String,
        /// The template being built.
        template: String,
    },
    /// An unnamed placeholder has no positional argument.
    MissingPositional {
        /// Zero-based index of the positional argument.
        index: usize,
        /// The template being built.
        template: String,
    },
    /// A value does not conform to its variable's type class.
    InvalidValue {
        /// The variable name (or `#index` for positional placeholders).
        name: String,
        /// The rejected value.
        value: String,
        /// The template being built.
        template: String,
    },
    /// An absolute URL was needed but no netloc was available.
    MissingNetloc {
        /// The route being built.
        name: String,
    },
    /// The netloc override does not match the route's host template.
    InvalidNetloc {
        /// The rejected netloc.
        netloc: String,
        /// The host template it was checked against.
        template: String,
    },
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownName { name } => {
                write!(f, "no route named \"{name}\" is registered")
            }
            Self::MissingValue { name, template } => {
                write!(
                    f,
                    "missing value for \"{name}\" to build \"{template}\""
                )
            }
            Self::MissingPositional { index, template } => {
                write!(
                    f,
                    "missing positional argument {index} to build \"{template}\""
                )
            }
            Self::InvalidValue {
                name,
                value,
                template,
            } => {
                write!(
                    f,
                    "value \"{value}\" is not valid for \"{name}\" in \"{template}\""
                )
            }
            Self::MissingNetloc { name } => {
                write!(
                    f,
                    "route \"{name}\" needs a netloc to build an absolute URL \
                     - pass one explicitly or build against a request with a host"
                )
            }
            Self::InvalidNetloc { netloc, template } => {
                write!(
                    f,
                    "netloc \"{netloc}\" does not match host template \"{template}\""
                )
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// A request descriptor could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The URL is neither an absolute URL nor a path starting with `/`.
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// The underlying error message.
        source: String,
    },
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl { url, source } => {
                write!(f, "invalid request URL \"{url}\": {source}")
            }
        }
    }
}

impl std::error::Error for RequestError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_error_wraps_pattern_error() {
        let err: RouterError = PatternError::InvalidPrefix {
            prefix: "/a/".into(),
        }
        .into();
        assert!(matches!(err, RouterError::Pattern(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("/a/"));
    }

    #[test]
    fn build_error_names_missing_variable() {
        let err = BuildError::MissingValue {
            name: "username".into(),
            template: "/user/<username:word>/".into(),
        };
        assert!(err.to_string().contains("\"username\""));
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + std::error::Error>() {}
        assert_send_sync::<PatternError>();
        assert_send_sync::<RouterError>();
        assert_send_sync::<BuildError>();
        assert_send_sync::<RequestError>();
    }
}
