//! Config types for declarative router construction.
//!
//! These types mirror the [`Route`] tree but are serde-deserializable, so a
//! router can be loaded from JSON or YAML.
//!
//! | Config variant | Runtime type |
//! |----------------|--------------|
//! | `rule` | [`Rule`] |
//! | `path_prefix` / `name_prefix` / `handler_prefix` | [`CompositeRule`](crate::CompositeRule) |
//! | `host` | [`HostRule`](crate::HostRule) |
//!
//! ```yaml
//! routes:
//!   - type: path_prefix
//!     prefix: /user/<username:word>
//!     routes:
//!       - type: rule
//!         template: /
//!         handler: UserOverviewHandler
//!         name: user-overview
//! ```

use crate::{CompositeRule, PrefixKind, Route, Router, RouterError, Rule};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for a [`Router`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Top-level routes, in match order.
    pub routes: Vec<RouteConfig>,
}

impl RouterConfig {
    /// Compile into a [`Router`].
    ///
    /// # Errors
    ///
    /// Returns the first [`RouterError`] raised while adding routes.
    pub fn into_router(self) -> Result<Router, RouterError> {
        let mut router = Router::new();
        router.extend(self.routes)?;
        Ok(router)
    }
}

/// Configuration for a [`Route`].
///
/// Uses `#[serde(tag = "type")]` for discriminated union deserialization:
///
/// ```json
/// { "type": "rule", "template": "/", "handler": "Home", "name": "home" }
/// { "type": "path_prefix", "prefix": "/a", "routes": [...] }
/// { "type": "host", "template": "<sub>.example.com", "routes": [...] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RouteConfig {
    /// A leaf rule.
    #[serde(rename = "rule")]
    Rule {
        /// Path template.
        template: String,
        /// Handler identifier.
        handler: String,
        /// Route name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Allowed methods. Empty allows any.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        methods: Vec<String>,
        /// Default values (strings).
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        defaults: BTreeMap<String, String>,
    },

    /// Children share a path prefix.
    #[serde(rename = "path_prefix")]
    PathPrefix {
        /// Must start with `/` and not end with `/`.
        prefix: String,
        /// Child routes.
        routes: Vec<RouteConfig>,
    },

    /// Children share a name prefix.
    #[serde(rename = "name_prefix")]
    NamePrefix {
        /// Prepended to descendant names.
        prefix: String,
        /// Child routes.
        routes: Vec<RouteConfig>,
    },

    /// Children share a handler prefix.
    #[serde(rename = "handler_prefix")]
    HandlerPrefix {
        /// Prepended to descendant handlers.
        prefix: String,
        /// Child routes.
        routes: Vec<RouteConfig>,
    },

    /// Children are matched only on hosts matching `template`.
    #[serde(rename = "host")]
    Host {
        /// Host template.
        template: String,
        /// Child routes.
        routes: Vec<RouteConfig>,
    },
}

impl From<RouteConfig> for Route {
    fn from(config: RouteConfig) -> Self {
        let composite = |kind, prefix, routes: Vec<RouteConfig>| {
            Route::Composite(CompositeRule::new(
                kind,
                prefix,
                routes.into_iter().map(Route::from),
            ))
        };
        match config {
            RouteConfig::Rule {
                template,
                handler,
                name,
                methods,
                defaults,
            } => {
                let mut rule = Rule::new(template, handler).methods(methods);
                rule.name = name;
                rule.defaults = defaults;
                Route::Rule(rule)
            }
            RouteConfig::PathPrefix { prefix, routes } => composite(PrefixKind::Path, prefix, routes),
            RouteConfig::NamePrefix { prefix, routes } => composite(PrefixKind::Name, prefix, routes),
            RouteConfig::HandlerPrefix { prefix, routes } => {
                composite(PrefixKind::Handler, prefix, routes)
            }
            RouteConfig::Host { template, routes } => {
                Route::host(template, routes.into_iter().map(Route::from))
            }
        }
    }
}

impl Router {
    /// Build a router from configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`RouterError`] raised while adding routes.
    pub fn from_config(config: RouterConfig) -> Result<Self, RouterError> {
        config.into_router()
    }
}
