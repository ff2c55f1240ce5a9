//! Values supplied to [`Router::build`](crate::Router::build).

use std::collections::BTreeMap;
use std::fmt::Display;

/// Arguments for building a URL.
///
/// `args` feed unnamed placeholders in order, `kwargs` feed named variables.
/// Kwargs the template does not declare become the query string.
///
/// # Example
///
/// ```
/// use ruta::BuildArgs;
///
/// let args = BuildArgs::new()
///     .with_arg(2024)
///     .with_kwarg("slug", "hello")
///     .with_fragment("comments");
/// assert_eq!(args.args, vec!["2024".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArgs {
    /// Positional values.
    pub args: Vec<String>,
    /// Named values.
    pub kwargs: BTreeMap<String, String>,
    /// `host[:port]` for absolute URLs. Required by host routes.
    pub netloc: Option<String>,
    /// Scheme for absolute URLs.
    pub scheme: Option<String>,
    /// Appended as `#fragment`.
    pub fragment: Option<String>,
    /// Build an absolute URL even without a host route or overrides.
    pub full: bool,
}

impl BuildArgs {
    /// Empty arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional value.
    #[must_use]
    pub fn with_arg(mut self, value: impl Display) -> Self {
        self.args.push(value.to_string());
        self
    }

    /// Set a named value.
    #[must_use]
    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.kwargs.insert(key.into(), value.to_string());
        self
    }

    /// Set the netloc override.
    #[must_use]
    pub fn with_netloc(mut self, netloc: impl Into<String>) -> Self {
        self.netloc = Some(netloc.into());
        self
    }

    /// Set the scheme override.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Set the fragment.
    #[must_use]
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    /// Request an absolute URL.
    #[must_use]
    pub fn with_full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    /// Returns `true` if the URL must be absolute.
    #[must_use]
    pub fn wants_absolute(&self) -> bool {
        self.full || self.netloc.is_some() || self.scheme.is_some()
    }
}
