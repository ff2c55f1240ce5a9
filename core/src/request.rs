//! `Request`: the request descriptor routes are matched against.

use crate::RequestError;

/// Request descriptor: everything the router looks at.
///
/// Build one with [`Request::blank`] from a URL or path, or with
/// [`Request::builder`] field by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    query: Option<String>,
    host: Option<String>,
    scheme: Option<String>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: "GET".to_owned(),
            path: "/".to_owned(),
            query: None,
            host: None,
            scheme: None,
        }
    }
}

impl Request {
    /// Create a builder for `Request`.
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Create a `GET` request from a path (`/foo?x=1`) or an absolute URL
    /// (`http://host:port/foo`).
    ///
    /// A bare path carries no host or scheme, so it never matches host routes.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidUrl`] if `url` is neither.
    pub fn blank(url: &str) -> Result<Self, RequestError> {
        if url.starts_with('/') {
            let without_fragment = url.split_once('#').map_or(url, |(before, _)| before);
            let (path, query) = match without_fragment.split_once('?') {
                Some((path, query)) => (path, Some(query.to_owned())),
                None => (without_fragment, None),
            };
            return Ok(Self {
                path: path.to_owned(),
                query,
                ..Self::default()
            });
        }

        let parsed = url::Url::parse(url).map_err(|e| RequestError::InvalidUrl {
            url: url.to_owned(),
            source: e.to_string(),
        })?;

        let host = parsed.host_str().map(|host| match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        });

        Ok(Self {
            path: parsed.path().to_owned(),
            query: parsed.query().map(str::to_owned),
            host,
            scheme: Some(parsed.scheme().to_owned()),
            ..Self::default()
        })
    }

    /// The method, uppercased.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The raw (possibly percent-encoded) path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The query string, without the leading `?`.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// `host[:port]`, if known.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// The host with any port removed.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.host.as_deref().map(strip_port)
    }

    /// The scheme, if known.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Return a copy with a different method.
    #[must_use]
    pub fn with_method(mut self, method: impl AsRef<str>) -> Self {
        self.method = method.as_ref().to_ascii_uppercase();
        self
    }
}

/// Strip `:port` from `host[:port]`, leaving bracketed IPv6 literals intact.
pub(crate) fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Builder for `Request`.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Set the method (uppercased).
    #[must_use]
    pub fn method(mut self, method: impl AsRef<str>) -> Self {
        self.request.method = method.as_ref().to_ascii_uppercase();
        self
    }

    /// Set the path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.request.path = path.into();
        self
    }

    /// Set the query string (without `?`).
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.request.query = Some(query.into());
        self
    }

    /// Set `host[:port]`.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.request.host = Some(host.into());
        self
    }

    /// Set the scheme.
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.request.scheme = Some(scheme.into());
        self
    }

    /// Build the `Request`.
    #[must_use]
    pub fn build(self) -> Request {
        self.request
    }
}
