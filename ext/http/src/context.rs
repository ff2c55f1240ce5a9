//! `http::Request` context helpers.
//!
//! Provides ergonomic access to the parts of an `http::Request` the router
//! looks at, and the conversion to [`ruta::Request`].

use http::header::HOST;

/// Extension trait for `http::Request` to extract routing data.
pub trait HttpRequestExt {
    /// Get a header value by name. Non-UTF-8 values are ignored.
    fn get_header(&self, name: &str) -> Option<&str>;

    /// Get the path component of the URI.
    fn get_path(&self) -> &str;

    /// Get the query component of the URI, without `?`.
    fn get_query(&self) -> Option<&str>;

    /// Get `host[:port]`: the URI authority, falling back to the `Host` header.
    fn get_authority(&self) -> Option<&str>;

    /// Get the URI scheme, if the request target was absolute.
    fn get_scheme(&self) -> Option<&str>;

    /// Get a form-decoded query parameter. The first occurrence wins.
    fn get_query_param(&self, name: &str) -> Option<String>;
}

impl<B> HttpRequestExt for http::Request<B> {
    fn get_header(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn get_path(&self) -> &str {
        self.uri().path()
    }

    fn get_query(&self) -> Option<&str> {
        self.uri().query()
    }

    fn get_authority(&self) -> Option<&str> {
        self.uri()
            .authority()
            .map(http::uri::Authority::as_str)
            .or_else(|| self.headers().get(HOST).and_then(|v| v.to_str().ok()))
    }

    fn get_scheme(&self) -> Option<&str> {
        self.uri().scheme_str()
    }

    fn get_query_param(&self, name: &str) -> Option<String> {
        let query = self.get_query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// Convert an `http::Request` into the router's request descriptor.
#[must_use]
pub fn to_route_request<B>(request: &http::Request<B>) -> ruta::Request {
    let mut builder = ruta::Request::builder()
        .method(request.method().as_str())
        .path(request.get_path());
    if let Some(query) = request.get_query() {
        builder = builder.query(query);
    }
    if let Some(authority) = request.get_authority() {
        builder = builder.host(authority);
    }
    if let Some(scheme) = request.get_scheme() {
        builder = builder.scheme(scheme);
    }
    builder.build()
}
