//! Router dispatch for `http::Request`.

use crate::context::to_route_request;
use http::StatusCode;
use ruta::{RouteMatch, Router};

/// What routing decided for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A rule matched.
    Matched(RouteMatch),
    /// The path matched, but only for other methods (listed, sorted).
    MethodNotAllowed(Vec<String>),
    /// Nothing matched.
    NotFound,
}

impl RouteOutcome {
    /// The response status this outcome maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Matched(_) => StatusCode::OK,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// The `Allow` header value for a 405 response.
    #[must_use]
    pub fn allow_header(&self) -> Option<String> {
        match self {
            Self::MethodNotAllowed(methods) => Some(methods.join(", ")),
            _ => None,
        }
    }
}

/// Route `http::Request` values directly.
pub trait RouterExt {
    /// Match an `http::Request`.
    fn match_http<B>(&self, request: &http::Request<B>) -> Option<RouteMatch>;

    /// Match an `http::Request`, telling 404 from 405.
    fn dispatch<B>(&self, request: &http::Request<B>) -> RouteOutcome;
}

impl RouterExt for Router {
    fn match_http<B>(&self, request: &http::Request<B>) -> Option<RouteMatch> {
        self.match_request(&to_route_request(request))
    }

    fn dispatch<B>(&self, request: &http::Request<B>) -> RouteOutcome {
        let request = to_route_request(request);
        if let Some(m) = self.match_request(&request) {
            return RouteOutcome::Matched(m);
        }
        let allowed = self.allowed_methods(&request);
        if allowed.is_empty() {
            RouteOutcome::NotFound
        } else {
            RouteOutcome::MethodNotAllowed(allowed)
        }
    }
}
