//! ruta-http: route `http::Request` values
//!
//! Adapts requests from the [`http`] crate (used by hyper, axum, tower and
//! friends) to the router's [`ruta::Request`] descriptor.
//!
//! # Architecture
//!
//! ```text
//! http::Request<B>
//!         ↓ to_route_request()
//! ruta::Request (method, path, query, host, scheme)
//!         ↓ Router::match_request()
//! RouteOutcome::{Matched, MethodNotAllowed, NotFound}
//! ```
//!
//! # Example
//!
//! ```
//! use ruta::prelude::*;
//! use ruta_http::prelude::*;
//!
//! let mut router = Router::new();
//! router.add(Rule::new("/items/<id:int>", "ItemHandler").methods(["GET"])).unwrap();
//!
//! let request = http::Request::get("http://shop.example.com/items/42").body(()).unwrap();
//! match router.dispatch(&request) {
//!     RouteOutcome::Matched(m) => assert_eq!(m.kwargs["id"], "42"),
//!     other => panic!("unexpected {other:?}"),
//! }
//!
//! let request = http::Request::delete("/items/42").body(()).unwrap();
//! assert_eq!(router.dispatch(&request).status(), http::StatusCode::METHOD_NOT_ALLOWED);
//! ```

mod context;
mod dispatch;

pub use context::{to_route_request, HttpRequestExt};
pub use dispatch::{RouteOutcome, RouterExt};

pub use http;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{HttpRequestExt, RouteOutcome, RouterExt};
}
