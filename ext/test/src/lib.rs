//! ruta-test: conformance fixtures and test helpers
//!
//! Provides reference route trees for router tests, and (with the `fixtures`
//! feature) a YAML fixture runner.
//!
//! # Example
//!
//! ```
//! use ruta_test::prelude::*;
//!
//! let router = reference_router();
//! let m = router.match_request(&Request::blank("/user/calvin/").unwrap()).unwrap();
//! assert_eq!(m.handler, "apps.users.UserOverviewHandler");
//! ```

use ruta::prelude::*;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Path prefix `/a` over `/`, `/b`, `/c` and a nested `/d` prefix holding
/// the same three rules.
#[must_use]
pub fn nested_prefix_routes() -> Route {
    Route::path_prefix(
        "/a",
        [
            Rule::new("/", "a").named("name-a").into(),
            Rule::new("/b", "a/b").named("name-a/b").into(),
            Rule::new("/c", "a/c").named("name-a/c").into(),
            Route::path_prefix(
                "/d",
                [
                    Rule::new("/", "a/d").named("name-a/d").into(),
                    Rule::new("/b", "a/d/b").named("name-a/d/b").into(),
                    Rule::new("/c", "a/d/c").named("name-a/d/c").into(),
                ],
            ),
        ],
    )
}

/// Path, handler and name prefixes stacked over three user pages.
#[must_use]
pub fn user_routes() -> Route {
    Route::path_prefix(
        r"/user/<username:\w+>",
        [Route::handler_prefix(
            "apps.users.",
            [Route::name_prefix(
                "user-",
                [
                    Rule::new("/", "UserOverviewHandler").named("overview").into(),
                    Rule::new("/profile", "UserProfileHandler").named("profile").into(),
                    Rule::new("/projects", "UserProjectsHandler").named("projects").into(),
                ],
            )],
        )],
    )
}

/// A host route over App Engine style subdomains.
#[must_use]
pub fn subdomain_routes() -> Route {
    Route::host(
        "<:[^.]+>.app-id.appspot.com",
        [Rule::new("/foo", "FooHandler").named("x").into()],
    )
}

/// A router holding all reference routes, in the order above.
///
/// # Panics
///
/// Never: the reference routes are known to compile.
#[must_use]
pub fn reference_router() -> Router {
    let mut router = Router::new();
    for route in [nested_prefix_routes(), user_routes(), subdomain_routes()] {
        if let Err(e) = router.add(route) {
            panic!("reference routes must compile: {e}");
        }
    }
    router
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{nested_prefix_routes, reference_router, subdomain_routes, user_routes};
    pub use ruta::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_router_names() {
        let router = reference_router();
        assert_eq!(router.len(), 3);
        assert_eq!(
            router.names().collect::<Vec<_>>(),
            vec![
                "name-a",
                "name-a/b",
                "name-a/c",
                "name-a/d",
                "name-a/d/b",
                "name-a/d/c",
                "user-overview",
                "user-profile",
                "user-projects",
                "x",
            ]
        );
    }

    #[test]
    fn reference_routes_match_their_own_builds() {
        let router = reference_router();
        let args = BuildArgs::new().with_kwarg("username", "calvin");
        for name in ["name-a", "name-a/d/b", "user-profile"] {
            let url = router.build(name, None, &args).unwrap();
            let m = router.match_request(&Request::blank(&url).unwrap()).unwrap();
            assert_eq!(m.name.as_deref(), Some(name));
        }
    }
}
