//! Compile benchmarks: templates → patterns, route trees → router.
//!
//! Measures the one-time cost paid at registration: template parsing, regex
//! compilation and prefix composition at scale.

use ruta::prelude::*;
use ruta::{PatternKind, RoutePattern};

fn main() {
    divan::main();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Single template compilation
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn compile_literal(bencher: divan::Bencher) {
    bencher.bench_local(|| RoutePattern::compile(PatternKind::Path, "/api/v1/users"));
}

#[divan::bench]
fn compile_typed_variables(bencher: divan::Bencher) {
    bencher.bench_local(|| {
        RoutePattern::compile(PatternKind::Path, "/user/<username:word>/posts/<:int>/<slug>")
    });
}

#[divan::bench]
fn compile_embedded_regex(bencher: divan::Bencher) {
    bencher.bench_local(|| {
        RoutePattern::compile(
            PatternKind::Path,
            r"/orders/<id:[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}>",
        )
    });
}

#[divan::bench]
fn compile_host(bencher: divan::Bencher) {
    bencher.bench_local(|| RoutePattern::compile(PatternKind::Host, "<:[^.]+>.app-id.appspot.com"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Router construction at scale
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [1, 10, 50, 100, 200])]
fn add_n_flat_rules(bencher: divan::Bencher, n: usize) {
    bencher.bench_local(|| {
        let mut router = Router::new();
        for i in 0..n {
            let _ = router.add(Rule::new(format!("/route/{i}/<id:int>"), format!("H{i}")).named(format!("r{i}")));
        }
        router
    });
}

#[divan::bench(args = [1, 10, 50, 100])]
fn add_n_prefixed_rules(bencher: divan::Bencher, n: usize) {
    bencher.bench_local(|| {
        let children: Vec<Route> = (0..n)
            .map(|i| Rule::new(format!("/page{i}"), format!("Page{i}")).named(format!("page{i}")).into())
            .collect();
        let mut router = Router::new();
        let _ = router.add(Route::path_prefix(
            r"/user/<username:\w+>",
            [Route::handler_prefix("apps.users.", [Route::name_prefix("user-", children)])],
        ));
        router
    });
}
