//! Match trace types for debugging routing decisions.
//!
//! Trace steps mirror the compiled route tree but record what happened
//! instead of what was declared. Use
//! [`Router::match_with_trace`](crate::Router::match_with_trace) to see which
//! routes were tried before the winner.
//!
//! # Example
//!
//! ```
//! use ruta::prelude::*;
//!
//! let mut router = Router::new();
//! router.add(Rule::new("/a", "A")).unwrap();
//! router.add(Rule::new("/b", "B")).unwrap();
//!
//! let trace = router.match_with_trace(&Request::blank("/b").unwrap());
//! assert_eq!(trace.result.unwrap().handler, "B");
//! assert_eq!(trace.steps.len(), 2);
//! assert!(!trace.steps[0].matched);
//! ```

use crate::RouteMatch;
use std::fmt;

/// What kind of route a trace step visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// A leaf rule.
    Rule,
    /// A path-prefix composite.
    PathPrefix,
    /// A name-prefix composite.
    NamePrefix,
    /// A handler-prefix composite.
    HandlerPrefix,
    /// A host route.
    Host,
}

/// Trace of a full [`Router`](crate::Router) match.
///
/// `result` always equals what
/// [`Router::match_request`](crate::Router::match_request) returns for the
/// same request.
pub struct MatchTrace {
    /// The final result.
    pub result: Option<RouteMatch>,
    /// Top-level routes tried, in order.
    /// Stops after the first match (preserves first-match-wins).
    pub steps: Vec<TraceStep>,
}

impl MatchTrace {
    /// Flatten to `(depth, step)` pairs in visit order.
    #[must_use]
    pub fn walk(&self) -> Vec<(usize, &TraceStep)> {
        fn visit<'a>(steps: &'a [TraceStep], depth: usize, out: &mut Vec<(usize, &'a TraceStep)>) {
            for step in steps {
                out.push((depth, step));
                visit(&step.children, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        visit(&self.steps, 0, &mut out);
        out
    }
}

impl fmt::Debug for MatchTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchTrace")
            .field("result", &self.result)
            .field("steps", &self.steps)
            .finish()
    }
}

/// One route visited during a match.
pub struct TraceStep {
    /// Position among its siblings (0-based).
    pub index: usize,
    /// What kind of route this is.
    pub kind: StepKind,
    /// Effective template for rules and path prefixes, the host template for
    /// host routes, the raw prefix for name and handler prefixes.
    pub template: String,
    /// Did this route (or one of its descendants) produce the match?
    pub matched: bool,
    /// Children tried, in order. Empty when a prefix or host rejected early.
    pub children: Vec<TraceStep>,
}

impl fmt::Debug for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceStep")
            .field("index", &self.index)
            .field("kind", &self.kind)
            .field("template", &self.template)
            .field("matched", &self.matched)
            .field("children", &self.children)
            .finish()
    }
}
