//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the router.
//!
//! ```yaml
//! name: nested prefixes
//! router:
//!   routes:
//!     - type: path_prefix
//!       prefix: /a
//!       routes:
//!         - { type: rule, template: /b, handler: B, name: b }
//! matches:
//!   - name: hit
//!     url: /a/b
//!     expect: { handler: B, name: b }
//!   - name: miss
//!     url: /a
//!     expect: null
//! builds:
//!   - name: build b
//!     route: b
//!     expect: /a/b
//! ```

use ruta::prelude::*;
use ruta::RouterConfig;
use serde::Deserialize;
use std::collections::BTreeMap;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub router: RouterConfig,
    /// Expected registration error kind; when set, no cases run.
    #[serde(default)]
    pub expect_error: Option<String>,
    #[serde(default)]
    pub matches: Vec<MatchCase>,
    #[serde(default)]
    pub builds: Vec<BuildCase>,
}

/// Match test case
#[derive(Debug, Deserialize)]
pub struct MatchCase {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
    /// `null` expects no match.
    pub expect: Option<ExpectedMatch>,
}

/// Expected match result
#[derive(Debug, Deserialize)]
pub struct ExpectedMatch {
    pub handler: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, String>,
    #[serde(default)]
    pub host_match: Option<Vec<String>>,
}

/// Build test case
#[derive(Debug, Deserialize)]
pub struct BuildCase {
    pub name: String,
    /// Route name to build.
    pub route: String,
    /// URL of the request to build against.
    #[serde(default)]
    pub request: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, String>,
    #[serde(default)]
    pub netloc: Option<String>,
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub fragment: Option<String>,
    #[serde(default)]
    pub full: bool,
    #[serde(default)]
    pub expect: Option<String>,
    /// Expected [`BuildError`] kind, e.g. `missing_value`.
    #[serde(default)]
    pub expect_error: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════════

impl MatchCase {
    /// Build the request for this case
    pub fn build_request(&self) -> Result<Request, RequestError> {
        let request = Request::blank(&self.url)?;
        Ok(match &self.method {
            Some(method) => request.with_method(method),
            None => request,
        })
    }
}

impl ExpectedMatch {
    fn to_route_match(&self) -> RouteMatch {
        RouteMatch {
            handler: self.handler.clone(),
            name: self.name.clone(),
            args: self.args.clone(),
            kwargs: self.kwargs.clone(),
            host_match: self.host_match.clone(),
        }
    }
}

impl BuildCase {
    /// Build the arguments for this case
    pub fn build_args(&self) -> BuildArgs {
        BuildArgs {
            args: self.args.clone(),
            kwargs: self.kwargs.clone(),
            netloc: self.netloc.clone(),
            scheme: self.scheme.clone(),
            fragment: self.fragment.clone(),
            full: self.full,
        }
    }

    fn expected(&self) -> String {
        match (&self.expect, &self.expect_error) {
            (_, Some(kind)) => format!("error {kind}"),
            (Some(url), None) => url.clone(),
            (None, None) => "<unspecified>".into(),
        }
    }
}

/// Stable snake_case label for a [`BuildError`].
#[must_use]
pub fn build_error_kind(error: &BuildError) -> &'static str {
    match error {
        BuildError::UnknownName { .. } => "unknown_name",
        BuildError::MissingValue { .. } => "missing_value",
        BuildError::MissingPositional { .. } => "missing_positional",
        BuildError::InvalidValue { .. } => "invalid_value",
        BuildError::MissingNetloc { .. } => "missing_netloc",
        BuildError::InvalidNetloc { .. } => "invalid_netloc",
    }
}

/// Stable snake_case label for a [`RouterError`].
#[must_use]
pub fn router_error_kind(error: &RouterError) -> &'static str {
    match error {
        RouterError::Pattern(e) => match e {
            PatternError::UnterminatedVariable { .. } => "unterminated_variable",
            PatternError::InvalidVariableName { .. } => "invalid_variable_name",
            PatternError::UnknownTypeClass { .. } => "unknown_type_class",
            PatternError::InvalidRegex { .. } => "invalid_regex",
            PatternError::DuplicateVariable { .. } => "duplicate_variable",
            PatternError::InvalidPrefix { .. } => "invalid_prefix",
            PatternError::TemplateTooLong { .. } => "template_too_long",
        },
        RouterError::DuplicateName { .. } => "duplicate_name",
        RouterError::DepthExceeded { .. } => "depth_exceeded",
        RouterError::NestedHost { .. } => "nested_host",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results
    pub fn run(&self) -> Vec<CaseResult> {
        let router = match (self.router.clone().into_router(), &self.expect_error) {
            (Ok(router), None) => router,
            (Ok(_), Some(kind)) => {
                return vec![CaseResult {
                    case_name: "load".into(),
                    passed: false,
                    expected: format!("error {kind}"),
                    actual: "router loaded".into(),
                }];
            }
            (Err(e), expected) => {
                let actual = router_error_kind(&e);
                return vec![CaseResult {
                    case_name: "load".into(),
                    passed: expected.as_deref() == Some(actual),
                    expected: expected
                        .as_ref()
                        .map_or_else(|| "router loaded".into(), |k| format!("error {k}")),
                    actual: format!("error {actual}: {e}"),
                }];
            }
        };

        let matches = self.matches.iter().map(|case| {
            let expected = case.expect.as_ref().map(ExpectedMatch::to_route_match);
            let actual = case
                .build_request()
                .map(|request| router.match_request(&request));
            CaseResult {
                case_name: case.name.clone(),
                passed: actual.as_ref().is_ok_and(|a| *a == expected),
                expected: format!("{expected:?}"),
                actual: format!("{actual:?}"),
            }
        });

        let builds = self.builds.iter().map(|case| {
            let request = case.request.as_deref().map(Request::blank).transpose();
            let actual = request.map(|request| router.build(&case.route, request.as_ref(), &case.build_args()));
            let (passed, actual) = match actual {
                Err(e) => (false, format!("bad request url: {e}")),
                Ok(Ok(url)) => (case.expect_error.is_none() && case.expect.as_deref() == Some(url.as_str()), url),
                Ok(Err(e)) => {
                    let kind = build_error_kind(&e);
                    (case.expect_error.as_deref() == Some(kind), format!("error {kind}: {e}"))
                }
            };
            CaseResult {
                case_name: case.name.clone(),
                passed,
                expected: case.expected(),
                actual,
            }
        });

        matches.chain(builds).collect()
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        let results = self.run();
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r"
name: inline
router:
  routes:
    - type: path_prefix
      prefix: /a
      routes:
        - { type: rule, template: /b, handler: B, name: b }
matches:
  - name: hit
    url: /a/b
    expect: { handler: B, name: b }
  - name: miss
    url: /a
    expect: null
builds:
  - name: build b
    route: b
    expect: /a/b
  - name: unknown
    route: nope
    expect_error: unknown_name
";

    #[test]
    fn inline_fixture_passes() {
        let fixture = Fixture::from_yaml(FIXTURE).unwrap();
        let results = fixture.run();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
    }

    #[test]
    fn wrong_expectation_fails() {
        let yaml = FIXTURE.replace("expect: /a/b", "expect: /a/c");
        let fixture = Fixture::from_yaml(&yaml).unwrap();
        let failed: Vec<_> = fixture.run().into_iter().filter(|r| !r.passed).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].case_name, "build b");
    }

    #[test]
    fn expected_load_error() {
        let yaml = r"
name: bad prefix
router:
  routes:
    - { type: path_prefix, prefix: /a/, routes: [] }
expect_error: invalid_prefix
";
        let fixture = Fixture::from_yaml(yaml).unwrap();
        fixture.run_and_assert();
    }

    #[test]
    fn multi_document() {
        let yaml = format!("{FIXTURE}\n---\n{FIXTURE}");
        assert_eq!(Fixture::from_yaml_multi(&yaml).unwrap().len(), 2);
    }
}
