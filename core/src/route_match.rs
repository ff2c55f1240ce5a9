use crate::BuildArgs;
use std::collections::BTreeMap;

/// Result of a successful match.
///
/// `handler` and `name` are effective values (all prefixes applied).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct RouteMatch {
    /// Effective handler identifier.
    pub handler: String,
    /// Effective route name, if the rule is named.
    pub name: Option<String>,
    /// Unnamed path captures, left to right.
    pub args: Vec<String>,
    /// Named path captures, with rule defaults filled in underneath.
    pub kwargs: BTreeMap<String, String>,
    /// Host captures in template order, when matched under a host route.
    #[cfg_attr(feature = "config", serde(skip_serializing_if = "Option::is_none"))]
    pub host_match: Option<Vec<String>>,
}

impl RouteMatch {
    /// Arguments that rebuild the matched path.
    ///
    /// Host captures are not carried over: host routes need an explicit netloc.
    #[must_use]
    pub fn to_build_args(&self) -> BuildArgs {
        BuildArgs {
            args: self.args.clone(),
            kwargs: self.kwargs.clone(),
            ..BuildArgs::default()
        }
    }
}
