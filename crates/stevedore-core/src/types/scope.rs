//! Dependency scopes and scope filtering.
//!
//! Scopes classify how a dependency participates in resolution and launch.
//! The filter uses exclusion-list semantics: test and system scopes are kept
//! out of the graph, everything else passes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Dependency scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Compile,
    Runtime,
    Provided,
    Test,
    System,
    None,
}

/// Error raised for scope strings outside the known set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown dependency scope: {0}")]
pub struct ScopeParseError(pub String);

impl Scope {
    /// Canonical lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Runtime => "runtime",
            Scope::Provided => "provided",
            Scope::Test => "test",
            Scope::System => "system",
            Scope::None => "none",
        }
    }

    /// Whether transitive dependencies of an artifact in this scope are
    /// expanded. System-scoped artifacts are leaves.
    pub fn pulls_transitives(self) -> bool {
        self != Scope::System
    }

    /// Whether a farther declaration carrying this scope is promoted onto a
    /// nearer node carrying `nearest`: runtime beats test and provided,
    /// compile beats everything else.
    pub fn promotes_over(self, nearest: Scope) -> bool {
        match self {
            Scope::Runtime => matches!(nearest, Scope::Test | Scope::Provided),
            Scope::Compile => nearest != Scope::Compile,
            _ => false,
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Compile
    }
}

impl FromStr for Scope {
    type Err = ScopeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "compile" => Ok(Scope::Compile),
            "runtime" => Ok(Scope::Runtime),
            "provided" => Ok(Scope::Provided),
            "test" => Ok(Scope::Test),
            "system" => Ok(Scope::System),
            "none" => Ok(Scope::None),
            other => Err(ScopeParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scope filter deciding which dependencies enter the resolution graph.
///
/// Written as an exclusion list so that scopes outside the excluded set pass
/// by default.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    excluded: Vec<Scope>,
}

impl ScopeFilter {
    /// Filter with an explicit exclusion list
    pub fn excluding(excluded: Vec<Scope>) -> Self {
        Self { excluded }
    }

    /// Check whether a scope passes the filter
    pub fn includes(&self, scope: Scope) -> bool {
        !self.excluded.contains(&scope)
    }
}

impl Default for ScopeFilter {
    fn default() -> Self {
        Self::excluding(vec![Scope::Test, Scope::System])
    }
}
