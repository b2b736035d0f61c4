//! Launch descriptors, the externally observable output of resolution.
//!
//! The textual form is parsed by downstream launchers and must not change:
//! `scheme:group/name/version[@startLevel][@nostart]`, prefixed with `wrap:`
//! when the artifact is not a self-describing module.

use super::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheme used when the caller does not configure one
pub const DEFAULT_SCHEME: &str = "mvn";

/// One entry of the ordered launch list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchDescriptor {
    pub coordinate: Coordinate,
    /// Set when the artifact lacks a module manifest and the launcher must
    /// wrap it before activation.
    pub needs_wrap: bool,
    pub start_level: Option<u32>,
    pub no_start: bool,
}

/// Caller-supplied start annotation matched by group and name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartDirective {
    pub group: String,
    pub name: String,
    pub start_level: Option<u32>,
    pub no_start: bool,
}

impl LaunchDescriptor {
    /// Descriptor with no annotations
    pub fn new(coordinate: Coordinate, needs_wrap: bool) -> Self {
        Self {
            coordinate,
            needs_wrap,
            start_level: None,
            no_start: false,
        }
    }

    /// Render the launcher line for the given scheme
    pub fn render(&self, scheme: &str) -> String {
        let mut line = String::new();
        if self.needs_wrap {
            line.push_str("wrap:");
        }
        line.push_str(scheme);
        line.push(':');
        line.push_str(&self.coordinate.group);
        line.push('/');
        line.push_str(&self.coordinate.name);
        line.push('/');
        line.push_str(&self.coordinate.version.to_string());
        if let Some(level) = self.start_level {
            line.push('@');
            line.push_str(&level.to_string());
        }
        if self.no_start {
            line.push_str("@nostart");
        }
        line
    }
}

impl fmt::Display for LaunchDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(DEFAULT_SCHEME))
    }
}

impl StartDirective {
    /// Check whether this directive names the given coordinate
    pub fn applies_to(&self, coordinate: &Coordinate) -> bool {
        self.group == coordinate.group && self.name == coordinate.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Version;

    fn coordinate() -> Coordinate {
        Coordinate::new("org.example", "util", Version::new(1, 2, 0))
    }

    #[test]
    fn test_plain_descriptor() {
        let descriptor = LaunchDescriptor::new(coordinate(), false);
        assert_eq!(descriptor.render("mvn"), "mvn:org.example/util/1.2.0");
    }

    #[test]
    fn test_wrap_prefix() {
        let descriptor = LaunchDescriptor::new(coordinate(), true);
        assert_eq!(descriptor.render("mvn"), "wrap:mvn:org.example/util/1.2.0");
    }

    #[test]
    fn test_start_annotations() {
        let mut descriptor = LaunchDescriptor::new(coordinate(), false);
        descriptor.start_level = Some(2);
        assert_eq!(descriptor.render("mvn"), "mvn:org.example/util/1.2.0@2");

        descriptor.no_start = true;
        assert_eq!(
            descriptor.render("mvn"),
            "mvn:org.example/util/1.2.0@2@nostart"
        );

        descriptor.start_level = None;
        assert_eq!(
            descriptor.render("mvn"),
            "mvn:org.example/util/1.2.0@nostart"
        );
    }

    #[test]
    fn test_custom_scheme() {
        let descriptor = LaunchDescriptor::new(coordinate(), true);
        assert_eq!(descriptor.render("obr"), "wrap:obr:org.example/util/1.2.0");
    }

    #[test]
    fn test_directive_matching() {
        let directive = StartDirective {
            group: "org.example".to_string(),
            name: "util".to_string(),
            start_level: Some(1),
            no_start: false,
        };

        assert!(directive.applies_to(&coordinate()));
        assert!(!directive.applies_to(&Coordinate::new(
            "org.example",
            "other",
            Version::new(1, 2, 0)
        )));
    }
}
