//! Artifact version and version-range types.
//!
//! Versions follow the dotted-numeric convention used by repository
//! coordinates (`1.2.3`, `2.0`, `1.0-beta2`). Ranges follow the bracket
//! syntax used in dependency declarations: a bare version is a recommended
//! version, `[1.0]` pins exactly, `[1.0,2.0)` bounds an interval, and
//! comma-separated intervals form a union.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Artifact version: dotted numeric components plus an optional qualifier.
///
/// `1.0` and `1.0.0` compare equal; a qualified version sorts below the
/// unqualified release with the same components (`1.0-beta1 < 1.0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub components: Vec<u64>,
    pub qualifier: Option<String>,
}

/// Version parsing and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version format: {input}")]
    InvalidFormat { input: String },

    #[error("invalid number in version: {component}")]
    InvalidNumber { component: String },

    #[error("invalid version range: {input}")]
    InvalidRange { input: String },
}

impl Version {
    /// Create a three-component version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            components: vec![major, minor, patch],
            qualifier: None,
        }
    }

    /// Check if this version carries a qualifier (`1.0-beta2`)
    pub fn is_qualified(&self) -> bool {
        self.qualifier.is_some()
    }

    /// Component at `index`, treating missing trailing components as zero
    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }

    fn precedence_cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            match self.component(i).cmp(&other.component(i)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        match (&self.qualifier, &other.qualifier) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.precedence_cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Trailing zeros are stripped so that 1.0 and 1.0.0 hash identically,
        // matching the equality relation.
        let mut significant = self.components.len();
        while significant > 0 && self.components[significant - 1] == 0 {
            significant -= 1;
        }
        self.components[..significant].hash(state);
        self.qualifier.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let (core_part, qualifier) = match input.split_once('-') {
            Some((_, q)) if q.is_empty() => {
                return Err(VersionError::InvalidFormat {
                    input: input.to_string(),
                })
            },
            Some((c, q)) => (c, Some(q.to_string())),
            None => (input, None),
        };

        if core_part.is_empty() {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let mut components = Vec::new();
        for part in core_part.split('.') {
            let value = part.parse().map_err(|_| VersionError::InvalidNumber {
                component: part.to_string(),
            })?;
            components.push(value);
        }

        Ok(Version {
            components,
            qualifier,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", component)?;
        }
        if let Some(ref qualifier) = self.qualifier {
            write!(f, "-{}", qualifier)?;
        }
        Ok(())
    }
}

/// One interval of acceptable versions; unbounded ends are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    pub lower: Option<Version>,
    pub lower_inclusive: bool,
    pub upper: Option<Version>,
    pub upper_inclusive: bool,
}

impl Restriction {
    /// The interval accepting every version
    pub fn everything() -> Self {
        Self {
            lower: None,
            lower_inclusive: false,
            upper: None,
            upper_inclusive: false,
        }
    }

    /// Check whether a version falls inside this interval
    pub fn contains(&self, version: &Version) -> bool {
        if let Some(ref lower) = self.lower {
            match version.cmp(lower) {
                Ordering::Less => return false,
                Ordering::Equal if !self.lower_inclusive => return false,
                _ => {},
            }
        }
        if let Some(ref upper) = self.upper {
            match version.cmp(upper) {
                Ordering::Greater => return false,
                Ordering::Equal if !self.upper_inclusive => return false,
                _ => {},
            }
        }
        true
    }

    /// Intersect two intervals, returning `None` when they do not overlap
    pub fn intersect(&self, other: &Restriction) -> Option<Restriction> {
        let (lower, lower_inclusive) = match (&self.lower, &other.lower) {
            (None, None) => (None, false),
            (Some(a), None) => (Some(a.clone()), self.lower_inclusive),
            (None, Some(b)) => (Some(b.clone()), other.lower_inclusive),
            (Some(a), Some(b)) => match a.cmp(b) {
                Ordering::Greater => (Some(a.clone()), self.lower_inclusive),
                Ordering::Less => (Some(b.clone()), other.lower_inclusive),
                Ordering::Equal => (
                    Some(a.clone()),
                    self.lower_inclusive && other.lower_inclusive,
                ),
            },
        };
        let (upper, upper_inclusive) = match (&self.upper, &other.upper) {
            (None, None) => (None, false),
            (Some(a), None) => (Some(a.clone()), self.upper_inclusive),
            (None, Some(b)) => (Some(b.clone()), other.upper_inclusive),
            (Some(a), Some(b)) => match a.cmp(b) {
                Ordering::Less => (Some(a.clone()), self.upper_inclusive),
                Ordering::Greater => (Some(b.clone()), other.upper_inclusive),
                Ordering::Equal => (
                    Some(a.clone()),
                    self.upper_inclusive && other.upper_inclusive,
                ),
            },
        };

        if let (Some(lo), Some(hi)) = (&lower, &upper) {
            match lo.cmp(hi) {
                Ordering::Greater => return None,
                Ordering::Equal if !(lower_inclusive && upper_inclusive) => return None,
                _ => {},
            }
        }

        Some(Restriction {
            lower,
            lower_inclusive,
            upper,
            upper_inclusive,
        })
    }

    fn parse(segment: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidRange {
            input: segment.to_string(),
        };

        let lower_inclusive = segment.starts_with('[');
        let upper_inclusive = segment.ends_with(']');
        if segment.len() < 2 {
            return Err(invalid());
        }
        let inner = &segment[1..segment.len() - 1];

        if let Some((lo, hi)) = inner.split_once(',') {
            let lower = if lo.trim().is_empty() {
                None
            } else {
                Some(Version::from_str(lo)?)
            };
            let upper = if hi.trim().is_empty() {
                None
            } else {
                Some(Version::from_str(hi)?)
            };
            if let (Some(l), Some(u)) = (&lower, &upper) {
                match l.cmp(u) {
                    Ordering::Greater => return Err(invalid()),
                    Ordering::Equal if !(lower_inclusive && upper_inclusive) => {
                        return Err(invalid())
                    },
                    _ => {},
                }
            }
            Ok(Restriction {
                lower,
                lower_inclusive,
                upper,
                upper_inclusive,
            })
        } else {
            // Exact pin, only valid as [1.0]
            if !(lower_inclusive && upper_inclusive) {
                return Err(invalid());
            }
            let version = Version::from_str(inner)?;
            Ok(Restriction {
                lower: Some(version.clone()),
                lower_inclusive: true,
                upper: Some(version),
                upper_inclusive: true,
            })
        }
    }

    fn is_everything(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(lo), Some(hi)) = (&self.lower, &self.upper) {
            if lo == hi && self.lower_inclusive && self.upper_inclusive {
                return write!(f, "[{}]", lo);
            }
        }
        write!(f, "{}", if self.lower_inclusive { '[' } else { '(' })?;
        if let Some(ref lo) = self.lower {
            write!(f, "{}", lo)?;
        }
        write!(f, ",")?;
        if let Some(ref hi) = self.upper {
            write!(f, "{}", hi)?;
        }
        write!(f, "{}", if self.upper_inclusive { ']' } else { ')' })
    }
}

/// Version requirement of a dependency declaration.
///
/// A bare `1.0` carries a recommended version and accepts anything; bracketed
/// intervals constrain the acceptable set. Intersecting two requirements can
/// leave the restriction set empty, meaning no version can satisfy both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    pub recommended: Option<Version>,
    pub restrictions: Vec<Restriction>,
}

impl VersionRange {
    /// Range recommending a single version without constraining others
    pub fn pinned(version: Version) -> Self {
        Self {
            recommended: Some(version),
            restrictions: vec![Restriction::everything()],
        }
    }

    /// Range accepting any version, recommending none
    pub fn any() -> Self {
        Self {
            recommended: None,
            restrictions: vec![Restriction::everything()],
        }
    }

    /// Parse a range or bare version string
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        Self::from_str(input)
    }

    /// Check whether a version satisfies the restrictions
    pub fn matches(&self, version: &Version) -> bool {
        self.restrictions.iter().any(|r| r.contains(version))
    }

    /// True when intersection has eliminated every acceptable interval
    pub fn is_over_constrained(&self) -> bool {
        self.restrictions.is_empty()
    }

    /// Intersect with another range.
    ///
    /// The recommended version of `self` survives when present, otherwise the
    /// other side's recommendation is adopted. The restriction sets are
    /// intersected pairwise; a disjoint result leaves the range
    /// over-constrained.
    pub fn restrict(&self, other: &VersionRange) -> VersionRange {
        let mut restrictions = Vec::new();
        for a in &self.restrictions {
            for b in &other.restrictions {
                if let Some(joined) = a.intersect(b) {
                    restrictions.push(joined);
                }
            }
        }
        VersionRange {
            recommended: self
                .recommended
                .clone()
                .or_else(|| other.recommended.clone()),
            restrictions,
        }
    }

    /// Pick the highest available version satisfying the restrictions
    pub fn select_from(&self, available: &[Version]) -> Option<Version> {
        let mut sorted = available.to_vec();
        sorted.sort();
        sorted.iter().rev().find(|v| self.matches(v)).cloned()
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if !input.starts_with('[') && !input.starts_with('(') {
            let version = Version::from_str(input)?;
            return Ok(VersionRange::pinned(version));
        }

        let invalid = || VersionError::InvalidRange {
            input: input.to_string(),
        };

        let mut restrictions = Vec::new();
        let mut rest = input;
        loop {
            let close = rest.find(|c| c == ']' || c == ')').ok_or_else(invalid)?;
            let (segment, remainder) = rest.split_at(close + 1);
            restrictions.push(Restriction::parse(segment)?);
            rest = remainder;
            if rest.is_empty() {
                break;
            }
            rest = rest.strip_prefix(',').ok_or_else(invalid)?;
            if !rest.starts_with('[') && !rest.starts_with('(') {
                return Err(invalid());
            }
        }

        Ok(VersionRange {
            recommended: None,
            restrictions,
        })
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref recommended) = self.recommended {
            let unconstrained =
                self.restrictions.len() == 1 && self.restrictions[0].is_everything();
            if unconstrained {
                return write!(f, "{}", recommended);
            }
        }
        if self.restrictions.is_empty() {
            return write!(f, "[]");
        }
        for (i, restriction) in self.restrictions.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", restriction)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let v = Version::from_str("1.2.3").unwrap();
        assert_eq!(v.components, vec![1, 2, 3]);
        assert_eq!(v.qualifier, None);

        let v = Version::from_str("2.0").unwrap();
        assert_eq!(v.components, vec![2, 0]);

        let v = Version::from_str("1.0-beta2").unwrap();
        assert_eq!(v.qualifier, Some("beta2".to_string()));
    }

    #[test]
    fn test_version_parsing_rejects_garbage() {
        assert!(Version::from_str("").is_err());
        assert!(Version::from_str("1.x").is_err());
        assert!(Version::from_str("1.0-").is_err());
    }

    #[test]
    fn test_version_equality_ignores_trailing_zeros() {
        let short = Version::from_str("1.0").unwrap();
        let long = Version::from_str("1.0.0").unwrap();
        assert_eq!(short, long);
    }

    #[test]
    fn test_version_ordering() {
        let v1 = Version::from_str("1.0").unwrap();
        let v11 = Version::from_str("1.1").unwrap();
        let v2 = Version::from_str("2.0").unwrap();
        let beta = Version::from_str("1.1-beta1").unwrap();

        assert!(v1 < v11);
        assert!(v11 < v2);
        assert!(beta < v11);
        assert!(v1 < beta);
    }

    #[test]
    fn test_version_display_round_trip() {
        for input in ["1.2.3", "2.0", "1.0-beta2"] {
            let v = Version::from_str(input).unwrap();
            assert_eq!(v.to_string(), input);
        }
    }

    #[test]
    fn test_range_pinned() {
        let range = VersionRange::parse("1.0").unwrap();
        assert_eq!(range.recommended, Some(Version::from_str("1.0").unwrap()));
        assert!(range.matches(&Version::from_str("9.9").unwrap()));
    }

    #[test]
    fn test_range_interval() {
        let range = VersionRange::parse("[1.0,2.0)").unwrap();
        assert_eq!(range.recommended, None);
        assert!(range.matches(&Version::from_str("1.0").unwrap()));
        assert!(range.matches(&Version::from_str("1.9").unwrap()));
        assert!(!range.matches(&Version::from_str("2.0").unwrap()));
        assert!(!range.matches(&Version::from_str("0.9").unwrap()));
    }

    #[test]
    fn test_range_exact_pin() {
        let range = VersionRange::parse("[1.0]").unwrap();
        assert!(range.matches(&Version::from_str("1.0").unwrap()));
        assert!(!range.matches(&Version::from_str("1.0.1").unwrap()));
    }

    #[test]
    fn test_range_open_ended() {
        let range = VersionRange::parse("(,1.0]").unwrap();
        assert!(range.matches(&Version::from_str("0.5").unwrap()));
        assert!(range.matches(&Version::from_str("1.0").unwrap()));
        assert!(!range.matches(&Version::from_str("1.1").unwrap()));
    }

    #[test]
    fn test_range_union() {
        let range = VersionRange::parse("[1.0,2.0),[3.0,4.0)").unwrap();
        assert!(range.matches(&Version::from_str("1.5").unwrap()));
        assert!(!range.matches(&Version::from_str("2.5").unwrap()));
        assert!(range.matches(&Version::from_str("3.5").unwrap()));
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(VersionRange::parse("[2.0,1.0]").is_err());
        assert!(VersionRange::parse("(1.0,1.0)").is_err());
        assert!(VersionRange::parse("(1.0)").is_err());
    }

    #[test]
    fn test_restrict_pinned_against_interval() {
        let pinned = VersionRange::parse("1.0").unwrap();
        let interval = VersionRange::parse("[1.0,2.0)").unwrap();

        let joined = pinned.restrict(&interval);
        assert_eq!(joined.recommended, Some(Version::from_str("1.0").unwrap()));
        assert!(joined.matches(&Version::from_str("1.5").unwrap()));
        assert!(!joined.matches(&Version::from_str("2.0").unwrap()));
    }

    #[test]
    fn test_restrict_disjoint_intervals() {
        let a = VersionRange::parse("[1.0,2.0)").unwrap();
        let b = VersionRange::parse("[3.0,4.0)").unwrap();

        let joined = a.restrict(&b);
        assert!(joined.is_over_constrained());
        assert!(!joined.matches(&Version::from_str("1.5").unwrap()));
    }

    #[test]
    fn test_select_from_prefers_highest() {
        let range = VersionRange::parse("[1.0,2.0)").unwrap();
        let available = vec![
            Version::from_str("0.9").unwrap(),
            Version::from_str("1.4").unwrap(),
            Version::from_str("1.2").unwrap(),
            Version::from_str("2.0").unwrap(),
        ];

        let selected = range.select_from(&available).unwrap();
        assert_eq!(selected, Version::from_str("1.4").unwrap());
    }

    #[test]
    fn test_select_from_empty_when_over_constrained() {
        let a = VersionRange::parse("[1.0,2.0)").unwrap();
        let b = VersionRange::parse("[3.0,4.0)").unwrap();
        let joined = a.restrict(&b);

        let available = vec![Version::from_str("1.5").unwrap()];
        assert_eq!(joined.select_from(&available), None);
    }

    #[test]
    fn test_range_display() {
        assert_eq!(VersionRange::parse("1.0").unwrap().to_string(), "1.0");
        assert_eq!(
            VersionRange::parse("[1.0,2.0)").unwrap().to_string(),
            "[1.0,2.0)"
        );
        assert_eq!(VersionRange::parse("[1.0]").unwrap().to_string(), "[1.0]");
        assert_eq!(VersionRange::parse("(,1.0]").unwrap().to_string(), "(,1.0]");
    }
}
