//! Extension versions and version constraints.
//!
//! Versions are semver. Two relaxations are accepted when parsing:
//!
//! - a leading core-compatibility prefix such as `8.x-` is stripped
//!   (`8.x-1.2` is version `1.2.0`)
//! - missing minor/patch components default to zero (`1.2` is `1.2.0`)
//!
//! A constraint is a comma-separated list of specifiers, all of which must
//! hold:
//!
//! ```
//! use ext_extensions::version::{VersionConstraint, parse_version};
//!
//! let constraint = VersionConstraint::parse(">=1.0, <2").unwrap();
//! assert!(constraint.matches(&parse_version("8.x-1.4").unwrap()));
//! assert!(!constraint.matches(&parse_version("2.0.0").unwrap()));
//! ```

use std::fmt;

use semver::Version;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Ge,
    Gt,
    Le,
    Lt,
    Eq,
    Ne,
}

/// Operator spellings, longest first so `>=` wins over `>`.
const OPERATORS: &[(&str, Op)] = &[
    (">=", Op::Ge),
    ("<=", Op::Le),
    ("!=", Op::Ne),
    ("==", Op::Eq),
    (">", Op::Gt),
    ("<", Op::Lt),
    ("=", Op::Eq),
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Specifier {
    op: Op,
    version: Version,
}

impl Specifier {
    fn parse(raw: &str) -> Result<Self> {
        let (op, rest) = OPERATORS
            .iter()
            .find_map(|(token, op)| raw.strip_prefix(token).map(|rest| (*op, rest)))
            .unwrap_or((Op::Eq, raw));

        let version = parse_version(rest.trim()).map_err(|_| Error::VersionConstraintParse {
            constraint: raw.to_string(),
            reason: format!("invalid version: {}", rest.trim()),
        })?;
        Ok(Self { op, version })
    }

    fn matches(&self, candidate: &Version) -> bool {
        match self.op {
            Op::Ge => candidate >= &self.version,
            Op::Gt => candidate > &self.version,
            Op::Le => candidate <= &self.version,
            Op::Lt => candidate < &self.version,
            Op::Eq => candidate == &self.version,
            Op::Ne => candidate != &self.version,
        }
    }
}

/// A parsed version constraint, e.g. `>=1.0, <2.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    specifiers: Vec<Specifier>,
    raw: String,
}

impl VersionConstraint {
    /// Parse a comma-separated constraint. A bare version means `==`.
    pub fn parse(constraint: &str) -> Result<Self> {
        let specifiers = constraint
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Specifier::parse)
            .collect::<Result<Vec<_>>>()?;

        if specifiers.is_empty() {
            return Err(Error::VersionConstraintParse {
                constraint: constraint.to_string(),
                reason: "empty constraint".to_string(),
            });
        }

        Ok(Self {
            specifiers,
            raw: constraint.trim().to_string(),
        })
    }

    /// Whether `version` satisfies every specifier.
    pub fn matches(&self, version: &Version) -> bool {
        self.specifiers.iter().all(|spec| spec.matches(version))
    }

    /// The constraint as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse an extension version, accepting a `N.x-` core prefix and
/// abbreviated `major` / `major.minor` forms.
pub fn parse_version(raw: &str) -> Result<Version> {
    let trimmed = raw.trim();
    let unprefixed = strip_core_prefix(trimmed);

    if let Ok(v) = Version::parse(unprefixed) {
        return Ok(v);
    }

    let (core, suffix) = match unprefixed.find(['-', '+']) {
        Some(idx) => unprefixed.split_at(idx),
        None => (unprefixed, ""),
    };
    let padded = match core.matches('.').count() {
        0 => format!("{core}.0.0{suffix}"),
        1 => format!("{core}.0{suffix}"),
        _ => unprefixed.to_string(),
    };

    Version::parse(&padded).map_err(|e| Error::InvalidVersion {
        version: raw.to_string(),
        reason: e.to_string(),
    })
}

/// `8.x-1.2` -> `1.2`; anything else is returned unchanged.
fn strip_core_prefix(s: &str) -> &str {
    match s.split_once(".x-") {
        Some((major, rest)) if !major.is_empty() && major.bytes().all(|b| b.is_ascii_digit()) => {
            rest
        }
        _ => s,
    }
}
