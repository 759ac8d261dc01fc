//! Constraint matching implementation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters that can appear in a Base58 address
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Name reported when an address matched an empty constraint set
pub const UNCONSTRAINED: &str = "unconstrained";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("minLength {min} exceeds maxLength {max}")]
    LengthBounds { min: usize, max: usize },
}

/// Constraints an address must satisfy; every specified field must pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Constraints {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub contains: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub case_sensitive: bool,
    pub exclude_patterns: Vec<String>,
}

fn specified(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl Constraints {
    pub fn prefix(value: impl Into<String>) -> Self {
        Self {
            prefix: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn suffix(value: impl Into<String>) -> Self {
        Self {
            suffix: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            contains: Some(value.into()),
            ..Default::default()
        }
    }

    /// Make string comparisons case sensitive
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// The specified string tests, in evaluation order. Empty strings count
    /// as unspecified.
    pub fn string_tests(&self) -> Vec<(ConstraintKind, &str)> {
        [
            (ConstraintKind::Prefix, &self.prefix),
            (ConstraintKind::Suffix, &self.suffix),
            (ConstraintKind::Contains, &self.contains),
            (ConstraintKind::StartsWith, &self.starts_with),
            (ConstraintKind::EndsWith, &self.ends_with),
        ]
        .into_iter()
        .filter_map(|(kind, value)| specified(value).map(|v| (kind, v)))
        .collect()
    }

    fn excludes(&self) -> impl Iterator<Item = &str> {
        self.exclude_patterns
            .iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// No field specified: every address matches
    pub fn is_empty(&self) -> bool {
        self.string_tests().is_empty()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.excludes().next().is_none()
    }

    pub fn validate(&self) -> Result<(), ConstraintError> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(ConstraintError::LengthBounds { min, max });
            }
        }
        Ok(())
    }

    /// Non-fatal problems worth showing the caller before a search
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.is_empty() {
            warnings.push(
                "no constraints specified: every derived address matches, which is expensive"
                    .to_string(),
            );
        }
        for (kind, value) in self.string_tests() {
            if let Some(c) = value.chars().find(|&c| !self.char_possible(c)) {
                warnings.push(format!(
                    "{} '{}' contains '{}', which never appears in a Base58 address",
                    kind.name(),
                    value,
                    c
                ));
            }
        }
        warnings
    }

    fn char_possible(&self, c: char) -> bool {
        if self.case_sensitive {
            BASE58_ALPHABET.contains(c)
        } else {
            BASE58_ALPHABET.contains(c.to_ascii_lowercase())
                || BASE58_ALPHABET.contains(c.to_ascii_uppercase())
        }
    }
}

/// A positive string test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    Prefix,
    Suffix,
    Contains,
    StartsWith,
    EndsWith,
}

impl ConstraintKind {
    pub fn name(self) -> &'static str {
        match self {
            ConstraintKind::Prefix => "prefix",
            ConstraintKind::Suffix => "suffix",
            ConstraintKind::Contains => "contains",
            ConstraintKind::StartsWith => "startsWith",
            ConstraintKind::EndsWith => "endsWith",
        }
    }

    fn test(self, address: &str, pattern: &str) -> bool {
        match self {
            ConstraintKind::Prefix | ConstraintKind::StartsWith => address.starts_with(pattern),
            ConstraintKind::Suffix | ConstraintKind::EndsWith => address.ends_with(pattern),
            ConstraintKind::Contains => address.contains(pattern),
        }
    }
}

/// Result of checking one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub ok: bool,
    /// Names of the constraints that passed, or `[UNCONSTRAINED]`
    pub satisfied: Vec<&'static str>,
}

impl MatchOutcome {
    fn reject() -> Self {
        Self {
            ok: false,
            satisfied: Vec::new(),
        }
    }
}

/// Constraint matcher with patterns pre-folded for the configured case mode
#[derive(Debug, Clone)]
pub struct ConstraintMatcher {
    constraints: Constraints,
    tests: Vec<(ConstraintKind, String)>,
    excludes: Vec<String>,
    unconstrained: bool,
}

impl ConstraintMatcher {
    pub fn new(constraints: Constraints) -> Self {
        let fold = |s: &str| {
            if constraints.case_sensitive {
                s.to_string()
            } else {
                s.to_lowercase()
            }
        };
        let tests = constraints
            .string_tests()
            .into_iter()
            .map(|(kind, value)| (kind, fold(value)))
            .collect();
        let excludes = constraints.excludes().map(fold).collect();
        let unconstrained = constraints.is_empty();

        Self {
            constraints,
            tests,
            excludes,
            unconstrained,
        }
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    fn fold<'a>(&self, address: &'a str) -> std::borrow::Cow<'a, str> {
        if self.constraints.case_sensitive {
            address.into()
        } else {
            address.to_lowercase().into()
        }
    }

    fn length_ok(&self, address: &str) -> bool {
        let len = address.chars().count();
        self.constraints.min_length.map_or(true, |min| len >= min)
            && self.constraints.max_length.map_or(true, |max| len <= max)
    }

    /// Whether `address` passes, without collecting names
    pub fn is_match(&self, address: &str) -> bool {
        if self.unconstrained {
            return true;
        }
        if !self.length_ok(address) {
            return false;
        }
        let folded = self.fold(address);
        !self.excludes.iter().any(|p| folded.contains(p.as_str()))
            && self.tests.iter().all(|(kind, p)| kind.test(&folded, p))
    }

    /// Check `address` and report which constraints it satisfied
    pub fn matches(&self, address: &str) -> MatchOutcome {
        if self.unconstrained {
            return MatchOutcome {
                ok: true,
                satisfied: vec![UNCONSTRAINED],
            };
        }

        let mut satisfied = Vec::new();

        // Length bounds come first and ignore case folding
        if !self.length_ok(address) {
            return MatchOutcome::reject();
        }
        if self.constraints.min_length.is_some() {
            satisfied.push("minLength");
        }
        if self.constraints.max_length.is_some() {
            satisfied.push("maxLength");
        }

        let folded = self.fold(address);
        if self.excludes.iter().any(|p| folded.contains(p.as_str())) {
            return MatchOutcome::reject();
        }
        if !self.excludes.is_empty() {
            satisfied.push("excludePatterns");
        }

        for (kind, pattern) in &self.tests {
            if !kind.test(&folded, pattern) {
                return MatchOutcome::reject();
            }
            satisfied.push(kind.name());
        }

        MatchOutcome {
            ok: true,
            satisfied,
        }
    }
}
