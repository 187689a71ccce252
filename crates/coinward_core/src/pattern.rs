//! # Wildcard Pattern Resolution
//!
//! Identifier-to-value mapping with two rule kinds:
//!
//! - **exact** rules: plain identifiers, matched via hash lookup first
//! - **wildcard** rules: `*` matches any run of characters, `?` matches a
//!   single character; anchored and case-insensitive
//!
//! Wildcard rules are compiled to regexes once at configure time and kept
//! sorted by descending *specificity* (literal character count minus two
//! per wildcard), so `Ore_Iron_*` beats `*_Iron_*` for `Ore_Iron_Basalt`.
//! Ties keep insertion order.

use std::collections::{HashMap, HashSet};

use regex::RegexBuilder;

use crate::error::{CoreError, CoreResult};

/// A compiled wildcard pattern.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    raw: String,
    regex: regex::Regex,
    specificity: i64,
}

impl WildcardPattern {
    /// Whether a rule string contains wildcard metacharacters.
    #[must_use]
    pub fn is_pattern(rule: &str) -> bool {
        rule.contains(['*', '?'])
    }

    /// Compile a wildcard rule into an anchored, case-insensitive matcher.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPattern`] if the compiled expression is
    /// rejected (pathological length, mostly).
    pub fn compile(raw: &str) -> CoreResult<Self> {
        let mut expr = String::with_capacity(raw.len() + 8);
        let mut literal = String::new();
        let mut literal_chars: i64 = 0;
        let mut wildcards: i64 = 0;

        expr.push('^');
        for ch in raw.chars() {
            match ch {
                '*' | '?' => {
                    expr.push_str(&regex::escape(&literal));
                    literal.clear();
                    wildcards += 1;
                    if ch == '*' {
                        expr.push_str(".*");
                    } else {
                        expr.push('.');
                    }
                }
                other => {
                    literal.push(other);
                    literal_chars += 1;
                }
            }
        }
        expr.push_str(&regex::escape(&literal));
        expr.push('$');

        let regex = RegexBuilder::new(&expr)
            .case_insensitive(true)
            .build()
            .map_err(|source| CoreError::InvalidPattern { pattern: raw.to_owned(), source })?;

        Ok(Self {
            raw: raw.to_owned(),
            regex,
            specificity: literal_chars - 2 * wildcards,
        })
    }

    /// Whether the pattern matches the whole identifier.
    #[must_use]
    #[inline]
    pub fn matches(&self, id: &str) -> bool {
        self.regex.is_match(id)
    }

    /// The rule text this pattern was compiled from.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Specificity used for ordering: more literal text wins, each wildcard
    /// costs two.
    #[must_use]
    pub fn specificity(&self) -> i64 {
        self.specificity
    }
}

/// Identifier-to-value resolution table: exact rules first, then wildcard
/// rules in descending specificity.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    exact: HashMap<String, String>,
    patterns: Vec<(WildcardPattern, String)>,
}

impl PatternSet {
    /// Empty set; resolves nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(rule, value)` pairs, splitting exact from wildcard
    /// rules and sorting the wildcard rules by specificity.
    ///
    /// # Errors
    ///
    /// Returns the first pattern compile failure.
    pub fn from_mappings<I>(mappings: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut set = Self::new();
        for (rule, value) in mappings {
            set.add(&rule, &value)?;
        }
        set.sort_patterns();
        Ok(set)
    }

    fn add(&mut self, rule: &str, value: &str) -> CoreResult<()> {
        if WildcardPattern::is_pattern(rule) {
            self.patterns.push((WildcardPattern::compile(rule)?, value.to_owned()));
        } else {
            self.exact.insert(rule.to_owned(), value.to_owned());
        }
        Ok(())
    }

    fn sort_patterns(&mut self) {
        // Stable: equal specificity keeps insertion order.
        self.patterns.sort_by(|a, b| b.0.specificity.cmp(&a.0.specificity));
    }

    /// Exact-rule lookup only.
    #[must_use]
    pub fn resolve_exact(&self, id: &str) -> Option<&str> {
        self.exact.get(id).map(String::as_str)
    }

    /// Wildcard-rule lookup only; first match in specificity order.
    #[must_use]
    pub fn resolve_pattern(&self, id: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(p, _)| p.matches(id))
            .map(|(_, v)| v.as_str())
    }

    /// Full resolution: exact table, then wildcard rules.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.resolve_exact(id).or_else(|| self.resolve_pattern(id))
    }

    /// Total rule count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    /// Whether the set holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }
}

/// Set of identifiers that must never produce a value, with both exact and
/// wildcard rules.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    exact: HashSet<String>,
    patterns: Vec<WildcardPattern>,
}

impl ExclusionSet {
    /// Empty set; excludes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rule strings.
    ///
    /// # Errors
    ///
    /// Returns the first pattern compile failure.
    pub fn from_rules<I>(rules: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut set = Self::new();
        for rule in rules {
            if WildcardPattern::is_pattern(&rule) {
                set.patterns.push(WildcardPattern::compile(&rule)?);
            } else {
                set.exact.insert(rule);
            }
        }
        Ok(set)
    }

    /// Whether the identifier is excluded.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.exact.contains(id) || self.patterns.iter().any(|p| p.matches(id))
    }

    /// Total rule count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    /// Whether the set holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }
}
