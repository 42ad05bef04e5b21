//! Header matching implementation.

use super::MatcherError;
use crate::config::HeaderMatcher;
use crate::record::TraceHeader;
use regex::Regex;

/// Header matching utility: does `headers` hold a header `name` matching `value`?
///
/// Implemented for plain closures so callers can inject their own semantics.
pub trait HeaderMatch: Send + Sync {
    /// Check the header collection.
    fn matches(&self, headers: &[TraceHeader], name: &str, value: &str) -> bool;
}

impl<F> HeaderMatch for F
where
    F: Fn(&[TraceHeader], &str, &str) -> bool + Send + Sync,
{
    fn matches(&self, headers: &[TraceHeader], name: &str, value: &str) -> bool {
        self(headers, name, value)
    }
}

/// Default header utility: case-insensitive name, exact value, any occurrence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactHeaderMatch;

impl HeaderMatch for ExactHeaderMatch {
    fn matches(&self, headers: &[TraceHeader], name: &str, value: &str) -> bool {
        headers
            .iter()
            .any(|h| h.name.eq_ignore_ascii_case(name) && h.value == value)
    }
}

/// Compiled header matcher.
#[derive(Debug)]
pub struct HeaderMatcherImpl {
    /// Header name (lowercase)
    name: String,
    /// Match condition
    condition: HeaderCondition,
}

#[derive(Debug)]
enum HeaderCondition {
    /// Exact value match
    Equals(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Matches(Regex),
    /// Header must be present
    Present,
    /// Header must be absent
    Absent,
}

impl HeaderMatcherImpl {
    /// Compile a header matcher from configuration.
    pub fn compile(config: &HeaderMatcher) -> Result<Self, MatcherError> {
        let name = config.name.to_lowercase();

        let condition = if let Some(ref value) = config.equals {
            HeaderCondition::Equals(value.clone())
        } else if let Some(ref substr) = config.contains {
            HeaderCondition::Contains(substr.clone())
        } else if let Some(ref pattern) = config.matches {
            HeaderCondition::Matches(Regex::new(pattern)?)
        } else if config.absent == Some(true) || config.present == Some(false) {
            HeaderCondition::Absent
        } else {
            // Default to presence check
            HeaderCondition::Present
        };

        Ok(Self { name, condition })
    }

    /// Check the condition against every header with the configured name.
    pub fn matches(&self, headers: &[TraceHeader]) -> bool {
        let mut values = headers
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(&self.name))
            .map(|h| h.value.as_str());

        match &self.condition {
            HeaderCondition::Equals(expected) => values.any(|v| v == expected),
            HeaderCondition::Contains(substr) => values.any(|v| v.contains(substr.as_str())),
            HeaderCondition::Matches(regex) => values.any(|v| regex.is_match(v)),
            HeaderCondition::Present => values.next().is_some(),
            HeaderCondition::Absent => values.next().is_none(),
        }
    }
}
