//! URL matching implementation.

use super::MatcherError;
use crate::config::{PatternType, UrlMatcher};
use glob::Pattern as GlobPattern;
use regex::Regex;

/// Compiled URL matcher.
#[derive(Debug)]
pub enum UrlMatcherImpl {
    /// Exact string match
    Exact(String),
    /// Glob pattern match
    Glob(GlobPattern),
    /// Regex pattern match
    Regex(Regex),
}

impl UrlMatcherImpl {
    /// Compile a URL matcher from configuration.
    pub fn compile(config: &UrlMatcher) -> Result<Self, MatcherError> {
        match config.pattern_type {
            PatternType::Exact => Ok(Self::Exact(config.pattern.clone())),
            PatternType::Glob => {
                let pattern = GlobPattern::new(&config.pattern)?;
                Ok(Self::Glob(pattern))
            }
            PatternType::Regex => {
                let regex = Regex::new(&config.pattern)?;
                Ok(Self::Regex(regex))
            }
        }
    }

    /// Check whether `url` matches.
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Glob(pattern) => pattern.matches(url),
            Self::Regex(regex) => regex.is_match(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str, pattern_type: PatternType) -> UrlMatcherImpl {
        UrlMatcherImpl::compile(&UrlMatcher {
            pattern: pattern.to_string(),
            pattern_type,
        })
        .unwrap()
    }

    #[test]
    fn test_exact_match() {
        let matcher = compile("https://api.example.com/users", PatternType::Exact);

        assert!(matcher.matches("https://api.example.com/users"));
        assert!(!matcher.matches("https://api.example.com/users/123"));
    }

    #[test]
    fn test_glob_match() {
        let matcher = compile("https://api.example.com/*/avatar", PatternType::Glob);

        assert!(matcher.matches("https://api.example.com/users/avatar"));
        assert!(!matcher.matches("https://api.example.com/users/123"));
    }

    #[test]
    fn test_regex_match() {
        let matcher = compile(r"^https://[^/]+/files/\d+$", PatternType::Regex);

        assert!(matcher.matches("https://cdn.example.com/files/42"));
        assert!(!matcher.matches("https://cdn.example.com/files/abc"));
    }

    #[test]
    fn test_invalid_glob() {
        let err = UrlMatcherImpl::compile(&UrlMatcher {
            pattern: "[".to_string(),
            pattern_type: PatternType::Glob,
        })
        .unwrap_err();
        assert!(matches!(err, MatcherError::InvalidGlob(_)));
    }
}
