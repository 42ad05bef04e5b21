//! Configuration types for trace transformation pipelines.

use serde::{Deserialize, Serialize};

/// Main configuration of a trace pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Configuration version
    pub version: String,
    /// Global settings
    pub settings: Settings,
    /// Transform rules (applied in priority order)
    pub rules: Vec<Rule>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            settings: Settings::default(),
            rules: vec![],
        }
    }
}

/// Global settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Body length limit applied after all rules, in characters (-1 = no limit)
    pub max_body_length: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_body_length: -1,
        }
    }
}

/// A transform rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name (for logging/debugging)
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: String,
    /// Whether the rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Priority (higher = applied first)
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Matching conditions
    #[serde(rename = "match", default)]
    pub matcher: RuleMatcher,
    /// Body transformation
    #[serde(default)]
    pub body: BodyTransform,
}

fn default_true() -> bool {
    true
}

fn default_priority() -> i32 {
    50
}

/// Matching conditions for a rule.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuleMatcher {
    /// HTTP methods to match
    #[serde(default)]
    pub methods: Option<Vec<String>>,
    /// URL matching
    #[serde(default)]
    pub url: Option<UrlMatcher>,
    /// Request header conditions
    #[serde(default)]
    pub headers: Option<Vec<HeaderMatcher>>,
    /// Response conditions
    #[serde(default)]
    pub response: Option<ResponseMatcher>,
}

/// URL matcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlMatcher {
    /// The pattern to match
    pub pattern: String,
    /// Match type: exact, glob, regex
    #[serde(default, rename = "type")]
    pub pattern_type: PatternType,
}

/// Pattern matching type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// Exact string match
    Exact,
    /// Glob pattern (*, ?)
    Glob,
    /// Regular expression
    #[default]
    Regex,
}

/// Header matcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderMatcher {
    /// Header name (case-insensitive)
    pub name: String,
    /// Exact value match
    #[serde(default)]
    pub equals: Option<String>,
    /// Contains substring
    #[serde(default)]
    pub contains: Option<String>,
    /// Regex match
    #[serde(default)]
    pub matches: Option<String>,
    /// Header must be present
    #[serde(default)]
    pub present: Option<bool>,
    /// Header must be absent
    #[serde(default)]
    pub absent: Option<bool>,
}

/// Response matcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResponseMatcher {
    /// Status codes to match
    #[serde(default)]
    pub status_codes: Option<Vec<u16>>,
    /// Response header conditions
    #[serde(default)]
    pub headers: Option<Vec<HeaderMatcher>>,
}

/// Body transformation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BodyTransform {
    /// Maximum body length in characters (negative = no limit)
    #[serde(default)]
    pub limit: Option<i64>,
    /// Body to clear before limiting
    #[serde(default)]
    pub clear: Option<BodyTarget>,
}

/// Which body of the record a body transformation targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BodyTarget {
    Request,
    Response,
    Both,
}
