//! Request and response matchers.

mod header;
mod url;

pub use header::{ExactHeaderMatch, HeaderMatch, HeaderMatcherImpl};
pub use url::UrlMatcherImpl;

use crate::config::{ResponseMatcher, RuleMatcher};
use crate::context::{RequestInfo, ResponseInfo};

/// Compiled request conditions of a rule.
#[derive(Debug, Default)]
pub struct CompiledRequestMatcher {
    /// URL matcher
    url: Option<UrlMatcherImpl>,
    /// Allowed methods (uppercase)
    methods: Option<Vec<String>>,
    /// Request header matchers
    headers: Vec<HeaderMatcherImpl>,
}

/// Compiled response conditions of a rule.
#[derive(Debug, Default)]
pub struct CompiledResponseMatcher {
    status_codes: Option<Vec<u16>>,
    headers: Vec<HeaderMatcherImpl>,
}

impl CompiledRequestMatcher {
    /// Compile the request conditions of a rule matcher.
    pub fn compile(config: &RuleMatcher) -> Result<Self, MatcherError> {
        let url = config
            .url
            .as_ref()
            .map(UrlMatcherImpl::compile)
            .transpose()?;

        let methods = config
            .methods
            .as_ref()
            .map(|ms| ms.iter().map(|m| m.to_uppercase()).collect());

        let headers = compile_headers(config.headers.as_deref())?;

        Ok(Self {
            url,
            methods,
            headers,
        })
    }

    /// Check if the request matches all conditions.
    pub fn matches(&self, request: &RequestInfo) -> bool {
        if let Some(ref url_matcher) = self.url {
            if !url_matcher.matches(&request.url) {
                return false;
            }
        }

        if let Some(ref methods) = self.methods {
            let method = request.method.to_uppercase();
            if !methods.iter().any(|m| *m == method) {
                return false;
            }
        }

        self.headers.iter().all(|h| h.matches(&request.headers))
    }

    /// Whether any request condition is configured.
    pub fn is_unconditional(&self) -> bool {
        self.url.is_none() && self.methods.is_none() && self.headers.is_empty()
    }
}

impl CompiledResponseMatcher {
    /// Compile response conditions.
    pub fn compile(config: &ResponseMatcher) -> Result<Self, MatcherError> {
        Ok(Self {
            status_codes: config.status_codes.clone(),
            headers: compile_headers(config.headers.as_deref())?,
        })
    }

    /// Check if the response matches all conditions.
    pub fn matches(&self, response: &ResponseInfo) -> bool {
        if let Some(ref status_codes) = self.status_codes {
            if !status_codes.contains(&response.status) {
                return false;
            }
        }

        self.headers.iter().all(|h| h.matches(&response.headers))
    }
}

fn compile_headers(
    config: Option<&[crate::config::HeaderMatcher]>,
) -> Result<Vec<HeaderMatcherImpl>, MatcherError> {
    config
        .map(|hs| {
            hs.iter()
                .map(HeaderMatcherImpl::compile)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Errors that can occur during matcher compilation.
#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(#[from] glob::PatternError),
}
