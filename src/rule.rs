//! Rule engine: compiles configured rules into one transformer chain.

use crate::config::{Rule, TraceConfig};
use crate::context::{RequestInfo, ResponseInfo};
use crate::matcher::{CompiledRequestMatcher, CompiledResponseMatcher, MatcherError};
use crate::transformer::{
    identity, limit_body_size_transformer, BodyTransformer, BoxedTransformer, RequestFiltered,
    TraceTransformer,
};
use tracing::{debug, trace};

/// Summary of a compiled rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    /// Rule name
    pub name: String,
    /// Rule priority
    pub priority: i32,
}

/// Compiled rules of a configuration.
#[derive(Debug)]
pub struct RuleEngine {
    rules: Vec<CompiledRule>,
    chain: BoxedTransformer,
}

impl RuleEngine {
    /// Compile every enabled rule, highest priority first, followed by the
    /// global body length limit.
    pub fn new(config: &TraceConfig) -> Result<Self, RuleError> {
        let mut enabled: Vec<&Rule> = config.rules.iter().filter(|r| r.enabled).collect();
        // Stable: equal priorities keep configuration order
        enabled.sort_by_key(|r| std::cmp::Reverse(r.priority));

        let mut rules = Vec::with_capacity(enabled.len());
        let mut chain = identity().boxed();

        for rule in enabled {
            let compiled = compile_rule(rule)?;
            chain = chain.and_then(compiled).boxed();
            rules.push(CompiledRule {
                name: rule.name.clone(),
                priority: rule.priority,
            });
        }

        let chain = chain
            .and_then(limit_body_size_transformer(
                config.settings.max_body_length,
            ))
            .boxed();

        Ok(Self { rules, chain })
    }

    /// Get the compiled rules, in application order.
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Get the compiled transformer chain.
    pub fn chain(&self) -> &BoxedTransformer {
        &self.chain
    }

    /// Consume the engine, keeping only the transformer chain.
    pub fn into_chain(self) -> BoxedTransformer {
        self.chain
    }
}

fn compile_rule(rule: &Rule) -> Result<BoxedTransformer, RuleError> {
    if rule.name.trim().is_empty() {
        return Err(RuleError::MissingName);
    }

    let request_matcher =
        CompiledRequestMatcher::compile(&rule.matcher).map_err(|source| RuleError::Matcher {
            rule: rule.name.clone(),
            source,
        })?;

    let response_matcher = rule
        .matcher
        .response
        .as_ref()
        .map(CompiledResponseMatcher::compile)
        .transpose()
        .map_err(|source| RuleError::Matcher {
            rule: rule.name.clone(),
            source,
        })?;

    let transformer = gate_on_request(rule, request_matcher);

    Ok(match response_matcher {
        Some(response_matcher) => transformer
            .only_for_responses_matching(move |response: &ResponseInfo| {
                response_matcher.matches(response)
            })
            .boxed(),
        None => transformer.boxed(),
    })
}

/// The rule's body transformer, applied only to requests its matcher accepts.
///
/// Logging happens in the predicate, so a matched rule costs no extra link
/// in the chain.
fn gate_on_request(
    rule: &Rule,
    request_matcher: CompiledRequestMatcher,
) -> RequestFiltered<BodyTransformer, impl Fn(&RequestInfo) -> bool + Send + Sync> {
    let name = rule.name.clone();
    BodyTransformer::new(&rule.body).only_for_requests_matching(move |request: &RequestInfo| {
        let matched = request_matcher.matches(request);
        if matched {
            debug!(rule = %name, url = %request.url, "Applying trace transform rule");
        } else {
            trace!(rule = %name, url = %request.url, "Request does not match rule");
        }
        matched
    })
}

/// Errors that can occur while compiling rules.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Rule name must not be empty")]
    MissingName,

    #[error("Invalid matcher in rule '{rule}': {source}")]
    Matcher {
        rule: String,
        #[source]
        source: MatcherError,
    },
}
