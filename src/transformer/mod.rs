//! Trace transformers and their combinators.
//!
//! A transformer maps a trace record, together with the request and response it
//! was captured from, to the record the next stage should see. Transformers are
//! composed like iterator adapters:
//!
//! ```
//! use http_trace_transform::transformer::{limit_body_size_transformer, transform_fn, TraceTransformer};
//! use http_trace_transform::{RequestInfo, ResponseInfo, TraceRecord};
//!
//! let chain = limit_body_size_transformer(4)
//!     .and_then(transform_fn(|_req: &RequestInfo, _resp: &ResponseInfo, mut record: TraceRecord| {
//!         record.api_name = record.api_name.to_uppercase();
//!         record
//!     }))
//!     .only_for_responses_with_header("X-Trace", "full");
//! # let _ = chain;
//! ```

mod body;

pub use body::{limit_body_size_transformer, BodyTransformer, LimitBodySize};

use crate::context::{RequestInfo, ResponseInfo};
use crate::matcher::{ExactHeaderMatch, HeaderMatch};
use crate::record::TraceRecord;
use std::fmt;

/// Operation applied to a trace record before it reaches the log sink.
pub trait TraceTransformer: Send + Sync {
    /// Transform the record captured for `request` and `response`.
    ///
    /// The returned record is the one the caller must keep using; it may be the
    /// input record modified in place or a different one.
    fn transform(
        &self,
        request: &RequestInfo,
        response: &ResponseInfo,
        record: TraceRecord,
    ) -> TraceRecord;

    /// Get the transformer name for debugging.
    fn name(&self) -> &'static str {
        "transformer"
    }

    /// Apply `self`, then `next` on the record `self` produced.
    fn and_then<T>(self, next: T) -> AndThen<Self, T>
    where
        Self: Sized,
        T: TraceTransformer,
    {
        AndThen { first: self, next }
    }

    /// Apply `self` only when `predicate` accepts the request.
    fn only_for_requests_matching<P>(self, predicate: P) -> RequestFiltered<Self, P>
    where
        Self: Sized,
        P: Fn(&RequestInfo) -> bool + Send + Sync,
    {
        RequestFiltered {
            inner: self,
            predicate,
        }
    }

    /// Apply `self` only when `predicate` accepts the response.
    fn only_for_responses_matching<P>(self, predicate: P) -> ResponseFiltered<Self, P>
    where
        Self: Sized,
        P: Fn(&ResponseInfo) -> bool + Send + Sync,
    {
        ResponseFiltered {
            inner: self,
            predicate,
        }
    }

    /// Apply `self` only to responses carrying a `header_name` header equal
    /// to `header_value`, as decided by [`ExactHeaderMatch`].
    fn only_for_responses_with_header(
        self,
        header_name: impl Into<String>,
        header_value: impl Into<String>,
    ) -> ResponseFiltered<Self, HeaderPredicate<ExactHeaderMatch>>
    where
        Self: Sized,
    {
        self.only_for_responses_with_header_using(ExactHeaderMatch, header_name, header_value)
    }

    /// Same as [`only_for_responses_with_header`](Self::only_for_responses_with_header)
    /// with a caller-provided header matching utility.
    fn only_for_responses_with_header_using<M>(
        self,
        matcher: M,
        header_name: impl Into<String>,
        header_value: impl Into<String>,
    ) -> ResponseFiltered<Self, HeaderPredicate<M>>
    where
        Self: Sized,
        M: HeaderMatch,
    {
        let predicate = HeaderPredicate {
            matcher,
            name: header_name.into(),
            value: header_value.into(),
        };
        ResponseFiltered {
            inner: self,
            predicate,
        }
    }

    /// Erase the concrete type, e.g. to build chains at runtime.
    fn boxed(self) -> BoxedTransformer
    where
        Self: Sized + 'static,
    {
        BoxedTransformer::new(self)
    }
}

/// Transformer backed by a closure. See [`transform_fn`].
#[derive(Clone, Copy)]
pub struct FnTransformer<F>(F);

/// Lift a closure into a [`TraceTransformer`].
pub fn transform_fn<F>(f: F) -> FnTransformer<F>
where
    F: Fn(&RequestInfo, &ResponseInfo, TraceRecord) -> TraceRecord + Send + Sync,
{
    FnTransformer(f)
}

impl<F> TraceTransformer for FnTransformer<F>
where
    F: Fn(&RequestInfo, &ResponseInfo, TraceRecord) -> TraceRecord + Send + Sync,
{
    fn transform(
        &self,
        request: &RequestInfo,
        response: &ResponseInfo,
        record: TraceRecord,
    ) -> TraceRecord {
        (self.0)(request, response, record)
    }

    fn name(&self) -> &'static str {
        "fn_transformer"
    }
}

impl<F> fmt::Debug for FnTransformer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransformer").finish_non_exhaustive()
    }
}

/// Pass-through transformer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

/// Transformer returning every record unchanged.
pub fn identity() -> Identity {
    Identity
}

impl TraceTransformer for Identity {
    fn transform(
        &self,
        _request: &RequestInfo,
        _response: &ResponseInfo,
        record: TraceRecord,
    ) -> TraceRecord {
        record
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Two transformers applied in sequence. See [`TraceTransformer::and_then`].
#[derive(Debug, Clone)]
pub struct AndThen<A, B> {
    first: A,
    next: B,
}

impl<A, B> TraceTransformer for AndThen<A, B>
where
    A: TraceTransformer,
    B: TraceTransformer,
{
    fn transform(
        &self,
        request: &RequestInfo,
        response: &ResponseInfo,
        record: TraceRecord,
    ) -> TraceRecord {
        let record = self.first.transform(request, response, record);
        self.next.transform(request, response, record)
    }

    fn name(&self) -> &'static str {
        "and_then"
    }
}

/// Transformer gated on a request predicate.
/// See [`TraceTransformer::only_for_requests_matching`].
pub struct RequestFiltered<T, P> {
    inner: T,
    predicate: P,
}

impl<T, P> TraceTransformer for RequestFiltered<T, P>
where
    T: TraceTransformer,
    P: Fn(&RequestInfo) -> bool + Send + Sync,
{
    fn transform(
        &self,
        request: &RequestInfo,
        response: &ResponseInfo,
        record: TraceRecord,
    ) -> TraceRecord {
        if (self.predicate)(request) {
            self.inner.transform(request, response, record)
        } else {
            record
        }
    }

    fn name(&self) -> &'static str {
        "request_filtered"
    }
}

impl<T: fmt::Debug, P> fmt::Debug for RequestFiltered<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestFiltered")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// Transformer gated on a response predicate.
/// See [`TraceTransformer::only_for_responses_matching`].
pub struct ResponseFiltered<T, P> {
    inner: T,
    predicate: P,
}

impl<T, P> TraceTransformer for ResponseFiltered<T, P>
where
    T: TraceTransformer,
    P: ResponsePredicate,
{
    fn transform(
        &self,
        request: &RequestInfo,
        response: &ResponseInfo,
        record: TraceRecord,
    ) -> TraceRecord {
        if self.predicate.test(response) {
            self.inner.transform(request, response, record)
        } else {
            record
        }
    }

    fn name(&self) -> &'static str {
        "response_filtered"
    }
}

impl<T: fmt::Debug, P> fmt::Debug for ResponseFiltered<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseFiltered")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// Predicate over a response.
///
/// Implemented for closures and for [`HeaderPredicate`].
pub trait ResponsePredicate: Send + Sync {
    /// Whether the response is accepted.
    fn test(&self, response: &ResponseInfo) -> bool;
}

impl<F> ResponsePredicate for F
where
    F: Fn(&ResponseInfo) -> bool + Send + Sync,
{
    fn test(&self, response: &ResponseInfo) -> bool {
        self(response)
    }
}

/// Response predicate holding when the header utility finds `name: value`
/// among the response headers.
#[derive(Debug, Clone)]
pub struct HeaderPredicate<M> {
    matcher: M,
    name: String,
    value: String,
}

impl<M: HeaderMatch> ResponsePredicate for HeaderPredicate<M> {
    fn test(&self, response: &ResponseInfo) -> bool {
        self.matcher
            .matches(&response.headers, &self.name, &self.value)
    }
}

/// Type-erased transformer.
pub struct BoxedTransformer(Box<dyn TraceTransformer>);

impl BoxedTransformer {
    /// Box a transformer.
    pub fn new<T: TraceTransformer + 'static>(transformer: T) -> Self {
        Self(Box::new(transformer))
    }
}

impl TraceTransformer for BoxedTransformer {
    fn transform(
        &self,
        request: &RequestInfo,
        response: &ResponseInfo,
        record: TraceRecord,
    ) -> TraceRecord {
        self.0.transform(request, response, record)
    }

    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn boxed(self) -> BoxedTransformer {
        self
    }
}

impl fmt::Debug for BoxedTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoxedTransformer")
            .field(&self.0.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn make_record(body_request: &str, body_response: &str) -> TraceRecord {
        TraceRecord::new("https://api.example.com/users", "POST", "200")
            .with_bodies(body_request, body_response)
            .with_api_name("users")
    }

    fn uppercase_api_name() -> impl TraceTransformer {
        transform_fn(|_req, _resp, mut record| {
            record.api_name = record.api_name.to_uppercase();
            record
        })
    }

    fn append_to_request_body(suffix: &'static str) -> impl TraceTransformer {
        transform_fn(move |_req, _resp, mut record| {
            record.body_request.push_str(suffix);
            record
        })
    }

    #[test]
    fn test_and_then_applies_in_order() {
        let request = RequestInfo::new("POST", "https://api.example.com/users");
        let response = ResponseInfo::new(200);

        let chain = append_to_request_body("a").and_then(append_to_request_body("b"));
        let record = chain.transform(&request, &response, make_record("", ""));

        assert_eq!(record.body_request, "ab");
    }

    #[test]
    fn test_limit_then_uppercase() {
        let request = RequestInfo::new("POST", "https://api.example.com/users");
        let response = ResponseInfo::new(200);

        let chain = limit_body_size_transformer(4).and_then(uppercase_api_name());
        let record = chain.transform(&request, &response, make_record("abcdefghij", "short"));

        assert_eq!(record.body_request, "abcd");
        assert_eq!(record.body_response, "shor");
        assert_eq!(record.api_name, "USERS");
    }

    #[test]
    fn test_next_sees_output_of_first() {
        let request = RequestInfo::new("GET", "/");
        let response = ResponseInfo::new(200);

        let chain = limit_body_size_transformer(2).and_then(transform_fn(
            |_req, _resp, mut record: TraceRecord| {
                record.api_name = record.body_request.clone();
                record
            },
        ));
        let record = chain.transform(&request, &response, make_record("abcdef", ""));

        assert_eq!(record.api_name, "ab");
    }

    #[test]
    fn test_only_for_requests_matching() {
        let transformer = limit_body_size_transformer(3)
            .only_for_requests_matching(|req: &RequestInfo| req.method == "POST");
        let response = ResponseInfo::new(200);

        let post = RequestInfo::new("POST", "/users");
        let record = transformer.transform(&post, &response, make_record("abcdef", ""));
        assert_eq!(record.body_request, "abc");

        let get = RequestInfo::new("GET", "/users");
        let input = make_record("abcdef", "");
        let record = transformer.transform(&get, &response, input.clone());
        assert_eq!(record, input);
    }

    #[test]
    fn test_only_for_responses_matching() {
        let transformer = limit_body_size_transformer(0)
            .only_for_responses_matching(|resp: &ResponseInfo| resp.status >= 500);
        let request = RequestInfo::new("GET", "/users");

        let record =
            transformer.transform(&request, &ResponseInfo::new(503), make_record("x", "oops"));
        assert_eq!(record.body_response, "");

        let record =
            transformer.transform(&request, &ResponseInfo::new(200), make_record("x", "fine"));
        assert_eq!(record.body_response, "fine");
    }

    #[test]
    fn test_predicate_evaluated_on_every_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let transformer = identity().only_for_requests_matching(move |_req: &RequestInfo| {
            counter.fetch_add(1, Ordering::Relaxed);
            true
        });
        let request = RequestInfo::new("GET", "/");
        let response = ResponseInfo::new(200);

        for _ in 0..3 {
            transformer.transform(&request, &response, TraceRecord::default());
        }
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_only_for_responses_with_header_absent() {
        let transformer =
            limit_body_size_transformer(4).only_for_responses_with_header("X-Trace", "skip");
        let request = RequestInfo::new("GET", "/users");
        let response = ResponseInfo::new(200).with_header("Content-Type", "application/json");

        let input = make_record("abcdefghij", "a long response body");
        let record = transformer.transform(&request, &response, input.clone());
        assert_eq!(record, input);
    }

    #[test]
    fn test_only_for_responses_with_header_present() {
        let transformer =
            limit_body_size_transformer(4).only_for_responses_with_header("X-Trace", "skip");
        let request = RequestInfo::new("GET", "/users");
        let response = ResponseInfo::new(200).with_header("x-trace", "skip");

        let record = transformer.transform(&request, &response, make_record("abcdefghij", ""));
        assert_eq!(record.body_request, "abcd");
    }

    #[test]
    fn test_only_for_responses_with_header_using_injected_matcher() {
        let prefix_match = |headers: &[crate::record::TraceHeader], name: &str, value: &str| {
            headers
                .iter()
                .any(|h| h.name == name && h.value.starts_with(value))
        };
        let transformer = limit_body_size_transformer(1).only_for_responses_with_header_using(
            prefix_match,
            "Content-Type",
            "image/",
        );
        let request = RequestInfo::new("GET", "/logo");

        let png = ResponseInfo::new(200).with_header("Content-Type", "image/png");
        let record = transformer.transform(&request, &png, make_record("", "binary"));
        assert_eq!(record.body_response, "b");

        let json = ResponseInfo::new(200).with_header("Content-Type", "application/json");
        let record = transformer.transform(&request, &json, make_record("", "{}"));
        assert_eq!(record.body_response, "{}");
    }

    #[test]
    fn test_boxed_chain() {
        let chain: Vec<BoxedTransformer> = vec![
            append_to_request_body("1").boxed(),
            append_to_request_body("2").boxed(),
        ];
        let request = RequestInfo::new("GET", "/");
        let response = ResponseInfo::new(200);

        let record = chain.iter().fold(make_record("", ""), |record, t| {
            t.transform(&request, &response, record)
        });
        assert_eq!(record.body_request, "12");
        assert_eq!(chain[0].name(), "fn_transformer");
    }

    fn arb_record() -> impl Strategy<Value = TraceRecord> {
        (".*", ".*", ".*", "[A-Z]{3,6}").prop_map(|(body_request, body_response, api_name, method)| {
            TraceRecord::new("https://api.example.com/", method, "200")
                .with_bodies(body_request, body_response)
                .with_api_name(api_name)
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        #[test]
        fn proptest_identity_is_left_identity(record in arb_record(), limit in -2i64..8) {
            let request = RequestInfo::new(record.method.clone(), record.url.clone());
            let response = ResponseInfo::new(200);

            let direct = limit_body_size_transformer(limit)
                .and_then(uppercase_api_name())
                .transform(&request, &response, record.clone());
            let chained = identity()
                .and_then(limit_body_size_transformer(limit).and_then(uppercase_api_name()))
                .transform(&request, &response, record);

            prop_assert_eq!(direct, chained);
        }

        #[test]
        fn proptest_rejected_request_is_untouched(record in arb_record(), accept in any::<bool>()) {
            let request = RequestInfo::new(record.method.clone(), record.url.clone());
            let response = ResponseInfo::new(200);
            let inner = limit_body_size_transformer(1).and_then(uppercase_api_name());
            let filtered = limit_body_size_transformer(1)
                .and_then(uppercase_api_name())
                .only_for_requests_matching(move |_req: &RequestInfo| accept);

            let output = filtered.transform(&request, &response, record.clone());
            if accept {
                prop_assert_eq!(output, inner.transform(&request, &response, record));
            } else {
                prop_assert_eq!(output, record);
            }
        }
    }
}
