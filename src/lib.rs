//! Post-processing of HTTP client trace records.
//!
//! An HTTP client interceptor captures one [`TraceRecord`] per exchange. Before
//! the record reaches a log sink, it is threaded through composable
//! [`TraceTransformer`]s:
//!
//! - sequential chaining with [`and_then`](TraceTransformer::and_then)
//! - request or response gating with
//!   [`only_for_requests_matching`](TraceTransformer::only_for_requests_matching),
//!   [`only_for_responses_matching`](TraceTransformer::only_for_responses_matching) and
//!   [`only_for_responses_with_header`](TraceTransformer::only_for_responses_with_header)
//! - body truncation with [`limit_body_size_transformer`]
//!
//! Chains can also be declared in configuration and compiled into a
//! [`TracePipeline`].
//!
//! ## Configuration Example
//!
//! ```yaml
//! settings:
//!   max_body_length: 4096
//! rules:
//!   - name: "drop-image-bodies"
//!     match:
//!       response:
//!         headers:
//!           - name: "Content-Type"
//!             matches: "^image/"
//!     body:
//!       clear: response
//! ```

pub mod config;
pub mod context;
pub mod matcher;
pub mod pipeline;
pub mod record;
pub mod rule;
pub mod transformer;

pub use config::TraceConfig;
pub use context::{RequestInfo, ResponseInfo};
pub use matcher::{ExactHeaderMatch, HeaderMatch};
pub use pipeline::{TracePipeline, TracePipelineError};
pub use record::{TraceHeader, TraceRecord};
pub use rule::{RuleEngine, RuleError};
pub use transformer::{
    identity, limit_body_size_transformer, transform_fn, BoxedTransformer, TraceTransformer,
};
