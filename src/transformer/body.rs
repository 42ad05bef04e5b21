//! Body transformers: length limiting and clearing.

use super::TraceTransformer;
use crate::config::{BodyTarget, BodyTransform};
use crate::context::{RequestInfo, ResponseInfo};
use crate::record::TraceRecord;
use tracing::trace;

/// Truncates both bodies of a record to a maximum length in UTF-16 code units.
///
/// Built by [`limit_body_size_transformer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitBodySize {
    /// `None` disables the limit
    max_length: Option<usize>,
}

/// Build a transformer truncating `body_request` and `body_response` to
/// `max_length` UTF-16 code units.
///
/// A character needing two code units is never split: the body is cut at the
/// last character boundary within the limit, so it may end up one unit short.
///
/// A negative `max_length` means "no limit": the transformer returns every
/// record unchanged. A limit of `0` empties both bodies.
pub fn limit_body_size_transformer(max_length: i64) -> LimitBodySize {
    LimitBodySize {
        max_length: usize::try_from(max_length).ok(),
    }
}

impl LimitBodySize {
    /// The configured limit, `None` when disabled.
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }
}

impl TraceTransformer for LimitBodySize {
    fn transform(
        &self,
        _request: &RequestInfo,
        _response: &ResponseInfo,
        mut record: TraceRecord,
    ) -> TraceRecord {
        let Some(max_length) = self.max_length else {
            return record;
        };

        if truncate_utf16(&mut record.body_request, max_length) {
            trace!(max_length, url = %record.url, "Truncated request body");
        }
        if truncate_utf16(&mut record.body_response, max_length) {
            trace!(max_length, url = %record.url, "Truncated response body");
        }

        record
    }

    fn name(&self) -> &'static str {
        "limit_body_size"
    }
}

/// Truncate `body` to at most `max_units` UTF-16 code units, on a char boundary.
/// Returns whether anything was cut.
fn truncate_utf16(body: &mut String, max_units: usize) -> bool {
    let mut units = 0;
    for (byte_offset, c) in body.char_indices() {
        units += c.len_utf16();
        if units > max_units {
            body.truncate(byte_offset);
            return true;
        }
    }
    false
}

/// Configured body transformation of a rule: optional clearing, then an
/// optional length limit.
#[derive(Debug, Clone)]
pub struct BodyTransformer {
    clear: Option<BodyTarget>,
    limit: LimitBodySize,
}

impl BodyTransformer {
    /// Create a body transformer from configuration.
    pub fn new(config: &BodyTransform) -> Self {
        Self {
            clear: config.clear,
            limit: limit_body_size_transformer(config.limit.unwrap_or(-1)),
        }
    }
}

impl TraceTransformer for BodyTransformer {
    fn transform(
        &self,
        request: &RequestInfo,
        response: &ResponseInfo,
        mut record: TraceRecord,
    ) -> TraceRecord {
        match self.clear {
            Some(BodyTarget::Request) => record.body_request.clear(),
            Some(BodyTarget::Response) => record.body_response.clear(),
            Some(BodyTarget::Both) => {
                record.body_request.clear();
                record.body_response.clear();
            }
            None => {}
        }

        self.limit.transform(request, response, record)
    }

    fn name(&self) -> &'static str {
        "body_transformer"
    }
}
