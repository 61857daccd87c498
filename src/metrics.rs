//! Metric helpers for `rebroker`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate.

use metrics::counter;

use crate::protocol::DecodedResponse;

/// Name of the counter tracking responses drained by a flush.
pub const RESPONSES_FLUSHED: &str = "rebroker_responses_flushed_total";
/// Name of the counter tracking rewritten broker/coordinator addresses.
pub const ADDRESSES_REWRITTEN: &str = "rebroker_addresses_rewritten_total";
/// Name of the counter tracking frames dropped after a failed parse.
pub const PARSE_FAILURES_DROPPED: &str = "rebroker_parse_failures_dropped_total";

/// Kind of response drained during a flush, used as a metric label.
#[derive(Clone, Copy)]
pub enum ResponseKind {
    /// Cluster metadata responses.
    Metadata,
    /// Coordinator lookup responses.
    FindCoordinator,
    /// Every other response type.
    Opaque,
}

impl ResponseKind {
    fn as_str(self) -> &'static str {
        match self {
            ResponseKind::Metadata => "metadata",
            ResponseKind::FindCoordinator => "find_coordinator",
            ResponseKind::Opaque => "opaque",
        }
    }
}

impl From<&DecodedResponse> for ResponseKind {
    fn from(response: &DecodedResponse) -> Self {
        match response {
            DecodedResponse::Metadata(_) => ResponseKind::Metadata,
            DecodedResponse::FindCoordinator(_) => ResponseKind::FindCoordinator,
            DecodedResponse::Opaque(_) => ResponseKind::Opaque,
        }
    }
}

/// Record a flushed response of the given kind.
pub fn inc_flushed(kind: ResponseKind) {
    counter!(RESPONSES_FLUSHED, "kind" => kind.as_str()).increment(1);
}

/// Record one rewritten broker or coordinator address.
pub fn inc_addresses_rewritten() { counter!(ADDRESSES_REWRITTEN).increment(1); }

/// Record a frame dropped because structured decoding failed.
pub fn inc_parse_failures() { counter!(PARSE_FAILURES_DROPPED).increment(1); }
