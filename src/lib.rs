//! Public API for the `rebroker` library.
//!
//! This crate implements the response-rewriting stage of a Kafka-aware
//! proxy. Decoded broker responses are buffered in arrival order, the
//! advertised broker and coordinator addresses inside metadata and
//! coordinator-lookup responses are rewritten to proxy-reachable
//! equivalents, and the whole batch is re-encoded as a single atomic flush.
//! Every other response type passes through unmodified.

pub mod codec;
pub mod config;
pub mod error;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod protocol;
pub mod rewrite;
pub mod rewriter;

pub use codec::ResponseCodec;
pub use config::RewriterConfig;
pub use error::RewriteError;
pub use protocol::{
    BrokerEndpoint,
    Coordinator,
    DecodedResponse,
    FindCoordinatorResponse,
    MetadataResponse,
    OpaqueResponse,
    ResponseMetadata,
    api_key,
};
pub use rewrite::{AddressMap, HostPort, RewriteRule, RuleKey};
pub use rewriter::{
    PassThroughRewriter,
    ResponseRewriter,
    RewritingResponseRewriter,
    create_rewriter,
};
