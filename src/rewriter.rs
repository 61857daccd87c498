//! Response collection, dispatch, and atomic flush.
//!
//! One rewriter instance is bound to one client connection and driven
//! entirely by that connection's callbacks: the upstream decoder pushes
//! typed responses via [`ResponseRewriter::on_message`], and the connection
//! layer drains the batch with [`ResponseRewriter::process`] when it is
//! ready to write. Calls are strictly serialized by the hosting connection
//! loop; nothing here blocks, suspends, or spawns.

use std::{collections::VecDeque, io, mem, sync::Arc};

use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::{trace, warn};

use crate::{
    codec::ResponseCodec,
    config::RewriterConfig,
    error::RewriteError,
    protocol::{DecodedResponse, ResponseMetadata, api_key},
    rewrite::{AddressMap, rewrite_broker, rewrite_coordinator},
};

#[cfg(feature = "metrics")]
use crate::metrics;

/// Control surface invoked by the decoder and connection layer.
pub trait ResponseRewriter: Send {
    /// Append one decoded, tagged response to the pending batch.
    ///
    /// The payload is never inspected here; dispatch happens at flush time.
    fn on_message(&mut self, response: DecodedResponse);

    /// Notification that a frame failed structured decoding.
    ///
    /// Policy: drop-on-failure. The notification carries identifying
    /// metadata only, no payload bytes, so the frame cannot be re-emitted
    /// raw at this boundary; it is excluded from the rewritten stream.
    /// Revisiting this requires the decoder to hand over the undecoded
    /// frame bytes.
    fn on_failed_parse(&mut self, metadata: ResponseMetadata);

    /// Flush every pending response, in arrival order, into `buffer`.
    ///
    /// The buffer's previous contents are replaced, not appended to; an
    /// empty batch yields an empty buffer. The flush is atomic: on error
    /// the buffer is left exactly as the caller passed it.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::ApiKeyMismatch`] when an opaque payload
    /// claims a structured API key, and [`RewriteError::Encode`] when the
    /// encoder fails. Both are fatal for the batch; the hosting connection
    /// is expected to tear down.
    fn process(&mut self, buffer: &mut BytesMut) -> Result<(), RewriteError>;

    /// Number of responses currently queued. Exposed for tests and
    /// introspection; zero before any push and again after a successful
    /// flush.
    fn pending(&self) -> usize;
}

/// Active variant: buffers responses and rewrites advertised addresses.
pub struct RewritingResponseRewriter<E = ResponseCodec> {
    map: Arc<AddressMap>,
    encoder: E,
    queue: VecDeque<DecodedResponse>,
}

impl<E> RewritingResponseRewriter<E>
where
    E: Encoder<DecodedResponse, Error = io::Error>,
{
    /// Construct a rewriter over a shared address map and an encoder.
    ///
    /// The map is shared read-only across all connections' rewriters and is
    /// never mutated after construction.
    #[must_use]
    pub fn new(map: Arc<AddressMap>, encoder: E) -> Self {
        Self {
            map,
            encoder,
            queue: VecDeque::new(),
        }
    }

    /// Narrow one response to its concrete payload and rewrite its
    /// addresses if it carries any.
    ///
    /// The match is exhaustive over the known variant set; unhandled API
    /// keys fall into the opaque arm and pass through unmodified. An opaque
    /// payload claiming one of the handled keys means the decoder tagged a
    /// frame it did not structurally decode, which is an internal
    /// consistency violation.
    fn dispatch(&self, response: DecodedResponse) -> Result<DecodedResponse, RewriteError> {
        match response {
            DecodedResponse::Metadata(mut metadata) => {
                metadata.brokers = metadata
                    .brokers
                    .into_iter()
                    .map(|broker| rewrite_broker(&self.map, broker))
                    .collect();
                Ok(DecodedResponse::Metadata(metadata))
            }
            DecodedResponse::FindCoordinator(mut lookup) => {
                lookup.coordinator = rewrite_coordinator(&self.map, lookup.coordinator);
                lookup.coordinators = lookup
                    .coordinators
                    .into_iter()
                    .map(|coordinator| rewrite_coordinator(&self.map, coordinator))
                    .collect();
                Ok(DecodedResponse::FindCoordinator(lookup))
            }
            DecodedResponse::Opaque(opaque) => {
                if opaque.api_key == api_key::METADATA
                    || opaque.api_key == api_key::FIND_COORDINATOR
                {
                    return Err(RewriteError::ApiKeyMismatch {
                        api_key: opaque.api_key,
                    });
                }
                Ok(DecodedResponse::Opaque(opaque))
            }
        }
    }
}

impl<E> ResponseRewriter for RewritingResponseRewriter<E>
where
    E: Encoder<DecodedResponse, Error = io::Error> + Send,
{
    fn on_message(&mut self, response: DecodedResponse) { self.queue.push_back(response); }

    fn on_failed_parse(&mut self, metadata: ResponseMetadata) {
        warn!(
            api_key = metadata.api_key,
            api_version = metadata.api_version,
            correlation_id = metadata.correlation_id,
            "dropping response that failed structured decoding",
        );
        #[cfg(feature = "metrics")]
        metrics::inc_parse_failures();
    }

    fn process(&mut self, buffer: &mut BytesMut) -> Result<(), RewriteError> {
        trace!(count = self.queue.len(), "emitting stored responses");
        // Encode into a staging buffer first so a mid-batch failure leaves
        // the caller's buffer untouched.
        let mut staged = BytesMut::new();
        for response in mem::take(&mut self.queue) {
            let response = self.dispatch(response)?;
            #[cfg(feature = "metrics")]
            metrics::inc_flushed((&response).into());
            self.encoder.encode(response, &mut staged)?;
        }
        mem::swap(buffer, &mut staged);
        Ok(())
    }

    fn pending(&self) -> usize { self.queue.len() }
}

/// Pass-through variant used when rewriting is not configured.
///
/// All operations are no-ops. In particular [`process`] never drains or
/// alters the buffer, so the original wire bytes already staged by the
/// connection layer flow through untouched.
///
/// [`process`]: ResponseRewriter::process
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThroughRewriter;

impl ResponseRewriter for PassThroughRewriter {
    fn on_message(&mut self, _response: DecodedResponse) {}

    fn on_failed_parse(&mut self, _metadata: ResponseMetadata) {}

    fn process(&mut self, _buffer: &mut BytesMut) -> Result<(), RewriteError> { Ok(()) }

    fn pending(&self) -> usize { 0 }
}

/// Select the rewriter variant for one connection from configuration.
///
/// The choice is made once at construction; no per-message branching on the
/// flag happens afterwards.
#[must_use]
pub fn create_rewriter(config: &RewriterConfig) -> Box<dyn ResponseRewriter> {
    if config.rewrite_enabled {
        let map = Arc::new(AddressMap::from_rules(&config.rules));
        if map.is_empty() {
            log::warn!(
                "response rewriting enabled with no rules; advertised addresses will pass through unmodified"
            );
        }
        Box::new(RewritingResponseRewriter::new(map, ResponseCodec::default()))
    } else {
        Box::new(PassThroughRewriter)
    }
}
