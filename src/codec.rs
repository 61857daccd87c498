//! Default length-prefixed codec for decoded responses.
//!
//! The rewriter treats the encoder as a pluggable seam: any
//! [`tokio_util::codec::Encoder`] over [`DecodedResponse`] will do. This
//! module supplies the default implementation, framing each response with a
//! 4-byte big-endian length prefix over a bincode body. A matching
//! [`Decoder`] implementation is provided so harnesses and tests can consume
//! flushed buffers; exact Kafka wire parsing is the upstream decoder's
//! responsibility, not this crate's.

use std::io;

use bincode::config;
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::protocol::DecodedResponse;

/// Length prefix header size (4 bytes for big-endian u32).
pub const LENGTH_HEADER_SIZE: usize = 4;

/// Minimum frame length in bytes.
///
/// Frame lengths passed to the constructor are clamped to at least this
/// value to leave room for protocol overhead.
pub const MIN_FRAME_LENGTH: usize = 64;

/// Maximum frame length in bytes (16 MiB).
///
/// Frame lengths passed to the constructor are clamped to at most this value
/// to prevent unbounded allocation.
pub const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

fn clamp_frame_length(value: usize) -> usize { value.clamp(MIN_FRAME_LENGTH, MAX_FRAME_LENGTH) }

/// Length-prefixed bincode codec for [`DecodedResponse`] frames.
#[derive(Clone, Debug)]
pub struct ResponseCodec {
    max_frame_length: usize,
}

impl ResponseCodec {
    /// Construct a codec with a maximum frame body length.
    #[must_use]
    pub fn new(max_frame_length: usize) -> Self {
        Self {
            max_frame_length: clamp_frame_length(max_frame_length),
        }
    }

    /// Maximum frame body length this codec will accept.
    #[must_use]
    pub fn max_frame_length(&self) -> usize { self.max_frame_length }
}

impl Default for ResponseCodec {
    fn default() -> Self {
        Self {
            max_frame_length: 64 * 1024,
        }
    }
}

impl Encoder<DecodedResponse> for ResponseCodec {
    type Error = io::Error;

    fn encode(&mut self, item: DecodedResponse, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let body = bincode::encode_to_vec(&item, config::standard())
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
        if body.len() > self.max_frame_length {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "frame body of {} bytes exceeds maximum of {}",
                    body.len(),
                    self.max_frame_length
                ),
            ));
        }
        let len = u32::try_from(body.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))?;
        dst.reserve(LENGTH_HEADER_SIZE + body.len());
        dst.put_u32(len);
        dst.extend_from_slice(&body);
        Ok(())
    }
}

impl Decoder for ResponseCodec {
    type Item = DecodedResponse;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LENGTH_HEADER_SIZE {
            return Ok(None);
        }
        let mut header = src.as_ref();
        let len = header.get_u32() as usize;
        if len > self.max_frame_length {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "frame body of {len} bytes exceeds maximum of {}",
                    self.max_frame_length
                ),
            ));
        }
        if src.len() < LENGTH_HEADER_SIZE + len {
            return Ok(None);
        }
        src.advance(LENGTH_HEADER_SIZE);
        let body = src.split_to(len);
        let (response, consumed) = bincode::decode_from_slice(&body, config::standard())
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
        if consumed != len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "trailing bytes inside frame body",
            ));
        }
        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::OpaqueResponse;

    fn opaque(payload: Vec<u8>) -> DecodedResponse {
        DecodedResponse::Opaque(OpaqueResponse {
            api_key: 18,
            correlation_id: 5,
            payload,
        })
    }

    #[test]
    fn constructor_clamps_frame_length_bounds() {
        assert_eq!(ResponseCodec::new(1).max_frame_length(), MIN_FRAME_LENGTH);
        assert_eq!(
            ResponseCodec::new(MAX_FRAME_LENGTH * 2).max_frame_length(),
            MAX_FRAME_LENGTH
        );
    }

    #[test]
    fn oversized_body_is_rejected_at_encode() {
        let mut codec = ResponseCodec::new(MIN_FRAME_LENGTH);
        let mut dst = BytesMut::new();
        let err = codec
            .encode(opaque(vec![0u8; MIN_FRAME_LENGTH * 2]), &mut dst)
            .expect_err("oversized frame must be rejected");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(dst.is_empty(), "nothing may be written for rejected frames");
    }

    #[test]
    fn partial_frames_wait_for_more_bytes() {
        let mut codec = ResponseCodec::default();
        let mut wire = BytesMut::new();
        codec
            .encode(opaque(b"fetch".to_vec()), &mut wire)
            .expect("encode");
        let mut truncated = wire.split_to(wire.len() - 1);
        assert!(
            codec.decode(&mut truncated).expect("decode").is_none(),
            "incomplete frame must not decode",
        );
    }
}
