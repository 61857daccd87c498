//! Decoded Kafka response model shared by the rewriting pipeline.
//!
//! Responses arrive from the upstream decoder already tagged and typed. The
//! two address-carrying response types are modelled structurally; every other
//! API key is carried as an opaque payload that is never introspected.

use bincode::{Decode, Encode};

/// Well-known Kafka API keys for the response types subject to rewriting.
pub mod api_key {
    /// Cluster metadata response.
    pub const METADATA: i16 = 3;
    /// Group/transaction coordinator lookup response.
    pub const FIND_COORDINATOR: i16 = 10;
}

/// A cluster member's advertised endpoint inside a metadata response.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct BrokerEndpoint {
    /// Stable broker identity assigned by the cluster.
    pub node_id: i32,
    /// Advertised host name or address.
    pub host: String,
    /// Advertised port.
    pub port: u16,
    /// Rack identifier, if the cluster reports one.
    pub rack: Option<String>,
}

/// The node responsible for a client's group or transaction.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct Coordinator {
    /// Stable broker identity of the coordinator.
    pub node_id: i32,
    /// Advertised host name or address.
    pub host: String,
    /// Advertised port.
    pub port: u16,
}

/// Decoded cluster metadata response (API key 3).
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct MetadataResponse {
    /// Correlation identifier echoed back to the client.
    pub correlation_id: i32,
    /// Quota throttle time reported by the broker, in milliseconds.
    pub throttle_time_ms: i32,
    /// Advertised cluster members, in broker-reported order.
    pub brokers: Vec<BrokerEndpoint>,
    /// Cluster identifier, if reported.
    pub cluster_id: Option<String>,
    /// Node id of the controller broker.
    pub controller_id: i32,
}

/// Decoded coordinator lookup response (API key 10).
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct FindCoordinatorResponse {
    /// Correlation identifier echoed back to the client.
    pub correlation_id: i32,
    /// Quota throttle time reported by the broker, in milliseconds.
    pub throttle_time_ms: i32,
    /// Top-level coordinator (older protocol versions).
    pub coordinator: Coordinator,
    /// Per-key coordinators (newer protocol versions), in request order.
    pub coordinators: Vec<Coordinator>,
}

/// Any other response type, carried but never introspected.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct OpaqueResponse {
    /// API key reported by the decoder for this frame.
    pub api_key: i16,
    /// Correlation identifier echoed back to the client.
    pub correlation_id: i32,
    /// Decoded payload bytes, re-emitted verbatim.
    pub payload: Vec<u8>,
}

/// A decoded, tagged response awaiting flush.
///
/// The tag and the payload are the same value, so narrowing a response to its
/// concrete type is an exhaustive `match` with no runtime-cast failure mode.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub enum DecodedResponse {
    /// Cluster metadata carrying the broker list.
    Metadata(MetadataResponse),
    /// Coordinator lookup carrying one or more coordinator addresses.
    FindCoordinator(FindCoordinatorResponse),
    /// Every other response type.
    Opaque(OpaqueResponse),
}

impl DecodedResponse {
    /// API key identifying this response's semantic type.
    #[must_use]
    pub fn api_key(&self) -> i16 {
        match self {
            Self::Metadata(_) => api_key::METADATA,
            Self::FindCoordinator(_) => api_key::FIND_COORDINATOR,
            Self::Opaque(response) => response.api_key,
        }
    }

    /// Correlation identifier echoed back to the client.
    #[must_use]
    pub fn correlation_id(&self) -> i32 {
        match self {
            Self::Metadata(response) => response.correlation_id,
            Self::FindCoordinator(response) => response.correlation_id,
            Self::Opaque(response) => response.correlation_id,
        }
    }
}

/// Identifying metadata for a frame the decoder could not turn into a typed
/// response. Carries no payload bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponseMetadata {
    /// API key reported in the frame header.
    pub api_key: i16,
    /// API version reported in the frame header.
    pub api_version: i16,
    /// Correlation identifier reported in the frame header.
    pub correlation_id: i32,
}
