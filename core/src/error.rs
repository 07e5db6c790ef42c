//! Error types for the request executor.
//!
//! # Design
//! Two families with different propagation rules. `ConfigError` means the
//! caller handed us something unusable (bad address, bad header value) and is
//! returned as `Err` from the build step. `TransportError` covers everything
//! that can go wrong once the request is on its way; it never escapes the
//! executor and is captured into `Response` instead.

use thiserror::Error;

/// Caller misuse detected while building the transport request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("invalid header name: {0:?}")]
    InvalidHeaderName(String),

    #[error("invalid value for header `{name}`: {value:?}")]
    InvalidHeaderValue { name: String, value: String },

    #[error("invalid If-Modified-Since date: {0:?}")]
    InvalidDate(String),

    #[error("invalid proxy address: {0}")]
    InvalidProxy(String),
}

/// A failure that prevented a usable response from being produced.
#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS, connect, TLS, timeout, protocol errors reported by ureq.
    #[error(transparent)]
    Http(#[from] ureq::Error),

    /// The `http::Request` handed to the transport could not be assembled.
    #[error("invalid request: {0}")]
    Request(#[from] ureq::http::Error),

    /// Writing the request body failed.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] std::io::Error),

    /// The response body could not be read or decompressed.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] std::io::Error),

    /// Raw I/O failure, used by transports that talk to sockets directly.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Http(ureq::Error::Timeout(_)) => true,
            TransportError::Io(e) => e.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}
