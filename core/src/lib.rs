//! Synchronous HTTP request executor.
//!
//! # Overview
//! Takes a fully described `Request` (address, method, headers, cookies,
//! form parameters, files or a raw body), assembles a correctly encoded wire
//! request, sends it over a blocking transport, and folds whatever happens
//! into a single `Response` value.
//!
//! # Design
//! - `builder` produces a plain-data `HttpRequest`; restricted headers are
//!   routed to dedicated slots instead of the generic header list.
//! - `body` picks exactly one encoding per request (multipart, urlencoded or
//!   raw) and writes it.
//! - `transport` is the I/O seam. `UreqTransport` is the real one; tests can
//!   plug in their own.
//! - `response` normalizes both outcomes of a send. HTTP error statuses are
//!   completed responses, not errors.
//! - Only configuration mistakes surface as `Err`.

pub mod body;
pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;
pub mod types;

pub use body::{BodyEncoding, MultipartWriter, RequestContext};
pub use client::RequestExecutor;
pub use config::ExecutorConfig;
pub use error::{ConfigError, TransportError};
pub use http::{HttpRequest, RestrictedHeader};
pub use response::{Response, ResponseCookie, ResponseStatus};
pub use transport::{RawResponse, SendOutcome, Transport, UreqTransport};
pub use types::{Credentials, FileAttachment, Method, Parameter, Proxy, RawBody, Request};
