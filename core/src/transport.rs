//! Blocking transport seam.
//!
//! # Design
//! A `Transport` turns an `HttpRequest` into one of two outcomes and never
//! panics or returns `Err`: either the server answered (any status code,
//! 4xx/5xx included) or no usable response exists. Keeping these as the two
//! variants of `SendOutcome` means nobody downstream has to inspect an error
//! to find out whether it secretly carries a response.
//!
//! `UreqTransport` builds a fresh agent per call, so no connection or cookie
//! state is shared between requests.

use std::io::Read;

use flate2::read::ZlibDecoder;
use tracing::debug;
use ureq::http;
use ureq::ResponseExt;

use crate::config::ExecutorConfig;
use crate::error::TransportError;
use crate::http::HttpRequest;

/// What came back from the server, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub reason: Option<String>,
    /// In received order, duplicates kept.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Address after following redirects.
    pub final_uri: String,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The two ways a send can end.
#[derive(Debug)]
pub enum SendOutcome {
    CompletedWithStatus(RawResponse),
    TransportFailed(TransportError),
}

pub trait Transport {
    fn send(&self, request: &HttpRequest) -> SendOutcome;
}

/// ureq-backed blocking transport.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    max_redirects: u32,
    max_response_bytes: u64,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::from_config(&ExecutorConfig::default())
    }

    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self {
            max_redirects: config.max_redirects,
            max_response_bytes: config.max_response_bytes,
        }
    }

    fn agent(&self, request: &HttpRequest) -> Result<ureq::Agent, TransportError> {
        let proxy = match &request.proxy {
            Some(p) => Some(ureq::Proxy::new(&p.address)?),
            None => None,
        };
        Ok(ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(self.max_redirects)
            .timeout_global(request.timeout)
            .proxy(proxy)
            .build()
            .new_agent())
    }

    fn round_trip(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        let agent = self.agent(request)?;

        let mut builder = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.uri.clone());
        for (name, value) in request.wire_headers() {
            builder = builder.header(name, value);
        }

        let mut response = match &request.body {
            Some(body) => agent.run(builder.body(body.clone())?)?,
            None => agent.run(builder.body(())?)?,
        };

        let status = response.status();
        let final_uri = response.get_uri().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect::<Vec<_>>();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_response_bytes)
            .read_to_vec()?;

        let mut raw = RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            headers,
            body,
            final_uri,
        };
        if request.decompression.deflate {
            inflate(&mut raw)?;
        }
        Ok(raw)
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> SendOutcome {
        debug!(method = %request.method, uri = %request.uri, "sending request");
        match self.round_trip(request) {
            Ok(raw) => SendOutcome::CompletedWithStatus(raw),
            Err(e) => SendOutcome::TransportFailed(e),
        }
    }
}

/// ureq handles gzip itself; zlib-wrapped `deflate` bodies are decoded here.
fn inflate(raw: &mut RawResponse) -> Result<(), TransportError> {
    let is_deflate = raw
        .header("content-encoding")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("deflate"));
    if !is_deflate || raw.body.is_empty() {
        return Ok(());
    }

    let mut decoded = Vec::new();
    ZlibDecoder::new(raw.body.as_slice())
        .read_to_end(&mut decoded)
        .map_err(TransportError::Decode)?;
    raw.body = decoded;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    use super::*;

    fn raw(headers: &[(&str, &str)], body: Vec<u8>) -> RawResponse {
        RawResponse {
            status: 200,
            reason: Some("OK".to_string()),
            headers: headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            body,
            final_uri: "http://example.test/".to_string(),
        }
    }

    #[test]
    fn deflate_body_is_inflated() {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"squashed text").unwrap();
        let mut r = raw(&[("Content-Encoding", "deflate")], enc.finish().unwrap());
        inflate(&mut r).unwrap();
        assert_eq!(r.body, b"squashed text");
    }

    #[test]
    fn identity_body_is_untouched() {
        let mut r = raw(&[("Content-Type", "text/plain")], b"plain".to_vec());
        inflate(&mut r).unwrap();
        assert_eq!(r.body, b"plain");
    }

    #[test]
    fn corrupt_deflate_body_is_a_decode_error() {
        let mut r = raw(&[("content-encoding", "deflate")], b"definitely not zlib".to_vec());
        let err = inflate(&mut r).unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let r = raw(&[("X-One", "1"), ("x-one", "2")], Vec::new());
        assert_eq!(r.header("x-ONE"), Some("1"));
        assert_eq!(r.header("missing"), None);
    }
}
