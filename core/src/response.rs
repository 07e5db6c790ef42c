//! Uniform response value and the normalizer that produces it.
//!
//! # Design
//! `normalize` is total: every `SendOutcome` maps to a `Response`, and the
//! caller tells success from failure by `response_status` alone. An HTTP
//! error status is still `Completed`; only a missing response is `Error`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;
use ureq::http::Uri;

use crate::error::TransportError;
use crate::transport::{RawResponse, SendOutcome};

/// Coarse outcome of a call, independent of the HTTP status code.
///
/// The synchronous executor only ever produces `Completed` or `Error`;
/// `TimedOut` and `Aborted` exist so cancellable callers report the same way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    #[default]
    None,
    Completed,
    Error,
    TimedOut,
    Aborted,
}

/// A cookie set by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub http_only: bool,
    pub secure: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status_code: Option<u16>,
    pub status_description: String,
    pub raw_bytes: Vec<u8>,
    pub content: String,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub content_encoding: Option<String>,
    pub server: Option<String>,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<ResponseCookie>,
    pub response_status: ResponseStatus,
    pub error_message: Option<String>,
    pub error: Option<Arc<TransportError>>,
    /// Address that produced the response, after redirects.
    pub response_uri: Option<String>,
}

impl Response {
    /// Completed with a 2xx status.
    pub fn is_successful(&self) -> bool {
        self.response_status == ResponseStatus::Completed
            && self.status_code.is_some_and(|s| (200..300).contains(&s))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn completed(raw: RawResponse) -> Self {
        let header = |name: &str| raw.header(name).map(str::to_string);
        let content_type = header("content-type");
        let content_length = raw
            .header("content-length")
            .and_then(|v| v.trim().parse::<u64>().ok());
        let content_encoding = header("content-encoding");
        let server = header("server");

        let default_domain = raw
            .final_uri
            .parse::<Uri>()
            .ok()
            .and_then(|u| u.host().map(str::to_string));
        let cookies = raw
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("set-cookie"))
            .filter_map(|(_, v)| parse_set_cookie(v, default_domain.as_deref()))
            .collect();

        let content = decode_text(&raw.body, content_type.as_deref());

        Self {
            status_code: Some(raw.status),
            status_description: raw.reason.unwrap_or_default(),
            content,
            raw_bytes: raw.body,
            content_type,
            content_length,
            content_encoding,
            server,
            headers: raw.headers,
            cookies,
            response_status: ResponseStatus::Completed,
            error_message: None,
            error: None,
            response_uri: Some(raw.final_uri),
        }
    }

    fn failed(error: TransportError) -> Self {
        Self {
            response_status: ResponseStatus::Error,
            error_message: Some(error.to_string()),
            error: Some(Arc::new(error)),
            ..Default::default()
        }
    }
}

pub fn normalize(outcome: SendOutcome) -> Response {
    match outcome {
        SendOutcome::CompletedWithStatus(raw) => Response::completed(raw),
        SendOutcome::TransportFailed(error) => {
            warn!(error = %error, timeout = error.is_timeout(), "request failed");
            Response::failed(error)
        }
    }
}

/// Decode a body using its BOM, else the declared charset, else UTF-8.
pub fn decode_text(bytes: &[u8], content_type: Option<&str>) -> String {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => return String::from_utf8_lossy(rest).into_owned(),
        [0xFF, 0xFE, rest @ ..] => return decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => return decode_utf16(rest, u16::from_be_bytes),
        _ => {}
    }

    let charset = content_type.and_then(charset_of).map(|c| c.to_ascii_lowercase());
    match charset.as_deref() {
        Some("iso-8859-1" | "latin1" | "latin-1" | "us-ascii" | "ascii") => {
            bytes.iter().map(|&b| char::from(b)).collect()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn charset_of(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Parse one `Set-Cookie` value. Unparsable entries yield `None`.
pub fn parse_set_cookie(raw: &str, default_domain: Option<&str>) -> Option<ResponseCookie> {
    let mut parts = raw.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut cookie = ResponseCookie {
        name: name.to_string(),
        value: value.trim().trim_matches('"').to_string(),
        domain: default_domain.map(str::to_string),
        path: None,
        expires: None,
        http_only: false,
        secure: false,
    };

    for attr in parts {
        let (key, val) = match attr.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (attr.trim(), ""),
        };
        match key.to_ascii_lowercase().as_str() {
            "domain" if !val.is_empty() => {
                cookie.domain = Some(val.trim_start_matches('.').to_string());
            }
            "path" if !val.is_empty() => cookie.path = Some(val.to_string()),
            "expires" => {
                cookie.expires = DateTime::parse_from_rfc2822(val)
                    .ok()
                    .map(|d| d.with_timezone(&Utc));
            }
            "httponly" => cookie.http_only = true,
            "secure" => cookie.secure = true,
            _ => {}
        }
    }
    Some(cookie)
}
