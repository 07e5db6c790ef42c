//! Transport-ready request model.
//!
//! # Design
//! `HttpRequest` is what `builder::configure` produces and what a `Transport`
//! consumes. It is plain data, so tests can inspect exactly what would go on
//! the wire without opening a socket.
//!
//! Some headers cannot be set through a generic header list on conforming
//! clients; they live in dedicated slots here and are routed there by
//! `RestrictedHeader`. `wire_headers` flattens everything back into the
//! ordered list that is actually sent.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use ureq::http::Uri;

use crate::error::ConfigError;
use crate::types::{Credentials, Method, Proxy};

/// Response codings the client advertises and decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decompression {
    pub gzip: bool,
    pub deflate: bool,
    pub identity: bool,
}

impl Decompression {
    pub fn all() -> Self {
        Self {
            gzip: true,
            deflate: true,
            identity: true,
        }
    }

    /// Value for `Accept-Encoding`, or `None` when nothing is enabled.
    pub fn accept_encoding(&self) -> Option<String> {
        let codings: Vec<&str> = [
            (self.gzip, "gzip"),
            (self.deflate, "deflate"),
            (self.identity, "identity"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        (!codings.is_empty()).then(|| codings.join(", "))
    }
}

/// Headers that get a dedicated slot on `HttpRequest` instead of landing in
/// the generic header list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictedHeader {
    Connection,
    Expect,
    IfModifiedSince,
    Referer,
    TransferEncoding,
    UserAgent,
}

impl RestrictedHeader {
    pub fn lookup(name: &str) -> Option<Self> {
        const TABLE: [(&str, RestrictedHeader); 6] = [
            ("Connection", RestrictedHeader::Connection),
            ("Expect", RestrictedHeader::Expect),
            ("If-Modified-Since", RestrictedHeader::IfModifiedSince),
            ("Referer", RestrictedHeader::Referer),
            ("Transfer-Encoding", RestrictedHeader::TransferEncoding),
            ("User-Agent", RestrictedHeader::UserAgent),
        ];
        TABLE
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, header)| *header)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RestrictedHeader::Connection => "Connection",
            RestrictedHeader::Expect => "Expect",
            RestrictedHeader::IfModifiedSince => "If-Modified-Since",
            RestrictedHeader::Referer => "Referer",
            RestrictedHeader::TransferEncoding => "Transfer-Encoding",
            RestrictedHeader::UserAgent => "User-Agent",
        }
    }

    /// Store `value` in the slot for this header.
    ///
    /// `Transfer-Encoding` also switches the request to chunked mode.
    pub fn apply(&self, request: &mut HttpRequest, value: &str) -> Result<(), ConfigError> {
        match self {
            RestrictedHeader::Connection => request.connection = Some(value.to_string()),
            RestrictedHeader::Expect => request.expect = Some(value.to_string()),
            RestrictedHeader::IfModifiedSince => {
                request.if_modified_since = Some(parse_date(value)?);
            }
            RestrictedHeader::Referer => request.referer = Some(value.to_string()),
            RestrictedHeader::TransferEncoding => {
                request.transfer_encoding = Some(value.to_string());
                request.send_chunked = true;
            }
            RestrictedHeader::UserAgent => request.user_agent = Some(value.to_string()),
        }
        Ok(())
    }
}

/// Lenient date parsing for `If-Modified-Since`. Zone-less forms are UTC.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, ConfigError> {
    let v = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(v) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(v, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(v, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ConfigError::InvalidDate(value.to_string()))
}

/// IMF-fixdate, the form HTTP expects on the wire.
pub fn format_http_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// A cookie bound to the host it will be sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
}

/// Cookie store owned by exactly one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the cookie with the same name and domain.
    pub fn add(&mut self, cookie: Cookie) {
        match self
            .cookies
            .iter_mut()
            .find(|c| c.name == cookie.name && c.domain.eq_ignore_ascii_case(&cookie.domain))
        {
            Some(existing) => existing.value = cookie.value,
            None => self.cookies.push(cookie),
        }
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// `Cookie` header value for a request to `host`.
    pub fn header_for(&self, host: &str) -> Option<String> {
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| c.domain.eq_ignore_ascii_case(host))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }
}

/// A request ready for a `Transport`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub uri: Uri,
    pub decompression: Decompression,
    pub user_agent: Option<String>,
    /// `None` means the transport default.
    pub timeout: Option<Duration>,
    pub credentials: Option<Credentials>,
    pub proxy: Option<Proxy>,
    pub connection: Option<String>,
    pub expect: Option<String>,
    pub if_modified_since: Option<DateTime<Utc>>,
    pub referer: Option<String>,
    pub transfer_encoding: Option<String>,
    pub send_chunked: bool,
    /// Generic headers in caller order. Duplicates are kept.
    pub headers: Vec<(String, String)>,
    pub cookies: CookieJar,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            decompression: Decompression::all(),
            user_agent: None,
            timeout: None,
            credentials: None,
            proxy: None,
            connection: None,
            expect: None,
            if_modified_since: None,
            referer: None,
            transfer_encoding: None,
            send_chunked: false,
            headers: Vec::new(),
            cookies: CookieJar::new(),
            content_type: None,
            content_length: None,
            body: None,
        }
    }

    pub fn host(&self) -> &str {
        self.uri.host().unwrap_or_default()
    }

    /// The complete header list as it goes out, in a stable order.
    pub fn wire_headers(&self) -> Vec<(String, String)> {
        let mut out = self.headers.clone();
        let mut push = |name: &str, value: String| out.push((name.to_string(), value));

        if let Some(v) = &self.connection {
            push(RestrictedHeader::Connection.name(), v.clone());
        }
        if let Some(v) = &self.expect {
            push(RestrictedHeader::Expect.name(), v.clone());
        }
        if let Some(date) = &self.if_modified_since {
            push(RestrictedHeader::IfModifiedSince.name(), format_http_date(date));
        }
        if let Some(v) = &self.referer {
            push(RestrictedHeader::Referer.name(), v.clone());
        }
        if let Some(v) = self.wire_transfer_encoding() {
            push(RestrictedHeader::TransferEncoding.name(), v);
        }
        if let Some(v) = &self.user_agent {
            push(RestrictedHeader::UserAgent.name(), v.clone());
        }
        if let Some(c) = &self.credentials {
            let token = STANDARD.encode(format!("{}:{}", c.username, c.password));
            push("Authorization", format!("Basic {token}"));
        }
        if let Some(v) = self.decompression.accept_encoding() {
            push("Accept-Encoding", v);
        }
        if let Some(v) = self.cookies.header_for(self.host()) {
            push("Cookie", v);
        }
        if let Some(v) = &self.content_type {
            push("Content-Type", v.clone());
        }
        if let Some(len) = self.content_length.filter(|_| !self.send_chunked) {
            push("Content-Length", len.to_string());
        }
        out
    }

    fn wire_transfer_encoding(&self) -> Option<String> {
        if !self.send_chunked {
            return self.transfer_encoding.clone();
        }
        match self.transfer_encoding.as_deref().map(str::trim) {
            None | Some("") => Some("chunked".to_string()),
            Some(v) if v.to_ascii_lowercase().ends_with("chunked") => Some(v.to_string()),
            Some(v) => Some(format!("{v}, chunked")),
        }
    }
}
