//! Turns a caller `Request` into a transport-ready `HttpRequest`.
//!
//! Pure construction: no I/O happens here, and the only failures are
//! `ConfigError`s caused by unusable input.

use ureq::http::{HeaderName, HeaderValue, Uri};

use crate::error::ConfigError;
use crate::http::{Cookie, CookieJar, HttpRequest, RestrictedHeader};
use crate::types::{Method, Request};

/// Build the transport request: method, decompression, user agent, timeout,
/// credentials and proxy first, then headers, then cookies.
pub fn configure(method: Method, request: &Request) -> Result<HttpRequest, ConfigError> {
    let uri = parse_address(&request.url)?;
    let mut http = HttpRequest::new(method, uri);

    if let Some(ua) = request.user_agent.as_deref().filter(|ua| !ua.is_empty()) {
        validate_value("User-Agent", ua)?;
        http.user_agent = Some(ua.to_string());
    }
    if !request.timeout.is_zero() {
        http.timeout = Some(request.timeout);
    }
    http.credentials = request.credentials.clone();
    if let Some(proxy) = &request.proxy {
        proxy
            .address
            .parse::<Uri>()
            .map_err(|e| ConfigError::InvalidProxy(format!("{}: {e}", proxy.address)))?;
        http.proxy = Some(proxy.clone());
    }

    append_headers(&mut http, &request.headers)?;
    append_cookies(&mut http, &request.cookies);
    Ok(http)
}

fn parse_address(address: &str) -> Result<Uri, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidAddress {
        address: address.to_string(),
        reason,
    };
    let uri: Uri = address.parse().map_err(|e| invalid(format!("{e}")))?;
    match (uri.scheme_str(), uri.host()) {
        (Some("http" | "https"), Some(host)) if !host.is_empty() => Ok(uri),
        (Some("http" | "https"), _) => Err(invalid("missing host".to_string())),
        _ => Err(invalid("expected an absolute http or https address".to_string())),
    }
}

/// Route each header to its restricted slot, or append it to the generic list.
fn append_headers(http: &mut HttpRequest, headers: &[(String, String)]) -> Result<(), ConfigError> {
    for (name, value) in headers {
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeaderName(name.clone()))?;
        validate_value(name, value)?;

        match RestrictedHeader::lookup(name) {
            Some(restricted) => restricted.apply(http, value)?,
            None => http.headers.push((name.clone(), value.clone())),
        }
    }
    Ok(())
}

fn validate_value(name: &str, value: &str) -> Result<(), ConfigError> {
    HeaderValue::from_str(value)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidHeaderValue {
            name: name.to_string(),
            value: value.to_string(),
        })
}

/// Fresh jar per request; every cookie is bound to the target host.
fn append_cookies(http: &mut HttpRequest, cookies: &[(String, String)]) {
    let domain = http.host().to_string();
    let mut jar = CookieJar::new();
    for (name, value) in cookies {
        jar.add(Cookie {
            name: name.clone(),
            value: value.clone(),
            domain: domain.clone(),
        });
    }
    http.cookies = jar;
}
