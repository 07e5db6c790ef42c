//! Caller-facing request description.
//!
//! # Design
//! `Request` is plain data: the caller fills it in (directly, through the
//! `with_*` helpers, or by deserializing it) and hands a reference to
//! `RequestExecutor`. Nothing here validates its contents; validation happens
//! once, in `builder::configure`, so every error surfaces at one place.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// HTTP verbs supported by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Options,
    Delete,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Delete => "DELETE",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }

    /// Whether the body encoder runs for this method.
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let method = match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "DELETE" => Method::Delete,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            _ => return Err(ConfigError::UnsupportedMethod(s.to_string())),
        };
        Ok(method)
    }
}

/// A form parameter. Sent urlencoded, or as a multipart field when files are
/// attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// A file sent as one part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    /// Form field the caller intended for this file.
    pub name: String,
    pub file_name: String,
    pub data: Vec<u8>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Pre-serialized payload written verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBody {
    pub content: String,
    pub content_type: String,
}

/// Pre-supplied credentials, passed through as HTTP Basic authorization.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Proxy to route the request through, e.g. `http://proxy.local:3128`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proxy {
    pub address: String,
}

/// Everything the caller wants sent. Single use: build one per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    /// Fully assembled target address, query string included.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<(String, String)>,
    pub parameters: Vec<Parameter>,
    pub files: Vec<FileAttachment>,
    pub body: Option<RawBody>,
    /// Zero means "use the transport default".
    pub timeout: Duration,
    pub proxy: Option<Proxy>,
    pub credentials: Option<Credentials>,
    pub user_agent: Option<String>,
}

impl Request {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.parameters.push(Parameter {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn with_file(
        mut self,
        name: &str,
        file_name: &str,
        data: impl Into<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Self {
        self.files.push(FileAttachment {
            name: name.to_string(),
            file_name: file_name.to_string(),
            data: data.into(),
            content_type: content_type.map(str::to_string),
        });
        self
    }

    pub fn with_body(mut self, content: &str, content_type: &str) -> Self {
        self.body = Some(RawBody {
            content: content.to_string(),
            content_type: content_type.to_string(),
        });
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, address: &str) -> Self {
        self.proxy = Some(Proxy {
            address: address.to_string(),
        });
        self
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }
}
