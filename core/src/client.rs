//! Synchronous request executor.
//!
//! # Design
//! `RequestExecutor` holds only configuration and a transport, and every
//! method takes `&self`. Per-call state (the multipart boundary) lives in a
//! `RequestContext` created inside `execute`, so one executor can serve many
//! calls without them seeing each other's scratch data.
//!
//! Flow: `builder::configure` → `body::prepare` (POST/PUT only) →
//! `Transport::send` → `response::normalize`. Only the first step can return
//! `Err`; from then on every failure ends up inside the returned `Response`.

use tracing::debug;

use crate::body::{self, RequestContext};
use crate::builder;
use crate::config::ExecutorConfig;
use crate::error::ConfigError;
use crate::response::{self, Response};
use crate::transport::{SendOutcome, Transport, UreqTransport};
use crate::types::{Method, Request};

#[derive(Debug, Clone)]
pub struct RequestExecutor<T = UreqTransport> {
    transport: T,
    config: ExecutorConfig,
}

impl RequestExecutor<UreqTransport> {
    pub fn new() -> Self {
        Self::with_config(ExecutorConfig::default())
    }

    pub fn with_config(config: ExecutorConfig) -> Self {
        Self {
            transport: UreqTransport::from_config(&config),
            config,
        }
    }
}

impl Default for RequestExecutor<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> RequestExecutor<T> {
    pub fn with_transport(transport: T, config: ExecutorConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Send `request` with `method` and return the normalized response.
    ///
    /// `Err` is reserved for unusable input; network trouble and HTTP error
    /// statuses are reported through `Response::response_status`.
    pub fn execute(&self, method: Method, request: &Request) -> Result<Response, ConfigError> {
        let mut http = builder::configure(method, request)?;
        if http.user_agent.is_none() {
            http.user_agent = self.config.user_agent.clone();
        }
        if http.timeout.is_none() && self.config.timeout_ms > 0 {
            http.timeout = Some(self.config.timeout());
        }

        let ctx = RequestContext::new();
        let outcome = if method.has_body() {
            match body::prepare(&mut http, request, &ctx) {
                Ok(()) => self.transport.send(&http),
                Err(e) => SendOutcome::TransportFailed(e),
            }
        } else {
            self.transport.send(&http)
        };

        let response = response::normalize(outcome);
        debug!(
            method = %method,
            url = %request.url,
            status = ?response.status_code,
            outcome = ?response.response_status,
            "request finished"
        );
        Ok(response)
    }

    /// Like `execute`, with the verb given as text (`"get"`, `"POST"`, ...).
    pub fn execute_method(&self, verb: &str, request: &Request) -> Result<Response, ConfigError> {
        self.execute(verb.parse()?, request)
    }

    pub fn get(&self, request: &Request) -> Result<Response, ConfigError> {
        self.execute(Method::Get, request)
    }

    pub fn head(&self, request: &Request) -> Result<Response, ConfigError> {
        self.execute(Method::Head, request)
    }

    pub fn options(&self, request: &Request) -> Result<Response, ConfigError> {
        self.execute(Method::Options, request)
    }

    pub fn delete(&self, request: &Request) -> Result<Response, ConfigError> {
        self.execute(Method::Delete, request)
    }

    pub fn post(&self, request: &Request) -> Result<Response, ConfigError> {
        self.execute(Method::Post, request)
    }

    pub fn put(&self, request: &Request) -> Result<Response, ConfigError> {
        self.execute(Method::Put, request)
    }
}
