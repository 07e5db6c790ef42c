use std::io::Write;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{AppendHeaders, IntoResponse, Redirect},
    routing::{any, get},
    Json, Router,
};
use flate2::{write::ZlibEncoder, Compression};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw, returned by `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub body_len: usize,
}

impl Echo {
    /// All values of a header, case-insensitively.
    pub fn header(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/cookies", get(set_cookies))
        .route("/redirect", get(redirect))
        .route("/deflate", get(deflate))
        .route("/slow/{millis}", get(slow))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
        body_len: body.len(),
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, format!("status {}", status.as_u16()))
}

async fn set_cookies() -> impl IntoResponse {
    (
        AppendHeaders([
            (header::SET_COOKIE, "session=abc123; Path=/; HttpOnly"),
            (header::SET_COOKIE, "theme=dark; Path=/"),
        ]),
        "cookies set",
    )
}

async fn redirect() -> Redirect {
    Redirect::to("/echo")
}

async fn deflate() -> impl IntoResponse {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    let compressed = encoder
        .write_all(b"inflated payload")
        .and_then(|_| encoder.finish());
    match compressed {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_ENCODING, "deflate"), (header::CONTENT_TYPE, "text/plain")],
            bytes,
        )
            .into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn slow(Path(millis): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    "finally"
}
