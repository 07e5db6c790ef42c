//! Request body encoding.
//!
//! # Design
//! Exactly one encoding applies per request, so the choice is a sum type
//! resolved once by `BodyEncoding::resolve`: files beat form parameters, which
//! beat a raw body. The multipart boundary is per-request scratch state and is
//! carried in a `RequestContext` that the caller creates for each call.

use std::io::{self, Write};

use uuid::Uuid;

use crate::error::TransportError;
use crate::http::HttpRequest;
use crate::types::{FileAttachment, Parameter, RawBody, Request};

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const OCTET_STREAM: &str = "application/octet-stream";

/// Per-call scratch state threaded through encode and send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    boundary: String,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_boundary(&format!("-----------------------{}", Uuid::new_v4().simple()))
    }

    /// Fixed boundary, for reproducible output.
    pub fn with_boundary(boundary: &str) -> Self {
        Self {
            boundary: boundary.to_string(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The one body encoding chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding<'a> {
    Multipart {
        files: &'a [FileAttachment],
        parameters: &'a [Parameter],
    },
    FormUrlEncoded(&'a [Parameter]),
    Raw(&'a RawBody),
}

impl<'a> BodyEncoding<'a> {
    pub fn resolve(request: &'a Request) -> Option<Self> {
        if !request.files.is_empty() {
            Some(BodyEncoding::Multipart {
                files: &request.files,
                parameters: &request.parameters,
            })
        } else if !request.parameters.is_empty() {
            Some(BodyEncoding::FormUrlEncoded(&request.parameters))
        } else {
            request.body.as_ref().map(BodyEncoding::Raw)
        }
    }
}

/// Set content headers and body on `http` according to the resolved encoding.
///
/// Only call this for methods that carry a body.
pub fn prepare(
    http: &mut HttpRequest,
    request: &Request,
    ctx: &RequestContext,
) -> Result<(), TransportError> {
    let Some(encoding) = BodyEncoding::resolve(request) else {
        return Ok(());
    };

    match encoding {
        BodyEncoding::Multipart { files, parameters } => {
            http.content_type = Some(format!("multipart/form-data; boundary={}", ctx.boundary()));
            let mut body = Vec::new();
            MultipartWriter::new(ctx.boundary())
                .write(&mut body, files, parameters)
                .map_err(TransportError::Encode)?;
            http.body = Some(body);
        }
        BodyEncoding::FormUrlEncoded(parameters) => {
            http.content_type = Some(FORM_URLENCODED.to_string());
            set_sized_body(http, encode_parameters(parameters).into_bytes());
        }
        BodyEncoding::Raw(raw) => {
            http.content_type = Some(raw.content_type.clone());
            set_sized_body(http, raw.content.as_bytes().to_vec());
        }
    }
    Ok(())
}

fn set_sized_body(http: &mut HttpRequest, body: Vec<u8>) {
    http.content_length = Some(body.len() as u64);
    http.body = Some(body);
}

/// `name=value` pairs joined by `&`, both sides percent-encoded.
pub fn encode_parameters(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|p| format!("{}={}", urlencoding::encode(&p.name), urlencoding::encode(&p.value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Writes a `multipart/form-data` body.
///
/// Part layout, every line CRLF-terminated:
///
/// ```text
/// --{boundary}
/// Content-Disposition: form-data; name="{file_name}"; filename="{file_name}";
/// Content-Type: {content_type}
///
/// {bytes}
/// ```
///
/// followed by one part per parameter and a closing `--{boundary}--`.
#[derive(Debug, Clone, Copy)]
pub struct MultipartWriter<'a> {
    boundary: &'a str,
}

impl<'a> MultipartWriter<'a> {
    pub fn new(boundary: &'a str) -> Self {
        Self { boundary }
    }

    pub fn write<W: Write>(
        &self,
        out: &mut W,
        files: &[FileAttachment],
        parameters: &[Parameter],
    ) -> io::Result<()> {
        for file in files {
            // The file name doubles as the part name.
            let header = format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\";\r\nContent-Type: {}\r\n\r\n",
                self.boundary,
                file.file_name,
                file.file_name,
                file.content_type.as_deref().unwrap_or(OCTET_STREAM),
            );
            out.write_all(header.as_bytes())?;
            out.write_all(&file.data)?;
            out.write_all(b"\r\n")?;
        }

        for param in parameters {
            let part = format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, param.name, param.value,
            );
            out.write_all(part.as_bytes())?;
        }

        out.write_all(format!("\r\n--{}--\r\n", self.boundary).as_bytes())?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::configure;
    use crate::types::Method;

    fn prepared(request: &Request, ctx: &RequestContext) -> HttpRequest {
        let mut http = configure(Method::Post, request).unwrap();
        prepare(&mut http, request, ctx).unwrap();
        http
    }

    fn base() -> Request {
        Request::new("http://upload.test/form")
    }

    #[test]
    fn files_take_priority_over_parameters_and_body() {
        let req = base()
            .with_file("doc", "a.txt", b"hello".to_vec(), Some("text/plain"))
            .with_parameter("k", "v")
            .with_body("{}", "application/json");
        assert!(matches!(BodyEncoding::resolve(&req), Some(BodyEncoding::Multipart { .. })));

        let ctx = RequestContext::with_boundary("XYZ");
        let http = prepared(&req, &ctx);
        assert_eq!(http.content_type.as_deref(), Some("multipart/form-data; boundary=XYZ"));
        let body = String::from_utf8(http.body.unwrap()).unwrap();
        assert!(!body.contains("k=v"));
        assert!(body.contains("name=\"k\"\r\n\r\nv\r\n"));
    }

    #[test]
    fn parameters_take_priority_over_body() {
        let req = base().with_parameter("a b", "c&d").with_body("{}", "application/json");
        let http = prepared(&req, &RequestContext::new());
        assert_eq!(http.content_type.as_deref(), Some(FORM_URLENCODED));
        assert_eq!(http.body.as_deref(), Some(&b"a%20b=c%26d"[..]));
        assert_eq!(http.content_length, Some(11));
    }

    #[test]
    fn raw_body_is_written_verbatim_with_byte_length() {
        let req = base().with_body("{\"name\":\"Zoë\"}", "application/json");
        let http = prepared(&req, &RequestContext::new());
        assert_eq!(http.content_type.as_deref(), Some("application/json"));
        assert_eq!(http.body.as_deref(), Some("{\"name\":\"Zoë\"}".as_bytes()));
        // 'ë' is two bytes in UTF-8
        assert_eq!(http.content_length, Some(15));
    }

    #[test]
    fn nothing_to_send_leaves_request_untouched() {
        let http = prepared(&base(), &RequestContext::new());
        assert!(http.content_type.is_none());
        assert!(http.content_length.is_none());
        assert!(http.body.is_none());
    }

    #[test]
    fn multipart_layout_is_exact() {
        let req = base()
            .with_file("avatar", "x.png", vec![0xFF, 0xD8, 0xFF], Some("image/png"))
            .with_parameter("caption", "hi");
        let mut out = Vec::new();
        MultipartWriter::new("B0UND")
            .write(&mut out, &req.files, &req.parameters)
            .unwrap();

        let mut expected = b"--B0UND\r\nContent-Disposition: form-data; name=\"x.png\"; filename=\"x.png\";\r\nContent-Type: image/png\r\n\r\n".to_vec();
        expected.extend_from_slice(&[0xFF, 0xD8, 0xFF]);
        expected.extend_from_slice(
            b"\r\n--B0UND\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nhi\r\n\r\n--B0UND--\r\n",
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn multipart_defaults_content_type() {
        let req = base().with_file("f", "blob.bin", vec![1, 2], None);
        let http = prepared(&req, &RequestContext::with_boundary("b"));
        let body = http.body.unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("Content-Type: application/octet-stream\r\n\r\n"));
        assert!(http.content_length.is_none());
    }

    #[test]
    fn boundaries_differ_between_contexts() {
        let a = RequestContext::new();
        let b = RequestContext::new();
        assert_ne!(a.boundary(), b.boundary());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn multipart_write_failure_is_reported() {
        let req = base().with_file("f", "a.bin", vec![1], None);
        let err = MultipartWriter::new("b")
            .write(&mut FailingWriter, &req.files, &req.parameters)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
