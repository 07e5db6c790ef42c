//! Verify body encoding against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file lists inputs and the exact bytes expected on the wire.
//! Multipart vectors split the expectation into head, file data and tail so
//! binary file content can be expressed in JSON.

use restexec_core::body::{encode_parameters, prepare, FORM_URLENCODED};
use restexec_core::builder::configure;
use restexec_core::{FileAttachment, Method, MultipartWriter, Parameter, Request, RequestContext};

#[test]
fn urlencoded_test_vectors() {
    let raw = include_str!("../../test-vectors/urlencoded.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let parameters: Vec<Parameter> = serde_json::from_value(case["parameters"].clone()).unwrap();
        let expected = case["expected_body"].as_str().unwrap();

        assert_eq!(encode_parameters(&parameters), expected, "{name}: encoded body");

        // Same result through the full build path.
        let request = Request {
            url: "http://vectors.test/form".to_string(),
            parameters,
            ..Default::default()
        };
        let mut http = configure(Method::Post, &request).unwrap();
        prepare(&mut http, &request, &RequestContext::new()).unwrap();
        assert_eq!(http.content_type.as_deref(), Some(FORM_URLENCODED), "{name}: content type");
        assert_eq!(http.body.as_deref(), Some(expected.as_bytes()), "{name}: body");
        assert_eq!(http.content_length, Some(expected.len() as u64), "{name}: content length");
    }
}

#[test]
fn multipart_test_vectors() {
    let raw = include_str!("../../test-vectors/multipart.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let boundary = vectors["boundary"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let files: Vec<FileAttachment> = serde_json::from_value(case["files"].clone()).unwrap();
        let parameters: Vec<Parameter> = serde_json::from_value(case["parameters"].clone()).unwrap();
        let data: Vec<u8> = serde_json::from_value(case["expected_data"].clone()).unwrap();

        let mut expected = case["expected_head"].as_str().unwrap().as_bytes().to_vec();
        expected.extend_from_slice(&data);
        expected.extend_from_slice(case["expected_tail"].as_str().unwrap().as_bytes());

        let mut out = Vec::new();
        MultipartWriter::new(boundary)
            .write(&mut out, &files, &parameters)
            .unwrap();
        assert_eq!(out, expected, "{name}: writer output");

        let request = Request {
            url: "http://vectors.test/upload".to_string(),
            files,
            parameters,
            ..Default::default()
        };
        let mut http = configure(Method::Put, &request).unwrap();
        prepare(&mut http, &request, &RequestContext::with_boundary(boundary)).unwrap();
        assert_eq!(
            http.content_type.as_deref(),
            Some(format!("multipart/form-data; boundary={boundary}").as_str()),
            "{name}: content type"
        );
        assert_eq!(http.body.as_deref(), Some(expected.as_slice()), "{name}: body");
    }
}
