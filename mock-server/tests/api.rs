use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn empty(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_reports_method_path_and_query() {
    let resp = app().oneshot(empty("DELETE", "/echo?a=1&b=2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "DELETE");
    assert_eq!(echo.path, "/echo");
    assert_eq!(echo.query.as_deref(), Some("a=1&b=2"));
    assert_eq!(echo.body_len, 0);
}

#[tokio::test]
async fn echo_reports_headers_and_body() {
    let req = Request::builder()
        .method("POST")
        .uri("/echo")
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-tag", "one")
        .header("x-tag", "two")
        .body("a%20b=c%26d".to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.header("content-type"), vec!["application/x-www-form-urlencoded"]);
    assert_eq!(echo.header("x-tag"), vec!["one", "two"]);
    assert_eq!(echo.body, "a%20b=c%26d");
    assert_eq!(echo.body_len, 11);
}

// --- status ---

#[tokio::test]
async fn status_returns_requested_code() {
    let resp = app().oneshot(empty("GET", "/status/404")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(&body_bytes(resp).await[..], b"status 404");
}

#[tokio::test]
async fn status_out_of_range_is_400() {
    let resp = app().oneshot(empty("PUT", "/status/1000")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- cookies ---

#[tokio::test]
async fn cookies_sets_two_cookies() {
    let resp = app().oneshot(empty("GET", "/cookies")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let set: Vec<&str> = resp
        .headers()
        .get_all(http::header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(set, vec!["session=abc123; Path=/; HttpOnly", "theme=dark; Path=/"]);
}

// --- redirect ---

#[tokio::test]
async fn redirect_points_at_echo() {
    let resp = app().oneshot(empty("GET", "/redirect")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[http::header::LOCATION], "/echo");
}

// --- deflate ---

#[tokio::test]
async fn deflate_body_is_zlib_encoded() {
    use std::io::Read;

    let resp = app().oneshot(empty("GET", "/deflate")).await.unwrap();
    assert_eq!(resp.headers()[http::header::CONTENT_ENCODING], "deflate");

    let compressed = body_bytes(resp).await;
    let mut text = String::new();
    flate2::read::ZlibDecoder::new(&compressed[..])
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text, "inflated payload");
}

// --- slow ---

#[tokio::test]
async fn slow_eventually_answers() {
    let resp = app().oneshot(empty("GET", "/slow/10")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"finally");
}
