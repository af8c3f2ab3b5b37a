//! Request and response shapes intercepted and produced by the engine.
//!
//! These are deliberately small: the engine only needs method, URL, headers,
//! body and (for requests) how the platform classified the request.

use bytes::Bytes;
use http::header::{HeaderName, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{CacheKey, SyncError};

/// How the platform classified a request when it was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level document navigation.
    Navigate,
    /// Same-origin subresource fetch.
    #[default]
    SameOrigin,
    /// Cross-origin CORS fetch.
    Cors,
    /// Opaque cross-origin fetch.
    NoCors,
}

/// An outbound request issued by the host application.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Bytes,
    mode: RequestMode,
}

impl Request {
    /// Create a request with no headers and an empty body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            mode: RequestMode::default(),
        }
    }

    /// Create a request from an absolute URL string.
    pub fn parse(method: Method, url: &str) -> Result<Self, SyncError> {
        Ok(Self::new(method, Url::parse(url)?))
    }

    /// Create a GET subresource request.
    pub fn get(url: &str) -> Result<Self, SyncError> {
        Self::parse(Method::GET, url)
    }

    /// Create a GET top-level navigation request.
    pub fn navigate(url: &str) -> Result<Self, SyncError> {
        Ok(Self::get(url)?.with_mode(RequestMode::Navigate))
    }

    /// Set the request mode.
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The absolute request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL path component.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// How the platform classified this request.
    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Whether this is a top-level navigation.
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Whether the method may have side effects (anything but GET, HEAD, OPTIONS).
    pub fn is_mutating(&self) -> bool {
        ![Method::GET, Method::HEAD, Method::OPTIONS].contains(&self.method)
    }

    /// The cache key this request is stored and looked up under.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.method.clone(), &self.url)
    }
}

/// A response returned to the original caller, fetched from the network,
/// read from a cache bucket, or synthesized by the engine.
///
/// Cloning is cheap: the body is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Create a response with no headers and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Reassemble a response from its parts.
    pub fn from_parts(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// An HTML document response.
    pub fn html(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::new(status)
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            )
            .with_body(body)
    }

    /// A JSON response with `value` as its body.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, SyncError> {
        let body = serde_json::to_vec(value).map_err(SyncError::Serialization)?;
        Ok(Self::new(status)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(body))
    }

    /// Set the response body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a header, replacing any existing value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status is 2xx.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The `content-type` header, if present and valid ASCII.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Decode the body as JSON.
    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T, SyncError> {
        serde_json::from_slice(&self.body).map_err(SyncError::Deserialization)
    }

    /// Split into status, headers and body.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_methods_are_not_mutating() {
        for method in [Method::GET, Method::HEAD, Method::OPTIONS] {
            let req = Request::parse(method, "https://app.test/api/items").unwrap();
            assert!(!req.is_mutating());
        }
    }

    #[test]
    fn write_methods_are_mutating() {
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            let req = Request::parse(method, "https://app.test/api/items").unwrap();
            assert!(req.is_mutating());
        }
    }

    #[test]
    fn navigate_sets_mode() {
        let req = Request::navigate("https://app.test/reports").unwrap();
        assert!(req.is_navigation());
        assert_eq!(req.path(), "/reports");
    }

    #[test]
    fn relative_url_is_rejected() {
        assert!(matches!(
            Request::get("/relative"),
            Err(SyncError::InvalidUrl(_))
        ));
    }

    #[test]
    fn is_ok_covers_2xx_only() {
        assert!(Response::new(StatusCode::OK).is_ok());
        assert!(Response::new(StatusCode::NO_CONTENT).is_ok());
        assert!(!Response::new(StatusCode::NOT_MODIFIED).is_ok());
        assert!(!Response::new(StatusCode::NOT_FOUND).is_ok());
        assert!(!Response::new(StatusCode::INTERNAL_SERVER_ERROR).is_ok());
    }

    #[test]
    fn html_sets_content_type() {
        let resp = Response::html(StatusCode::SERVICE_UNAVAILABLE, "<p>offline</p>");
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(resp.content_type().unwrap().starts_with("text/html"));
        assert_eq!(resp.body().as_ref(), b"<p>offline</p>");
    }

    #[test]
    fn json_body_decodes() {
        let resp = Response::json(StatusCode::OK, &serde_json::json!({"status": "ok"})).unwrap();
        assert_eq!(resp.content_type(), Some("application/json"));
        let value: serde_json::Value = resp.body_json().unwrap();
        assert_eq!(value["status"], "ok");
    }

    #[test]
    fn clone_shares_body() {
        let resp = Response::new(StatusCode::OK).with_body(vec![1u8; 1024]);
        let copy = resp.clone();
        assert_eq!(resp, copy);
        assert_eq!(resp.body().as_ptr(), copy.body().as_ptr());
    }
}
