// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response descriptor

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::headers;
use crate::error::{Error, Result};

/// A received response.
///
/// Carries the resolved absolute URL of the request that produced it:
/// cookie path resolution and relative Location resolution both work
/// against that URL, not against the base address or a redirect chain.
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// Resolved absolute URL of the originating request
    pub request_url: Url,
}

impl Response {
    /// Create a new response
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes, request_url: Url) -> Self {
        Self {
            status,
            headers,
            body,
            request_url,
        }
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if status is any redirection (3xx)
    pub fn is_redirection(&self) -> bool {
        self.status.is_redirection()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get body as text
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Other(e.to_string()))
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header(headers::CONTENT_TYPE)
    }

    /// Get Set-Cookie headers
    pub fn set_cookies(&self) -> Vec<&str> {
        self.header_all(headers::SET_COOKIE)
    }

    /// Get the Location header
    pub fn location(&self) -> Option<&str> {
        self.header(headers::LOCATION)
    }

    /// Get the originating request URL
    pub fn request_url(&self) -> &Url {
        &self.request_url
    }

    /// Get body length
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_response_status() {
        let resp = Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::new(),
            url("http://example.com/"),
        );
        assert!(resp.is_success());
        assert_eq!(resp.status_code(), 200);
    }

    #[test]
    fn test_response_text() {
        let resp = Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::from("Hello! world"),
            url("http://example.com/sayHello"),
        );
        assert_eq!(resp.text().unwrap(), "Hello! world");
    }

    #[test]
    fn test_repeated_set_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1; path=/"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        let resp = Response::new(
            StatusCode::OK,
            headers,
            Bytes::new(),
            url("http://example.com/"),
        );
        assert_eq!(resp.set_cookies(), vec!["a=1; path=/", "b=2"]);
    }

    #[test]
    fn test_location_header() {
        let mut headers = HeaderMap::new();
        headers.insert("location", HeaderValue::from_static("/next"));
        let resp = Response::new(
            StatusCode::FOUND,
            headers,
            Bytes::new(),
            url("http://example.com/start"),
        );
        assert_eq!(resp.location(), Some("/next"));
        assert!(resp.is_redirection());
    }
}
