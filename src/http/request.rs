// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request descriptor and body builders

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;

use super::content_types;
use crate::error::Result;

/// An outgoing request, built per call.
///
/// The target may be absolute or relative; relative targets are resolved
/// against the session's base address at dispatch time, which is why the
/// descriptor keeps the raw string instead of a parsed URL.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Absolute URL or base-relative target
    pub target: String,
    /// Extra request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Bytes>,
    /// Content type of the body
    pub content_type: Option<String>,
}

impl Request {
    /// Create a new GET request
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    /// Create a new POST request
    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    /// Create a new request with arbitrary method
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderMap::new(),
            body: None,
            content_type: None,
        }
    }

    /// Set a header
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set a raw body with its content type
    pub fn body(mut self, body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.content_type = Some(content_type.into());
        self
    }

    /// Set an url-encoded form body
    pub fn form<K, V>(mut self, values: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = values
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    urlencoding_encode(k.as_ref()),
                    urlencoding_encode(v.as_ref())
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        self.body = Some(Bytes::from(body));
        self.content_type = Some(content_types::FORM.to_string());
        self
    }

    /// Set a raw JSON body
    pub fn json(mut self, json: impl Into<String>) -> Self {
        self.body = Some(Bytes::from(json.into()));
        self.content_type = Some(content_types::JSON.to_string());
        self
    }

    /// Set a JSON body from a serializable value
    pub fn json_value<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.body = Some(Bytes::from(serde_json::to_vec(data)?));
        self.content_type = Some(content_types::JSON.to_string());
        Ok(self)
    }

    /// Set a raw XML body
    pub fn xml(mut self, xml: impl Into<String>) -> Self {
        self.body = Some(Bytes::from(xml.into()));
        self.content_type = Some(content_types::XML.to_string());
        self
    }
}

/// URL encode a string
fn urlencoding_encode(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '~' => result.push(c),
            ' ' => result.push('+'),
            _ => {
                for byte in c.to_string().bytes() {
                    result.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    result
}
