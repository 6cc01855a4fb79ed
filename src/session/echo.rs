// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-process stub application used by the session tests.
//!
//! A deliberately dumb router: echoes headers and cookies back, sets and
//! deletes cookies on request, and produces every redirect shape the
//! session engine has to handle.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Method, StatusCode};

use super::dispatch::{VirtualRequest, VirtualResponse, VirtualServer};
use crate::error::Result;

pub(crate) struct EchoApp;

fn query(request: &VirtualRequest, name: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

fn has_query(request: &VirtualRequest, name: &str) -> bool {
    request.url.query_pairs().any(|(k, _)| k == name)
}

#[async_trait]
impl VirtualServer for EchoApp {
    async fn dispatch(&self, request: VirtualRequest) -> Result<VirtualResponse> {
        if has_query(&request, "readCookies") {
            let mut body = String::new();
            if let Some(cookies) = request.headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
                for pair in cookies.split(';') {
                    let pair = pair.trim();
                    if pair.is_empty() {
                        continue;
                    }
                    let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                    body.push_str(name);
                    body.push(':');
                    body.push_str(value);
                    body.push('\n');
                }
            }
            return Ok(VirtualResponse::new(StatusCode::OK).body(body));
        }

        let response = match request.url.path() {
            "/sayHello" => VirtualResponse::new(StatusCode::OK).body("Hello! from the echo app"),
            "/readHeader" => {
                let name = query(&request, "name").unwrap_or_default();
                let value = request
                    .headers
                    .get(name.as_str())
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("");
                VirtualResponse::new(StatusCode::OK)
                    .body(format!("header '{}': '{}'", name, value))
            }
            "/setCookie" => {
                let name = query(&request, "name").unwrap_or_default();
                let path = query(&request, "path").unwrap_or_default();
                let value = query(&request, "value")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| "CookieValue".to_string());
                let set_cookie = if path.is_empty() {
                    format!("{}={}", name, value)
                } else {
                    format!("{}={}; path={}", name, value, path)
                };
                VirtualResponse::new(StatusCode::OK)
                    .header("set-cookie", set_cookie)
                    .body(format!("Cookie set: {} Path: {} Value: {}", name, path, value))
            }
            "/deleteCookie" => {
                let name = query(&request, "name").unwrap_or_default();
                let path = query(&request, "path").unwrap_or_default();
                let path_part = if path.is_empty() {
                    String::new()
                } else {
                    format!("path={}; ", path)
                };
                let set_cookie = format!(
                    "{}=; {}expires=Thu, 01 Jan 1970 00:00:00 GMT",
                    name, path_part
                );
                VirtualResponse::new(StatusCode::OK)
                    .header("set-cookie", set_cookie)
                    .body(format!("Cookie delete: {} Path: {}", name, path))
            }
            "/doubleCookie" => VirtualResponse::new(StatusCode::OK)
                .header("set-cookie", "Twice=Val; path=/first; path=/second")
                .body("double"),
            "/setAndBounce" => VirtualResponse::new(StatusCode::FOUND)
                .header("set-cookie", "Hop=1; path=/")
                .header("location", "/sayHello"),
            "/bounce" => {
                let n: u32 = query(&request, "n").and_then(|v| v.parse().ok()).unwrap_or(0);
                if n > 0 {
                    VirtualResponse::new(StatusCode::FOUND)
                        .header("location", format!("/bounce?n={}", n - 1))
                } else {
                    VirtualResponse::new(StatusCode::OK).body("landed")
                }
            }
            "/moved" => {
                VirtualResponse::new(StatusCode::MOVED_PERMANENTLY).header("location", "/sayHello")
            }
            "/seeOther" => {
                VirtualResponse::new(StatusCode::SEE_OTHER).header("location", "/sayHello")
            }
            "/temporary" => {
                VirtualResponse::new(StatusCode::TEMPORARY_REDIRECT).header("location", "/sayHello")
            }
            "/submit" => {
                if request.method != Method::POST {
                    VirtualResponse::new(StatusCode::METHOD_NOT_ALLOWED)
                } else {
                    VirtualResponse::new(StatusCode::SEE_OTHER).header("location", "/whoami")
                }
            }
            "/whoami" => {
                VirtualResponse::new(StatusCode::OK).body(format!("method: {}", request.method))
            }
            "/rewriteJson" => {
                if request.method != Method::POST {
                    VirtualResponse::new(StatusCode::METHOD_NOT_ALLOWED)
                } else {
                    let body = request.body.as_deref().unwrap_or(&[]);
                    let value: serde_json::Value = serde_json::from_slice(body)?;
                    VirtualResponse::new(StatusCode::OK).body(format!("JSON: '{}'", value))
                }
            }
            "/echoBody" => {
                let content_type = request
                    .headers
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("");
                let body = request
                    .body
                    .as_deref()
                    .map(String::from_utf8_lossy)
                    .unwrap_or_default();
                VirtualResponse::new(StatusCode::OK)
                    .body(format!("content-type: '{}' body: '{}'", content_type, body))
            }
            _ => VirtualResponse::new(StatusCode::NOT_FOUND).body("not found"),
        };
        Ok(response)
    }
}
