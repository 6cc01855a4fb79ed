// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Dual-transport request dispatch
//!
//! One code path builds every outgoing request (bearer token scoped to
//! the base address, cookie header from the jar) and normalizes every
//! incoming response, whichever transport carried it. Requests targeting
//! the application under test go through an in-process [`VirtualServer`]
//! when one is configured; everything else goes over the real network.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::redirect::Policy;
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::{Error, Result};
use crate::http::{CookieJar, Request, Response};

/// A request handed to an in-process application
#[derive(Debug)]
pub struct VirtualRequest {
    /// Request method
    pub method: Method,
    /// Resolved absolute URL
    pub url: Url,
    /// Request headers, cookie and authorization included
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Bytes>,
}

/// A response produced by an in-process application
#[derive(Debug)]
pub struct VirtualResponse {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl VirtualResponse {
    /// Create an empty response with a status
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Append a header (repeated names accumulate, as Set-Cookie needs)
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.append(name, value);
        }
        self
    }
}

/// An application reachable without a socket: submit a request, get a
/// response. Implementations host the system under test in-process.
#[async_trait]
pub trait VirtualServer: Send + Sync {
    /// Handle one request
    async fn dispatch(&self, request: VirtualRequest) -> Result<VirtualResponse>;
}

/// Session state shared between the client façade and the dispatcher.
pub(crate) struct SessionState {
    /// Base address; relative targets resolve against it
    pub base_address: Option<Url>,
    /// Header name carrying the bearer token
    pub authorization_header_name: RwLock<String>,
    /// Bearer token, sent only within the base address
    pub token: RwLock<Option<String>>,
    /// The session cookie jar
    pub cookies: CookieJar,
}

/// Builds, routes and normalizes requests for one session.
pub struct RequestDispatcher {
    state: Arc<SessionState>,
    network: reqwest::Client,
    virtual_server: Option<Arc<dyn VirtualServer>>,
}

impl RequestDispatcher {
    pub(crate) fn new(
        state: Arc<SessionState>,
        virtual_server: Option<Arc<dyn VirtualServer>>,
    ) -> Result<Self> {
        // Redirects are followed by the session engine, never by reqwest,
        // and the jar owns all cookie handling.
        let network = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()?;
        Ok(Self {
            state,
            network,
            virtual_server,
        })
    }

    /// Send a request: resolve the target, inject bearer and cookie
    /// headers, route to the right transport, normalize the response and
    /// run the one cookie-jar update pass.
    pub async fn send(&self, request: Request) -> Result<Response> {
        let (url, target_was_absolute) = self.resolve(&request.target)?;
        let headers = self.build_headers(&request, &url)?;

        let in_process = self.routes_in_process(target_was_absolute, &url);
        let (status, response_headers, body) = match (&self.virtual_server, in_process) {
            (Some(server), true) => {
                tracing::debug!(method = %request.method, %url, transport = "virtual", "dispatching");
                let reply = server
                    .dispatch(VirtualRequest {
                        method: request.method.clone(),
                        url: url.clone(),
                        headers,
                        body: request.body.clone(),
                    })
                    .await?;
                (reply.status, reply.headers, reply.body)
            }
            _ => {
                tracing::debug!(method = %request.method, %url, transport = "network", "dispatching");
                let mut builder = self
                    .network
                    .request(request.method.clone(), url.clone())
                    .headers(headers);
                if let Some(body) = request.body.clone() {
                    builder = builder.body(body);
                }
                let reply = builder.send().await?;
                let status = reply.status();
                let response_headers = reply.headers().clone();
                let body = reply.bytes().await?;
                (status, response_headers, body)
            }
        };

        let response = Response::new(status, response_headers, body, url.clone());
        // Exactly one jar update per response, identical for both
        // transports, before the receive hook sees the response.
        self.state
            .cookies
            .apply_set_cookie(&url, response.set_cookies())?;
        Ok(response)
    }

    /// Resolve a target against the base address. The boolean reports
    /// whether the target was absolute on its own.
    fn resolve(&self, target: &str) -> Result<(Url, bool)> {
        match Url::parse(target) {
            Ok(url) => Ok((url, true)),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self
                    .state
                    .base_address
                    .as_ref()
                    .ok_or(Error::InvalidRequestUri)?;
                Ok((base.join(target)?, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// A relative target always addresses the hosted application; an
    /// absolute one only when it falls within the base address.
    fn routes_in_process(&self, target_was_absolute: bool, url: &Url) -> bool {
        if self.virtual_server.is_none() {
            return false;
        }
        if !target_was_absolute {
            return true;
        }
        match &self.state.base_address {
            Some(base) => is_base_of(base, url),
            None => false,
        }
    }

    fn build_headers(&self, request: &Request, url: &Url) -> Result<HeaderMap> {
        let mut headers = request.headers.clone();

        if let Some(token) = self.state.token.read().as_deref() {
            let in_base = self
                .state
                .base_address
                .as_ref()
                .map_or(false, |base| is_base_of(base, url));
            if in_base {
                let name = self.state.authorization_header_name.read().clone();
                let name = HeaderName::try_from(name.as_str())
                    .map_err(|_| Error::config(format!("invalid authorization header name '{name}'")))?;
                let value = HeaderValue::try_from(format!("Bearer {token}"))
                    .map_err(|_| Error::config("bearer token is not a valid header value"))?;
                headers.insert(name, value);
            }
        }

        if let Some(cookie_header) = self.state.cookies.cookie_header(url) {
            let value = HeaderValue::try_from(cookie_header)
                .map_err(|_| Error::config("cookie header is not a valid header value"))?;
            headers.insert(COOKIE, value);
        }

        if let Some(content_type) = &request.content_type {
            let value = HeaderValue::try_from(content_type.as_str())
                .map_err(|_| Error::config("invalid content type"))?;
            headers.insert(CONTENT_TYPE, value);
        }

        Ok(headers)
    }
}

/// Whether `url` lives under `base`: same scheme, host and port, and the
/// base path (taken as a directory, anything after its last `/` ignored)
/// is a prefix of the URL path.
pub(crate) fn is_base_of(base: &Url, url: &Url) -> bool {
    if base.scheme() != url.scheme()
        || base.host_str() != url.host_str()
        || base.port_or_known_default() != url.port_or_known_default()
    {
        return false;
    }
    let base_path = base.path();
    let dir = match base_path.rfind('/') {
        Some(idx) => &base_path[..=idx],
        None => "/",
    };
    url.path().starts_with(dir)
}
