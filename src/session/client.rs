// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session client façade
//!
//! Verb-level operations over the dispatcher and the redirect engine.
//! Every verb call runs the same flow: dispatch, consult the receive
//! hook, and auto-follow redirects within the configured budget when the
//! hook allows it.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use serde::Serialize;
use url::Url;

use super::dispatch::{RequestDispatcher, SessionState, VirtualServer};
use super::hook::{FollowAlways, ReceiveHook};
use super::redirect::RedirectEngine;
use crate::error::{Error, Result};
use crate::http::{
    CookieJar, Request, Response, DEFAULT_AUTHORIZATION_HEADER, DEFAULT_MAX_REDIRECTIONS,
};

/// Browser-faithful HTTP session for driving a web application under
/// test, either through an in-process virtual server or over the
/// network. Owns the cookie jar, the bearer token and the redirect
/// budget; intended for sequential use by one test at a time.
pub struct SessionClient {
    state: Arc<SessionState>,
    dispatcher: Arc<RequestDispatcher>,
    redirects: RedirectEngine,
    receive_hook: RwLock<Option<Arc<dyn ReceiveHook>>>,
    max_redirections: RwLock<u32>,
}

impl SessionClient {
    /// Create a client reaching its base address over the network.
    pub fn new(base_address: impl AsRef<str>) -> Result<Self> {
        let base = Url::parse(base_address.as_ref())?;
        Self::build(Some(base), None)
    }

    /// Create a client whose base address is served by an in-process
    /// application; URLs outside the base address still go over the
    /// network.
    pub fn hosted(
        base_address: impl AsRef<str>,
        server: Arc<dyn VirtualServer>,
    ) -> Result<Self> {
        let base = Url::parse(base_address.as_ref())?;
        Self::build(Some(base), Some(server))
    }

    /// Create a client with no base address: absolute URLs only, and the
    /// bearer token is never injected.
    pub fn detached() -> Result<Self> {
        Self::build(None, None)
    }

    fn build(
        base_address: Option<Url>,
        virtual_server: Option<Arc<dyn VirtualServer>>,
    ) -> Result<Self> {
        let state = Arc::new(SessionState {
            base_address,
            authorization_header_name: RwLock::new(DEFAULT_AUTHORIZATION_HEADER.to_string()),
            token: RwLock::new(None),
            cookies: CookieJar::new(),
        });
        let dispatcher = Arc::new(RequestDispatcher::new(state.clone(), virtual_server)?);
        Ok(Self {
            state,
            redirects: RedirectEngine::new(dispatcher.clone()),
            dispatcher,
            receive_hook: RwLock::new(Some(Arc::new(FollowAlways))),
            max_redirections: RwLock::new(DEFAULT_MAX_REDIRECTIONS),
        })
    }

    /// Issue a GET request to a base-relative or absolute URL.
    pub async fn get(&self, target: impl Into<String>) -> Result<Response> {
        self.send(Request::get(target)).await
    }

    /// Issue a POST request with url-encoded form values.
    pub async fn post_form<K, V>(
        &self,
        target: impl Into<String>,
        values: &[(K, V)],
    ) -> Result<Response>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.send(Request::post(target).form(values)).await
    }

    /// Issue a POST request with a raw JSON body.
    pub async fn post_json(
        &self,
        target: impl Into<String>,
        json: impl Into<String>,
    ) -> Result<Response> {
        self.send(Request::post(target).json(json)).await
    }

    /// Issue a POST request with a serialized JSON body.
    pub async fn post_json_value<T: Serialize>(
        &self,
        target: impl Into<String>,
        data: &T,
    ) -> Result<Response> {
        self.send(Request::post(target).json_value(data)?).await
    }

    /// Issue a POST request with an XML body.
    pub async fn post_xml(
        &self,
        target: impl Into<String>,
        xml: impl Into<String>,
    ) -> Result<Response> {
        self.send(Request::post(target).xml(xml)).await
    }

    /// Issue a POST request with a raw body and content type.
    pub async fn post(
        &self,
        target: impl Into<String>,
        body: impl Into<Bytes>,
        content_type: impl Into<String>,
    ) -> Result<Response> {
        self.send(Request::post(target).body(body, content_type)).await
    }

    /// Send a prepared request through the full session flow.
    pub async fn send(&self, request: Request) -> Result<Response> {
        let response = self.dispatcher.send(request).await?;
        let hook = self
            .receive_hook
            .read()
            .clone()
            .ok_or(Error::MisconfiguredClient)?;
        if hook.on_response(&response).await? {
            let budget = *self.max_redirections.read();
            self.redirects.auto_follow(response, budget).await
        } else {
            Ok(response)
        }
    }

    /// Follow one redirect step manually. With `strict` set, a
    /// non-redirect response fails instead of being returned unchanged.
    pub async fn follow_redirect(&self, response: Response, strict: bool) -> Result<Response> {
        self.redirects.follow_once(response, strict).await
    }

    /// The redirect engine, for callers driving redirects themselves.
    pub fn redirects(&self) -> &RedirectEngine {
        &self.redirects
    }

    /// The session cookie jar.
    pub fn cookies(&self) -> &CookieJar {
        &self.state.cookies
    }

    /// Expire cookies under the base address and the given sub-paths.
    pub fn clear_cookies<I, S>(&self, sub_paths: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let base = self
            .state
            .base_address
            .as_ref()
            .ok_or_else(|| Error::config("clearing cookies requires a base address"))?;
        self.state.cookies.expire(base, sub_paths);
        Ok(())
    }

    /// Expire cookies under an explicit base path and sub-paths.
    pub fn clear_cookies_at<I, S>(&self, base: &Url, sub_paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.state.cookies.expire(base, sub_paths);
    }

    /// The base address, if any.
    pub fn base_address(&self) -> Option<&Url> {
        self.state.base_address.as_ref()
    }

    /// Current bearer token.
    pub fn token(&self) -> Option<String> {
        self.state.token.read().clone()
    }

    /// Set the bearer token sent to URLs within the base address.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.state.token.write() = Some(token.into());
    }

    /// Clear the bearer token.
    pub fn clear_token(&self) {
        *self.state.token.write() = None;
    }

    /// Header name carrying the bearer token (defaults to "Authorization").
    pub fn authorization_header_name(&self) -> String {
        self.state.authorization_header_name.read().clone()
    }

    /// Change the header name carrying the bearer token.
    pub fn set_authorization_header_name(&self, name: impl Into<String>) {
        *self.state.authorization_header_name.write() = name.into();
    }

    /// Maximum number of automatically followed redirections.
    pub fn max_automatic_redirections(&self) -> u32 {
        *self.max_redirections.read()
    }

    /// Set the redirect budget. Zero and negative values disable
    /// auto-follow entirely; callers then drive [`Self::follow_redirect`]
    /// themselves.
    pub fn set_max_automatic_redirections(&self, value: i32) {
        *self.max_redirections.write() = value.max(0) as u32;
    }

    /// Replace the receive hook.
    pub fn set_receive_hook(&self, hook: Arc<dyn ReceiveHook>) {
        *self.receive_hook.write() = Some(hook);
    }

    /// Remove the receive hook. Sending fails until a hook is set again.
    pub fn clear_receive_hook(&self) {
        *self.receive_hook.write() = None;
    }
}
