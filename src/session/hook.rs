// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Receive hook
//!
//! Runs on every response a verb call obtains, after the cookie jar has
//! been updated, and decides whether the session may auto-follow
//! redirects. Returning `false` hands redirect control back to the
//! caller; the response is returned as-is.

use async_trait::async_trait;

use crate::error::Result;
use crate::http::Response;

/// Caller-pluggable gate consulted once per verb call.
#[async_trait]
pub trait ReceiveHook: Send + Sync {
    /// Return true when the response is eligible for auto-follow.
    async fn on_response(&self, response: &Response) -> Result<bool>;
}

/// Default hook: every response is eligible for auto-follow.
#[derive(Debug, Default)]
pub struct FollowAlways;

#[async_trait]
impl ReceiveHook for FollowAlways {
    async fn on_response(&self, _response: &Response) -> Result<bool> {
        Ok(true)
    }
}
