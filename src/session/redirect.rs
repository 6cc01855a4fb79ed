// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Redirect following
//!
//! A received response is either terminal, a follow-eligible redirect
//! (301 Moved, 302 Found, 303 See Other), or a 307 Temporary Redirect,
//! which is rejected outright. A follow step always
//! downgrades to GET and resolves a relative Location against the URL of
//! the request that produced the response, not against the base address.

use std::sync::Arc;

use reqwest::StatusCode;
use url::Url;

use super::dispatch::RequestDispatcher;
use crate::error::{Error, Result};
use crate::http::{Request, Response};

/// Bounded redirect follower over the session dispatcher.
pub struct RedirectEngine {
    dispatcher: Arc<RequestDispatcher>,
}

impl RedirectEngine {
    pub(crate) fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Classify a response: `Some(target)` when it must be followed,
    /// `None` when it is terminal. A 307 fails, a redirect without a
    /// Location header fails.
    fn redirect_target(response: &Response) -> Result<Option<Url>> {
        match response.status {
            StatusCode::TEMPORARY_REDIRECT => Err(Error::UnsupportedRedirect {
                url: response.request_url().to_string(),
            }),
            StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER => {
                let location = response.location().ok_or(Error::MissingLocation {
                    status: response.status_code(),
                })?;
                let target = match Url::parse(location) {
                    Ok(url) => url,
                    Err(url::ParseError::RelativeUrlWithoutBase) => {
                        response.request_url().join(location)?
                    }
                    Err(e) => return Err(e.into()),
                };
                Ok(Some(target))
            }
            _ => Ok(None),
        }
    }

    /// Follow one redirect step.
    ///
    /// A non-redirect response is returned unchanged, or fails with
    /// [`Error::NotARedirect`] when `strict` is set. The previous
    /// response is dropped before the new GET is issued.
    pub async fn follow_once(&self, response: Response, strict: bool) -> Result<Response> {
        match Self::redirect_target(&response)? {
            Some(target) => {
                tracing::debug!(
                    status = response.status_code(),
                    from = %response.request_url(),
                    to = %target,
                    "following redirect"
                );
                drop(response);
                self.dispatcher.send(Request::get(target)).await
            }
            None if strict => Err(Error::NotARedirect {
                status: response.status_code(),
            }),
            None => Ok(response),
        }
    }

    /// Follow redirects for at most `budget` hops.
    ///
    /// Budget exhaustion returns the last response obtained even when it
    /// is itself still a redirect; a terminal response stops early.
    pub async fn auto_follow(&self, mut response: Response, budget: u32) -> Result<Response> {
        let mut remaining = budget;
        while remaining > 0 {
            match Self::redirect_target(&response)? {
                None => break,
                Some(target) => {
                    tracing::debug!(
                        status = response.status_code(),
                        to = %target,
                        remaining,
                        "auto-following redirect"
                    );
                    response = self.dispatcher.send(Request::get(target)).await?;
                    remaining -= 1;
                }
            }
        }
        Ok(response)
    }
}
