// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP primitives for the session client
//!
//! Request and response descriptors plus the cookie jar. The jar owns
//! the corrected Set-Cookie path handling; the session layer never
//! touches raw header values itself.

mod cookie;
mod request;
mod response;

pub use cookie::{Cookie, CookieJar};
pub use request::Request;
pub use response::Response;

/// Default authorization header name
pub const DEFAULT_AUTHORIZATION_HEADER: &str = "Authorization";

/// Default maximum number of automatically followed redirections
pub const DEFAULT_MAX_REDIRECTIONS: u32 = 50;

/// Common HTTP headers
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const LOCATION: &str = "location";
}

/// Content types used by the POST helpers
pub mod content_types {
    pub const FORM: &str = "application/x-www-form-urlencoded";
    pub const JSON: &str = "application/json; charset=utf-8";
    pub const XML: &str = "application/xml; charset=utf-8";
}
