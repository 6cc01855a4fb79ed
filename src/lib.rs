// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Mustekala - Browser-faithful HTTP test sessions
//!
//! A programmatic HTTP client for driving integration tests against a
//! web application, through an in-process virtual transport or over a
//! real socket, with the session semantics a browser would give you:
//!
//! - Cookie jar with correct `Set-Cookie` path scoping: the *last*
//!   `path=` attribute wins (RFC 6265 §5.3) and a missing attribute
//!   defaults to the request path, not `/`
//! - Bearer token injected only on requests within the base address
//! - Bounded automatic redirect following (301/302/303; 307 rejected)
//! - Pluggable receive hook to take manual control of redirects
//! - One dispatch pipeline for both transports, so cookie semantics are
//!   identical in-process and over the wire
//! - Dynamic key/value configuration source with batched change
//!   notifications, and a wrapper for an external server process
//!
//! ## Example
//!
//! ```rust,no_run
//! use mustekala::SessionClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SessionClient::new("http://localhost:7835/")?;
//!     client.set_token("my token");
//!
//!     let response = client.get("/profile").await?;
//!     println!("{}: {}", response.status_code(), response.text()?);
//!
//!     client.post_form("/login", &[("user", "tester"), ("pass", "hunter2")]).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod process;
pub mod session;

// Re-exports for convenience

// Session client
pub use session::{
    FollowAlways, ReceiveHook, RedirectEngine, RequestDispatcher, SessionClient, VirtualRequest,
    VirtualResponse, VirtualServer,
};

// HTTP primitives
pub use http::{Cookie, CookieJar, Request, Response};

// Errors
pub use error::{Error, Result};

// Dynamic configuration
pub use config::{BatchGuard, DynamicConfig};

// External server process
pub use process::ExternalServer;

/// Mustekala version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
