// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the mustekala session client
//!
//! Session-usage errors carry the context a test author needs (status,
//! URL); transport and parsing failures are wrapped transparently.

use thiserror::Error;

/// Result type alias for mustekala operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the session client
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The receive hook was unset when a response arrived
    #[error("receive hook must be set before sending requests")]
    MisconfiguredClient,

    /// A 307 Temporary Redirect was encountered; it is never followed
    #[error("307 Temporary Redirect is not supported (from {url})")]
    UnsupportedRedirect { url: String },

    /// Strict manual follow was asked on a non-redirect response
    #[error("response must be a 301 Moved, 302 Found or 303 See Other, got {status}")]
    NotARedirect { status: u16 },

    /// A redirect-eligible response carried no Location header
    #[error("{status} response has no Location header")]
    MissingLocation { status: u16 },

    /// A relative request target with no base address to resolve against
    #[error("request URI is relative and the client has no base address")]
    InvalidRequestUri,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a redirect-handling error
    pub fn is_redirect_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedRedirect { .. }
                | Error::NotARedirect { .. }
                | Error::MissingLocation { .. }
        )
    }

    /// Check if this is a transport-level error
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Io(_))
    }

    /// Get the HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotARedirect { status } => Some(*status),
            Error::MissingLocation { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
