// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar with corrected Set-Cookie path handling
//!
//! Stock cookie stores resolve the `path=` attribute of a `Set-Cookie`
//! value from its first occurrence and default to `/` when absent. Both
//! are wrong for session-faithful testing: RFC 6265 §5.3 takes the last
//! occurrence, and the default path is the path of the request that
//! received the cookie. The jar scans and strips `path=` attributes
//! itself before handing the remainder to the name/value/expiry parser.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

lazy_static! {
    static ref COOKIE_PATH: Regex = Regex::new(r"(?i)(?:^|;)\s*path\s*=\s*([^;\s]*)")
        .expect("cookie path regex");
}

/// A single HTTP cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value (None and Some("") are both valid session cookies)
    pub value: Option<String>,
    /// Domain the cookie belongs to
    pub domain: String,
    /// Path the cookie is valid for
    pub path: String,
    /// Explicitly expired (cleared) cookie
    pub expired: bool,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            domain: String::new(),
            path: "/".to_string(),
            expired: false,
            expires: None,
        }
    }

    /// Create a cookie without a value
    pub fn valueless(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            domain: String::new(),
            path: "/".to_string(),
            expired: false,
            expires: None,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expired || self.expires.map_or(false, |exp| exp < Utc::now())
    }

    /// Check if the cookie applies to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        if !self.domain_matches(host) {
            return false;
        }
        if !url.path().starts_with(&self.path) {
            return false;
        }
        !self.is_expired()
    }

    /// Check if domain matches
    fn domain_matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return true;
        }
        let domain = self.domain.trim_start_matches('.');
        host == domain || host.ends_with(&format!(".{}", domain))
    }

    /// Parse a Set-Cookie value into name, value and expiry.
    ///
    /// The `path=` attribute is NOT interpreted here; the jar strips it
    /// beforehand and assigns the storage path itself. Malformed input
    /// (no name) yields None and the value is dropped.
    pub fn parse(header: &str, origin: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let first = loop {
            let segment = parts.next()?.trim();
            if !segment.is_empty() {
                break segment;
            }
        };

        let mut cookie = match first.split_once('=') {
            Some((name, value)) => {
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Cookie::new(name, value.trim())
            }
            None => Cookie::valueless(first),
        };

        // Default domain to the origin host
        cookie.domain = origin.host_str().unwrap_or("").to_string();

        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let attr = attr.trim().to_lowercase();
                let val = val.trim();
                match attr.as_str() {
                    "domain" => cookie.domain = val.trim_start_matches('.').to_string(),
                    "expires" => {
                        if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
                            cookie.expires = Some(dt.with_timezone(&Utc));
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            cookie.expires = Some(Utc::now() + chrono::Duration::seconds(secs));
                        }
                    }
                    _ => {}
                }
            }
        }

        Some(cookie)
    }

    /// Serialize for a Cookie request header
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value.as_deref().unwrap_or(""))
    }
}

/// Cookie storage keyed by domain, insertion-ordered within a domain.
///
/// One mutex guards the whole jar so a mutation is visible to the very
/// next lookup. Lock scopes are short and never held across an await.
#[derive(Debug, Clone)]
pub struct CookieJar {
    cookies: Arc<Mutex<HashMap<String, Vec<Cookie>>>>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self {
            cookies: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store a cookie, replacing any entry with the same (domain, path, name)
    pub fn set(&self, cookie: Cookie) {
        let mut jar = self.cookies.lock();
        let entries = jar.entry(cookie.domain.clone()).or_default();
        match entries
            .iter()
            .position(|c| c.name == cookie.name && c.path == cookie.path)
        {
            Some(index) => entries[index] = cookie,
            None => entries.push(cookie),
        }
    }

    /// Get all cookies applying to a URL
    pub fn cookies_for(&self, url: &Url) -> Vec<Cookie> {
        let jar = self.cookies.lock();
        let mut result = Vec::new();
        for entries in jar.values() {
            for cookie in entries.iter() {
                if cookie.matches(url) {
                    result.push(cookie.clone());
                }
            }
        }
        result
    }

    /// Get the Cookie header value for a URL, None when no cookie applies
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.cookies_for(url);
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|c| c.header_value())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Merge the Set-Cookie values received by a request into the jar.
    ///
    /// For each raw value: every `path=` attribute is scanned (last one
    /// wins) and stripped; the effective path defaults to the request
    /// URL's path when absent; the path is resolved against the request
    /// authority to obtain the storage location.
    pub fn apply_set_cookie<I, S>(&self, request_url: &Url, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if request_url.host_str().is_none() {
            return Err(Error::InvalidRequestUri);
        }
        let mut root = request_url.clone();
        root.set_path("/");
        root.set_query(None);
        root.set_fragment(None);

        for raw in values {
            let raw = raw.as_ref();
            let (stripped, last_path) = strip_path_attributes(raw);
            let storage_url = match last_path {
                Some(p) => root.join(&p)?,
                None => {
                    // No path in the cookie: the path is the one of the request.
                    let mut u = request_url.clone();
                    u.set_query(None);
                    u.set_fragment(None);
                    u
                }
            };
            if let Some(mut cookie) = Cookie::parse(&stripped, &storage_url) {
                cookie.path = storage_url.path().to_string();
                tracing::trace!(
                    name = %cookie.name,
                    path = %cookie.path,
                    domain = %cookie.domain,
                    "storing cookie"
                );
                self.set(cookie);
            }
        }
        Ok(())
    }

    /// Mark every cookie visible at `base` as expired, then do the same
    /// for each non-blank sub-path resolved against `base` (normalized
    /// to a trailing separator). Entries are not removed; repeated calls
    /// are safe.
    pub fn expire<I, S>(&self, base: &Url, sub_paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut jar = self.cookies.lock();
        mark_expired(&mut jar, base);
        for sub in sub_paths {
            let sub = sub.as_ref().trim();
            if sub.is_empty() {
                continue;
            }
            let normalized = if sub.ends_with('/') {
                sub.to_string()
            } else {
                format!("{}/", sub)
            };
            match base.join(&normalized) {
                Ok(url) => mark_expired(&mut jar, &url),
                Err(err) => {
                    tracing::warn!(sub_path = %sub, %err, "skipping unresolvable sub path");
                }
            }
        }
    }

    /// Physically remove expired cookies
    pub fn purge_expired(&self) {
        let mut jar = self.cookies.lock();
        for entries in jar.values_mut() {
            entries.retain(|c| !c.is_expired());
        }
        jar.retain(|_, entries| !entries.is_empty());
    }

    /// Get total cookie count, expired entries included
    pub fn len(&self) -> usize {
        self.cookies.lock().values().map(|e| e.len()).sum()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn mark_expired(jar: &mut HashMap<String, Vec<Cookie>>, url: &Url) {
    for entries in jar.values_mut() {
        for cookie in entries.iter_mut() {
            if cookie.matches(url) {
                cookie.expired = true;
            }
        }
    }
}

/// Remove every `path=` attribute from a raw Set-Cookie value and
/// return the remainder together with the last attribute value seen.
fn strip_path_attributes(raw: &str) -> (String, Option<String>) {
    let mut stripped = String::with_capacity(raw.len());
    let mut last_path = None;
    let mut pos = 0;
    for caps in COOKIE_PATH.captures_iter(raw) {
        let Some(m) = caps.get(0) else { continue };
        stripped.push_str(&raw[pos..m.start()]);
        pos = m.end();
        if let Some(value) = caps.get(1) {
            last_path = Some(value.as_str().to_string());
        }
    }
    stripped.push_str(&raw[pos..]);
    (stripped, last_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_strip_single_path() {
        let (rest, path) = strip_path_attributes("Gateau=V; path=/COOKIEPATH; HttpOnly");
        assert_eq!(rest, "Gateau=V; HttpOnly");
        assert_eq!(path.as_deref(), Some("/COOKIEPATH"));
    }

    #[test]
    fn test_strip_last_path_wins() {
        let (rest, path) = strip_path_attributes("a=b; path=/first; path=/second");
        assert_eq!(rest, "a=b");
        assert_eq!(path.as_deref(), Some("/second"));
    }

    #[test]
    fn test_strip_tolerates_whitespace_and_case() {
        let (rest, path) = strip_path_attributes("a=b;  PATH = /x ; Secure");
        assert_eq!(path.as_deref(), Some("/x"));
        assert!(rest.contains("a=b"));
        assert!(rest.to_lowercase().contains("secure"));
        assert!(!rest.to_lowercase().contains("path"));
    }

    #[test]
    fn test_strip_empty_path_value() {
        let (_, path) = strip_path_attributes("a=b; path=");
        assert_eq!(path.as_deref(), Some(""));
    }

    #[test]
    fn test_no_path_attribute() {
        let (rest, path) = strip_path_attributes("Gateau=V");
        assert_eq!(rest, "Gateau=V");
        assert!(path.is_none());
    }

    #[test]
    fn test_parse_name_value_and_expiry() {
        let origin = url("http://example.com/");
        let cookie =
            Cookie::parse("session=abc; expires=Thu, 01 Jan 1970 00:00:00 GMT", &origin).unwrap();
        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value.as_deref(), Some("abc"));
        assert_eq!(cookie.domain, "example.com");
        assert!(cookie.is_expired());
    }

    #[test]
    fn test_parse_valueless_cookie() {
        let origin = url("http://example.com/");
        let cookie = Cookie::parse("flag", &origin).unwrap();
        assert_eq!(cookie.name, "flag");
        assert!(cookie.value.is_none());
        assert!(!cookie.is_expired());
        assert_eq!(cookie.header_value(), "flag=");
    }

    #[test]
    fn test_apply_last_path_wins() {
        let jar = CookieJar::new();
        jar.apply_set_cookie(
            &url("http://example.com/login"),
            ["Twice=Val; path=/first; path=/second"],
        )
        .unwrap();
        let stored = jar.cookies_for(&url("http://example.com/second/page"));
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].path, "/second");
        assert!(jar.cookies_for(&url("http://example.com/first/page")).is_empty());
    }

    #[test]
    fn test_apply_defaults_to_request_path() {
        let jar = CookieJar::new();
        jar.apply_set_cookie(&url("http://example.com/setCookie?name=Gateau"), ["Gateau=V"])
            .unwrap();

        // Visible below the request path, not at the root.
        assert!(jar
            .cookie_header(&url("http://example.com/setCookie/sub/path/"))
            .is_some());
        assert_eq!(
            jar.cookie_header(&url("http://example.com/setCookie")).as_deref(),
            Some("Gateau=V")
        );
        assert!(jar.cookie_header(&url("http://example.com/")).is_none());
    }

    #[test]
    fn test_apply_empty_path_resolves_to_root() {
        let jar = CookieJar::new();
        jar.apply_set_cookie(&url("http://example.com/deep/place"), ["a=b; path="])
            .unwrap();
        let stored = jar.cookies_for(&url("http://example.com/"));
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].path, "/");
    }

    #[test]
    fn test_apply_relative_path_resolves_against_authority() {
        let jar = CookieJar::new();
        jar.apply_set_cookie(&url("http://example.com/deep/place"), ["a=b; path=COOKIEPATH"])
            .unwrap();
        let stored = jar.cookies_for(&url("http://example.com/COOKIEPATH"));
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].path, "/COOKIEPATH");
    }

    #[test]
    fn test_root_cookie_visible_everywhere_until_expired() {
        let jar = CookieJar::new();
        let base = url("http://example.com/");
        jar.apply_set_cookie(&base, ["Gateau=CookieValue; path=/"]).unwrap();

        assert_eq!(
            jar.cookie_header(&url("http://example.com/sub/path/")).as_deref(),
            Some("Gateau=CookieValue")
        );
        assert_eq!(jar.cookie_header(&base).as_deref(), Some("Gateau=CookieValue"));

        jar.expire(&base, Vec::<String>::new());
        assert!(jar.cookie_header(&url("http://example.com/sub/path/")).is_none());
        assert!(jar.cookie_header(&base).is_none());
        // Entry is retained, only marked.
        assert_eq!(jar.len(), 1);
    }

    #[test]
    fn test_expire_sub_paths_normalized() {
        let jar = CookieJar::new();
        let base = url("http://example.com/");
        jar.apply_set_cookie(&url("http://example.com/setCookie"), ["Gateau=V"])
            .unwrap();

        // Not visible at the root, so a bare expire leaves it alone.
        jar.expire(&base, Vec::<String>::new());
        assert!(jar
            .cookie_header(&url("http://example.com/setCookie/sub/"))
            .is_some());

        jar.expire(&base, ["setCookie"]);
        assert!(jar
            .cookie_header(&url("http://example.com/setCookie/sub/"))
            .is_none());
    }

    #[test]
    fn test_expire_is_idempotent() {
        let jar = CookieJar::new();
        let base = url("http://example.com/");
        jar.apply_set_cookie(&base, ["a=1; path=/"]).unwrap();
        jar.expire(&base, ["", "  "]);
        jar.expire(&base, Vec::<String>::new());
        assert!(jar.cookie_header(&base).is_none());
    }

    #[test]
    fn test_server_driven_deletion_replaces_entry() {
        let jar = CookieJar::new();
        let base = url("http://example.com/");
        jar.apply_set_cookie(&base, ["Gateau=CookieValue; path=/"]).unwrap();
        assert!(jar.cookie_header(&base).is_some());

        jar.apply_set_cookie(
            &base,
            ["Gateau=; path=/; expires=Thu, 01 Jan 1970 00:00:00 GMT"],
        )
        .unwrap();
        assert!(jar.cookie_header(&base).is_none());
        assert_eq!(jar.len(), 1);

        jar.purge_expired();
        assert!(jar.is_empty());
    }

    #[test]
    fn test_replace_same_key_keeps_insertion_order() {
        let jar = CookieJar::new();
        let base = url("http://example.com/");
        jar.apply_set_cookie(&base, ["a=1; path=/", "b=2; path=/"]).unwrap();
        jar.apply_set_cookie(&base, ["a=3; path=/"]).unwrap();
        assert_eq!(jar.cookie_header(&base).as_deref(), Some("a=3; b=2"));
    }

    #[test]
    fn test_distinct_paths_are_distinct_entries() {
        let jar = CookieJar::new();
        jar.apply_set_cookie(&url("http://example.com/a"), ["x=1; path=/a"])
            .unwrap();
        jar.apply_set_cookie(&url("http://example.com/b"), ["x=2; path=/b"])
            .unwrap();
        assert_eq!(jar.len(), 2);
        assert_eq!(
            jar.cookie_header(&url("http://example.com/a/page")).as_deref(),
            Some("x=1")
        );
    }

    #[test]
    fn test_domain_scoping() {
        let jar = CookieJar::new();
        jar.apply_set_cookie(&url("http://example.com/"), ["a=1; path=/"])
            .unwrap();
        assert!(jar.cookie_header(&url("http://other.test/")).is_none());
    }

    #[test]
    fn test_max_age_in_future() {
        let jar = CookieJar::new();
        let base = url("http://example.com/");
        jar.apply_set_cookie(&base, ["keep=1; path=/; max-age=3600"]).unwrap();
        assert!(jar.cookie_header(&base).is_some());
    }
}
