//! Request matching: which stored cookies apply to an outgoing request.
//!
//! Matching is a pure predicate over `(host, path, scheme)` with no side
//! effects; expiry is the store's concern, not the matcher's.

use url::Url;

use crate::base::jarerror::JarError;
use crate::cookies::record::CookieRecord;

/// The slice of a request URL that cookie matching looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub host: String,
    pub path: String,
    pub scheme: String,
}

impl RequestTarget {
    /// Extract host, path, and scheme from an already-parsed URL.
    ///
    /// URLs that cannot name a host (`mailto:`, `data:`) are caller errors,
    /// reported loudly rather than matched against nothing.
    pub fn from_url(url: &Url) -> Result<Self, JarError> {
        let host = url.host_str().ok_or_else(|| JarError::UrlMissingHost {
            url: url.to_string(),
        })?;
        Ok(Self {
            host: host.to_ascii_lowercase(),
            path: url.path().to_string(),
            scheme: url.scheme().to_ascii_lowercase(),
        })
    }
}

/// Does `record` apply to `target`? Domain, path, and scheme must all
/// accept.
pub fn cookie_matches_target(record: &CookieRecord, target: &RequestTarget) -> bool {
    domain_matches(&record.domain, &target.host)
        && path_matches(&record.path, &target.path)
        && scheme_allows(record.secure, &target.scheme)
}

/// RFC2965 domain selection. A leading dot covers the named domain and all
/// subdomains; without one the host must match exactly. Host names compare
/// ASCII-case-insensitively.
fn domain_matches(cookie_domain: &str, host: &str) -> bool {
    if let Some(bare) = cookie_domain.strip_prefix('.') {
        if host.eq_ignore_ascii_case(bare) {
            return true;
        }
        // Suffix comparison keeps the leading dot, so the match stays
        // dot-delimited: ".example.com" never accepts "fooexample.com".
        let host = host.as_bytes();
        let suffix = cookie_domain.as_bytes();
        host.len() >= suffix.len()
            && host[host.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
    } else {
        host.eq_ignore_ascii_case(cookie_domain)
    }
}

/// Path selection: exact match, or prefix extension on a `/` boundary.
/// `/` covers every path; `/a` covers `/a` and `/a/b` but not `/ab`.
fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    if request_path.starts_with(cookie_path) {
        if cookie_path.ends_with('/') {
            return true;
        }
        return request_path.as_bytes().get(cookie_path.len()) == Some(&b'/');
    }
    false
}

/// `Secure` cookies travel only over https.
fn scheme_allows(secure: bool, scheme: &str) -> bool {
    !secure || scheme.eq_ignore_ascii_case("https")
}
