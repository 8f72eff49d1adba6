//! # authjar
//!
//! A browser-faithful, in-memory HTTP cookie jar for client libraries that
//! act on a user's behalf during an authentication handshake.
//!
//! `authjar` implements the part of cookie handling with non-trivial rules:
//! `Set-Cookie`/`Set-Cookie2` attribute parsing (including quoted-value
//! edge cases), RFC2965-style domain/path/scheme matching, and expiry and
//! overwrite semantics with lazy eviction. It deliberately does *not* do
//! HTTP transport, URL parsing, or persistence; those belong to the owning
//! client.
//!
//! ## Features
//!
//! - **Browser-style matching**: leading-dot domain cookies cover whole
//!   subdomain trees, host cookies stay host-exact, `Secure` cookies travel
//!   only over https
//! - **RFC2965 removal semantics**: `max-age=0` or a past `expires` deletes
//!   the stored cookie with the same `(domain, path, name)` key
//! - **Lazy eviction**: expired cookies vanish on the next read, with no
//!   background sweeps or timers
//! - **Lenient parsing**: malformed lines degrade instead of failing the
//!   store, with `tracing` warnings where leniency is security-relevant
//!
//! ## Quick Start
//!
//! ```rust
//! use authjar::cookies::CookieJar;
//! use url::Url;
//!
//! let mut jar = CookieJar::new();
//!
//! // After receiving a response:
//! let url = Url::parse("http://service.example.com/lookup/?q=username")?;
//! jar.store_cookies(&url, &["Set-Cookie: SID=abc123; path=/"])?;
//!
//! // Before the next request to the same service:
//! let next = Url::parse("http://service.example.com/make_changes.php")?;
//! let cookies = jar.get_cookies(&next)?;
//! assert_eq!(cookies["SID"], "abc123");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`cookies`] - Cookie records, storage, and matching
//!
//! ## Security
//!
//! Two behaviors here are security-relevant and deliberately visible:
//! - `Secure` cookies are withheld from non-https requests, even when the
//!   same jar serves both schemes of one host
//! - A malformed `expires` date keeps the cookie as a session cookie
//!   instead of dropping it; the jar logs a warning whenever it does this,
//!   because a cookie silently kept forever should never be invisible

pub mod base;
pub mod cookies;
