//! Cookie storage, parsing, and request matching.
//!
//! The pipeline mirrors how a browser's network stack treats cookies:
//!
//! | Stage | Module | Responsibility |
//! |-------|--------|----------------|
//! | Parse | `parse` | `Set-Cookie`/`Set-Cookie2` lines → [`CookieRecord`] |
//! | Date  | `expiry` | `max-age`/`expires` → absolute expiry, expiry tests |
//! | Match | [`matching`] | does a stored record apply to a target URL? |
//! | Store | [`jar`] | keyed upsert/delete, lazy eviction, the public API |
//!
//! # Storing and retrieving
//!
//! ```rust
//! use authjar::cookies::CookieJar;
//! use url::Url;
//!
//! let mut jar = CookieJar::new();
//! let url = Url::parse("https://service.example.com/login")?;
//! jar.store_cookies(&url, &["Set-Cookie: ticket=ST-12345; path=/; Secure"])?;
//!
//! // Secure cookies stay off plaintext requests.
//! let plain = jar.get_cookies(&Url::parse("http://service.example.com/login")?)?;
//! assert!(plain.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Session persistence
//!
//! The jar never touches disk. An owning client that wants to carry a
//! session across restarts exports the records, serializes them with serde,
//! and replays them later:
//!
//! ```rust
//! use authjar::cookies::{CookieJar, CookieRecord};
//!
//! let mut jar = CookieJar::new();
//! jar.store_cookie(CookieRecord::new("SID", "abc123", "service.example.com"))?;
//!
//! let saved = jar.export_records();
//! let mut restored = CookieJar::new();
//! restored.import_records(saved)?;
//! assert_eq!(restored.len(), 1);
//! # Ok::<(), authjar::base::jarerror::JarError>(())
//! ```

mod expiry;
mod parse;

pub mod jar;
pub mod matching;
pub mod record;

pub use jar::CookieJar;
pub use matching::{cookie_matches_target, RequestTarget};
pub use record::CookieRecord;
