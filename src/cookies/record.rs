use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single stored cookie.
///
/// A `domain` with a leading dot covers the named domain and every
/// subdomain; without one it covers exactly one host. `expiry` of `None`
/// marks a session cookie, which lives as long as the jar does.
///
/// Records are serde-serializable so an owning client can persist a
/// session externally and replay it through
/// [`CookieJar::import_records`](crate::cookies::jar::CookieJar::import_records).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub expiry: Option<OffsetDateTime>,
}

impl CookieRecord {
    /// Build a record with the defaults a bare `name=value` header gets:
    /// path `/`, not secure, no expiry. The domain is lowercased on entry;
    /// host names compare case-insensitively everywhere else.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into().to_ascii_lowercase(),
            path: "/".to_string(),
            secure: false,
            expiry: None,
        }
    }

    /// True when the domain attribute carries a leading dot.
    pub fn is_domain_cookie(&self) -> bool {
        self.domain.starts_with('.')
    }

    /// Expiry test shared by store time (insert vs. delete) and read time
    /// (lazy eviction). A record expires the moment `now` reaches `expiry`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        match self.expiry {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }

    /// Storage identity: `(domain, path, name)`, domain compared
    /// case-insensitively as a host name, path and name byte-exact.
    pub(crate) fn same_identity(&self, other: &CookieRecord) -> bool {
        self.domain.eq_ignore_ascii_case(&other.domain)
            && self.path == other.path
            && self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn test_session_cookie_never_expires() {
        let record = CookieRecord::new("SID", "abc", "service.example.com");
        assert!(!record.is_expired(OffsetDateTime::now_utc() + Duration::days(3650)));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let now = OffsetDateTime::now_utc();
        let mut record = CookieRecord::new("SID", "abc", "service.example.com");
        record.expiry = Some(now);

        assert!(record.is_expired(now));
        assert!(record.is_expired(now + Duration::seconds(1)));
        assert!(!record.is_expired(now - Duration::seconds(1)));
    }

    #[test]
    fn test_identity_ignores_domain_case() {
        let a = CookieRecord::new("SID", "abc", "Service.Example.COM");
        let b = CookieRecord::new("SID", "xyz", "service.example.com");
        assert!(a.same_identity(&b));
    }

    #[test]
    fn test_identity_distinguishes_domain_and_host_cookie() {
        let host = CookieRecord::new("SID", "abc", "example.com");
        let domain = CookieRecord::new("SID", "abc", ".example.com");
        assert!(!host.same_identity(&domain));
    }

    #[test]
    fn test_new_lowercases_domain() {
        let record = CookieRecord::new("SID", "abc", ".Example.COM");
        assert_eq!(record.domain, ".example.com");
        assert!(record.is_domain_cookie());
    }
}
