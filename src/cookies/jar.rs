//! The cookie store: insert/overwrite/delete semantics over an
//! insertion-ordered table.

use std::collections::BTreeMap;

use time::OffsetDateTime;
use url::Url;

use crate::base::jarerror::JarError;
use crate::cookies::matching::{cookie_matches_target, RequestTarget};
use crate::cookies::parse;
use crate::cookies::record::CookieRecord;

/// Hard ceiling on stored records. Crossing it evicts the oldest record in
/// insertion order; ordinary sessions never come close.
const MAX_COOKIES_TOTAL: usize = 3000;

/// An in-memory cookie jar scoped to one client session.
///
/// Records are logically keyed by `(domain, path, name)` and held in
/// insertion order, which is also the scan order of
/// [`get_cookies`](CookieJar::get_cookies); re-storing an existing key
/// overwrites the record and moves it to the back. The jar is a plain
/// owned value with `&mut self` mutators; a host application sharing one
/// across threads serializes access with its own lock.
///
/// # Example
///
/// ```rust
/// use authjar::cookies::CookieJar;
/// use url::Url;
///
/// let mut jar = CookieJar::new();
/// let url = Url::parse("http://service.example.com/lookup/?q=x")?;
/// jar.store_cookies(&url, &["Set-Cookie: SID=abc123; path=/"])?;
///
/// let cookies = jar.get_cookies(&Url::parse("http://service.example.com/account")?)?;
/// assert_eq!(cookies["SID"], "abc123");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<CookieRecord>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self {
            cookies: Vec::new(),
        }
    }

    /// Digest the `Set-Cookie`/`Set-Cookie2` headers of one response.
    ///
    /// `url` is the request URL the response answered; its host becomes the
    /// domain of any cookie that does not name one. A record that arrives
    /// already expired deletes the stored cookie with the same key instead
    /// of being inserted (RFC2965 §3.2.2 removal).
    pub fn store_cookies<S: AsRef<str>>(
        &mut self,
        url: &Url,
        response_headers: &[S],
    ) -> Result<(), JarError> {
        self.store_cookies_at(url, response_headers, OffsetDateTime::now_utc())
    }

    pub(crate) fn store_cookies_at<S: AsRef<str>>(
        &mut self,
        url: &Url,
        response_headers: &[S],
        now: OffsetDateTime,
    ) -> Result<(), JarError> {
        let target = RequestTarget::from_url(url)?;
        let records = parse::parse_cookie_headers(response_headers, &target.host, now);
        tracing::debug!(host = %target.host, count = records.len(), "storing response cookies");
        for record in records {
            self.upsert(record, now);
        }
        Ok(())
    }

    /// Store a single record directly, under the same expiry and overwrite
    /// semantics as header storage. Used for replaying exported sessions
    /// and for tests that bypass header parsing.
    ///
    /// A record with an empty name or domain is a programmer error, not
    /// tolerated protocol noise.
    pub fn store_cookie(&mut self, record: CookieRecord) -> Result<(), JarError> {
        self.store_cookie_at(record, OffsetDateTime::now_utc())
    }

    pub(crate) fn store_cookie_at(
        &mut self,
        record: CookieRecord,
        now: OffsetDateTime,
    ) -> Result<(), JarError> {
        if record.name.is_empty() {
            return Err(JarError::InvalidRecord {
                reason: "empty cookie name",
            });
        }
        if record.domain.is_empty() {
            return Err(JarError::InvalidRecord {
                reason: "empty cookie domain",
            });
        }
        self.upsert(record, now);
        Ok(())
    }

    /// Cookies applying to `url`, as `name -> value`.
    ///
    /// Expired records discovered by the scan are purged as a side effect
    /// and never resurface. When several matching records share a name (a
    /// host cookie and a domain cookie, say), the record stored last wins.
    /// The sorted map gives callers a reproducible serialization order for
    /// the outgoing `Cookie:` header.
    pub fn get_cookies(&mut self, url: &Url) -> Result<BTreeMap<String, String>, JarError> {
        self.get_cookies_at(url, OffsetDateTime::now_utc())
    }

    pub(crate) fn get_cookies_at(
        &mut self,
        url: &Url,
        now: OffsetDateTime,
    ) -> Result<BTreeMap<String, String>, JarError> {
        let target = RequestTarget::from_url(url)?;
        self.prune(now);

        let mut matched = BTreeMap::new();
        for cookie in &self.cookies {
            if cookie_matches_target(cookie, &target) {
                matched.insert(cookie.name.clone(), cookie.value.clone());
            }
        }
        Ok(matched)
    }

    /// Drop every expired record now instead of waiting for the next read.
    /// Returns how many records were removed.
    pub fn purge_expired(&mut self) -> usize {
        self.prune(OffsetDateTime::now_utc())
    }

    /// Snapshot of every stored record, in insertion order. Together with
    /// [`import_records`](CookieJar::import_records) this is the seam for
    /// external session persistence; the jar itself never touches disk.
    pub fn export_records(&self) -> Vec<CookieRecord> {
        self.cookies.clone()
    }

    /// Replay records through normal storage semantics. Already-expired
    /// records are filtered out (or delete their stored key) exactly as if
    /// they had arrived in a response. Returns the number of live records
    /// accepted.
    pub fn import_records<I>(&mut self, records: I) -> Result<usize, JarError>
    where
        I: IntoIterator<Item = CookieRecord>,
    {
        let now = OffsetDateTime::now_utc();
        let mut accepted = 0;
        for record in records {
            let live = !record.is_expired(now);
            self.store_cookie_at(record, now)?;
            if live {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    /// Number of stored records, counting not-yet-purged expired ones.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Forget every stored cookie.
    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    fn prune(&mut self, now: OffsetDateTime) -> usize {
        let before = self.cookies.len();
        self.cookies.retain(|cookie| !cookie.is_expired(now));
        before - self.cookies.len()
    }

    fn upsert(&mut self, record: CookieRecord, now: OffsetDateTime) {
        if record.is_expired(now) {
            // An expired record is a deletion order for its key.
            let before = self.cookies.len();
            self.cookies.retain(|cookie| !cookie.same_identity(&record));
            if self.cookies.len() < before {
                tracing::debug!(
                    name = %record.name,
                    domain = %record.domain,
                    "cookie removed via expired set-cookie"
                );
            }
            return;
        }

        self.cookies.retain(|cookie| !cookie.same_identity(&record));
        self.cookies.push(record);

        if self.cookies.len() > MAX_COOKIES_TOTAL {
            let evicted = self.cookies.remove(0);
            tracing::warn!(
                name = %evicted.name,
                domain = %evicted.domain,
                "cookie jar over capacity; evicted oldest record"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::Duration;

    fn service_url(path: &str) -> Url {
        Url::parse(&format!("http://service.example.com{path}")).unwrap()
    }

    #[test]
    fn test_max_age_lifecycle() {
        let t0 = datetime!(2010-09-07 17:51:54 UTC);
        let mut jar = CookieJar::new();
        let url = service_url("/lookup/?action=search");

        jar.store_cookies_at(&url, &["Set-Cookie2: person=\"bob jones\"; path=/; max-age=2"], t0)
            .unwrap();

        // Present at +1s, gone at +3s, and a later read never resurrects it.
        let cookies = jar.get_cookies_at(&url, t0 + Duration::seconds(1)).unwrap();
        assert_eq!(cookies.get("person").map(String::as_str), Some("bob jones"));

        let cookies = jar.get_cookies_at(&url, t0 + Duration::seconds(3)).unwrap();
        assert!(!cookies.contains_key("person"));

        let cookies = jar.get_cookies_at(&url, t0 + Duration::seconds(4)).unwrap();
        assert!(!cookies.contains_key("person"));
        assert!(jar.is_empty());
    }

    #[test]
    fn test_max_age_zero_removes_existing_cookie() {
        let t0 = datetime!(2010-09-07 17:51:54 UTC);
        let mut jar = CookieJar::new();
        let url = service_url("/lookup/");

        jar.store_cookies_at(&url, &["Set-Cookie: SID=abc123; path=/"], t0)
            .unwrap();
        assert_eq!(jar.len(), 1);

        jar.store_cookies_at(&url, &["Set-Cookie2: SID=abc123; path=/; max-age=0"], t0)
            .unwrap();
        assert!(jar.is_empty());
    }

    #[test]
    fn test_negative_max_age_removes_existing_cookie() {
        let t0 = datetime!(2010-09-07 17:51:54 UTC);
        let mut jar = CookieJar::new();
        let url = service_url("/lookup/");

        jar.store_cookies_at(&url, &["Set-Cookie: SID=abc123; path=/"], t0)
            .unwrap();
        jar.store_cookies_at(&url, &["Set-Cookie: SID=abc123; path=/; max-age=-1"], t0)
            .unwrap();
        assert!(jar.is_empty());
    }

    #[test]
    fn test_expired_record_is_never_inserted() {
        let t0 = datetime!(2010-09-07 17:51:54 UTC);
        let mut jar = CookieJar::new();
        let url = service_url("/lookup/");

        jar.store_cookies_at(&url, &["Set-Cookie: bob=jones; path=/; max-age=-100"], t0)
            .unwrap();
        assert!(jar.is_empty());
    }

    #[test]
    fn test_overwrite_keeps_one_record_with_latest_value() {
        let t0 = datetime!(2010-09-07 17:51:54 UTC);
        let mut jar = CookieJar::new();
        let url = service_url("/make_changes.php");

        jar.store_cookies_at(&url, &["Set-Cookie: SID=\"hello world\"; path=/"], t0)
            .unwrap();
        jar.store_cookies_at(&url, &["Set-Cookie: SID=\"goodbye world\"; path=/"], t0)
            .unwrap();

        assert_eq!(jar.len(), 1);
        let cookies = jar.get_cookies_at(&url, t0).unwrap();
        assert_eq!(cookies.get("SID").map(String::as_str), Some("goodbye world"));
    }

    #[test]
    fn test_name_collision_last_stored_wins() {
        let t0 = datetime!(2010-09-07 17:51:54 UTC);
        let mut jar = CookieJar::new();
        let url = service_url("/make_changes.php");

        // Same name at two granularities: a host cookie and a domain cookie
        // are distinct keys, so both stay stored...
        jar.store_cookie_at(CookieRecord::new("SID", "host-scoped", "service.example.com"), t0)
            .unwrap();
        jar.store_cookie_at(CookieRecord::new("SID", "domain-scoped", ".example.com"), t0)
            .unwrap();
        assert_eq!(jar.len(), 2);

        // ...and the scan resolves the name to the record stored last.
        let cookies = jar.get_cookies_at(&url, t0).unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.get("SID").map(String::as_str), Some("domain-scoped"));

        // Re-storing the host cookie moves it to the back of the order and
        // flips the winner. Deterministic either way.
        jar.store_cookie_at(CookieRecord::new("SID", "host-scoped", "service.example.com"), t0)
            .unwrap();
        let cookies = jar.get_cookies_at(&url, t0).unwrap();
        assert_eq!(cookies.get("SID").map(String::as_str), Some("host-scoped"));
    }

    #[test]
    fn test_store_cookie_rejects_unusable_records() {
        let mut jar = CookieJar::new();

        let err = jar
            .store_cookie(CookieRecord::new("", "value", "service.example.com"))
            .unwrap_err();
        assert!(matches!(err, JarError::InvalidRecord { .. }));

        let err = jar
            .store_cookie(CookieRecord::new("SID", "value", ""))
            .unwrap_err();
        assert!(matches!(err, JarError::InvalidRecord { .. }));
        assert!(jar.is_empty());
    }

    #[test]
    fn test_hostless_url_is_a_loud_error() {
        let mut jar = CookieJar::new();
        let url = Url::parse("mailto:user@example.com").unwrap();

        assert!(matches!(
            jar.store_cookies(&url, &["Set-Cookie: SID=abc; path=/"]),
            Err(JarError::UrlMissingHost { .. })
        ));
        assert!(matches!(
            jar.get_cookies(&url),
            Err(JarError::UrlMissingHost { .. })
        ));
    }

    #[test]
    fn test_purge_expired_reports_removals() {
        let t0 = datetime!(2010-09-07 17:51:54 UTC);
        let mut jar = CookieJar::new();

        let mut stale = CookieRecord::new("old", "gone", "service.example.com");
        stale.expiry = Some(t0 + Duration::seconds(1));
        jar.store_cookie_at(stale, t0).unwrap();
        jar.store_cookie_at(CookieRecord::new("fresh", "kept", "service.example.com"), t0)
            .unwrap();

        assert_eq!(jar.prune(t0 + Duration::seconds(5)), 1);
        assert_eq!(jar.len(), 1);
    }

    #[test]
    fn test_capacity_eviction_drops_oldest() {
        let t0 = datetime!(2010-09-07 17:51:54 UTC);
        let mut jar = CookieJar::new();

        for i in 0..=MAX_COOKIES_TOTAL {
            jar.store_cookie_at(
                CookieRecord::new(format!("c{i}"), "v", "service.example.com"),
                t0,
            )
            .unwrap();
        }

        assert_eq!(jar.len(), MAX_COOKIES_TOTAL);
        // c0 went in first, so it is the one sacrificed.
        assert!(!jar.export_records().iter().any(|c| c.name == "c0"));
        assert!(jar.export_records().iter().any(|c| c.name == "c1"));
    }

    #[test]
    fn test_export_import_roundtrip() {
        let t0 = datetime!(2010-09-07 17:51:54 UTC);
        let mut jar = CookieJar::new();
        let url = service_url("/lookup/");

        jar.store_cookies_at(&url, &["Set-Cookie: SID=abc123; path=/"], t0)
            .unwrap();
        let mut keeper = CookieRecord::new("person", "bob", ".example.com");
        keeper.secure = true;
        jar.store_cookie_at(keeper, t0).unwrap();

        let exported = jar.export_records();
        assert_eq!(exported.len(), 2);

        let mut restored = CookieJar::new();
        let accepted = restored.import_records(exported).unwrap();
        assert_eq!(accepted, 2);
        assert_eq!(restored.len(), 2);

        let cookies = restored
            .get_cookies(&Url::parse("https://service.example.com/lookup/").unwrap())
            .unwrap();
        assert_eq!(cookies.get("SID").map(String::as_str), Some("abc123"));
        assert_eq!(cookies.get("person").map(String::as_str), Some("bob"));
    }

    #[test]
    fn test_import_filters_expired_records() {
        let mut jar = CookieJar::new();

        let mut stale = CookieRecord::new("old", "gone", "service.example.com");
        stale.expiry = Some(datetime!(2009-12-31 23:59:59 UTC));
        let fresh = CookieRecord::new("fresh", "kept", "service.example.com");

        let accepted = jar.import_records([stale, fresh]).unwrap();
        assert_eq!(accepted, 1);
        assert_eq!(jar.len(), 1);
    }
}
