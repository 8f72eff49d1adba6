//! `Set-Cookie` / `Set-Cookie2` response-header parsing.
//!
//! The parser is deliberately lenient: lines that are not a Set-Cookie
//! variant, lead segments without `name=value`, and attributes it does not
//! know are skipped without error. Servers get this wrong routinely and the
//! protocol tolerates it.

use time::OffsetDateTime;

use crate::cookies::expiry;
use crate::cookies::record::CookieRecord;

/// Scan raw response-header lines and build one [`CookieRecord`] per
/// recognized `Set-Cookie`/`Set-Cookie2` line with a usable lead segment.
///
/// `default_host` fills the domain of cookies that carry no `domain`
/// attribute, verbatim (no dot prepended), making them host cookies.
/// Relative expiries resolve against `now`, the moment of storage.
pub(crate) fn parse_cookie_headers<S: AsRef<str>>(
    lines: &[S],
    default_host: &str,
    now: OffsetDateTime,
) -> Vec<CookieRecord> {
    let mut records = Vec::new();
    for line in lines {
        if let Some(value) = set_cookie_value(line.as_ref()) {
            if let Some(record) = parse_cookie_line(value, default_host, now) {
                records.push(record);
            }
        }
    }
    records
}

/// Return the header value when the line is a Set-Cookie variant, matching
/// the header name case-insensitively. Every other line is ignored.
fn set_cookie_value(line: &str) -> Option<&str> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.eq_ignore_ascii_case("set-cookie") || name.eq_ignore_ascii_case("set-cookie2") {
        Some(value.trim())
    } else {
        None
    }
}

/// Parse a single header value into a record.
fn parse_cookie_line(
    value: &str,
    default_host: &str,
    now: OffsetDateTime,
) -> Option<CookieRecord> {
    let mut segments = split_segments(value).into_iter();

    let lead = segments.next()?;
    let Some((name, raw_value)) = lead.split_once('=') else {
        tracing::debug!(segment = %lead, "set-cookie line without name=value; skipped");
        return None;
    };
    let name = name.trim();
    if name.is_empty() {
        tracing::debug!(segment = %lead, "set-cookie line with empty name; skipped");
        return None;
    }

    let mut record = CookieRecord::new(name, unquote(raw_value.trim()), default_host);
    let mut max_age = None;
    let mut expires = None;

    for segment in segments {
        let (attr, attr_value) = match segment.split_once('=') {
            Some((attr, raw)) => (attr.trim(), Some(unquote(raw.trim()))),
            None => (segment, None),
        };
        match attr.to_ascii_lowercase().as_str() {
            "path" => {
                if let Some(path) = attr_value {
                    record.path = path;
                }
            }
            "domain" => {
                if let Some(domain) = attr_value {
                    record.domain = domain.to_ascii_lowercase();
                }
            }
            "secure" => record.secure = true,
            "expires" => expires = attr_value,
            "max-age" => max_age = attr_value,
            // RFC2965 extras (version, comment, port, discard, httponly)
            // carry nothing this jar acts on.
            _ => {}
        }
    }

    record.expiry = expiry::resolve_expiry(max_age.as_deref(), expires.as_deref(), now);
    Some(record)
}

/// Split a header value on `;`, treating double-quoted spans as opaque so
/// `;` and `=` inside them survive. `\"` within a span is an escaped quote,
/// not a boundary.
///
/// The scanner is a single open/close toggle: a stray unbalanced quote
/// inside a value desynchronizes it. Nested or unbalanced quoting is an
/// accepted limit of this parser, not a target.
fn split_segments(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, ch) in value.char_indices() {
        match ch {
            '\\' if in_quotes && !escaped => escaped = true,
            '"' if !escaped => {
                in_quotes = !in_quotes;
            }
            ';' if !in_quotes => {
                segments.push(&value[start..idx]);
                start = idx + 1;
                escaped = false;
            }
            _ => escaped = false,
        }
    }
    segments.push(&value[start..]);

    segments
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Strip one layer of enclosing double quotes and unescape `\"`. Values
/// that are not fully quoted pass through unchanged.
fn unquote(raw: &str) -> String {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"' {
        raw[1..raw.len() - 1].replace("\\\"", "\"")
    } else {
        raw.to_string()
    }
}
