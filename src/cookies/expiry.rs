//! Expiry resolution for the `max-age` and `expires` attributes.
//!
//! `max-age` is relative (seconds from the moment of storage, RFC2965) and
//! takes precedence over `expires` regardless of attribute order. Malformed
//! values degrade instead of failing the record: a bad `max-age` falls back
//! to `expires`, and a date that parses as nothing leaves the cookie
//! session-scoped. Both degradations log at warn level; a cookie kept
//! forever must never be invisible in the logs.

use std::sync::OnceLock;

use time::format_description::OwnedFormatItem;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

const WEEKDAY_PREFIXES: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Turn the attribute pair into an absolute expiry, or `None` for a
/// session cookie.
pub(crate) fn resolve_expiry(
    max_age: Option<&str>,
    expires: Option<&str>,
    now: OffsetDateTime,
) -> Option<OffsetDateTime> {
    if let Some(raw) = max_age {
        match raw.trim().parse::<i64>() {
            // Zero and negative values produce an already-elapsed expiry,
            // which the store treats as a deletion order.
            Ok(seconds) => return Some(now + Duration::seconds(seconds)),
            Err(_) => {
                tracing::warn!(value = %raw, "unparseable max-age attribute; falling back to expires");
            }
        }
    }

    if let Some(raw) = expires {
        match parse_http_date(raw) {
            Some(when) => return Some(when),
            None => {
                tracing::warn!(value = %raw, "unparseable expires date; cookie stored without expiry");
            }
        }
    }

    None
}

/// Parse the HTTP date shapes servers actually send:
///
/// - `Tue, 07 Sep 2010 17:51:54 GMT` (RFC1123)
/// - `Fri, 31-Dec-2009 23:59:59 GMT` (RFC850 shape, 4-digit year)
/// - `Friday, 31-Dec-09 23:59:59 GMT` (RFC850, 2-digit year)
/// - `Sun Nov  6 08:49:37 1994` (asctime)
///
/// The weekday is advisory and dropped rather than validated. Trailing
/// `GMT`/`UTC`/`UT`/`+0000`/`-0000` markers are accepted; every timestamp
/// is interpreted as UTC.
pub(crate) fn parse_http_date(raw: &str) -> Option<OffsetDateTime> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    // Collapse runs of whitespace; asctime pads single-digit days.
    let mut text = tokens.join(" ");

    if let Some((_, rest)) = text.split_once(',') {
        text = rest.trim_start().to_string();
    } else {
        let first_len = text.split(' ').next().map_or(0, str::len);
        let lead = text[..first_len].to_ascii_lowercase();
        if WEEKDAY_PREFIXES.iter().any(|day| lead.starts_with(day)) {
            text = text[first_len..].trim_start().to_string();
        }
    }

    let lowered = text.to_ascii_lowercase();
    for zone in [" gmt", " utc", " ut", " +0000", " -0000"] {
        if lowered.ends_with(zone) {
            text.truncate(text.len() - zone.len());
            break;
        }
    }

    let text = expand_two_digit_year(text.trim());

    for format in formats() {
        if let Ok(stamp) = PrimitiveDateTime::parse(&text, format) {
            return Some(stamp.assume_utc());
        }
    }
    None
}

/// RFC6265 century pivot for `dd-Mon-yy` dates: 00-69 land in the 2000s,
/// 70-99 in the 1900s.
fn expand_two_digit_year(text: &str) -> String {
    let Some((date_part, rest)) = text.split_once(' ') else {
        return text.to_string();
    };
    let pieces: Vec<&str> = date_part.split('-').collect();
    if pieces.len() == 3 && pieces[2].len() == 2 {
        if let Ok(two) = pieces[2].parse::<u16>() {
            let century = if two < 70 { 2000 } else { 1900 };
            return format!("{}-{}-{} {}", pieces[0], pieces[1], century + two, rest);
        }
    }
    text.to_string()
}

/// The candidate formats, weekday and zone already stripped.
fn formats() -> &'static [OwnedFormatItem] {
    static FORMATS: OnceLock<Vec<OwnedFormatItem>> = OnceLock::new();
    FORMATS.get_or_init(|| {
        [
            // 07 Sep 2010 17:51:54
            "[day padding:none] [month repr:short case_sensitive:false] [year] \
             [hour padding:none]:[minute]:[second]",
            // 31-Dec-2009 23:59:59
            "[day padding:none]-[month repr:short case_sensitive:false]-[year] \
             [hour padding:none]:[minute]:[second]",
            // Nov 6 08:49:37 1994 (asctime, whitespace collapsed)
            "[month repr:short case_sensitive:false] [day padding:none] \
             [hour padding:none]:[minute]:[second] [year]",
        ]
        .iter()
        .filter_map(|description| time::format_description::parse_owned::<2>(description).ok())
        .collect()
    })
}
