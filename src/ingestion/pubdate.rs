use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// Reconcile a loosely-formatted publish date against the known layouts:
/// RFC 1123 (named and numeric zone), RFC 3339 (with and without fractional
/// seconds), RFC 822 (named and numeric zone), RFC 850, and plain
/// `YYYY-MM-DD HH:MM:SS`.
///
/// Returns the first successful parse with `exact = true`. Anything else,
/// including the empty string, falls back to the current time with
/// `exact = false` — one malformed date must not abort ingestion of the
/// remaining items in a feed.
pub fn normalize(raw: &str) -> (DateTime<Utc>, bool) {
    match parse_pub_date(raw) {
        Some(ts) => (ts, true),
        None => (Utc::now(), false),
    }
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    // RFC 1123 and RFC 822, named or numeric zone, share the RFC 2822 grammar.
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_rfc850(s) {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    None
}

// "Monday, 02-Jan-06 15:04:05 MST"
fn parse_rfc850(s: &str) -> Option<DateTime<Utc>> {
    let (stamp, zone) = s.rsplit_once(' ')?;
    let offset = obsolete_zone_offset(zone)?;
    let naive = NaiveDateTime::parse_from_str(stamp, "%A, %d-%b-%y %H:%M:%S").ok()?;
    let local = naive.and_local_timezone(offset).single()?;
    Some(local.with_timezone(&Utc))
}

// RFC 822 obsolete zone table.
fn obsolete_zone_offset(zone: &str) -> Option<FixedOffset> {
    let hours = match zone {
        "UT" | "GMT" | "UTC" => 0,
        "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ => return None,
    };
    FixedOffset::east_opt(hours * 3600)
}
