use std::time::Duration;

use anyhow::{Result, bail, ensure};

// Parse an interval string like "30s", "1m30s" or "500ms" into a Duration.
// Zero, negative and unparseable intervals are rejected before any loop
// starts.
pub fn parse_interval(input: &str) -> Result<Duration> {
    let s = input.trim();
    ensure!(!s.is_empty(), "empty interval");

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits == 0 {
            bail!("invalid interval {input:?}");
        }
        let value: u64 = rest[..digits].parse()?;
        let after = &rest[digits..];
        let unit_len = after
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(after.len());
        total += match &after[..unit_len] {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value * 60),
            "h" => Duration::from_secs(value * 3600),
            unit => bail!("unknown unit {unit:?} in interval {input:?}"),
        };
        rest = &after[unit_len..];
    }

    ensure!(total > Duration::ZERO, "interval must be positive");
    Ok(total)
}
