use chrono::NaiveDate;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Hex digits of the digest kept in the code.
const SUFFIX_LEN: usize = 12;

/// Daily code cache keyed by "prefix:date". Codes are deterministic, so
/// a short TTL only saves the digest work on repeated generation calls.
static DAILY_CODE_CACHE: Lazy<Cache<String, String>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(32)
        .time_to_live(Duration::from_secs(86400))
        .build()
});

/// Derives the attendance code for a given day:
/// `PREFIX-YYYYMMDD-<first 12 hex of sha256(secret|prefix|yyyymmdd)>`.
pub fn daily_code(prefix: &str, date: NaiveDate, secret: &str) -> String {
    let day = date.format("%Y%m%d").to_string();

    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b"|");
    hasher.update(prefix.as_bytes());
    hasher.update(b"|");
    hasher.update(day.as_bytes());

    let digest = hex::encode(hasher.finalize());
    format!("{}-{}-{}", prefix, day, &digest[..SUFFIX_LEN])
}

/// Cached variant used by the generation endpoint.
pub async fn daily_code_cached(prefix: &str, date: NaiveDate, secret: &str) -> String {
    let key = format!("{}:{}", prefix, date);
    if let Some(code) = DAILY_CODE_CACHE.get(&key).await {
        return code;
    }

    let code = daily_code(prefix, date, secret);
    DAILY_CODE_CACHE.insert(key, code.clone()).await;
    code
}

/// A code is valid only if it equals today's derivation exactly.
/// Yesterday's code therefore expires at midnight.
pub fn validate_code(code: &str, prefix: &str, today: NaiveDate, secret: &str) -> bool {
    !code.is_empty() && code == daily_code(prefix, today, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn code_is_deterministic_and_prefixed() {
        let a = daily_code("VERRA_ATT", day(2), "s3cret");
        let b = daily_code("VERRA_ATT", day(2), "s3cret");

        assert_eq!(a, b);
        assert!(a.starts_with("VERRA_ATT-20250602-"));
        assert_eq!(a.len(), "VERRA_ATT-20250602-".len() + SUFFIX_LEN);
    }

    #[test]
    fn code_changes_with_date_prefix_and_secret() {
        let base = daily_code("VERRA_ATT", day(2), "s3cret");

        assert_ne!(base, daily_code("VERRA_ATT", day(3), "s3cret"));
        assert_ne!(base, daily_code("OTHER", day(2), "s3cret"));
        assert_ne!(base, daily_code("VERRA_ATT", day(2), "other"));
    }

    #[test]
    fn todays_code_validates() {
        let code = daily_code("VERRA_ATT", day(2), "s3cret");
        assert!(validate_code(&code, "VERRA_ATT", day(2), "s3cret"));
    }

    #[test]
    fn stale_tampered_and_empty_codes_are_rejected() {
        let code = daily_code("VERRA_ATT", day(2), "s3cret");

        // yesterday's code, presented today
        assert!(!validate_code(&code, "VERRA_ATT", day(3), "s3cret"));
        // flipped suffix character
        let mut tampered = code.clone();
        let swapped = if tampered.ends_with('0') { '1' } else { '0' };
        tampered.pop();
        tampered.push(swapped);
        assert!(!validate_code(&tampered, "VERRA_ATT", day(2), "s3cret"));
        // empty input
        assert!(!validate_code("", "VERRA_ATT", day(2), "s3cret"));
    }
}
