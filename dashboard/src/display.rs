//! Formatting helpers for table cells

use chrono::{DateTime, Utc};

/// Token base units per displayed whole unit.
const UNITS_PER_TOKEN: u64 = 1_000_000_000;

/// Shorten a hash or address to `1234567...abcdefg` for table display.
/// Counts chars, not bytes: backend-supplied strings are not always ASCII.
pub fn shorten_hash(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() > 14 {
        let head: String = chars[..7].iter().collect();
        let tail: String = chars[chars.len() - 7..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        hash.to_string()
    }
}

/// Fixed-point token amount, 4 decimals.
pub fn format_amount(amount: u64) -> String {
    format!("{:.4}", amount as f64 / UNITS_PER_TOKEN as f64)
}

/// Unix seconds -> `YYYY-MM-DD HH:MM:SS` UTC, or the raw number if out of
/// range.
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}

/// Coarse age relative to now: `12s`, `4m`, `2h`, `3d`.
pub fn format_age(timestamp: i64) -> String {
    let age = (Utc::now().timestamp() - timestamp).max(0);
    if age < 60 {
        format!("{}s", age)
    } else if age < 3_600 {
        format!("{}m", age / 60)
    } else if age < 86_400 {
        format!("{}h", age / 3_600)
    } else {
        format!("{}d", age / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_hash() {
        let hash = "0x1234567890abcdef1234567890abcdef";
        let short = shorten_hash(hash);
        assert_eq!(short, "0x12345...0abcdef");
        assert_eq!(short.len(), 17);
    }

    #[test]
    fn test_short_strings_pass_through() {
        assert_eq!(shorten_hash("0xabc"), "0xabc");
    }

    #[test]
    fn test_shorten_hash_multibyte_input() {
        // 15 chars but 30 bytes; byte slicing would split a char here.
        let name = "ααααααααααααααα";
        assert_eq!(shorten_hash(name), "ααααααα...ααααααα");
        assert_eq!(shorten_hash("νόδε-α"), "νόδε-α");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_500_000_000), "1.5000");
        assert_eq!(format_amount(0), "0.0000");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
    }

    #[test]
    fn test_format_age_buckets() {
        let now = Utc::now().timestamp();
        assert!(format_age(now).ends_with('s'));
        assert_eq!(format_age(now - 120), "2m");
        assert_eq!(format_age(now - 7_200), "2h");
        assert_eq!(format_age(now - 172_800), "2d");
    }
}
