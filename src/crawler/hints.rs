//! Size and date heuristics for listing rows
//!
//! Directory index pages print a size and a modification time next to each
//! link, in server- and locale-specific formats. These are captured verbatim;
//! nothing is normalized.

use regex::Regex;
use std::sync::LazyLock;

/// A size with a byte-unit suffix: "10 MB", "1.4GB", "512 kb"
static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+(?:[.,]\d+)?\s?[KMGT]B\b").expect("valid size regex")
});

/// Date formats seen on index pages, in match priority order
static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 2024-01-15 14:30[:05]
        r"\b\d{4}-\d{2}-\d{2} \d{2}:\d{2}(?::\d{2})?\b",
        // 15-Jan-2024 14:30
        r"\b\d{1,2}-[A-Za-z]{3}-\d{4} \d{2}:\d{2}\b",
        // 01/15/2024 2:30 PM; month first, so ambiguous dates read as US
        r"\b(?:0?[1-9]|1[0-2])/\d{1,2}/\d{4} \d{1,2}:\d{2}(?: ?[AaPp][Mm]\b)?",
        // 15/01/2024 14:30, reached when the first field cannot be a month
        r"\b\d{2}/\d{2}/\d{4} \d{2}:\d{2}\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid date regex"))
    .collect()
});

/// Returns the first size with a KB/MB/GB/TB unit found in the row text
pub fn size_hint(row_text: &str) -> Option<String> {
    SIZE_PATTERN
        .find(row_text)
        .map(|m| m.as_str().to_string())
}

/// Returns the first modification time found in the row text
///
/// Patterns are tried in order and the first one that matches wins.
pub fn modified_hint(row_text: &str) -> Option<String> {
    DATE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(row_text))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_with_space() {
        assert_eq!(size_hint("   10 MB"), Some("10 MB".to_string()));
    }

    #[test]
    fn test_size_without_space_and_decimal() {
        assert_eq!(
            size_hint("2024-01-15 14:30  1.4GB"),
            Some("1.4GB".to_string())
        );
    }

    #[test]
    fn test_size_case_insensitive() {
        assert_eq!(size_hint("512 kb"), Some("512 kb".to_string()));
        assert_eq!(size_hint("3 Tb"), Some("3 Tb".to_string()));
    }

    #[test]
    fn test_first_size_wins() {
        assert_eq!(size_hint("700 MB 1 GB"), Some("700 MB".to_string()));
    }

    #[test]
    fn test_no_size() {
        assert_eq!(size_hint("15-Jan-2024 14:30   1048576"), None);
        assert_eq!(size_hint("-"), None);
        assert_eq!(size_hint("MB"), None);
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(
            modified_hint("2024-01-15 14:30  1.4 GB"),
            Some("2024-01-15 14:30".to_string())
        );
        assert_eq!(
            modified_hint("2024-01-15 14:30:59"),
            Some("2024-01-15 14:30:59".to_string())
        );
    }

    #[test]
    fn test_apache_date() {
        assert_eq!(
            modified_hint("   15-Jan-2024 14:30    12M"),
            Some("15-Jan-2024 14:30".to_string())
        );
    }

    #[test]
    fn test_us_date_with_meridiem() {
        assert_eq!(
            modified_hint("1/15/2024 2:30 PM   <dir>"),
            Some("1/15/2024 2:30 PM".to_string())
        );
        assert_eq!(
            modified_hint("01/15/2024 14:30"),
            Some("01/15/2024 14:30".to_string())
        );
    }

    #[test]
    fn test_day_first_date() {
        assert_eq!(
            modified_hint("31/12/2023 09:05  4 KB"),
            Some("31/12/2023 09:05".to_string())
        );
    }

    #[test]
    fn test_ambiguous_slash_date_reads_month_first() {
        assert_eq!(
            modified_hint("05/06/2024 08:00 PM"),
            Some("05/06/2024 08:00 PM".to_string())
        );
        // Day 13 cannot be a month: only the day-first pattern applies
        assert_eq!(
            modified_hint("13/01/2024 08:00 PM"),
            Some("13/01/2024 08:00".to_string())
        );
    }

    #[test]
    fn test_no_date() {
        assert_eq!(modified_hint("10 MB"), None);
    }
}
