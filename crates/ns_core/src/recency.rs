use lazy_static::lazy_static;
use regex::RegexSet;

lazy_static! {
    // Same-day relative phrasing only. "N days ago" for N > 1 and absolute
    // dates deliberately fall through.
    static ref RECENT_PATTERNS: RegexSet = RegexSet::new([
        r"(?i)\bminutes? ago\b",
        r"(?i)\bhours? ago\b",
        r"(?i)(?:^|[^0-9])1 day ago\b",
        r"(?i)\byesterday\b",
        r"(?i)\btoday\b",
    ])
    .expect("recency patterns are valid");
}

/// Returns true when the relative date text of a search result denotes
/// same-day-ish coverage.
pub fn is_recent(date_text: &str) -> bool {
    RECENT_PATTERNS.is_match(date_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_phrases() {
        for text in ["3 minutes ago", "2 hours ago", "1 day ago", "yesterday", "today"] {
            assert!(is_recent(text), "{text} should be recent");
        }
    }

    #[test]
    fn test_old_phrases() {
        for text in ["3 days ago", "Jan 5, 2023", "2 weeks ago", "11 days ago", "21 day ago", ""] {
            assert!(!is_recent(text), "{text} should not be recent");
        }
    }

    #[test]
    fn test_case_and_padding() {
        assert!(is_recent("1 Minute Ago"));
        assert!(is_recent("  An hour ago "));
        assert!(is_recent("YESTERDAY"));
        assert!(is_recent("Today, 14:05"));
    }
}
