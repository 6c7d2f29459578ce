//! Match-percentage parsing.
//!
//! The match prompt asks for a first line of exactly `<int>%`. Models do not
//! always comply, so parsing is best effort: take the first line of the
//! trimmed response, keep every ASCII digit on it in order, and read the
//! result as an integer. Anything outside 0–100 is "no score".
//!
//! Digits from separate numbers on the first line are concatenated, so
//! `"78% (see page 2)"` reads as 782 and is rejected, while
//! `"7 of 8 matched"` reads as 78. This is kept as-is; callers must always
//! show the raw response next to the score.
//!
//! Line boundaries are the full Unicode set (`\r`, `\x0b`, `\x0c`,
//! `\x1c`-`\x1e`, NEL, U+2028, U+2029 as well as `\n`), so a lone carriage
//! return ends the first line.
//!
//! Only ASCII `0-9` count as digits. Other Unicode digits (Arabic-Indic,
//! superscripts, fullwidth) are dropped rather than interpreted, so `"٧٨%"`
//! has no score and `"8²%"` reads as 8.

use crate::output::MatchResult;
use tracing::debug;

/// Parse the leading percentage of a match response.
pub fn parse_score(response: &str) -> Option<u8> {
    let first_line = response.trim().split(is_line_break).next().unwrap_or("").trim();
    let digits: String = first_line.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        debug!("No digits on first line: {:?}", first_line);
        return None;
    }

    // Overflowing digit strings are out of range as well.
    match digits.parse::<u64>() {
        Ok(n) if n <= 100 => Some(n as u8),
        _ => {
            debug!("First-line value {} is outside 0-100", digits);
            None
        }
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Wrap a raw match response with its parsed score.
pub fn to_match_result(response: impl Into<String>) -> MatchResult {
    let response = response.into();
    MatchResult {
        score: parse_score(&response),
        response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_percentage() {
        assert_eq!(parse_score("78%\nExplanation..."), Some(78));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(parse_score("0%"), Some(0));
        assert_eq!(parse_score("100%\n\nPerfect"), Some(100));
    }

    #[test]
    fn above_hundred_is_absent() {
        assert_eq!(parse_score("105%\n..."), None);
    }

    #[test]
    fn no_digits_is_absent() {
        assert_eq!(parse_score("no number here"), None);
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("   \n  "), None);
    }

    #[test]
    fn digits_from_separate_numbers_concatenate() {
        assert_eq!(parse_score("7 of 8 matched\n..."), Some(78));
        assert_eq!(parse_score("78% (see page 2)"), None);
    }

    #[test]
    fn only_first_line_counts() {
        assert_eq!(parse_score("Match score\n85%"), None);
        assert_eq!(parse_score("Score: 64 %\n\n- missing: Kubernetes 1.29"), Some(64));
    }

    #[test]
    fn leading_blank_lines_are_ignored() {
        assert_eq!(parse_score("\n\n  91%  \n\nStrong overlap"), Some(91));
    }

    #[test]
    fn leading_zeros_and_overflow() {
        assert_eq!(parse_score("007%"), Some(7));
        assert_eq!(parse_score("99999999999999999999999%"), None);
    }

    #[test]
    fn any_line_break_ends_first_line() {
        assert_eq!(parse_score("78%\r(see page 2)"), Some(78));
        assert_eq!(parse_score("91%\r\nStrong overlap, 3 gaps"), Some(91));
        assert_eq!(parse_score("64%\u{2028}Note: 3 gaps"), Some(64));
        assert_eq!(parse_score("55%\u{2029}2 gaps"), Some(55));
        assert_eq!(parse_score("40%\x0c12 pages"), Some(40));
        assert_eq!(parse_score("33%\u{85}1 gap"), Some(33));
    }

    #[test]
    fn non_ascii_digits_are_ignored() {
        assert_eq!(parse_score("8²%"), Some(8));
        assert_eq!(parse_score("٧٨%"), None);
    }

    #[test]
    fn match_result_keeps_raw_response() {
        let m = to_match_result("about eighty\n\nwhatever");
        assert!(!m.is_parsed());
        assert_eq!(m.response, "about eighty\n\nwhatever");

        let m = to_match_result("42%");
        assert_eq!(m.score, Some(42));
    }
}
