//! Filename grammar for post assets
//!
//! Expected shape: `<digits><optional single letter>-<rest>.<extension>`.
//! The prefix before the first dash must be digits plus at most one letter;
//! anything else does not parse. `rest` may itself contain dashes and dots
//! (the final dot separates the extension) and may be empty.
//!
//! Examples:
//!   `1-25.03.30-7-COF08256.jpg` -> number 1, no letter, match key `25.03.30-7-COF08256`
//!   `2b-COF08256.jpg`           -> number 2, letter `b`, match key `COF08256`
//!   `4-.jpg`                    -> number 4, no letter, empty match key

use once_cell::sync::Lazy;
use regex::Regex;

static FILE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)([a-zA-Z]?)-(.*)\.([^.]+)$").expect("valid pattern"));

/// Parsed components of a post asset filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Full prefix before the first dash, e.g. `2a`
    pub group_key: String,
    /// Post position within the sequence
    pub number: u64,
    /// `None` for the main asset, `Some('a')`.. for secondaries.
    /// Case-sensitive; ordering is byte order of the letter.
    pub letter: Option<char>,
    /// Remainder between the first dash and the extension, used to
    /// correlate this file with a same-named file in another folder.
    /// May be empty.
    pub match_key: String,
}

/// Parse a filename against the post asset grammar.
///
/// Returns `None` for anything that does not fit; callers warn and skip.
pub fn parse(file_name: &str) -> Option<ParsedName> {
    let caps = FILE_NAME_RE.captures(file_name)?;

    let digits = &caps[1];
    let number: u64 = digits.parse().ok()?;
    let letter = caps[2].chars().next();
    let match_key = caps[3].to_string();

    Some(ParsedName {
        group_key: format!("{}{}", digits, &caps[2]),
        number,
        letter,
        match_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_secondary_with_dotted_match_key() {
        let parsed = parse("2a-25.03.30-7-COF.jpg").unwrap();
        assert_eq!(parsed.group_key, "2a");
        assert_eq!(parsed.number, 2);
        assert_eq!(parsed.letter, Some('a'));
        assert_eq!(parsed.match_key, "25.03.30-7-COF");
    }

    #[test]
    fn parses_main_asset_with_empty_match_key() {
        let parsed = parse("4-.jpg").unwrap();
        assert_eq!(parsed.group_key, "4");
        assert_eq!(parsed.number, 4);
        assert_eq!(parsed.letter, None);
        assert_eq!(parsed.match_key, "");
    }

    #[test]
    fn parses_plain_main_asset() {
        let parsed = parse("1-25.03.30-7-COF08256.jpg").unwrap();
        assert_eq!(parsed.number, 1);
        assert_eq!(parsed.letter, None);
        assert_eq!(parsed.match_key, "25.03.30-7-COF08256");
    }

    #[test]
    fn rejects_names_without_numeric_prefix() {
        assert_eq!(parse("bad_name.jpg"), None);
        assert_eq!(parse("a1-photo.jpg"), None);
        assert_eq!(parse("-photo.jpg"), None);
    }

    #[test]
    fn rejects_prefix_with_more_than_one_letter() {
        assert_eq!(parse("2ab-photo.jpg"), None);
    }

    #[test]
    fn rejects_names_without_extension_or_dash() {
        assert_eq!(parse("3-photo"), None);
        assert_eq!(parse("3.jpg"), None);
    }

    #[test]
    fn letter_suffix_is_case_sensitive() {
        let lower = parse("2a-x.jpg").unwrap();
        let upper = parse("2A-x.jpg").unwrap();
        assert_eq!(lower.letter, Some('a'));
        assert_eq!(upper.letter, Some('A'));
        assert_ne!(lower.group_key, upper.group_key);
    }
}
