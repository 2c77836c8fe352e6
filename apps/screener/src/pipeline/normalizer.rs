//! Text normalization — deterministic cleanup applied before vectorization.
//!
//! The passes run in a fixed order; later passes assume earlier ones ran.
//! The output must match what the vectorizer saw at training time, so quirks
//! (substring "RT"/"cc" removal, the kept leading space) are preserved as-is.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters replaced by a space in pass 5.
pub const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

// Whitespace here also covers the ASCII separators U+001C..U+001F, which the
// training-side cleaner treated as whitespace but Unicode White_Space does not.
static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"http[^\s\x1c-\x1f]+[\s\x1c-\x1f]*").unwrap());
static RT_CC: Lazy<Regex> = Lazy::new(|| Regex::new(r"RT|cc").unwrap());
static HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#[^\s\x1c-\x1f]+").unwrap());
static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@[^\s\x1c-\x1f]+").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\x1c-\x1f]+").unwrap());

/// Cleans raw resume text into the token stream the vectorizer expects.
pub fn clean(text: &str) -> String {
    let text = URL.replace_all(text, " ");
    let text = RT_CC.replace_all(&text, " ");
    let text = HASHTAG.replace_all(&text, "");
    let text = MENTION.replace_all(&text, "  ");
    let text = replace_punctuation(&text);
    let text = replace_non_ascii(&text);
    WHITESPACE.replace_all(&text, " ").into_owned()
}

fn replace_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| if PUNCTUATION.contains(c) { ' ' } else { c })
        .collect()
}

fn replace_non_ascii(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() { c } else { ' ' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_noise_is_removed() {
        let cleaned = clean("Visit http://x.com now RT @john #tag!");
        assert_eq!(cleaned, "Visit now ");
        for banned in ["#", "@", "http", "RT", "!"] {
            assert!(!cleaned.contains(banned), "{banned:?} left in {cleaned:?}");
        }
    }

    #[test]
    fn test_url_swallows_trailing_whitespace() {
        assert_eq!(clean("see https://github.com/me/repo\n\nSkills"), "see Skills");
    }

    #[test]
    fn test_non_ascii_becomes_space() {
        assert_eq!(clean("Café résumé"), "Caf r sum ");
    }

    #[test]
    fn test_rt_and_cc_match_inside_words() {
        assert_eq!(clean("RTarget"), " arget");
        assert_eq!(clean("success"), "su ess");
        // Case-sensitive: lowercase "rt" and uppercase "CC" survive.
        assert_eq!(clean("rt CC"), "rt CC");
    }

    #[test]
    fn test_hashtag_leaves_no_space() {
        assert_eq!(clean("a#b c"), "a c");
    }

    #[test]
    fn test_mention_and_email() {
        assert_eq!(clean("mail john@example.com today"), "mail john today");
    }

    #[test]
    fn test_punctuation_becomes_space() {
        // "#," is a hashtag and goes first, then the remaining punctuation.
        assert_eq!(clean("C++/C#, Node.js; SQL"), "C C Node js SQL");
    }

    #[test]
    fn test_leading_and_trailing_space_preserved() {
        assert_eq!(clean("\t  Data   Scientist \n"), " Data Scientist ");
    }

    #[test]
    fn test_information_separators_count_as_whitespace() {
        assert_eq!(clean("Data\u{1f}Science\u{1c}Python"), "Data Science Python");
        // The URL stops at the separator instead of eating the next word.
        assert_eq!(clean("see http://a.b\u{1f}Python rest"), "see Python rest");
        assert_eq!(clean("#ml\u{1d}Spark @me\u{1e}SQL"), " Spark SQL");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_output_has_no_whitespace_runs() {
        let cleaned = clean("Skills:\n\n- Python\t\t- SQL \u{00a0} - Spark");
        assert!(!cleaned.contains("  "));
        assert!(cleaned.chars().all(|c| c.is_ascii() && (c == ' ' || !c.is_whitespace())));
    }

    #[test]
    fn test_clean_is_idempotent() {
        let samples = [
            "Visit http://x.com now RT @john #tag!",
            "Café résumé — naïve coöperation",
            "RTarget accounts, success rate 99.5% (cc: @hr)",
            "Education Details \r\n B.Tech in CSE; GPA 8.1/10 #proud",
            "   ",
            "http",
            "line one\n\n\nline two\t\tend",
        ];
        for sample in samples {
            let once = clean(sample);
            assert_eq!(clean(&once), once, "not idempotent for {sample:?}");
        }
    }
}
