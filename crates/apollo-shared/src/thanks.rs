//! Thanks detection.

use once_cell::sync::Lazy;
use regex::Regex;

static THANKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:thx|thanks|thank you|ty)\b").unwrap());

/// Whether the message thanks someone with a whole-word thanks phrase.
pub fn contains_thanks(content: &str) -> bool {
    THANKS.is_match(content)
}

/// Whether the bot is addressed by name.
pub fn mentions_bot_name(content: &str, bot_name: &str) -> bool {
    content.to_lowercase().contains(&bot_name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_words_only() {
        assert!(contains_thanks("thanks apollo"));
        assert!(contains_thanks("Thank you!"));
        assert!(contains_thanks("ty"));
        assert!(!contains_thanks("typical"));
        assert!(!contains_thanks("pretty"));
        assert!(!contains_thanks("t"));
    }
}
