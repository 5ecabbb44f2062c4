//! Twitter/X link rewriting.

use once_cell::sync::Lazy;
use regex::Regex;

static TWITTER_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://(?:twitter\.com|x\.com)").unwrap());

/// Host the rewritten links point at
pub const EMBED_FRIENDLY_HOST: &str = "https://fxtwitter.com";

pub fn has_twitter_link(content: &str) -> bool {
    TWITTER_HOST.is_match(content)
}

/// Rewrite every space-separated word holding a twitter/x link.
///
/// Returns one line per rewritten word, each prefixed by a newline, or `None`
/// when nothing was rewritten.
pub fn rewrite_twitter_links(content: &str) -> Option<String> {
    let rewritten: String = content
        .split(' ')
        .filter(|word| TWITTER_HOST.is_match(word))
        .map(|word| format!("\n{}", TWITTER_HOST.replace_all(word, EMBED_FRIENDLY_HOST)))
        .collect();

    if rewritten.is_empty() {
        None
    } else {
        Some(rewritten)
    }
}
