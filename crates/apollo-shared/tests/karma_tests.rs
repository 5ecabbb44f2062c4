//! Tests for karma, thanks and link parsing.

use apollo_shared::karma::{parse_karma, KarmaOp};
use apollo_shared::links::rewrite_twitter_links;
use apollo_shared::thanks::{contains_thanks, mentions_bot_name};

#[test]
fn test_single_plus() {
    let items = parse_karma("rust++");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].topic, "rust");
    assert_eq!(items[0].op, KarmaOp::Plus);
}

#[test]
fn test_quoted_topic_is_case_folded() {
    let items = parse_karma(r#""Free Pizza"++ at the social"#);
    assert_eq!(items[0].topic, "free pizza");
}

#[test]
fn test_neutral_and_minus() {
    let items = parse_karma("mondays-- weather+-");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].op, KarmaOp::Minus);
    assert_eq!(items[0].op.delta(), -1);
    assert_eq!(items[1].op, KarmaOp::Neutral);
    assert_eq!(items[1].op.delta(), 0);
}

#[test]
fn test_duplicate_topics_keep_first() {
    let items = parse_karma("tea++ TEA--");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].op, KarmaOp::Plus);
}

#[test]
fn test_code_spans_are_ignored() {
    assert!(parse_karma("run `ls --all` please").is_empty());
    assert!(parse_karma("```\nfor (i = 0; i < n; i++) {}\n```").is_empty());
}

#[test]
fn test_embedded_operators_are_ignored() {
    assert!(parse_karma("see https://example.com/a--b").is_empty());
    assert!(parse_karma("-- signature").is_empty());
    assert!(parse_karma("----").is_empty());
}

#[test]
fn test_trailing_punctuation_is_allowed() {
    let items = parse_karma("great talk, speaker++!");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].topic, "speaker");
}

#[test]
fn test_reason_after_operator() {
    let items = parse_karma("exec++ (for the pizza)");
    assert_eq!(items[0].reason.as_deref(), Some("for the pizza"));
}

#[test]
fn test_thanks_detection() {
    assert!(contains_thanks("thx!"));
    assert!(!contains_thanks("this is it"));
    assert!(mentions_bot_name("cheers Apollo", "apollo"));
}

#[test]
fn test_twitter_rewrite() {
    let rewritten =
        rewrite_twitter_links("look https://x.com/user/status/1 and http://twitter.com/a").unwrap();
    assert_eq!(
        rewritten,
        "\nhttps://fxtwitter.com/user/status/1\nhttps://fxtwitter.com/a"
    );
}

#[test]
fn test_no_twitter_link() {
    assert_eq!(rewrite_twitter_links("https://example.com"), None);
}
