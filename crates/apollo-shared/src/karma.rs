//! Karma message parsing.
//!
//! `thing++`, `thing--` and `thing+-` change the karma of `thing`; multi-word
//! topics are quoted (`"free pizza"++`). A parenthesised reason may follow the
//! operator: `rust++ (borrow checker saved me)`. Code spans are ignored so
//! pasted C++ or shell flags do not count.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static KARMA_TRIGGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+\+|--|\+-").unwrap());

static CODE_SPANS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```|`[^`\n]*`").unwrap());

static KARMA_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:"(?P<quoted>[^"\n]+)"|(?P<bare>[^\s"]+?))(?P<op>\+\+|--|\+-)(?:[ \t]*\((?P<reason>[^)\n]*)\))?"#,
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KarmaOp {
    Plus,
    Minus,
    Neutral,
}

impl KarmaOp {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "++" => Some(KarmaOp::Plus),
            "--" => Some(KarmaOp::Minus),
            "+-" => Some(KarmaOp::Neutral),
            _ => None,
        }
    }

    pub fn delta(self) -> i64 {
        match self {
            KarmaOp::Plus => 1,
            KarmaOp::Minus => -1,
            KarmaOp::Neutral => 0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            KarmaOp::Plus => "++",
            KarmaOp::Minus => "--",
            KarmaOp::Neutral => "+-",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KarmaItem {
    /// Case-folded topic
    pub topic: String,
    pub op: KarmaOp,
    pub reason: Option<String>,
}

/// Cheap pre-check before running the full parser
pub fn has_karma_trigger(content: &str) -> bool {
    KARMA_TRIGGER.is_match(content)
}

/// Extract karma items from a message, first occurrence of each topic wins.
pub fn parse_karma(content: &str) -> Vec<KarmaItem> {
    let text = CODE_SPANS.replace_all(content, " ");
    let mut items: Vec<KarmaItem> = Vec::new();

    for caps in KARMA_ITEM.captures_iter(&text) {
        let Some(whole) = caps.get(0) else { continue };
        if !starts_at_boundary(&text, whole.start()) || !ends_at_boundary(&text, whole.end()) {
            continue;
        }

        let topic = caps
            .name("quoted")
            .or_else(|| caps.name("bare"))
            .map(|m| m.as_str().trim().to_lowercase())
            .unwrap_or_default();
        if topic.is_empty() || topic.chars().all(|c| c == '+' || c == '-') {
            continue;
        }

        let Some(op) = caps.name("op").and_then(|m| KarmaOp::parse(m.as_str())) else {
            continue;
        };
        let reason = caps
            .name("reason")
            .map(|m| m.as_str().trim().to_string())
            .filter(|r| !r.is_empty());

        if items.iter().any(|i| i.topic == topic) {
            continue;
        }
        items.push(KarmaItem { topic, op, reason });
    }
    items
}

fn starts_at_boundary(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| c.is_whitespace() || matches!(c, '(' | '['))
}

fn ends_at_boundary(text: &str, end: usize) -> bool {
    text[end..].chars().next().map_or(true, |c| {
        c.is_whitespace() || matches!(c, ',' | '.' | ';' | ':' | '!' | '?' | ')' | ']')
    })
}
