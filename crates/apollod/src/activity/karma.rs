//! Applying karma changes from a chat message.

use crate::platform::IncomingMessage;
use anyhow::Result;
use apollo_common::config::KarmaConfig;
use apollo_common::store::{KarmaChange, MiniKarmaMode, Store};
use apollo_shared::karma::{parse_karma, KarmaItem, KarmaOp};
use chrono::Duration;
use tracing::{debug, info};

/// Outcome for one parsed item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KarmaOutcome {
    Applied { item: KarmaItem, score: i64 },
    SelfKarma { topic: String },
    TooSoon { topic: String, wait_mins: i64 },
}

/// Parse `msg` and apply every allowed change. Empty when nothing parsed.
pub fn apply_message_karma(
    store: &mut Store,
    msg: &IncomingMessage,
    config: &KarmaConfig,
) -> Result<Vec<KarmaOutcome>> {
    let mut items = parse_karma(&msg.content);
    if items.len() > config.max_changes {
        debug!("Karma message {} truncated to {} items", msg.id, config.max_changes);
        items.truncate(config.max_changes);
    }

    let author = msg.author.name.to_lowercase();
    let timeout = Duration::minutes(config.timeout_mins);
    let mut outcomes = Vec::with_capacity(items.len());

    for item in items {
        if item.topic == author {
            outcomes.push(KarmaOutcome::SelfKarma { topic: item.topic });
            continue;
        }

        if let Some(last) = store.last_karma_change(msg.author.id, &item.topic)? {
            let elapsed = msg.created_at - last;
            if elapsed < timeout {
                let wait_mins = (timeout - elapsed).num_minutes().max(1);
                outcomes.push(KarmaOutcome::TooSoon { topic: item.topic, wait_mins });
                continue;
            }
        }

        let record = store.apply_karma(&KarmaChange {
            user_uid: msg.author.id,
            message_id: msg.id,
            item: &item,
            at: msg.created_at,
        })?;
        info!("Karma {}{} by {} -> {}", item.topic, item.op.symbol(), msg.author.id, record.score());
        outcomes.push(KarmaOutcome::Applied { item, score: record.score() });
    }
    Ok(outcomes)
}

/// Reply text for a batch of outcomes, `None` when there is nothing to say
pub fn karma_reply(outcomes: &[KarmaOutcome], mode: MiniKarmaMode) -> Option<String> {
    if outcomes.is_empty() {
        return None;
    }
    match mode {
        MiniKarmaMode::Normal => Some(full_reply(outcomes)),
        MiniKarmaMode::Mini => Some(mini_reply(outcomes)),
    }
}

fn full_reply(outcomes: &[KarmaOutcome]) -> String {
    let lines: Vec<String> = outcomes
        .iter()
        .map(|outcome| match outcome {
            KarmaOutcome::Applied { item, score } => {
                let verb = match item.op {
                    KarmaOp::Plus => "increased to",
                    KarmaOp::Minus => "decreased to",
                    KarmaOp::Neutral => "stayed at",
                };
                match &item.reason {
                    Some(reason) => format!("**{}** {} {} ({})", item.topic, verb, score, reason),
                    None => format!("**{}** {} {}", item.topic, verb, score),
                }
            }
            KarmaOutcome::SelfKarma { topic } => {
                format!("**{}**: you cannot change your own karma", topic)
            }
            KarmaOutcome::TooSoon { topic, wait_mins } => format!(
                "**{}**: changed too recently, try again in {} min",
                topic, wait_mins
            ),
        })
        .collect();
    format!("Karma changes:\n{}", lines.join("\n"))
}

fn mini_reply(outcomes: &[KarmaOutcome]) -> String {
    let applied: Vec<String> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            KarmaOutcome::Applied { item, score } => Some(format!("{} {}", item.topic, score)),
            _ => None,
        })
        .collect();
    let refused = outcomes.len() - applied.len();

    match (applied.is_empty(), refused) {
        (true, n) => format!("{} karma change(s) refused", n),
        (false, 0) => applied.join(", "),
        (false, n) => format!("{} ({} refused)", applied.join(", "), n),
    }
}
