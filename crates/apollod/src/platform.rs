//! Chat platform abstraction.
//!
//! Handlers talk to the chat service only through `ChatPlatform`, so the
//! room flow and the activity listener run unchanged against Discord
//! (`discord::DiscordPlatform`) and against `FakePlatform` in tests.
//!
//! All ids are platform snowflakes.

use anyhow::{bail, Result};
use apollo_shared::RichReply;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: u64,
    pub name: String,
    pub bot: bool,
}

/// The message a reply points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub message_id: u64,
    /// Known when the platform delivered the referenced message inline
    pub author_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: u64,
    pub channel_id: u64,
    /// `None` for direct messages
    pub guild_id: Option<u64>,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub reply_to: Option<MessageRef>,
}

impl IncomingMessage {
    pub fn in_guild(&self) -> bool {
        self.guild_id.is_some()
    }
}

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// The bot's own user id
    fn bot_user_id(&self) -> u64;

    /// Send a rich reply to `reply_to`, returning the new message id
    async fn send_reply(&self, channel: u64, reply_to: u64, reply: &RichReply) -> Result<u64>;

    /// Send plain text, optionally as a reply, returning the new message id
    async fn send_text(&self, channel: u64, reply_to: Option<u64>, text: &str) -> Result<u64>;

    async fn add_reaction(&self, channel: u64, message: u64, symbol: &str) -> Result<()>;

    /// Wait for `user` to react to `message` with one of `symbols`.
    /// `Ok(None)` on timeout.
    async fn await_reaction(
        &self,
        channel: u64,
        message: u64,
        user: u64,
        symbols: &[&str],
        timeout: Duration,
    ) -> Result<Option<String>>;

    async fn delete_message(&self, channel: u64, message: u64) -> Result<()>;

    /// Hide the link previews of a message
    async fn suppress_embeds(&self, channel: u64, message: u64) -> Result<()>;

    /// Author of an existing message
    async fn message_author(&self, channel: u64, message: u64) -> Result<Option<u64>>;

    /// Author of the message sent in `channel` right before `before`
    async fn previous_message_author(&self, channel: u64, before: u64) -> Result<Option<u64>>;

    async fn member_has_any_role(&self, guild: u64, user: u64, roles: &[u64]) -> Result<bool>;
}

// ============================================================================
// Fake platform (testing)
// ============================================================================

/// A message the fake platform was asked to send
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        id: u64,
        channel: u64,
        reply_to: Option<u64>,
        text: String,
    },
    Rich {
        id: u64,
        channel: u64,
        reply_to: u64,
        reply: RichReply,
    },
}

impl Sent {
    pub fn id(&self) -> u64 {
        match self {
            Sent::Text { id, .. } | Sent::Rich { id, .. } => *id,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Sent::Text { text, .. } => Some(text),
            Sent::Rich { .. } => None,
        }
    }
}

/// A reaction the fake will deliver to the next `await_reaction`
#[derive(Debug, Clone)]
pub struct ScriptedReaction {
    pub user: u64,
    pub symbol: String,
    pub after: Duration,
}

#[derive(Debug, Default)]
struct FakeState {
    next_id: u64,
    sent: Vec<Sent>,
    reactions: Vec<(u64, String)>,
    deleted: Vec<u64>,
    suppressed: Vec<u64>,
    authors: HashMap<u64, u64>,
    previous_author: Option<u64>,
    members_with_role: HashSet<u64>,
    scripted: Option<ScriptedReaction>,
    delete_during_wait: Option<Duration>,
    delete_attempts: Vec<u64>,
    fail_sends: bool,
}

/// In-memory platform that records every call.
///
/// `await_reaction` sleeps on the tokio clock, so tests using
/// `start_paused` see timeouts complete instantly.
pub struct FakePlatform {
    bot_id: u64,
    reaction_delay: Duration,
    state: Mutex<FakeState>,
}

impl FakePlatform {
    pub fn new(bot_id: u64) -> Self {
        Self {
            bot_id,
            reaction_delay: Duration::ZERO,
            state: Mutex::new(FakeState {
                next_id: 1000,
                ..Default::default()
            }),
        }
    }

    /// Make every `add_reaction` take `delay`
    pub fn with_reaction_delay(mut self, delay: Duration) -> Self {
        self.reaction_delay = delay;
        self
    }

    pub fn script_reaction(&self, user: u64, symbol: &str, after: Duration) {
        self.with_state(|s| {
            s.scripted = Some(ScriptedReaction {
                user,
                symbol: symbol.to_string(),
                after,
            })
        });
    }

    /// Have someone else delete the message being waited on after `after`
    pub fn delete_during_wait(&self, after: Duration) {
        self.with_state(|s| s.delete_during_wait = Some(after));
    }

    pub fn set_message_author(&self, message: u64, author: u64) {
        self.with_state(|s| {
            s.authors.insert(message, author);
        });
    }

    pub fn set_previous_author(&self, author: Option<u64>) {
        self.with_state(|s| s.previous_author = author);
    }

    pub fn grant_role(&self, user: u64) {
        self.with_state(|s| {
            s.members_with_role.insert(user);
        });
    }

    /// Make every send fail
    pub fn fail_sends(&self) {
        self.with_state(|s| s.fail_sends = true);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.with_state(|s| s.sent.clone())
    }

    /// Reaction symbols added to `message`, in order
    pub fn reactions_on(&self, message: u64) -> Vec<String> {
        self.with_state(|s| {
            s.reactions
                .iter()
                .filter(|(m, _)| *m == message)
                .map(|(_, symbol)| symbol.clone())
                .collect()
        })
    }

    pub fn deleted(&self) -> Vec<u64> {
        self.with_state(|s| s.deleted.clone())
    }

    /// Every `delete_message` call, including ones that failed
    pub fn delete_attempts(&self) -> Vec<u64> {
        self.with_state(|s| s.delete_attempts.clone())
    }

    pub fn suppressed(&self) -> Vec<u64> {
        self.with_state(|s| s.suppressed.clone())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    fn record_send(&self, build: impl FnOnce(u64) -> Sent) -> Result<u64> {
        self.with_state(|s| {
            if s.fail_sends {
                bail!("send failed");
            }
            s.next_id += 1;
            let id = s.next_id;
            s.sent.push(build(id));
            s.authors.insert(id, self.bot_id);
            Ok(id)
        })
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    fn bot_user_id(&self) -> u64 {
        self.bot_id
    }

    async fn send_reply(&self, channel: u64, reply_to: u64, reply: &RichReply) -> Result<u64> {
        self.record_send(|id| Sent::Rich {
            id,
            channel,
            reply_to,
            reply: reply.clone(),
        })
    }

    async fn send_text(&self, channel: u64, reply_to: Option<u64>, text: &str) -> Result<u64> {
        self.record_send(|id| Sent::Text {
            id,
            channel,
            reply_to,
            text: text.to_string(),
        })
    }

    async fn add_reaction(&self, _channel: u64, message: u64, symbol: &str) -> Result<()> {
        if !self.reaction_delay.is_zero() {
            tokio::time::sleep(self.reaction_delay).await;
        }
        if self.with_state(|s| s.deleted.contains(&message)) {
            bail!("unknown message {}", message);
        }
        self.with_state(|s| s.reactions.push((message, symbol.to_string())));
        Ok(())
    }

    async fn await_reaction(
        &self,
        _channel: u64,
        message: u64,
        user: u64,
        symbols: &[&str],
        timeout: Duration,
    ) -> Result<Option<String>> {
        if let Some(after) = self.with_state(|s| s.delete_during_wait.take()) {
            if after < timeout {
                tokio::time::sleep(after).await;
                self.with_state(|s| s.deleted.push(message));
                bail!("message {} was deleted", message);
            }
        }
        let scripted = self.with_state(|s| s.scripted.take());
        match scripted {
            Some(r) if r.user == user && symbols.contains(&r.symbol.as_str()) && r.after < timeout => {
                if !r.after.is_zero() {
                    tokio::time::sleep(r.after).await;
                }
                Ok(Some(r.symbol))
            }
            _ => {
                tokio::time::sleep(timeout).await;
                Ok(None)
            }
        }
    }

    async fn delete_message(&self, _channel: u64, message: u64) -> Result<()> {
        self.with_state(|s| {
            s.delete_attempts.push(message);
            if s.deleted.contains(&message) {
                bail!("unknown message {}", message);
            }
            s.deleted.push(message);
            Ok(())
        })
    }

    async fn suppress_embeds(&self, _channel: u64, message: u64) -> Result<()> {
        self.with_state(|s| s.suppressed.push(message));
        Ok(())
    }

    async fn message_author(&self, _channel: u64, message: u64) -> Result<Option<u64>> {
        Ok(self.with_state(|s| s.authors.get(&message).copied()))
    }

    async fn previous_message_author(&self, _channel: u64, _before: u64) -> Result<Option<u64>> {
        Ok(self.with_state(|s| s.previous_author))
    }

    async fn member_has_any_role(&self, _guild: u64, user: u64, roles: &[u64]) -> Result<bool> {
        Ok(!roles.is_empty() && self.with_state(|s| s.members_with_role.contains(&user)))
    }
}
