//! Discord adapter over serenity.

use anyhow::{Context as _, Result};
use apollo_shared::{ImagePlacement, RichReply};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::all::{
    ChannelId, Client, Context, CreateAttachment, CreateEmbed, CreateEmbedFooter, CreateMessage,
    EditMessage, EventHandler, GatewayIntents, GetMessages, GuildId, Message, MessageId,
    ReactionCollector, ReactionType, Ready, UserId,
};
use std::time::Duration;
use tracing::{info, warn};

use crate::commands::handle_message;
use crate::platform::{Author, ChatPlatform, IncomingMessage, MessageRef};
use crate::state::SharedState;

pub struct DiscordPlatform {
    ctx: Context,
    bot_id: u64,
}

impl DiscordPlatform {
    pub fn new(ctx: Context) -> Self {
        let bot_id = ctx.cache.current_user().id.get();
        Self { ctx, bot_id }
    }

    fn message_builder(channel: u64, reply_to: Option<u64>) -> CreateMessage {
        let builder = CreateMessage::new();
        match reply_to {
            Some(id) => builder.reference_message((ChannelId::new(channel), MessageId::new(id))),
            None => builder,
        }
    }
}

fn embed_from_reply(reply: &RichReply) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&reply.title)
        .description(&reply.description);
    for field in &reply.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &reply.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(attachment) = &reply.attachment {
        embed = match attachment.placement {
            ImagePlacement::Image => embed.image(attachment.url()),
            ImagePlacement::Thumbnail => embed.thumbnail(attachment.url()),
        };
    }
    embed
}

/// Convert a gateway message into the platform-neutral form
pub fn incoming_from(msg: &Message) -> IncomingMessage {
    let created_at = DateTime::from_timestamp(msg.timestamp.unix_timestamp(), 0).unwrap_or_else(Utc::now);
    let reply_to = msg
        .message_reference
        .as_ref()
        .and_then(|r| r.message_id)
        .map(|id| MessageRef {
            message_id: id.get(),
            author_id: msg.referenced_message.as_ref().map(|m| m.author.id.get()),
        });

    IncomingMessage {
        id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        guild_id: msg.guild_id.map(|g| g.get()),
        author: Author {
            id: msg.author.id.get(),
            name: msg.author.name.clone(),
            bot: msg.author.bot,
        },
        content: msg.content.clone(),
        created_at,
        reply_to,
    }
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    fn bot_user_id(&self) -> u64 {
        self.bot_id
    }

    async fn send_reply(&self, channel: u64, reply_to: u64, reply: &RichReply) -> Result<u64> {
        let mut builder = Self::message_builder(channel, Some(reply_to)).embed(embed_from_reply(reply));
        if let Some(attachment) = &reply.attachment {
            builder = builder.add_file(CreateAttachment::bytes(
                attachment.bytes.clone(),
                attachment.filename.clone(),
            ));
        }
        let sent = ChannelId::new(channel)
            .send_message(&self.ctx.http, builder)
            .await
            .context("Failed to send room reply")?;
        Ok(sent.id.get())
    }

    async fn send_text(&self, channel: u64, reply_to: Option<u64>, text: &str) -> Result<u64> {
        let builder = Self::message_builder(channel, reply_to).content(text);
        let sent = ChannelId::new(channel)
            .send_message(&self.ctx.http, builder)
            .await
            .context("Failed to send message")?;
        Ok(sent.id.get())
    }

    async fn add_reaction(&self, channel: u64, message: u64, symbol: &str) -> Result<()> {
        ChannelId::new(channel)
            .create_reaction(
                &self.ctx.http,
                MessageId::new(message),
                ReactionType::Unicode(symbol.to_string()),
            )
            .await?;
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
        let allowed: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
        let reaction = ReactionCollector::new(&self.ctx)
            .message_id(MessageId::new(message))
            .author_id(UserId::new(user))
            .timeout(timeout)
            .filter(move |r| matches!(&r.emoji, ReactionType::Unicode(s) if allowed.contains(s)))
            .next()
            .await;

        Ok(reaction.and_then(|r| match r.emoji {
            ReactionType::Unicode(s) => Some(s),
            _ => None,
        }))
    }

    async fn delete_message(&self, channel: u64, message: u64) -> Result<()> {
        ChannelId::new(channel)
            .delete_message(&self.ctx.http, MessageId::new(message))
            .await?;
        Ok(())
    }

    async fn suppress_embeds(&self, channel: u64, message: u64) -> Result<()> {
        ChannelId::new(channel)
            .edit_message(
                &self.ctx.http,
                MessageId::new(message),
                EditMessage::new().suppress_embeds(true),
            )
            .await?;
        Ok(())
    }

    async fn message_author(&self, channel: u64, message: u64) -> Result<Option<u64>> {
        let msg = ChannelId::new(channel)
            .message(&self.ctx.http, MessageId::new(message))
            .await?;
        Ok(Some(msg.author.id.get()))
    }

    async fn previous_message_author(&self, channel: u64, before: u64) -> Result<Option<u64>> {
        let messages = ChannelId::new(channel)
            .messages(
                &self.ctx.http,
                GetMessages::new().before(MessageId::new(before)).limit(1),
            )
            .await?;
        Ok(messages.first().map(|m| m.author.id.get()))
    }

    async fn member_has_any_role(&self, guild: u64, user: u64, roles: &[u64]) -> Result<bool> {
        let member = GuildId::new(guild)
            .member(&self.ctx.http, UserId::new(user))
            .await?;
        Ok(member.roles.iter().any(|r| roles.contains(&r.get())))
    }
}

struct Handler {
    state: SharedState,
}

#[serenity::async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Connected to Discord as {} ({} guilds)", ready.user.name, ready.guilds.len());
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let platform = DiscordPlatform::new(ctx);
        let incoming = incoming_from(&msg);
        if let Err(e) = handle_message(&self.state, &platform, &incoming).await {
            warn!("Handling message {} failed: {:#}", incoming.id, e);
        }
    }
}

/// Connect to the gateway and serve until shutdown
pub async fn run(token: &str, state: SharedState) -> Result<()> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(token, intents)
        .event_handler(Handler { state })
        .await
        .context("Failed to create Discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down gracefully");
            shard_manager.shutdown_all().await;
        }
    });

    client.start().await.context("Discord client stopped")?;
    Ok(())
}
