//! Message dispatch: the activity listener, then prefixed commands.

use anyhow::Result;
use tracing::{debug, warn};

use crate::activity;
use crate::handlers::{handle_room, handle_roompr};
use crate::platform::{ChatPlatform, IncomingMessage};
use crate::state::BotState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Room(&'a str),
    RoomPr,
}

/// Parse a prefixed command. Unknown commands and plain text give `None`.
pub fn parse_command<'a>(content: &'a str, prefixes: &[String]) -> Option<Command<'a>> {
    let body = prefixes
        .iter()
        .find_map(|prefix| content.strip_prefix(prefix.as_str()))?;

    let (name, args) = match body.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (body, ""),
    };

    match name.to_lowercase().as_str() {
        "room" => Some(Command::Room(args)),
        "roompr" => Some(Command::RoomPr),
        _ => None,
    }
}

/// Commands are allowed for exec members anywhere, and for everyone outside
/// ignored channels.
pub async fn command_allowed(state: &BotState, platform: &dyn ChatPlatform, msg: &IncomingMessage) -> Result<bool> {
    if let Some(guild) = msg.guild_id {
        let exec_roles = &state.config.bot.exec_role_ids;
        if !exec_roles.is_empty()
            && platform
                .member_has_any_role(guild, msg.author.id, exec_roles)
                .await?
        {
            return Ok(true);
        }
    }
    let ignored = state.with_store(|s| s.is_channel_ignored(msg.channel_id))?;
    Ok(!ignored)
}

/// Entry point for every incoming message
pub async fn handle_message(state: &BotState, platform: &dyn ChatPlatform, msg: &IncomingMessage) -> Result<()> {
    if let Err(e) = activity::on_message(state, platform, msg).await {
        warn!("Activity processing for message {} failed: {:#}", msg.id, e);
    }

    if msg.author.bot {
        return Ok(());
    }
    let Some(command) = parse_command(&msg.content, &state.config.bot.command_prefixes) else {
        return Ok(());
    };

    if !command_allowed(state, platform, msg).await? {
        debug!("Dropped {:?} from {} in ignored channel {}", command, msg.author.id, msg.channel_id);
        return Ok(());
    }

    match command {
        Command::Room(query) => handle_room(state, platform, msg, query).await,
        Command::RoomPr => handle_roompr(platform, msg).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> Vec<String> {
        vec!["!".to_string(), "apollo ".to_string()]
    }

    #[test]
    fn test_parse_room_with_args() {
        assert_eq!(
            parse_command("!room  MS.01 ", &prefixes()),
            Some(Command::Room("MS.01"))
        );
        assert_eq!(
            parse_command("apollo room lib 2", &prefixes()),
            Some(Command::Room("lib 2"))
        );
        assert_eq!(parse_command("!room", &prefixes()), Some(Command::Room("")));
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(parse_command("!RoomPR", &prefixes()), Some(Command::RoomPr));
        assert_eq!(parse_command("!karma rust", &prefixes()), None);
        assert_eq!(parse_command("room MS.01", &prefixes()), None);
    }
}
