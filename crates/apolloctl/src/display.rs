//! Terminal rendering for apolloctl.

use apollo_common::store::{IgnoredChannel, KarmaRecord, MiniKarmaMode, UserRecord};
use apollo_shared::{ImagePlacement, RichReply, RoomCandidate};
use owo_colors::OwoColorize;

const KEY_WIDTH: usize = 12;

fn kv(key: &str, value: &str) -> String {
    format!("{:width$} {}", key.dimmed(), value, width = KEY_WIDTH)
}

/// A composed room reply as plain terminal text
pub fn render_reply(reply: &RichReply) -> String {
    let mut out = vec![reply.title.bold().to_string(), reply.description.clone()];
    for field in &reply.fields {
        out.push(String::new());
        out.push(field.name.cyan().to_string());
        out.extend(field.value.lines().map(|l| format!("  {}", l)));
    }
    if let Some(attachment) = &reply.attachment {
        let placement = match attachment.placement {
            ImagePlacement::Image => "image",
            ImagePlacement::Thumbnail => "thumbnail",
        };
        out.push(String::new());
        out.push(kv("map", &format!("{} ({} bytes, {})", attachment.filename, attachment.bytes.len(), placement)));
    }
    if let Some(footer) = &reply.footer {
        out.push(footer.dimmed().to_string());
    }
    out.join("\n")
}

/// Numbered candidate list for an ambiguous search
pub fn render_candidates(rooms: &[RoomCandidate]) -> String {
    let mut out = vec![format!("{} rooms match, rerun with --pick N:", rooms.len()).yellow().to_string()];
    for (i, room) in rooms.iter().enumerate() {
        out.push(format!(
            "  {:>2}. {} in {} {}",
            i + 1,
            room.display_name,
            room.building_name,
            room.floor_label
        ));
    }
    out.join("\n")
}

pub fn render_channels(channels: &[IgnoredChannel]) -> String {
    if channels.is_empty() {
        return "No ignored channels".dimmed().to_string();
    }
    channels
        .iter()
        .map(|c| {
            format!(
                "{}  added by {} on {}",
                c.channel,
                c.added_by,
                c.added_at.format("%Y-%m-%d %H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_mode(channel: u64, mode: MiniKarmaMode) -> String {
    let mode = match mode {
        MiniKarmaMode::Normal => "normal".to_string(),
        MiniKarmaMode::Mini => "mini".green().to_string(),
    };
    kv(&channel.to_string(), &mode)
}

fn colored_score(score: i64) -> String {
    match score {
        s if s > 0 => s.green().to_string(),
        s if s < 0 => s.red().to_string(),
        s => s.to_string(),
    }
}

pub fn render_karma(record: &KarmaRecord) -> String {
    [
        record.name.bold().to_string(),
        kv("score", &colored_score(record.score())),
        kv("pluses", &record.pluses.to_string()),
        kv("minuses", &record.minuses.to_string()),
        kv("neutrals", &record.neutrals.to_string()),
    ]
    .join("\n")
}

pub fn render_leaderboard(records: &[KarmaRecord]) -> String {
    if records.is_empty() {
        return "No karma yet".dimmed().to_string();
    }
    records
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{:>3}. {:<24} {}", i + 1, r.name, colored_score(r.score())))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_user(user: &UserRecord) -> String {
    [
        user.username.bold().to_string(),
        kv("uid", &user.user_uid.to_string()),
        kv("first seen", &user.first_seen.format("%Y-%m-%d %H:%M").to_string()),
        kv("last seen", &user.last_seen.format("%Y-%m-%d %H:%M").to_string()),
    ]
    .join("\n")
}
