//! Room reply assembly. Pure: no network or disk.

use super::directory::RoomDirectory;
use crate::config::RoomsConfig;
use crate::store::MiniKarmaMode;
use apollo_shared::term::timetable_links;
use apollo_shared::{ImagePlacement, ReplyAttachment, RichReply, RoomCandidate, TermWeek, MAP_ATTACHMENT_NAME};

pub const MISSING_ROOM_FOOTER: &str =
    "Missing a room? Add it with a PR or ask exec to add an alias. !roompr for more";

/// Everything the reply needs besides the room itself
pub struct ReplyContext<'a> {
    pub directory: &'a RoomDirectory,
    pub links: &'a RoomsConfig,
    pub week: Option<&'a TermWeek>,
    pub thumbnail: Option<Vec<u8>>,
    pub mode: MiniKarmaMode,
}

pub fn compose_room_reply(room: &RoomCandidate, ctx: ReplyContext<'_>) -> RichReply {
    let name = &room.display_name;
    let mut reply = RichReply::new(
        format!("Room Search: {}", name),
        format!("Building: **{} {}**", room.building_name, room.floor_label),
    );

    if let Some(cms_id) = &room.cms_id {
        reply.add_field(
            "Campus Map:",
            format!("**[{}]({}?cmsid={})**", name, ctx.links.campus_map_url, cms_id),
            true,
        );
    }

    if let Some(info) = ctx.directory.central_info(name) {
        reply.add_field(
            "Room Info:",
            format!(
                "**[{}]({}/{})**",
                name,
                ctx.links.room_info_url.trim_end_matches('/'),
                info
            ),
            true,
        );
    }

    if let (Some(tt_id), Some(week)) = (ctx.directory.timetable_id(name), ctx.week) {
        let [this_week, next_week, term] = timetable_links(&ctx.links.timetable_url, week, tt_id);
        reply.add_field(
            "Timetable:",
            format!(
                "**[{}]({})**\n[{}]({})\n[{}]({})",
                this_week.label, this_week.url, next_week.label, next_week.url, term.label, term.url
            ),
            true,
        );
    }

    if let Some(bytes) = ctx.thumbnail {
        let placement = match ctx.mode {
            MiniKarmaMode::Normal => ImagePlacement::Image,
            MiniKarmaMode::Mini => ImagePlacement::Thumbnail,
        };
        reply.attachment = Some(ReplyAttachment {
            filename: MAP_ATTACHMENT_NAME.to_string(),
            bytes,
            placement,
        });
    }
    if ctx.mode == MiniKarmaMode::Normal {
        reply.footer = Some(MISSING_ROOM_FOOTER.to_string());
    }

    reply
}
