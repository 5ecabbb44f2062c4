//! Shared types and pure logic for the Apollo bot.
//!
//! Nothing in this crate touches the network, the disk or the chat platform;
//! the IO layers live in `apollo_common` and `apollod`.

pub mod error;
pub mod karma;
pub mod links;
pub mod reply;
pub mod room;
pub mod term;
pub mod thanks;
pub mod version;

pub use error::ApolloError;
pub use reply::{ImagePlacement, ReplyAttachment, ReplyField, RichReply};
pub use room::RoomCandidate;
pub use term::{TermWeek, WeekRecord};
pub use version::{BUILD_DATE, GIT_SHA, VERSION};

/// Reaction symbols offered when a search is ambiguous, one per candidate.
pub const CHOICE_SYMBOLS: [&str; 10] = [
    "1\u{fe0f}\u{20e3}",
    "2\u{20e3}",
    "3\u{20e3}",
    "4\u{20e3}",
    "5\u{20e3}",
    "6\u{20e3}",
    "7\u{20e3}",
    "8\u{20e3}",
    "9\u{20e3}",
    "\u{1f51f}",
];

/// Reaction used to acknowledge thanks.
pub const THANKS_REACTION: &str = "\u{1f49c}";

/// Filename the map thumbnail is attached under.
pub const MAP_ATTACHMENT_NAME: &str = "map.png";
