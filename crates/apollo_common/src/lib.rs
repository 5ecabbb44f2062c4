//! Apollo Common - IO layers shared by the bot daemon and the admin CLI.
//!
//! Config loading, the HTTP fetcher seam, the SQLite store and the room
//! search context.

pub mod config;
pub mod http;
pub mod rooms;
pub mod store;

pub use config::Config;
pub use http::{FakeFetcher, FetchError, HttpFetcher, ReqwestFetcher};
pub use rooms::RoomSearch;
pub use store::{MiniKarmaMode, Store};
