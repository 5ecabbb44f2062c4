//! Room search: alias tables, remote resolution, term weeks, thumbnails and
//! reply assembly.
//!
//! `RoomSearch` owns every piece of process-wide room state. Construct it once
//! at startup with [`RoomSearch::init`] and share it behind an `Arc`.
//! Initialization order:
//! 1. static room tables (a missing or malformed table fails startup)
//! 2. thumbnail cache index
//! 3. term-week calculator (empty until the first request)

pub mod compose;
pub mod directory;
pub mod resolver;
pub mod term_week;
pub mod thumbnail;

pub use compose::{compose_room_reply, ReplyContext, MISSING_ROOM_FOOTER};
pub use directory::RoomDirectory;
pub use resolver::RoomResolver;
pub use term_week::{Clock, FixedClock, SystemClock, TermWeekCalculator};
pub use thumbnail::ThumbnailCache;

use crate::config::RoomsConfig;
use crate::http::HttpFetcher;
use crate::store::MiniKarmaMode;
use apollo_shared::{ApolloError, RichReply, RoomCandidate, TermWeek};
use std::sync::Arc;
use tracing::info;

/// Reply when a search yields nothing
pub const NOT_FOUND_TEXT: &str =
    "Room does not exist. Try a more general search, or suggest a room alias (more info with `!roompr`)";

/// Help text for requesting aliases
pub const ROOMPR_TEXT: &str = "This bot uses the Campus Map's API (<https://campus.warwick.ac.uk/>).\
If a name is wrong/missing on there, either ask exec to add it, or create a PR to add an alias in \
`resources/rooms/room-mapname.json`";

pub struct RoomSearch {
    config: RoomsConfig,
    directory: RoomDirectory,
    resolver: RoomResolver,
    thumbnails: ThumbnailCache,
    term: TermWeekCalculator,
}

impl RoomSearch {
    /// Load the room tables from disk and wire up the remote lookups
    pub fn init(
        config: &RoomsConfig,
        http: Arc<dyn HttpFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ApolloError> {
        let directory = RoomDirectory::load(&config.resource_dir)?;
        Self::with_directory(config, directory, http, clock)
    }

    /// Same as [`RoomSearch::init`] with tables already in memory
    pub fn with_directory(
        config: &RoomsConfig,
        directory: RoomDirectory,
        http: Arc<dyn HttpFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ApolloError> {
        let thumbnails = ThumbnailCache::open(&config.cache_dir, &config.thumbnail_url, http.clone())?;
        let resolver = RoomResolver::new(
            http.clone(),
            &config.autocomplete_url,
            config.map_api_token.clone(),
        );
        let term = TermWeekCalculator::new(http, &config.term_weeks_url, clock);
        info!("Room search ready");

        Ok(Self {
            config: config.clone(),
            directory,
            resolver,
            thumbnails,
            term,
        })
    }

    pub fn directory(&self) -> &RoomDirectory {
        &self.directory
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbnails
    }

    pub fn config(&self) -> &RoomsConfig {
        &self.config
    }

    /// Candidate rooms for free text. Empty means not found.
    pub async fn search(&self, query: &str) -> Vec<RoomCandidate> {
        self.resolver.resolve(&self.directory, query).await
    }

    pub async fn current_week(&self) -> Option<TermWeek> {
        self.term.current().await
    }

    /// Gather week and thumbnail for a chosen room and compose the reply.
    /// The week is only looked up for rooms with a timetable. A thumbnail
    /// fetch or cache write failure aborts the request.
    pub async fn build_reply(&self, room: &RoomCandidate, mode: MiniKarmaMode) -> Result<RichReply, ApolloError> {
        let week = match self.directory.timetable_id(&room.display_name) {
            Some(_) => self.current_week().await,
            None => None,
        };
        let thumbnail = self.thumbnails.get(&room.map_id).await?;

        Ok(compose_room_reply(
            room,
            ReplyContext {
                directory: &self.directory,
                links: &self.config,
                week: week.as_ref(),
                thumbnail: Some(thumbnail),
                mode,
            },
        ))
    }
}
