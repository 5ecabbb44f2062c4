//! Remote room resolution against the campus map autocomplete API.

use super::directory::RoomDirectory;
use crate::http::HttpFetcher;
use apollo_shared::room::candidates_from_response;
use apollo_shared::RoomCandidate;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct RoomResolver {
    http: Arc<dyn HttpFetcher>,
    autocomplete_url: String,
    token: Option<String>,
}

impl RoomResolver {
    pub fn new(http: Arc<dyn HttpFetcher>, autocomplete_url: &str, token: Option<String>) -> Self {
        Self {
            http,
            autocomplete_url: autocomplete_url.to_string(),
            token,
        }
    }

    /// Resolve free text to candidate rooms.
    ///
    /// Transport and decode failures are logged and reported as no rooms.
    pub async fn resolve(&self, directory: &RoomDirectory, query: &str) -> Vec<RoomCandidate> {
        let term = directory.search_token(query);
        if term != query.trim() {
            debug!("Room alias {:?} -> {:?}", query, term);
        }

        let url = format!(
            "{}?term={}",
            self.autocomplete_url,
            urlencoding::encode(term)
        );
        let headers: Vec<(&str, &str)> = self
            .token
            .as_deref()
            .map(|t| vec![("Authorization", t)])
            .unwrap_or_default();

        match self.http.get_json(&url, &headers).await {
            Ok(response) => {
                let rooms = candidates_from_response(&response);
                debug!("Room search {:?}: {} candidates", term, rooms.len());
                rooms
            }
            Err(e) => {
                warn!("Room search {:?} failed: {}", term, e);
                Vec::new()
            }
        }
    }
}
