//! Disk cache of campus map thumbnails.
//!
//! Files are named `<map id>.png` and never expire; the remote image for a map
//! id is stable. The in-memory path set mirrors the directory so a request
//! needs no existence check on disk.

use crate::http::HttpFetcher;
use apollo_shared::ApolloError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub struct ThumbnailCache {
    dir: PathBuf,
    thumbnail_url: String,
    http: Arc<dyn HttpFetcher>,
    cached: Mutex<HashSet<PathBuf>>,
}

impl ThumbnailCache {
    /// Create the cache directory if needed and index the files already in it
    pub fn open(dir: &Path, thumbnail_url: &str, http: Arc<dyn HttpFetcher>) -> Result<Self, ApolloError> {
        std::fs::create_dir_all(dir)?;

        let mut cached = HashSet::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "png") {
                cached.insert(path);
            }
        }
        info!("Thumbnail cache {}: {} cached rooms", dir.display(), cached.len());

        Ok(Self {
            dir: dir.to_path_buf(),
            thumbnail_url: thumbnail_url.trim_end_matches('/').to_string(),
            http,
            cached: Mutex::new(cached),
        })
    }

    /// Cache file for a map id. The id is percent-encoded, so distinct ids
    /// never share a file and `/` cannot leave the directory.
    pub fn path_for(&self, map_id: &str) -> PathBuf {
        self.dir.join(format!("{}.png", urlencoding::encode(map_id)))
    }

    pub fn is_cached(&self, map_id: &str) -> bool {
        let path = self.path_for(map_id);
        self.cached.lock().map(|c| c.contains(&path)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.cached.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Image bytes for a map id, fetching and storing them on first use
    pub async fn get(&self, map_id: &str) -> Result<Vec<u8>, ApolloError> {
        let path = self.path_for(map_id);

        if self.is_cached(map_id) {
            debug!("Thumbnail cache hit for {}", map_id);
            return Ok(tokio::fs::read(&path).await?);
        }

        info!("Caching thumbnail for room {}", map_id);
        let url = format!("{}/{}", self.thumbnail_url, urlencoding::encode(map_id));
        let bytes = self
            .http
            .get_bytes(&url)
            .await
            .map_err(|e| ApolloError::Fetch(e.to_string()))?;

        tokio::fs::write(&path, &bytes).await?;
        if let Ok(mut cached) = self.cached.lock() {
            cached.insert(path);
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FakeFetcher;

    const THUMB_URL: &str = "https://search.test/api/map-thumbnail";

    #[tokio::test]
    async fn test_miss_fetches_and_writes_then_hit_reads() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeFetcher::new().with_bytes(THUMB_URL, vec![1, 2, 3]));
        let cache = ThumbnailCache::open(dir.path(), THUMB_URL, fake.clone()).unwrap();
        assert!(cache.is_empty());

        let first = cache.get("abc").await.unwrap();
        assert_eq!(fake.count(THUMB_URL), 1);
        assert!(cache.path_for("abc").exists());
        assert_eq!(std::fs::read(cache.path_for("abc")).unwrap(), vec![1, 2, 3]);

        let second = cache.get("abc").await.unwrap();
        assert_eq!(fake.count(THUMB_URL), 1);
        assert_eq!(first, second);
        assert_eq!(fake.requests()[0].url, format!("{}/abc", THUMB_URL));
    }

    #[tokio::test]
    async fn test_existing_files_are_indexed_at_open() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("warm.png"), b"png").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let fake = Arc::new(FakeFetcher::new());
        let cache = ThumbnailCache::open(dir.path(), THUMB_URL, fake.clone()).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("warm").await.unwrap(), b"png".to_vec());
        assert_eq!(fake.count(THUMB_URL), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ThumbnailCache::open(dir.path(), THUMB_URL, Arc::new(FakeFetcher::new())).unwrap();

        assert!(matches!(cache.get("gone").await, Err(ApolloError::Fetch(_))));
        assert!(!cache.path_for("gone").exists());
        assert!(!cache.is_cached("gone"));
    }

    #[test]
    fn test_path_is_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ThumbnailCache::open(dir.path(), THUMB_URL, Arc::new(FakeFetcher::new())).unwrap();
        assert_eq!(cache.path_for("../x y"), dir.path().join("..%2Fx%20y.png"));
        assert_ne!(cache.path_for("a.b"), cache.path_for("a_b"));
    }

    #[tokio::test]
    async fn test_similar_ids_get_their_own_images() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(
            FakeFetcher::new()
                .with_bytes(&format!("{}/a.b", THUMB_URL), vec![1])
                .with_bytes(&format!("{}/a_b", THUMB_URL), vec![2]),
        );
        let cache = ThumbnailCache::open(dir.path(), THUMB_URL, fake.clone()).unwrap();

        assert_eq!(cache.get("a.b").await.unwrap(), vec![1]);
        assert_eq!(cache.get("a_b").await.unwrap(), vec![2]);
        assert_eq!(fake.count(THUMB_URL), 2);
    }
}
