//! HTTP fetching for the remote room, week and thumbnail APIs.
//!
//! Production code uses `ReqwestFetcher`. Tests use `FakeFetcher`, which
//! serves canned responses by URL prefix and records every request.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// HTTP fetch errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Trait abstraction over the HTTP client
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET `url` and parse the body as JSON
    async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> Result<Value, FetchError>;

    /// GET `url` and return the raw body
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

// ============================================================================
// Real fetcher
// ============================================================================

pub struct ReqwestFetcher {
    http: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("apollo/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    async fn send(&self, url: &str, headers: &[(&str, &str)]) -> Result<reqwest::Response, FetchError> {
        let mut request = self.http.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> Result<Value, FetchError> {
        debug!("GET {}", url);
        self.send(url, headers)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!("GET {} (bytes)", url);
        let body = self
            .send(url, &[])
            .await?
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(body.to_vec())
    }
}

// ============================================================================
// Fake fetcher (testing)
// ============================================================================

/// A request seen by `FakeFetcher`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// Canned responses keyed by URL prefix. Unknown URLs fail with HTTP 404.
#[derive(Default)]
pub struct FakeFetcher {
    json: Mutex<HashMap<String, Value>>,
    bytes: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, url_prefix: &str, body: Value) -> Self {
        self.set_json(url_prefix, body);
        self
    }

    pub fn with_bytes(self, url_prefix: &str, body: Vec<u8>) -> Self {
        if let Ok(mut bytes) = self.bytes.lock() {
            bytes.insert(url_prefix.to_string(), body);
        }
        self
    }

    /// Replace the JSON served for a prefix
    pub fn set_json(&self, url_prefix: &str, body: Value) {
        if let Ok(mut json) = self.json.lock() {
            json.insert(url_prefix.to_string(), body);
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of requests whose URL starts with `url_prefix`
    pub fn count(&self, url_prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.url.starts_with(url_prefix))
            .count()
    }

    fn record(&self, url: &str, headers: &[(&str, &str)]) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                url: url.to_string(),
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });
        }
    }

    fn lookup<T: Clone>(map: &Mutex<HashMap<String, T>>, url: &str) -> Result<T, FetchError> {
        let map = map
            .lock()
            .map_err(|_| FetchError::Network("fake fetcher poisoned".to_string()))?;
        map.iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, body)| body.clone())
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

#[async_trait]
impl HttpFetcher for FakeFetcher {
    async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> Result<Value, FetchError> {
        self.record(url, headers);
        Self::lookup(&self.json, url)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.record(url, &[]);
        Self::lookup(&self.bytes, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fake_serves_longest_prefix() {
        let fake = FakeFetcher::new()
            .with_json("https://a.test/", json!(1))
            .with_json("https://a.test/rooms", json!(2));

        assert_eq!(fake.get_json("https://a.test/rooms?q=x", &[]).await.unwrap(), json!(2));
        assert_eq!(fake.get_json("https://a.test/weeks", &[]).await.unwrap(), json!(1));
        assert!(fake.get_json("https://b.test/", &[]).await.is_err());
        assert_eq!(fake.count("https://a.test/"), 2);
    }
}
