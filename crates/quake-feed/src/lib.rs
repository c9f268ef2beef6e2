//! Retrieval of the earthquake feed and overlay documents.
//!
//! A fetch is a single request or file read. Nothing is retried; callers decide
//! what a failure means for the scene.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

mod types;

pub use types::{FeedLocation, FetchError};

/// USGS summary feed of every earthquake in the past week.
pub const USGS_ALL_WEEK_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";

/// PB2002 plate-boundary lines shipped next to the page.
pub const DEFAULT_PLATES_PATH: &str = "static/data/PB2002_boundaries.json";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches JSON documents over HTTP or from disk.
#[derive(Clone)]
pub struct DataSource {
    client: Client,
}

impl DataSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quakemap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Fetch `location` and parse the body as JSON.
    pub async fn fetch_json(&self, location: &FeedLocation) -> Result<Value, FetchError> {
        let bytes = match location {
            FeedLocation::Remote(url) => self.fetch_remote(url).await?,
            FeedLocation::Local(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| FetchError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
        };
        debug!("Fetched {} bytes from {location}", bytes.len());

        serde_json::from_slice(&bytes).map_err(|source| FetchError::Json {
            location: location.to_string(),
            source,
        })
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(request_error)?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }
        let bytes = response.bytes().await.map_err(request_error)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, path::PathBuf};

    use super::*;

    #[test]
    fn parses_locations() {
        assert_eq!(
            FeedLocation::parse(USGS_ALL_WEEK_URL),
            FeedLocation::Remote(USGS_ALL_WEEK_URL.to_string())
        );
        assert_eq!(
            FeedLocation::parse(DEFAULT_PLATES_PATH),
            FeedLocation::Local(PathBuf::from(DEFAULT_PLATES_PATH))
        );
        assert_eq!(FeedLocation::parse("data/x.json").to_string(), "data/x.json");
    }

    #[tokio::test]
    async fn reads_local_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"type":"FeatureCollection","features":[]}}"#).unwrap();

        let source = DataSource::new(DEFAULT_TIMEOUT).unwrap();
        let location = FeedLocation::Local(file.path().to_path_buf());
        let value = source.fetch_json(&location).await.unwrap();
        assert_eq!(value["type"], "FeatureCollection");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let location = FeedLocation::Local(dir.path().join("absent.geojson"));

        let source = DataSource::new(DEFAULT_TIMEOUT).unwrap();
        let err = source.fetch_json(&location).await.unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn invalid_body_is_a_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<html>maintenance</html>").unwrap();

        let source = DataSource::new(DEFAULT_TIMEOUT).unwrap();
        let err = source
            .fetch_json(&FeedLocation::Local(file.path().to_path_buf()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Json { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        let source = DataSource::new(Duration::from_secs(2)).unwrap();
        let err = source
            .fetch_json(&FeedLocation::Remote("http://127.0.0.1:9/feed.geojson".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }), "{err:?}");
    }
}
