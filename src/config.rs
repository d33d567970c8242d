//! Client configuration.
//!
//! Everything the offline core needs to be wired up once at process start:
//! the server base URL, where the two SQLite files live, the request
//! timeout, and how many replay failures a queued write gets before it is
//! parked in the dead-letter table.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Fetch-all-events endpoint path.
const GET_ALL_PATH: &str = "/api/getAll";

/// Add-event endpoint path.
const ADD_EVENT_PATH: &str = "/api/add";

/// Default per-request timeout; a timed-out request counts as a network
/// failure.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default replay attempts before a queued write is dead-lettered.
const DEFAULT_MAX_REPLAY_ATTEMPTS: u32 = 5;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    server_url: String,
    data_dir: PathBuf,
    request_timeout: Duration,
    max_replay_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        let server_url =
            std::env::var("DASHBOARDR_API_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let data_dir = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("dashboardr");
        Self {
            server_url,
            data_dir,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_replay_attempts: DEFAULT_MAX_REPLAY_ATTEMPTS,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_replay_attempts(mut self, attempts: u32) -> Self {
        self.max_replay_attempts = attempts;
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Get the full URL for an API endpoint.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), path)
    }

    /// URL of the fetch-all-events endpoint.
    pub fn get_all_url(&self) -> String {
        self.api_url(GET_ALL_PATH)
    }

    /// URL of the add-event endpoint.
    pub fn add_event_url(&self) -> String {
        self.api_url(ADD_EVENT_PATH)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the events/sync-meta database.
    pub fn events_db_path(&self) -> PathBuf {
        self.data_dir.join("events.db")
    }

    /// Path of the deferred write queue database. A separate file: the
    /// replay context opens its own pool over it and shares nothing
    /// in-memory with the foreground.
    pub fn queue_db_path(&self) -> PathBuf {
        self.data_dir.join("queue.db")
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn max_replay_attempts(&self) -> u32 {
        self.max_replay_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let config = Config::new().with_server_url("http://127.0.0.1:3000");
        assert_eq!(
            config.api_url("/api/getAll"),
            "http://127.0.0.1:3000/api/getAll"
        );
    }

    #[test]
    fn test_api_url_trailing_slash() {
        let config = Config::new().with_server_url("http://localhost:8080/");
        assert_eq!(config.add_event_url(), "http://localhost:8080/api/add");
    }

    #[test]
    fn test_db_paths_under_data_dir() {
        let config = Config::new().with_data_dir("/tmp/dashtest");
        assert_eq!(config.events_db_path(), PathBuf::from("/tmp/dashtest/events.db"));
        assert_eq!(config.queue_db_path(), PathBuf::from("/tmp/dashtest/queue.db"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::new()
            .with_request_timeout(Duration::from_secs(2))
            .with_max_replay_attempts(3);
        assert_eq!(config.request_timeout(), Duration::from_secs(2));
        assert_eq!(config.max_replay_attempts(), 3);
    }
}
