//! HTTP client for the dashboard API.
//!
//! Two endpoints exist: `GET /api/getAll` returning a JSON array of
//! events and `POST /api/add` taking a single event as a JSON body.
//! A non-2xx status is a failure; response bodies of writes are not
//! parsed further. Timeout behavior belongs to reqwest and a timed-out
//! request surfaces exactly like any other transport failure.

use reqwest::Client;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::offline::queue::PendingWrite;

/// Client for the dashboard server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Config,
    client: Client,
}

impl ApiClient {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { config, client })
    }

    /// Fetch all events from the server.
    pub async fn fetch_events(&self) -> Result<Vec<Event>> {
        let response = self.client.get(self.config.get_all_url()).send().await?;
        if !response.status().is_success() {
            return Err(Error::Http {
                status: response.status().as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    /// Post a single new event.
    pub async fn post_event(&self, event: &Event) -> Result<()> {
        let response = self
            .client
            .post(self.config.add_event_url())
            .json(event)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Http {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    /// The deferred-queue representation of `post_event` for this event,
    /// so a write that failed now can be replayed byte-for-byte later.
    pub fn pending_write_for(&self, event: &Event) -> Result<PendingWrite> {
        Ok(PendingWrite::new(
            "POST",
            self.config.add_event_url(),
            vec![("Content-Type".to_string(), "application/json".to_string())],
            serde_json::to_string(event)?,
        ))
    }

    /// Replay an opaque queued request. Used by the drain loop; success
    /// means only "the server answered 2xx".
    pub async fn send(&self, write: &PendingWrite) -> Result<()> {
        let method: reqwest::Method = write
            .method
            .parse()
            .map_err(|_| Error::Config(format!("invalid HTTP method '{}'", write.method)))?;

        let mut request = self.client.request(method, &write.url);
        for (name, value) in &write.headers {
            request = request.header(name, value);
        }

        let response = request.body(write.body.clone()).send().await?;
        if !response.status().is_success() {
            return Err(Error::Http {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
