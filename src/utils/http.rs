use std::path::Path;
use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use thiserror::Error;

use crate::settings::FetchSettings;
use crate::utils::file::file_get;
use crate::utils::url::is_link;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Failed to send request: {0}")]
    Http(String),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("Failed to read local subscription {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Source of raw subscription bodies.
///
/// The batch only ever asks for the whole body as text; transport details
/// belong to the implementation.
pub trait SubscriptionFetcher {
    fn fetch(&self, location: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher that also understands local file paths.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from the `[fetch]` settings.
    ///
    /// `insecure_skip_verify` turns off certificate validation for every
    /// subscription GET.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        if settings.insecure_skip_verify {
            warn!("TLS certificate validation is disabled for subscription fetches");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .danger_accept_invalid_certs(settings.insecure_skip_verify)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(HttpFetcher { client })
    }
}

impl SubscriptionFetcher for HttpFetcher {
    fn fetch(&self, location: &str) -> Result<String, FetchError> {
        if !is_link(location) {
            debug!("Reading subscription from local file {}", location);
            return file_get(Path::new(location)).map_err(|source| FetchError::Io {
                path: location.to_string(),
                source,
            });
        }

        let response = self
            .client
            .get(location)
            .send()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().map_err(|e| FetchError::Http(e.to_string()))
    }
}
