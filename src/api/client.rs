use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::api_model::{
    AnalyzeUrlRequest, FlowCheckPayload, FlowCheckRequest, FlowCheckResponse,
};
use crate::api::error::ApiError;
use crate::crawler::crawler_model::{
    Crawler, CrawlerDefinition, CrawlerPatch, CrawlerStatusReport,
};

// ============================================================================
// Backend trait
// ============================================================================

/// Operations served by the external crawler backend.
///
/// Element lists come back as raw JSON; callers run them through
/// [`ingest_elements`](crate::element::ingest::ingest_elements).
pub trait BackendApi {
    /// `POST /api/element`: DOM elements of the page at `url`.
    fn analyze_url(&self, url: &str) -> Result<Vec<Value>, ApiError>;

    /// `POST /api/flowcheck`: run staged tasks and report the resulting page.
    fn analyze_flow(&self, request: &FlowCheckRequest) -> Result<FlowCheckResponse, ApiError>;

    fn list_crawlers(&self) -> Result<Vec<Crawler>, ApiError>;
    fn create_crawler(&self, definition: &CrawlerDefinition) -> Result<Crawler, ApiError>;
    fn update_crawler(&self, id: &str, patch: &CrawlerPatch) -> Result<Crawler, ApiError>;
    fn delete_crawler(&self, id: &str) -> Result<(), ApiError>;
    fn start_crawler(&self, id: &str) -> Result<CrawlerStatusReport, ApiError>;
    fn stop_crawler(&self, id: &str) -> Result<CrawlerStatusReport, ApiError>;
    fn crawler_status(&self, id: &str) -> Result<CrawlerStatusReport, ApiError>;
    fn crawler_results(&self, id: &str) -> Result<Value, ApiError>;
    fn export_crawler(&self, id: &str) -> Result<String, ApiError>;
}

// ============================================================================
// HTTP backend
// ============================================================================

pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    /// `timeout = None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn crawler_endpoint(&self, id: &str, suffix: &str) -> String {
        self.endpoint(&format!("/api/crawlers/{}{}", id, suffix))
    }

    /// Send a request and return the body of a 2xx response.
    fn send_raw(&self, request: RequestBuilder, url: &str) -> Result<String, ApiError> {
        debug!(url, "backend request");

        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16(), &body);
            warn!(url, status = status.as_u16(), %err, "backend returned error");
            return Err(err);
        }

        Ok(body)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T, ApiError> {
        let body = self.send_raw(request, url)?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl BackendApi for HttpBackend {
    fn analyze_url(&self, url: &str) -> Result<Vec<Value>, ApiError> {
        let endpoint = self.endpoint("/api/element");
        let request = self
            .client
            .post(&endpoint)
            .json(&AnalyzeUrlRequest { url });
        self.send(request, &endpoint)
    }

    fn analyze_flow(&self, request: &FlowCheckRequest) -> Result<FlowCheckResponse, ApiError> {
        let endpoint = self.endpoint("/api/flowcheck");
        let payload: FlowCheckPayload =
            self.send(self.client.post(&endpoint).json(request), &endpoint)?;
        Ok(payload.into())
    }

    fn list_crawlers(&self) -> Result<Vec<Crawler>, ApiError> {
        let endpoint = self.endpoint("/api/crawlers");
        self.send(self.client.get(&endpoint), &endpoint)
    }

    fn create_crawler(&self, definition: &CrawlerDefinition) -> Result<Crawler, ApiError> {
        let endpoint = self.endpoint("/api/crawlers");
        self.send(self.client.post(&endpoint).json(definition), &endpoint)
    }

    fn update_crawler(&self, id: &str, patch: &CrawlerPatch) -> Result<Crawler, ApiError> {
        let endpoint = self.crawler_endpoint(id, "");
        self.send(self.client.patch(&endpoint).json(patch), &endpoint)
    }

    fn delete_crawler(&self, id: &str) -> Result<(), ApiError> {
        let endpoint = self.crawler_endpoint(id, "");
        self.send_raw(self.client.delete(&endpoint), &endpoint)?;
        Ok(())
    }

    fn start_crawler(&self, id: &str) -> Result<CrawlerStatusReport, ApiError> {
        let endpoint = self.crawler_endpoint(id, "/start");
        self.send(self.client.post(&endpoint), &endpoint)
    }

    fn stop_crawler(&self, id: &str) -> Result<CrawlerStatusReport, ApiError> {
        let endpoint = self.crawler_endpoint(id, "/stop");
        self.send(self.client.post(&endpoint), &endpoint)
    }

    fn crawler_status(&self, id: &str) -> Result<CrawlerStatusReport, ApiError> {
        let endpoint = self.crawler_endpoint(id, "/status");
        self.send(self.client.get(&endpoint), &endpoint)
    }

    fn crawler_results(&self, id: &str) -> Result<Value, ApiError> {
        let endpoint = self.crawler_endpoint(id, "/results");
        self.send(self.client.get(&endpoint), &endpoint)
    }

    fn export_crawler(&self, id: &str) -> Result<String, ApiError> {
        let endpoint = self.crawler_endpoint(id, "/export");
        self.send_raw(self.client.get(&endpoint), &endpoint)
    }
}
