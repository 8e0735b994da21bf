use std::cell::{Cell, RefCell};
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::api::api_model::{FlowCheckRequest, FlowCheckResponse};
use crate::api::client::BackendApi;
use crate::api::error::ApiError;
use crate::crawler::crawler_model::{
    Crawler, CrawlerDefinition, CrawlerPatch, CrawlerStatus, CrawlerStatusReport,
};

/// Sample page served in mock mode.
pub const MOCK_ELEMENTS: &str = include_str!("mock_elements.json");

/// Offline backend: serves the bundled sample page after a simulated delay
/// and keeps crawlers in memory for the lifetime of the value.
pub struct MockBackend {
    delay: Duration,
    crawlers: RefCell<Vec<Crawler>>,
    next_id: Cell<u64>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl MockBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            crawlers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Mock with no simulated latency.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }

    fn sample(&self) -> Result<Vec<Value>, ApiError> {
        serde_json::from_str(MOCK_ELEMENTS).map_err(|e| ApiError::Decode {
            url: "mock://elements".to_string(),
            message: e.to_string(),
        })
    }

    fn with_crawler<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Crawler) -> T,
    ) -> Result<T, ApiError> {
        let mut crawlers = self.crawlers.borrow_mut();
        let crawler = crawlers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        Ok(f(crawler))
    }
}

fn report(crawler: &Crawler) -> CrawlerStatusReport {
    CrawlerStatusReport {
        id: crawler.id.clone(),
        status: crawler.status,
        last_run: crawler.last_run.clone(),
        pages_crawled: None,
        message: None,
    }
}

impl BackendApi for MockBackend {
    fn analyze_url(&self, url: &str) -> Result<Vec<Value>, ApiError> {
        debug!(url, "mock element analysis");
        self.simulate_latency();
        self.sample()
    }

    fn analyze_flow(&self, request: &FlowCheckRequest) -> Result<FlowCheckResponse, ApiError> {
        debug!(tasks = request.tasks.len(), "mock flow analysis");
        self.simulate_latency();
        Ok(FlowCheckResponse {
            elements: self.sample()?,
            metadata: json!({
                "mock": true,
                "startUrl": request.start_url,
                "tasksExecuted": request.tasks.len(),
            }),
            errors: None,
        })
    }

    fn list_crawlers(&self) -> Result<Vec<Crawler>, ApiError> {
        Ok(self.crawlers.borrow().clone())
    }

    fn create_crawler(&self, definition: &CrawlerDefinition) -> Result<Crawler, ApiError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let crawler = Crawler {
            id: format!("mock-{}", id),
            name: definition.name.clone(),
            url: definition.start_url.clone(),
            status: CrawlerStatus::Idle,
            last_run: None,
            schedule: definition.schedule,
        };
        self.crawlers.borrow_mut().push(crawler.clone());
        Ok(crawler)
    }

    fn update_crawler(&self, id: &str, patch: &CrawlerPatch) -> Result<Crawler, ApiError> {
        self.with_crawler(id, |c| {
            if let Some(name) = &patch.name {
                c.name = name.clone();
            }
            if patch.schedule.is_some() {
                c.schedule = patch.schedule;
            }
            c.clone()
        })
    }

    fn delete_crawler(&self, id: &str) -> Result<(), ApiError> {
        let mut crawlers = self.crawlers.borrow_mut();
        let before = crawlers.len();
        crawlers.retain(|c| c.id != id);
        if crawlers.len() == before {
            return Err(ApiError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn start_crawler(&self, id: &str) -> Result<CrawlerStatusReport, ApiError> {
        self.with_crawler(id, |c| {
            c.status = CrawlerStatus::Running;
            c.last_run = Some(chrono::Utc::now().to_rfc3339());
            report(c)
        })
    }

    fn stop_crawler(&self, id: &str) -> Result<CrawlerStatusReport, ApiError> {
        self.with_crawler(id, |c| {
            c.status = CrawlerStatus::Idle;
            report(c)
        })
    }

    fn crawler_status(&self, id: &str) -> Result<CrawlerStatusReport, ApiError> {
        self.with_crawler(id, |c| report(c))
    }

    fn crawler_results(&self, id: &str) -> Result<Value, ApiError> {
        self.with_crawler(id, |c| json!({ "id": c.id, "results": [] }))
    }

    fn export_crawler(&self, id: &str) -> Result<String, ApiError> {
        let crawler = self.with_crawler(id, |c| c.clone())?;
        serde_json::to_string_pretty(&crawler).map_err(|e| ApiError::Decode {
            url: format!("mock://crawlers/{}", id),
            message: e.to_string(),
        })
    }
}
