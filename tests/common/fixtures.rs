use std::cell::RefCell;

use serde_json::{Value, json};

use crawler_studio::api::api_model::{FlowCheckRequest, FlowCheckResponse};
use crawler_studio::api::client::BackendApi;
use crawler_studio::api::error::ApiError;
use crawler_studio::crawler::crawler_model::{
    Crawler, CrawlerDefinition, CrawlerPatch, CrawlerStatusReport,
};
use crawler_studio::element::element_model::RawElement;

pub fn el(tag: &str, id: Option<&str>, classes: &[&str]) -> RawElement {
    RawElement {
        tag: tag.to_string(),
        id: id.map(str::to_string),
        classes: if classes.is_empty() {
            None
        } else {
            Some(classes.iter().map(|c| c.to_string()).collect())
        },
        name: None,
    }
}

/// `[{div #a .x}, {div .x .y}]`
pub fn two_divs() -> Vec<RawElement> {
    vec![el("div", Some("a"), &["x"]), el("div", None, &["x", "y"])]
}

pub fn to_values(elements: &[RawElement]) -> Vec<Value> {
    elements
        .iter()
        .map(|e| serde_json::to_value(e).unwrap())
        .collect()
}

// ============================================================================
// Scripted backend
// ============================================================================

/// Backend answering from canned results and recording flow requests.
pub struct ScriptedBackend {
    pub page: Vec<RawElement>,
    pub flow_result: RefCell<Option<Result<FlowCheckResponse, ApiError>>>,
    pub flow_requests: RefCell<Vec<FlowCheckRequest>>,
}

impl ScriptedBackend {
    pub fn new(page: Vec<RawElement>) -> Self {
        Self {
            page,
            flow_result: RefCell::new(None),
            flow_requests: RefCell::new(Vec::new()),
        }
    }

    pub fn flow_ok(self, elements: Vec<RawElement>) -> Self {
        *self.flow_result.borrow_mut() = Some(Ok(FlowCheckResponse {
            elements: to_values(&elements),
            metadata: json!({ "scripted": true }),
            errors: None,
        }));
        self
    }

    pub fn flow_err(self, status: u16, message: &str) -> Self {
        *self.flow_result.borrow_mut() = Some(Err(ApiError::Status {
            status,
            message: message.to_string(),
        }));
        self
    }
}

fn unsupported<T>() -> Result<T, ApiError> {
    Err(ApiError::Status {
        status: 501,
        message: "not scripted".to_string(),
    })
}

impl BackendApi for ScriptedBackend {
    fn analyze_url(&self, _url: &str) -> Result<Vec<Value>, ApiError> {
        Ok(to_values(&self.page))
    }

    fn analyze_flow(&self, request: &FlowCheckRequest) -> Result<FlowCheckResponse, ApiError> {
        self.flow_requests.borrow_mut().push(request.clone());
        self.flow_result
            .borrow_mut()
            .take()
            .unwrap_or_else(unsupported)
    }

    fn list_crawlers(&self) -> Result<Vec<Crawler>, ApiError> {
        unsupported()
    }

    fn create_crawler(&self, _definition: &CrawlerDefinition) -> Result<Crawler, ApiError> {
        unsupported()
    }

    fn update_crawler(&self, _id: &str, _patch: &CrawlerPatch) -> Result<Crawler, ApiError> {
        unsupported()
    }

    fn delete_crawler(&self, _id: &str) -> Result<(), ApiError> {
        unsupported()
    }

    fn start_crawler(&self, _id: &str) -> Result<CrawlerStatusReport, ApiError> {
        unsupported()
    }

    fn stop_crawler(&self, _id: &str) -> Result<CrawlerStatusReport, ApiError> {
        unsupported()
    }

    fn crawler_status(&self, _id: &str) -> Result<CrawlerStatusReport, ApiError> {
        unsupported()
    }

    fn crawler_results(&self, _id: &str) -> Result<Value, ApiError> {
        unsupported()
    }

    fn export_crawler(&self, _id: &str) -> Result<String, ApiError> {
        unsupported()
    }
}
